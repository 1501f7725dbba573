//! Optimizer: applies AST-to-AST transforms that address diagnostics.
//!
//! Each transform declares the rule ids it can fix; the optimizer invokes
//! only transforms whose declared set intersects the rules that actually
//! fired. Transforms mutate the AST in place and report whether anything
//! changed. In dry-run mode nothing is mutated; transforms are reported as
//! would-change instead.

pub mod rewriter;
pub mod transforms;

pub use rewriter::{Rewriter, RewriterOptions};

use crate::analyzer::Diagnostic;
use crate::parser::Dockerfile;
use std::collections::HashSet;

/// An automated fix addressing one or more rules.
pub trait Transform: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Rule ids whose diagnostics this transform can address.
    fn rules(&self) -> &'static [&'static str];

    /// Apply the fix, returning true when the AST changed.
    fn apply(&self, df: &mut Dockerfile, diagnostics: &[Diagnostic]) -> bool;
}

/// Runs transforms selected by the observed diagnostics.
#[derive(Default)]
pub struct Optimizer {
    transforms: Vec<Box<dyn Transform>>,
    dry_run: bool,
}

impl Optimizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transforms(mut self, transforms: impl IntoIterator<Item = Box<dyn Transform>>) -> Self {
        self.transforms.extend(transforms);
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn optimize(&self, df: &mut Dockerfile, diagnostics: &[Diagnostic]) -> OptimizeResult {
        let triggered: HashSet<&str> = diagnostics.iter().map(|d| d.rule.as_str()).collect();
        let mut result = OptimizeResult::default();

        for transform in &self.transforms {
            if !transform.rules().iter().any(|id| triggered.contains(id)) {
                continue;
            }

            if self.dry_run {
                result.changes.push(Change {
                    transform: transform.name(),
                    description: transform.description(),
                    applied: false,
                });
                continue;
            }

            log::debug!("applying transform {}", transform.name());
            if transform.apply(df, diagnostics) {
                result.changes.push(Change {
                    transform: transform.name(),
                    description: transform.description(),
                    applied: true,
                });
            }
        }

        result
    }
}

/// One applied (or would-apply) transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub transform: &'static str,
    pub description: &'static str,
    pub applied: bool,
}

/// The outcome of an optimizer pass.
#[derive(Debug, Clone, Default)]
pub struct OptimizeResult {
    pub changes: Vec<Change>,
}

impl OptimizeResult {
    pub fn has_changes(&self) -> bool {
        self.changes.iter().any(|c| c.applied)
    }
}

/// The built-in transform set, in application order.
pub fn builtin_transforms() -> Vec<Box<dyn Transform>> {
    vec![
        Box::new(transforms::merge_run::MergeRun),
        Box::new(transforms::cache_cleanup::AddCacheCleanup),
        Box::new(transforms::no_install_recommends::AddNoInstallRecommends),
        Box::new(transforms::add_to_copy::AddToCopy),
        Box::new(transforms::maintainer_to_label::MaintainerToLabel),
        Box::new(transforms::workdir_absolute::WorkdirAbsolute),
        Box::new(transforms::remove_sudo::RemoveSudo),
        Box::new(transforms::reorder_copy::ReorderCopy::default()),
        Box::new(transforms::pin_image_tag::PinImageTag::default()),
        Box::new(transforms::instruction_case::FixInstructionCase),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{Category, Severity};
    use crate::parser::parse;

    fn diag(rule: &str) -> Diagnostic {
        Diagnostic::builder(rule, Category::Performance)
            .severity(Severity::Warning)
            .message("test")
            .build()
    }

    #[test]
    fn only_matching_transforms_run() {
        let (mut df, _) = parse("FROM alpine\nRUN a\nRUN b\n");
        let optimizer = Optimizer::new().with_transforms(builtin_transforms());
        let result = optimizer.optimize(&mut df, &[diag("PERF004")]);
        assert!(result.has_changes());
        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].transform, "merge-run");
    }

    #[test]
    fn no_diagnostics_means_no_changes() {
        let (mut df, _) = parse("FROM alpine\nRUN a\nRUN b\n");
        let before = df.clone();
        let optimizer = Optimizer::new().with_transforms(builtin_transforms());
        let result = optimizer.optimize(&mut df, &[]);
        assert!(!result.has_changes());
        assert_eq!(df, before);
    }

    #[test]
    fn dry_run_reports_without_mutating() {
        let (mut df, _) = parse("FROM alpine\nRUN a\nRUN b\n");
        let before = df.clone();
        let optimizer = Optimizer::new()
            .with_transforms(builtin_transforms())
            .dry_run(true);
        let result = optimizer.optimize(&mut df, &[diag("PERF004")]);
        assert_eq!(df, before);
        assert!(!result.has_changes());
        assert_eq!(result.changes.len(), 1);
        assert!(!result.changes[0].applied);
    }
}

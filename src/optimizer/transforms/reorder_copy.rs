//! reorder-copy: move a broad COPY to after the dependency-install RUN.

use crate::analyzer::Diagnostic;
use crate::optimizer::Transform;
use crate::parser::{Dockerfile, Instruction, Stage};
use crate::rules::performance::{is_broad_source, is_dependency_install};

#[derive(Default)]
pub struct ReorderCopy {
    /// Report would-change without mutating.
    pub dry_run: bool,
}

struct StagePlan {
    broad_copy_idx: usize,
    dep_install_idx: usize,
}

fn plan_stage(stage: &Stage) -> Option<StagePlan> {
    let mut broad_copy_idx = None;
    let mut dep_install_idx = None;

    for (i, inst) in stage.instructions.iter().enumerate() {
        match inst {
            Instruction::Copy(copy) => {
                // COPY --from moves stage artifacts, not build context.
                if broad_copy_idx.is_none()
                    && copy.from.is_none()
                    && copy.sources.iter().any(|s| is_broad_source(s))
                {
                    broad_copy_idx = Some(i);
                }
            }
            Instruction::Add(add) => {
                if broad_copy_idx.is_none() && add.sources.iter().any(|s| is_broad_source(s)) {
                    broad_copy_idx = Some(i);
                }
            }
            Instruction::Run(run) => {
                if dep_install_idx.is_none() && is_dependency_install(&run.command) {
                    dep_install_idx = Some(i);
                }
            }
            _ => {}
        }
    }

    let plan = StagePlan {
        broad_copy_idx: broad_copy_idx?,
        dep_install_idx: dep_install_idx?,
    };
    // Only a copy that precedes the install needs to move.
    (plan.broad_copy_idx < plan.dep_install_idx).then_some(plan)
}

impl ReorderCopy {
    fn reorder_stage(&self, stage: &mut Stage) -> bool {
        let plan = match plan_stage(stage) {
            Some(p) => p,
            None => return false,
        };

        if self.dry_run {
            return true;
        }

        let copy = stage.instructions.remove(plan.broad_copy_idx);
        // Removal shifted the install left by one.
        let insert_at = plan.dep_install_idx.min(stage.instructions.len());
        stage.instructions.insert(insert_at, copy);
        true
    }
}

impl Transform for ReorderCopy {
    fn name(&self) -> &'static str {
        "reorder-copy"
    }

    fn description(&self) -> &'static str {
        "Reorder COPY to come after RUN install commands for better caching"
    }

    fn rules(&self) -> &'static [&'static str] {
        &["PERF001"]
    }

    fn apply(&self, df: &mut Dockerfile, _diagnostics: &[Diagnostic]) -> bool {
        let mut changed = false;
        for stage in &mut df.stages {
            if self.reorder_stage(stage) {
                changed = true;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn names(stage: &Stage) -> Vec<&'static str> {
        stage.instructions.iter().map(|i| i.name()).collect()
    }

    #[test]
    fn broad_copy_moves_after_install() {
        let (mut df, _) = parse("FROM node:20\nCOPY . .\nRUN npm ci\nCMD [\"app\"]\n");
        assert!(ReorderCopy::default().apply(&mut df, &[]));
        assert_eq!(names(&df.stages[0]), vec!["RUN", "COPY", "CMD"]);
    }

    #[test]
    fn ordering_already_good_is_untouched() {
        let (mut df, _) = parse("FROM node:20\nRUN npm ci\nCOPY . .\n");
        assert!(!ReorderCopy::default().apply(&mut df, &[]));
    }

    #[test]
    fn narrow_copy_is_untouched() {
        let (mut df, _) = parse("FROM node:20\nCOPY package.json .\nRUN npm ci\n");
        assert!(!ReorderCopy::default().apply(&mut df, &[]));
    }

    #[test]
    fn copy_from_stage_is_untouched() {
        let (mut df, _) = parse("FROM node:20\nCOPY --from=build . .\nRUN npm ci\n");
        assert!(!ReorderCopy::default().apply(&mut df, &[]));
    }

    #[test]
    fn dry_run_reports_without_mutating() {
        let (mut df, _) = parse("FROM node:20\nCOPY . .\nRUN npm ci\n");
        let before = df.clone();
        let transform = ReorderCopy { dry_run: true };
        assert!(transform.apply(&mut df, &[]));
        assert_eq!(df, before);
    }
}

//! BP004: deprecated MAINTAINER instruction.

use crate::analyzer::{Category, Diagnostic, Severity};
use crate::parser::{Dockerfile, Instruction};
use crate::rules::{Context, Rule};

pub struct DeprecatedMaintainer;

impl Rule for DeprecatedMaintainer {
    fn id(&self) -> &'static str {
        "BP004"
    }

    fn name(&self) -> &'static str {
        "deprecated-maintainer"
    }

    fn description(&self) -> &'static str {
        "MAINTAINER is deprecated. Use LABEL maintainer=\"...\" instead."
    }

    fn category(&self) -> Category {
        Category::BestPractice
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, df: &Dockerfile, ctx: &Context) -> Vec<Diagnostic> {
        let mut diags = Vec::new();

        for stage in &df.stages {
            for inst in &stage.instructions {
                let maint = match inst {
                    Instruction::Maintainer(m) => m,
                    _ => continue,
                };

                diags.push(
                    self.diagnostic()
                        .message("MAINTAINER instruction is deprecated")
                        .pos(maint.span.start)
                        .context(ctx.line(maint.span.start.line))
                        .help(format!(
                            "Use LABEL instead: LABEL maintainer=\"{}\"",
                            maint.maintainer
                        ))
                        .fix(format!("LABEL maintainer=\"{}\"", maint.maintainer))
                        .build(),
                );
            }
        }

        diags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn check(source: &str) -> Vec<Diagnostic> {
        let (df, _) = parse(source);
        DeprecatedMaintainer.check(&df, &Context::new("Dockerfile", source))
    }

    #[test]
    fn maintainer_fires_at_its_line() {
        let diags = check("FROM alpine\nMAINTAINER x@y.z\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].pos.line, 2);
        assert!(diags[0].fixable);
        assert!(diags[0]
            .fix_suggestion
            .as_deref()
            .unwrap()
            .contains("maintainer=\"x@y.z\""));
    }

    #[test]
    fn label_maintainer_passes() {
        let diags = check("FROM alpine\nLABEL maintainer=\"x@y.z\"\n");
        assert!(diags.is_empty());
    }
}

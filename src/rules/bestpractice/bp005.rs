//! BP005: relative WORKDIR paths.

use crate::analyzer::{Category, Diagnostic, Severity};
use crate::parser::Dockerfile;
use crate::rules::{Context, Rule};

pub struct WorkdirRelative;

impl Rule for WorkdirRelative {
    fn id(&self) -> &'static str {
        "BP005"
    }

    fn name(&self) -> &'static str {
        "workdir-absolute"
    }

    fn description(&self) -> &'static str {
        "WORKDIR should use absolute paths for clarity and predictability."
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
            for wd in stage.instructions.iter().filter_map(|i| i.as_workdir()) {
                let path = &wd.path;

                // Variable-based paths cannot be resolved at lint time.
                if path.starts_with('$') {
                    continue;
                }
                if path.starts_with('/') {
                    continue;
                }

                diags.push(
                    self.diagnostic()
                        .message(format!("WORKDIR uses relative path: {}", path))
                        .pos(wd.span.start)
                        .context(ctx.line(wd.span.start.line))
                        .help(format!("Use an absolute path for WORKDIR: WORKDIR /{}", path))
                        .fix("workdir-absolute")
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
        WorkdirRelative.check(&df, &Context::new("Dockerfile", source))
    }

    #[test]
    fn relative_fires() {
        let diags = check("FROM a\nWORKDIR app\n");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].fixable);
    }

    #[test]
    fn absolute_passes() {
        let diags = check("FROM a\nWORKDIR /app\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn variable_passes() {
        let diags = check("FROM a\nWORKDIR $HOME\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn each_relative_workdir_fires() {
        let diags = check("FROM a\nWORKDIR app\nWORKDIR src\n");
        assert_eq!(diags.len(), 2);
    }
}

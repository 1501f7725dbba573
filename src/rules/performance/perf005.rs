//! PERF005: apt install without --no-install-recommends.

use crate::analyzer::{Category, Diagnostic, Severity};
use crate::parser::Dockerfile;
use crate::rules::{Context, Rule};

pub struct NoInstallRecommends;

impl Rule for NoInstallRecommends {
    fn id(&self) -> &'static str {
        "PERF005"
    }

    fn name(&self) -> &'static str {
        "no-install-recommends"
    }

    fn description(&self) -> &'static str {
        "apt-get install without --no-install-recommends installs unnecessary packages."
    }

    fn category(&self) -> Category {
        Category::Performance
    }

    fn severity(&self) -> Severity {
        Severity::Info
    }

    fn check(&self, df: &Dockerfile, ctx: &Context) -> Vec<Diagnostic> {
        let mut diags = Vec::new();

        for stage in &df.stages {
            for run in stage.instructions.iter().filter_map(|i| i.as_run()) {
                let cmd = run.command_text();
                if cmd.contains("--no-install-recommends") {
                    continue;
                }

                let installer = if cmd.contains("apt-get install") {
                    Some("apt-get install")
                } else if cmd.contains("apt install") {
                    Some("apt install")
                } else {
                    None
                };

                if let Some(installer) = installer {
                    diags.push(
                        self.diagnostic()
                            .message(format!("{} without --no-install-recommends", installer))
                            .pos(run.span.start)
                            .context(ctx.line(run.span.start.line))
                            .help("Add --no-install-recommends to avoid installing unnecessary packages")
                            .fix("add-no-install-recommends")
                            .build(),
                    );
                }
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
        NoInstallRecommends.check(&df, &Context::new("Dockerfile", source))
    }

    #[test]
    fn apt_get_without_flag_fires() {
        let diags = check("FROM ubuntu\nRUN apt-get install -y curl\n");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn apt_without_flag_fires() {
        let diags = check("FROM ubuntu\nRUN apt install -y curl\n");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn with_flag_passes() {
        let diags = check("FROM ubuntu\nRUN apt-get install -y --no-install-recommends curl\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn apk_is_not_apt() {
        let diags = check("FROM alpine\nRUN apk add curl\n");
        assert!(diags.is_empty());
    }
}

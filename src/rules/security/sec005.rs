//! SEC005: sudo inside RUN instructions.

use crate::analyzer::{Category, Diagnostic, Severity};
use crate::parser::Dockerfile;
use crate::rules::{Context, Rule};

/// `sudo` counts only as a standalone command word, not a substring.
fn contains_sudo(cmd: &str) -> bool {
    cmd.split(|c: char| matches!(c, ' ' | '\t' | ';' | '&' | '|' | '\n'))
        .any(|part| part == "sudo")
}

pub struct SudoUsage;

impl Rule for SudoUsage {
    fn id(&self) -> &'static str {
        "SEC005"
    }

    fn name(&self) -> &'static str {
        "sudo-usage"
    }

    fn description(&self) -> &'static str {
        "sudo should not be used in Dockerfiles. RUN commands execute as root by default."
    }

    fn category(&self) -> Category {
        Category::Security
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, df: &Dockerfile, ctx: &Context) -> Vec<Diagnostic> {
        let mut diags = Vec::new();

        for stage in &df.stages {
            for run in stage.instructions.iter().filter_map(|i| i.as_run()) {
                if contains_sudo(run.command_text()) {
                    diags.push(
                        self.diagnostic()
                            .message("sudo usage detected in RUN instruction")
                            .pos(run.span.start)
                            .context(ctx.line(run.span.start.line))
                            .help("Remove sudo - RUN commands execute as root by default. If you need to run as non-root, use USER instruction.")
                            .fix("remove-sudo")
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
        SudoUsage.check(&df, &Context::new("Dockerfile", source))
    }

    #[test]
    fn sudo_fires() {
        let diags = check("FROM a\nRUN sudo apt-get update\n");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn sudo_after_separator_fires() {
        let diags = check("FROM a\nRUN make && sudo make install\n");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn sudo_dash_u_also_fires() {
        // Changing users still warrants review even though the transform
        // leaves it alone.
        let diags = check("FROM a\nRUN sudo -u app npm install\n");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn substring_does_not_fire() {
        let diags = check("FROM a\nRUN echo sudoku\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn heredoc_body_is_checked() {
        let diags = check("FROM a\nRUN <<EOF\nsudo apt-get update\nEOF\n");
        assert_eq!(diags.len(), 1);
    }
}

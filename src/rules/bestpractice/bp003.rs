//! BP003: multiple CMD instructions; only the last takes effect.

use crate::analyzer::{Category, Diagnostic, Severity};
use crate::parser::Dockerfile;
use crate::rules::{Context, Rule};

pub struct MultipleCmd;

impl Rule for MultipleCmd {
    fn id(&self) -> &'static str {
        "BP003"
    }

    fn name(&self) -> &'static str {
        "multiple-cmd"
    }

    fn description(&self) -> &'static str {
        "Only the last CMD instruction takes effect. Multiple CMDs are likely a mistake."
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
            let cmds: Vec<_> = stage
                .instructions
                .iter()
                .filter_map(|i| i.as_cmd())
                .collect();

            if cmds.len() < 2 {
                continue;
            }

            for cmd in &cmds[..cmds.len() - 1] {
                diags.push(
                    self.diagnostic()
                        .message("This CMD instruction is overridden by a later CMD")
                        .pos(cmd.span.start)
                        .context(ctx.line(cmd.span.start.line))
                        .help("Remove this CMD or combine the commands. Only the last CMD takes effect.")
                        .build(),
                );
            }
        }

        diags
    }
}

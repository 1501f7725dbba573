//! PERF004: consecutive RUN instructions create avoidable layers.

use crate::analyzer::{Category, Diagnostic, Severity};
use crate::parser::{Dockerfile, RunInstruction};
use crate::rules::{Context, Rule};

const DEFAULT_THRESHOLD: usize = 2;

pub struct ConsecutiveRuns;

impl ConsecutiveRuns {
    fn report(&self, runs: &[&RunInstruction], ctx: &Context, diags: &mut Vec<Diagnostic>) {
        if runs.len() < 2 {
            return;
        }
        let first = runs[0];
        let last = runs[runs.len() - 1];

        diags.push(
            self.diagnostic()
                .message(format!(
                    "{} consecutive RUN instructions could be merged",
                    runs.len()
                ))
                .range(first.span.start, last.span.end)
                .context(ctx.line(first.span.start.line))
                .help("Merge into a single RUN with && between commands to reduce layers")
                .fix("merge-run")
                .build(),
        );
    }
}

impl Rule for ConsecutiveRuns {
    fn id(&self) -> &'static str {
        "PERF004"
    }

    fn name(&self) -> &'static str {
        "consecutive-run"
    }

    fn description(&self) -> &'static str {
        "Consecutive RUN instructions create multiple layers. Merge them to reduce image size."
    }

    fn category(&self) -> Category {
        Category::Performance
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, df: &Dockerfile, ctx: &Context) -> Vec<Diagnostic> {
        let threshold = ctx
            .config_int("max_consecutive")
            .map(|v| v.max(2) as usize)
            .unwrap_or(DEFAULT_THRESHOLD);

        let mut diags = Vec::new();

        for stage in &df.stages {
            let mut group: Vec<&RunInstruction> = Vec::new();

            for inst in &stage.instructions {
                match inst.as_run() {
                    Some(run) => group.push(run),
                    None => {
                        if group.len() >= threshold {
                            self.report(&group, ctx, &mut diags);
                        }
                        group.clear();
                    }
                }
            }
            if group.len() >= threshold {
                self.report(&group, ctx, &mut diags);
            }
        }

        diags
    }
}

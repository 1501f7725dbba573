//! merge-run: coalesce consecutive shell-form RUN instructions.

use crate::analyzer::Diagnostic;
use crate::optimizer::Transform;
use crate::parser::{Dockerfile, Instruction, RunInstruction, Span};

pub struct MergeRun;

impl Transform for MergeRun {
    fn name(&self) -> &'static str {
        "merge-run"
    }

    fn description(&self) -> &'static str {
        "Merge consecutive RUN instructions to reduce layers"
    }

    fn rules(&self) -> &'static [&'static str] {
        &["PERF004"]
    }

    fn apply(&self, df: &mut Dockerfile, _diagnostics: &[Diagnostic]) -> bool {
        let mut changed = false;
        for stage in &mut df.stages {
            stage.instructions =
                merge_consecutive_runs(std::mem::take(&mut stage.instructions), &mut changed);
        }
        changed
    }
}

/// A RUN participates in merging only when it is plain shell form.
fn can_merge(run: &RunInstruction) -> bool {
    run.heredoc.is_none() && !run.is_exec && run.mount.is_none()
}

fn merge_consecutive_runs(instructions: Vec<Instruction>, changed: &mut bool) -> Vec<Instruction> {
    if instructions.len() < 2 {
        return instructions;
    }

    let mut result = Vec::with_capacity(instructions.len());
    let mut group: Vec<RunInstruction> = Vec::new();

    let flush = |group: &mut Vec<RunInstruction>, result: &mut Vec<Instruction>, changed: &mut bool| {
        if group.len() == 1 {
            if let Some(run) = group.pop() {
                result.push(Instruction::Run(run));
            }
        } else if group.len() > 1 {
            result.push(Instruction::Run(merge_group(std::mem::take(group))));
            *changed = true;
        }
    };

    for inst in instructions {
        match inst {
            Instruction::Run(run) if can_merge(&run) => group.push(run),
            other => {
                flush(&mut group, &mut result, changed);
                result.push(other);
            }
        }
    }
    flush(&mut group, &mut result, changed);

    result
}

fn merge_group(runs: Vec<RunInstruction>) -> RunInstruction {
    let span = Span::new(
        runs.first().map(|r| r.span.start).unwrap_or_default(),
        runs.last().map(|r| r.span.end).unwrap_or_default(),
    );

    let commands: Vec<&str> = runs
        .iter()
        .map(|r| r.command.trim())
        .filter(|c| !c.is_empty())
        .collect();

    RunInstruction {
        span,
        command: commands.join(" \\\n    && "),
        ..Default::default()
    }
}

//! SEC010: --chmod granting execute permissions.

use crate::analyzer::{Category, Diagnostic, Severity};
use crate::lexer::Position;
use crate::parser::{Dockerfile, Instruction};
use crate::rules::{Context, Rule};

/// Execute bit in octal (any odd digit) or symbolic `+x`/`=x` form.
fn grants_execute(chmod: &str) -> bool {
    if chmod.len() >= 3 {
        for c in chmod.chars() {
            if let Some(d) = c.to_digit(8) {
                if d & 1 != 0 {
                    return true;
                }
            }
        }
    }
    chmod.contains("+x") || chmod.contains("=x")
}

pub struct ChmodExecutable;

impl Rule for ChmodExecutable {
    fn id(&self) -> &'static str {
        "SEC010"
    }

    fn name(&self) -> &'static str {
        "chmod-executable"
    }

    fn description(&self) -> &'static str {
        "COPY/ADD with --chmod granting execute permissions should be reviewed."
    }

    fn category(&self) -> Category {
        Category::Security
    }

    fn severity(&self) -> Severity {
        Severity::Info
    }

    fn check(&self, df: &Dockerfile, ctx: &Context) -> Vec<Diagnostic> {
        let mut diags = Vec::new();

        for stage in &df.stages {
            for inst in &stage.instructions {
                let (chmod, pos): (&str, Position) = match inst {
                    Instruction::Copy(c) => match &c.chmod {
                        Some(m) => (m, c.span.start),
                        None => continue,
                    },
                    Instruction::Add(a) => match &a.chmod {
                        Some(m) => (m, a.span.start),
                        None => continue,
                    },
                    _ => continue,
                };

                if grants_execute(chmod) {
                    diags.push(
                        self.diagnostic()
                            .message(format!("--chmod={} grants execute permissions", chmod))
                            .pos(pos)
                            .context(ctx.line(pos.line))
                            .help("Ensure execute permissions are intentional. Only scripts and binaries should be executable.")
                            .build(),
                    );
                }
            }
        }

        diags
    }
}

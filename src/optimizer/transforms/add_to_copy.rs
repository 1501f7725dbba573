//! add-to-copy: replace ADD with COPY when no ADD-only feature is used.

use crate::analyzer::Diagnostic;
use crate::optimizer::Transform;
use crate::parser::{CopyInstruction, Dockerfile, Instruction};

pub struct AddToCopy;

impl Transform for AddToCopy {
    fn name(&self) -> &'static str {
        "add-to-copy"
    }

    fn description(&self) -> &'static str {
        "Replace ADD with COPY when special features aren't used"
    }

    fn rules(&self) -> &'static [&'static str] {
        &["BP002"]
    }

    fn apply(&self, df: &mut Dockerfile, _diagnostics: &[Diagnostic]) -> bool {
        let mut changed = false;

        for stage in &mut df.stages {
            for inst in &mut stage.instructions {
                let add = match inst {
                    Instruction::Add(a) => a,
                    _ => continue,
                };
                if add.has_url_source() || add.has_archive_source() {
                    continue;
                }

                *inst = Instruction::Copy(CopyInstruction {
                    span: add.span,
                    sources: std::mem::take(&mut add.sources),
                    destination: std::mem::take(&mut add.destination),
                    from: None,
                    chown: add.chown.take(),
                    chmod: add.chmod.take(),
                    link: false,
                });
                changed = true;
            }
        }

        changed
    }
}

//! maintainer-to-label: rewrite deprecated MAINTAINER instructions.

use crate::analyzer::Diagnostic;
use crate::optimizer::Transform;
use crate::parser::{Dockerfile, Instruction, KeyValue, LabelInstruction};

pub struct MaintainerToLabel;

impl Transform for MaintainerToLabel {
    fn name(&self) -> &'static str {
        "maintainer-to-label"
    }

    fn description(&self) -> &'static str {
        "Convert deprecated MAINTAINER to LABEL maintainer="
    }

    fn rules(&self) -> &'static [&'static str] {
        &["BP004"]
    }

    fn apply(&self, df: &mut Dockerfile, _diagnostics: &[Diagnostic]) -> bool {
        let mut changed = false;

        for stage in &mut df.stages {
            for inst in &mut stage.instructions {
                let maint = match inst {
                    Instruction::Maintainer(m) => m,
                    _ => continue,
                };

                *inst = Instruction::Label(LabelInstruction {
                    span: maint.span,
                    labels: vec![KeyValue::new(
                        "maintainer",
                        std::mem::take(&mut maint.maintainer),
                    )],
                });
                changed = true;
            }
        }

        changed
    }
}

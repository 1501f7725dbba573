//! fix-instruction-case: keyword casing is normalized by the rewriter,
//! which always emits uppercase keywords. This transform exists so the
//! optimizer reports lowercase-keyword findings as addressed.

use crate::analyzer::Diagnostic;
use crate::optimizer::Transform;
use crate::parser::Dockerfile;

pub struct FixInstructionCase;

impl Transform for FixInstructionCase {
    fn name(&self) -> &'static str {
        "fix-instruction-case"
    }

    fn description(&self) -> &'static str {
        "Convert instructions to uppercase"
    }

    fn rules(&self) -> &'static [&'static str] {
        &["STY001"]
    }

    fn apply(&self, _df: &mut Dockerfile, diagnostics: &[Diagnostic]) -> bool {
        diagnostics.iter().any(|d| d.rule == "STY001")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{Category, Severity};
    use crate::parser::parse;

    #[test]
    fn reports_change_when_sty001_present() {
        let (mut df, _) = parse("from alpine\n");
        let diag = Diagnostic::builder("STY001", Category::Style)
            .severity(Severity::Hint)
            .message("case")
            .build();
        assert!(FixInstructionCase.apply(&mut df, &[diag]));
    }

    #[test]
    fn no_sty001_no_change() {
        let (mut df, _) = parse("FROM alpine\n");
        assert!(!FixInstructionCase.apply(&mut df, &[]));
    }
}

//! STY001: instruction keywords should be uppercase.
//!
//! Detected from the source lines rather than the AST, since the parser
//! normalizes keyword casing away.

use crate::analyzer::{Category, Diagnostic, Severity};
use crate::lexer::{Position, TokenKind};
use crate::parser::Dockerfile;
use crate::rules::{Context, Rule};

pub struct InstructionCase;

impl Rule for InstructionCase {
    fn id(&self) -> &'static str {
        "STY001"
    }

    fn name(&self) -> &'static str {
        "instruction-case"
    }

    fn description(&self) -> &'static str {
        "Dockerfile instructions should be uppercase for consistency."
    }

    fn category(&self) -> Category {
        Category::Style
    }

    fn severity(&self) -> Severity {
        Severity::Hint
    }

    fn check(&self, _df: &Dockerfile, ctx: &Context) -> Vec<Diagnostic> {
        let mut diags = Vec::new();

        for (idx, line) in ctx.lines().iter().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let word = match trimmed.split_whitespace().next() {
                Some(w) => w,
                None => continue,
            };

            let upper = word.to_uppercase();
            if TokenKind::lookup_keyword(&upper).is_none() {
                continue;
            }
            if word == upper {
                continue;
            }

            diags.push(
                self.diagnostic()
                    .message(format!(
                        "Instruction '{}' should be uppercase: '{}'",
                        word, upper
                    ))
                    .pos(Position::new(idx as u32 + 1, 1, 0))
                    .context(line.clone())
                    .help(format!("Use uppercase for Dockerfile instructions: {}", upper))
                    .fix("fix-instruction-case")
                    .build(),
            );
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
        InstructionCase.check(&df, &Context::new("Dockerfile", source))
    }

    #[test]
    fn lowercase_fires() {
        let diags = check("from alpine\nrun echo hi\n");
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].pos.line, 1);
        assert_eq!(diags[1].pos.line, 2);
    }

    #[test]
    fn mixed_case_fires() {
        let diags = check("From alpine\n");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("'FROM'"));
    }

    #[test]
    fn uppercase_passes() {
        let diags = check("FROM alpine\nRUN echo hi\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn comments_and_args_ignored() {
        let diags = check("# from a comment\nFROM alpine\nRUN echo from here\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn non_keyword_first_word_ignored() {
        let diags = check("FROM alpine\nRUN make build\n");
        assert!(diags.is_empty());
    }
}

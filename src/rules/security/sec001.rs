//! SEC001: the final stage must not run as root.

use crate::analyzer::{Category, Diagnostic, Severity};
use crate::parser::Dockerfile;
use crate::rules::{Context, Rule};

pub struct RootUser;

impl Rule for RootUser {
    fn id(&self) -> &'static str {
        "SEC001"
    }

    fn name(&self) -> &'static str {
        "root-user"
    }

    fn description(&self) -> &'static str {
        "Container runs as root user. Running containers as root is a security risk."
    }

    fn category(&self) -> Category {
        Category::Security
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, df: &Dockerfile, ctx: &Context) -> Vec<Diagnostic> {
        // Build stages running as root is acceptable; only the stage that
        // produces the output image matters.
        let final_stage = match df.final_stage() {
            Some(s) => s,
            None => return Vec::new(),
        };

        let last_user = final_stage
            .instructions
            .iter()
            .filter_map(|i| i.as_user())
            .last();

        match last_user {
            None => vec![self
                .diagnostic()
                .message("Container runs as root (no USER instruction found)")
                .pos(final_stage.from.span.start)
                .context(ctx.line(final_stage.from.span.start.line))
                .help("Add a USER instruction to run as a non-root user, e.g., USER nobody")
                .fix("USER nobody")
                .build()],
            Some(user) if user.is_root() => vec![self
                .diagnostic()
                .message("Container explicitly runs as root user")
                .pos(user.span.start)
                .context(ctx.line(user.span.start.line))
                .help("Change to a non-root user for better security")
                .build()],
            Some(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn check(source: &str) -> Vec<Diagnostic> {
        let (df, _) = parse(source);
        RootUser.check(&df, &Context::new("Dockerfile", source))
    }

    #[test]
    fn missing_user_fires() {
        let diags = check("FROM alpine:3.18\nCMD [\"app\"]\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].rule, "SEC001");
        assert!(diags[0].fixable);
    }

    #[test]
    fn explicit_root_fires() {
        let diags = check("FROM alpine:3.18\nUSER root\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].pos.line, 2);
    }

    #[test]
    fn numeric_root_fires() {
        let diags = check("FROM alpine:3.18\nUSER 0\n");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn non_root_user_passes() {
        let diags = check("FROM alpine:3.18\nUSER app\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn last_user_wins() {
        let diags = check("FROM alpine:3.18\nUSER root\nUSER app\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn only_final_stage_checked() {
        let diags = check("FROM golang:1.21 AS build\nRUN go build\n\nFROM alpine:3.18\nUSER app\n");
        assert!(diags.is_empty());
    }
}

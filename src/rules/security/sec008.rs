//! SEC008: missing HEALTHCHECK.

use crate::analyzer::{Category, Diagnostic, Severity};
use crate::parser::Dockerfile;
use crate::rules::{Context, Rule};

pub struct MissingHealthcheck;

impl Rule for MissingHealthcheck {
    fn id(&self) -> &'static str {
        "SEC008"
    }

    fn name(&self) -> &'static str {
        "missing-healthcheck"
    }

    fn description(&self) -> &'static str {
        "HEALTHCHECK instruction is missing. Health checks enable container orchestrators to detect unhealthy containers."
    }

    fn category(&self) -> Category {
        Category::Security
    }

    fn severity(&self) -> Severity {
        Severity::Info
    }

    fn check(&self, df: &Dockerfile, ctx: &Context) -> Vec<Diagnostic> {
        let final_stage = match df.final_stage() {
            Some(s) => s,
            None => return Vec::new(),
        };

        // A HEALTHCHECK in any stage may be inherited by the final image.
        let has_healthcheck = df
            .instructions()
            .filter_map(|i| i.as_healthcheck())
            .any(|hc| !hc.none);

        if has_healthcheck {
            return Vec::new();
        }

        vec![self
            .diagnostic()
            .message("No HEALTHCHECK instruction found")
            .pos(final_stage.from.span.start)
            .context(ctx.line(final_stage.from.span.start.line))
            .help("Add a HEALTHCHECK instruction, e.g., HEALTHCHECK CMD curl -f http://localhost/ || exit 1")
            .fix("HEALTHCHECK --interval=30s --timeout=10s --start-period=5s --retries=3 CMD curl -f http://localhost/ || exit 1")
            .build()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn check(source: &str) -> Vec<Diagnostic> {
        let (df, _) = parse(source);
        MissingHealthcheck.check(&df, &Context::new("Dockerfile", source))
    }

    #[test]
    fn missing_fires() {
        let diags = check("FROM alpine:3.18\nCMD [\"app\"]\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Info);
    }

    #[test]
    fn present_passes() {
        let diags = check("FROM alpine:3.18\nHEALTHCHECK CMD wget -q localhost || exit 1\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn healthcheck_none_still_fires() {
        let diags = check("FROM alpine:3.18\nHEALTHCHECK NONE\n");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn earlier_stage_healthcheck_counts() {
        let diags = check(
            "FROM base:1 AS one\nHEALTHCHECK CMD true\n\nFROM one\nCMD [\"app\"]\n",
        );
        assert!(diags.is_empty());
    }
}

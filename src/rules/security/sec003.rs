//! SEC003: base images must be pinned to a tag or digest.

use crate::analyzer::{Category, Diagnostic, Severity};
use crate::parser::Dockerfile;
use crate::rules::{Context, Rule};

pub struct UnpinnedImageTag;

impl Rule for UnpinnedImageTag {
    fn id(&self) -> &'static str {
        "SEC003"
    }

    fn name(&self) -> &'static str {
        "unpinned-image-tag"
    }

    fn description(&self) -> &'static str {
        "Base image uses unpinned tag. Using 'latest' or no tag can lead to unpredictable builds."
    }

    fn category(&self) -> Category {
        Category::Security
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, df: &Dockerfile, ctx: &Context) -> Vec<Diagnostic> {
        let mut diags = Vec::new();

        for stage in &df.stages {
            let from = &stage.from;

            if from.is_scratch() || from.is_variable() || from.digest.is_some() {
                continue;
            }
            // FROM <alias> of an earlier stage carries its pinning.
            if df.is_stage_alias(&from.image) {
                continue;
            }

            let unpinned = match from.tag.as_deref() {
                None => Some("Base image has no tag (implicitly uses 'latest')"),
                Some("latest") => Some("Base image uses 'latest' tag"),
                Some(_) => None,
            };

            if let Some(msg) = unpinned {
                diags.push(
                    self.diagnostic()
                        .message(msg)
                        .pos(from.span.start)
                        .context(ctx.line(from.span.start.line))
                        .help(format!(
                            "Pin to a specific version for reproducible builds, e.g., {}:22.04 or use a digest",
                            from.image
                        ))
                        .fix("pin-image-tag")
                        .build(),
                );
            }
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
        UnpinnedImageTag.check(&df, &Context::new("Dockerfile", source))
    }

    #[test]
    fn no_tag_fires() {
        let diags = check("FROM ubuntu\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Error);
    }

    #[test]
    fn latest_tag_fires() {
        let diags = check("FROM ubuntu:latest\n");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn pinned_tag_passes() {
        let diags = check("FROM ubuntu:22.04\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn digest_passes() {
        let diags = check("FROM ubuntu@sha256:deadbeef\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn scratch_passes() {
        let diags = check("FROM scratch\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn variable_image_passes() {
        let diags = check("FROM ${BASE_IMAGE}\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn stage_alias_passes() {
        let diags = check("FROM golang:1.21 AS builder\nRUN true\n\nFROM builder\nRUN true\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn fires_once_per_unpinned_stage() {
        let diags = check("FROM ubuntu\nRUN true\n\nFROM debian:latest\nRUN true\n");
        assert_eq!(diags.len(), 2);
    }
}

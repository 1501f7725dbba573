//! PERF002: single-stage build with a build toolchain produces large images.

use crate::analyzer::{Category, Diagnostic, Severity};
use crate::parser::Dockerfile;
use crate::rules::{Context, Rule};

const BUILD_TOOLS: &[&str] = &[
    "gcc",
    "g++",
    "make",
    "cmake",
    "cargo",
    "rustc",
    "go build",
    "go install",
    "go mod",
    "npm run build",
    "yarn build",
    "mvn ",
    "gradle ",
    "./gradlew",
    "dotnet build",
    "dotnet publish",
];

const BUILD_IMAGES: &[&str] = &["golang", "rust", "node", "maven", "gradle", "dotnet/sdk"];

pub struct MissingMultistage;

impl Rule for MissingMultistage {
    fn id(&self) -> &'static str {
        "PERF002"
    }

    fn name(&self) -> &'static str {
        "missing-multistage"
    }

    fn description(&self) -> &'static str {
        "Build tools in the final image increase size. Use multi-stage builds to separate build and runtime environments."
    }

    fn category(&self) -> Category {
        Category::Performance
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, df: &Dockerfile, ctx: &Context) -> Vec<Diagnostic> {
        if df.stages.len() != 1 {
            return Vec::new();
        }
        let stage = &df.stages[0];

        let image = stage.from.image.to_lowercase();
        let is_build_image = BUILD_IMAGES.iter().any(|b| image.contains(b));
        if !is_build_image {
            return Vec::new();
        }

        let build_run = stage
            .instructions
            .iter()
            .filter_map(|i| i.as_run())
            .find(|run| BUILD_TOOLS.iter().any(|t| run.command.contains(t)));

        match build_run {
            Some(run) => vec![self
                .diagnostic()
                .message("Single-stage build with build tools will produce a large image")
                .pos(run.span.start)
                .context(ctx.line(run.span.start.line))
                .help("Use multi-stage build: build in one stage, copy only the artifact to a minimal base image (e.g., alpine, distroless)")
                .build()],
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn check(source: &str) -> Vec<Diagnostic> {
        let (df, _) = parse(source);
        MissingMultistage.check(&df, &Context::new("Dockerfile", source))
    }

    #[test]
    fn golang_single_stage_fires() {
        let diags = check("FROM golang:1.21\nCOPY . /src\nRUN go build -o /app ./...\n");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn multi_stage_passes() {
        let diags = check(
            "FROM golang:1.21 AS build\nRUN go build -o /app ./...\n\nFROM alpine:3.18\nCOPY --from=build /app /app\n",
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn runtime_image_passes() {
        let diags = check("FROM alpine:3.18\nRUN make install\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn build_image_without_build_command_passes() {
        let diags = check("FROM node:20\nCOPY server.js .\nCMD [\"node\", \"server.js\"]\n");
        assert!(diags.is_empty());
    }
}

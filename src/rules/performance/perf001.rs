//! PERF001: broad COPY before a dependency install defeats layer caching.

use super::{is_broad_source, is_dependency_install};
use crate::analyzer::{Category, Diagnostic, Severity};
use crate::parser::{Dockerfile, Instruction};
use crate::rules::{Context, Rule};

pub struct CopyBeforeInstall;

impl Rule for CopyBeforeInstall {
    fn id(&self) -> &'static str {
        "PERF001"
    }

    fn name(&self) -> &'static str {
        "copy-before-run"
    }

    fn description(&self) -> &'static str {
        "COPY/ADD instructions before RUN can invalidate Docker cache. Copy dependency files first, then run install commands, then copy the rest."
    }

    fn category(&self) -> Category {
        Category::Performance
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, df: &Dockerfile, ctx: &Context) -> Vec<Diagnostic> {
        let mut diags = Vec::new();

        for stage in &df.stages {
            // Good ordering copies dependency manifests first, installs,
            // then copies the tree. A broad copy is only a problem when an
            // install still follows it.
            let mut broad_copy: Option<&crate::parser::CopyInstruction> = None;
            let mut had_install = false;

            for inst in &stage.instructions {
                match inst {
                    Instruction::Copy(copy) => {
                        if !had_install && copy.sources.iter().any(|s| is_broad_source(s)) {
                            broad_copy = Some(copy);
                        }
                    }
                    Instruction::Run(run) => {
                        if is_dependency_install(&run.command) {
                            if let Some(copy) = broad_copy.take() {
                                diags.push(
                                    self.diagnostic()
                                        .message("Broad COPY before dependency install invalidates cache on any file change")
                                        .pos(copy.span.start)
                                        .context(ctx.line(copy.span.start.line))
                                        .help("Copy only dependency files first (package.json, requirements.txt, go.mod, etc.), run install, then COPY the rest")
                                        .fix("reorder-copy")
                                        .build(),
                                );
                            }
                            had_install = true;
                        }
                    }
                    _ => {}
                }
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
        CopyBeforeInstall.check(&df, &Context::new("Dockerfile", source))
    }

    #[test]
    fn broad_copy_then_install_fires() {
        let diags = check("FROM node:20\nCOPY . .\nRUN npm ci\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].pos.line, 2);
    }

    #[test]
    fn manifest_copy_then_install_passes() {
        let diags = check("FROM node:20\nCOPY package.json .\nRUN npm ci\nCOPY . .\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn broad_copy_after_install_passes() {
        let diags = check("FROM node:20\nRUN npm ci\nCOPY . .\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn broad_copy_without_install_passes() {
        let diags = check("FROM alpine:3.18\nCOPY . /srv\nCMD [\"serve\"]\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn other_package_managers_detected() {
        let diags = check("FROM python:3.12\nCOPY . /app\nRUN pip install -r requirements.txt\n");
        assert_eq!(diags.len(), 1);
    }
}

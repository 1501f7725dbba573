//! PERF003: package manager cache left in the layer.

use crate::analyzer::{Category, Diagnostic, Severity};
use crate::parser::Dockerfile;
use crate::rules::{Context, Rule};

struct PackageManager {
    install: &'static str,
    cleanup: &'static [&'static str],
}

const PACKAGE_MANAGERS: &[PackageManager] = &[
    PackageManager {
        install: "apt-get install",
        cleanup: &["rm -rf /var/lib/apt/lists/*", "apt-get clean"],
    },
    PackageManager {
        install: "apt install",
        cleanup: &["rm -rf /var/lib/apt/lists/*", "apt-get clean"],
    },
    PackageManager {
        install: "apk add",
        cleanup: &["--no-cache", "rm -rf /var/cache/apk/*"],
    },
    PackageManager {
        install: "yum install",
        cleanup: &["yum clean all", "rm -rf /var/cache/yum"],
    },
    PackageManager {
        install: "dnf install",
        cleanup: &["dnf clean all"],
    },
    PackageManager {
        install: "pip install",
        cleanup: &["--no-cache-dir", "rm -rf ~/.cache/pip"],
    },
    PackageManager {
        install: "pip3 install",
        cleanup: &["--no-cache-dir", "rm -rf ~/.cache/pip"],
    },
    PackageManager {
        install: "npm install",
        cleanup: &["npm cache clean", "rm -rf ~/.npm"],
    },
    PackageManager {
        install: "yarn",
        cleanup: &["yarn cache clean"],
    },
];

pub struct CacheNotCleaned;

impl Rule for CacheNotCleaned {
    fn id(&self) -> &'static str {
        "PERF003"
    }

    fn name(&self) -> &'static str {
        "cache-not-cleaned"
    }

    fn description(&self) -> &'static str {
        "Package manager cache should be cleaned in the same RUN instruction to reduce layer size."
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
            for run in stage.instructions.iter().filter_map(|i| i.as_run()) {
                let cmd = run.command_text();

                for pm in PACKAGE_MANAGERS {
                    if !cmd.contains(pm.install) {
                        continue;
                    }
                    if pm.cleanup.iter().any(|c| cmd.contains(c)) {
                        continue;
                    }
                    diags.push(
                        self.diagnostic()
                            .message(format!(
                                "Package manager cache not cleaned after {}",
                                pm.install
                            ))
                            .pos(run.span.start)
                            .context(ctx.line(run.span.start.line))
                            .help(format!(
                                "Add cache cleanup in the same RUN instruction: {}",
                                pm.cleanup.join(" or ")
                            ))
                            .fix("add-cache-cleanup")
                            .build(),
                    );
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
        CacheNotCleaned.check(&df, &Context::new("Dockerfile", source))
    }

    #[test]
    fn apt_without_cleanup_fires() {
        let diags = check("FROM ubuntu:22.04\nRUN apt-get update && apt-get install -y curl\n");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].fixable);
    }

    #[test]
    fn apt_with_cleanup_passes() {
        let diags = check(
            "FROM ubuntu:22.04\nRUN apt-get install -y curl && rm -rf /var/lib/apt/lists/*\n",
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn apk_no_cache_passes() {
        let diags = check("FROM alpine:3.18\nRUN apk add --no-cache curl\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn apk_without_no_cache_fires() {
        let diags = check("FROM alpine:3.18\nRUN apk add curl\n");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn pip_no_cache_dir_passes() {
        let diags = check("FROM python:3.12\nRUN pip install --no-cache-dir flask\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn yum_without_clean_fires() {
        let diags = check("FROM centos:7\nRUN yum install -y httpd\n");
        assert_eq!(diags.len(), 1);
    }
}

//! PERF006: archive downloaded in one RUN and extracted in a later one.

use crate::analyzer::{Category, Diagnostic, Severity};
use crate::parser::Dockerfile;
use crate::rules::{Context, Rule};
use regex::Regex;
use std::sync::LazyLock;

static DOWNLOAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(curl|wget)\s+.*\.(tar|tar\.gz|tgz|tar\.bz2|tar\.xz|zip)").unwrap());
static EXTRACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(tar\s+(-x|x)|unzip|gunzip)").unwrap());

const ARCHIVE_EXTS: &[&str] = &[".tar", ".tar.gz", ".tgz", ".tar.bz2", ".tar.xz", ".zip"];

fn mentions_archive(cmd: &str) -> bool {
    ARCHIVE_EXTS.iter().any(|ext| cmd.contains(ext))
}

pub struct SeparateDownloadExtract;

impl Rule for SeparateDownloadExtract {
    fn id(&self) -> &'static str {
        "PERF006"
    }

    fn name(&self) -> &'static str {
        "separate-download-extract"
    }

    fn description(&self) -> &'static str {
        "Download and extract should be in the same RUN instruction to avoid storing the archive in a layer."
    }

    fn category(&self) -> Category {
        Category::Performance
    }

    fn severity(&self) -> Severity {
        Severity::Info
    }

    fn check(&self, df: &Dockerfile, ctx: &Context) -> Vec<Diagnostic> {
        let mut diags = Vec::new();

        for stage in &df.stages {
            let mut pending_download: Option<&crate::parser::RunInstruction> = None;

            for run in stage.instructions.iter().filter_map(|i| i.as_run()) {
                let cmd = run.command_text();

                let has_download =
                    DOWNLOAD.is_match(cmd) || (cmd.contains("curl") && mentions_archive(cmd));
                let has_extract = EXTRACT.is_match(cmd);

                if has_download && !has_extract {
                    pending_download = Some(run);
                } else if has_extract {
                    if let Some(download) = pending_download.take() {
                        diags.push(
                            self.diagnostic()
                                .message("Download and extract are in separate RUN instructions")
                                .pos(download.span.start)
                                .context(ctx.line(download.span.start.line))
                                .help("Combine download and extract in the same RUN instruction, then remove the archive: curl -o file.tar.gz URL && tar xf file.tar.gz && rm file.tar.gz")
                                .build(),
                        );
                    }
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
        SeparateDownloadExtract.check(&df, &Context::new("Dockerfile", source))
    }

    #[test]
    fn split_download_extract_fires() {
        let diags = check(
            "FROM a\nRUN curl -o pkg.tar.gz https://x/pkg.tar.gz\nRUN tar xf pkg.tar.gz\n",
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].pos.line, 2);
    }

    #[test]
    fn combined_passes() {
        let diags =
            check("FROM a\nRUN curl -o p.tar.gz https://x/p.tar.gz && tar xf p.tar.gz && rm p.tar.gz\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn unrelated_extract_passes() {
        let diags = check("FROM a\nRUN tar xf bundled.tar\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn download_without_extract_passes() {
        let diags = check("FROM a\nRUN wget https://x/data.zip\n");
        assert!(diags.is_empty());
    }
}

//! SEC007: ADD of a remote URL without checksum verification.

use crate::analyzer::{Category, Diagnostic, Severity};
use crate::parser::{ast::is_remote_url, Dockerfile};
use crate::rules::{Context, Rule};

pub struct AddRemoteUrl;

impl Rule for AddRemoteUrl {
    fn id(&self) -> &'static str {
        "SEC007"
    }

    fn name(&self) -> &'static str {
        "add-remote-url"
    }

    fn description(&self) -> &'static str {
        "ADD with remote URL downloads without verification. Use --checksum or curl/wget with checksum verification."
    }

    fn category(&self) -> Category {
        Category::Security
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, df: &Dockerfile, ctx: &Context) -> Vec<Diagnostic> {
        let mut diags = Vec::new();

        for stage in &df.stages {
            for add in stage.instructions.iter().filter_map(|i| i.as_add()) {
                if add.checksum.is_some() {
                    continue;
                }
                for src in &add.sources {
                    if is_remote_url(src) {
                        diags.push(
                            self.diagnostic()
                                .message(format!(
                                    "ADD fetches remote URL {:?} without checksum verification",
                                    src
                                ))
                                .pos(add.span.start)
                                .context(ctx.line(add.span.start.line))
                                .help("Use ADD --checksum=sha256:... or prefer: RUN curl -o file URL && echo 'CHECKSUM file' | sha256sum -c -")
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
        AddRemoteUrl.check(&df, &Context::new("Dockerfile", source))
    }

    #[test]
    fn url_without_checksum_fires() {
        let diags = check("FROM a\nADD https://example.com/tool.tar.gz /opt/\n");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn url_with_checksum_passes() {
        let diags =
            check("FROM a\nADD --checksum=sha256:deadbeef https://example.com/tool.tar.gz /opt/\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn local_add_passes() {
        let diags = check("FROM a\nADD rootfs.tar.gz /\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn ftp_url_fires() {
        let diags = check("FROM a\nADD ftp://example.com/x.bin /x\n");
        assert_eq!(diags.len(), 1);
    }
}

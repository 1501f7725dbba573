//! BP002: ADD used where COPY would do.

use crate::analyzer::{Category, Diagnostic, Severity};
use crate::parser::Dockerfile;
use crate::rules::{Context, Rule};

pub struct AddVsCopy;

impl Rule for AddVsCopy {
    fn id(&self) -> &'static str {
        "BP002"
    }

    fn name(&self) -> &'static str {
        "add-vs-copy"
    }

    fn description(&self) -> &'static str {
        "COPY is preferred over ADD for copying local files. ADD has extra features that can be confusing."
    }

    fn category(&self) -> Category {
        Category::BestPractice
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, df: &Dockerfile, ctx: &Context) -> Vec<Diagnostic> {
        let mut diags = Vec::new();

        for stage in &df.stages {
            for add in stage.instructions.iter().filter_map(|i| i.as_add()) {
                // URL fetching and tar auto-extraction are ADD-only.
                if add.has_url_source() || add.has_archive_source() {
                    continue;
                }

                diags.push(
                    self.diagnostic()
                        .message("ADD is used where COPY would suffice")
                        .pos(add.span.start)
                        .context(ctx.line(add.span.start.line))
                        .help("Use COPY for simple file copies. ADD should only be used for URLs or tar extraction.")
                        .fix("add-to-copy")
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
        AddVsCopy.check(&df, &Context::new("Dockerfile", source))
    }

    #[test]
    fn plain_add_fires() {
        let diags = check("FROM a\nADD app.bin /usr/local/bin/app\n");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].fixable);
    }

    #[test]
    fn url_add_passes() {
        let diags = check("FROM a\nADD https://example.com/x.bin /x\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn tar_add_passes() {
        let diags = check("FROM a\nADD rootfs.tar.gz /\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn copy_never_fires() {
        let diags = check("FROM a\nCOPY app.bin /usr/local/bin/app\n");
        assert!(diags.is_empty());
    }
}

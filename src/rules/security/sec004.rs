//! SEC004: downloads piped straight into a shell.

use crate::analyzer::{Category, Diagnostic, Severity};
use crate::parser::Dockerfile;
use crate::rules::{Context, Rule};
use regex::Regex;
use std::sync::LazyLock;

static CURL_PIPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(curl|wget)\s+[^|]+\|\s*(sh|bash|zsh|dash|ksh)").unwrap());
static SHELL_SUBST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(bash|sh)\s+-c\s+["']?\$\((curl|wget)"#).unwrap());
static SHELL_PROCSUB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(bash|sh)\s+<\(\s*(curl|wget)").unwrap());

const SHELLS: &[&str] = &["sh", "bash", "zsh", "dash", "ksh"];

/// Catch `curl URL | bash` shapes the regexes miss, segment by segment.
fn is_download_pipe(cmd: &str) -> bool {
    let parts: Vec<&str> = cmd.split('|').collect();
    if parts.len() < 2 {
        return false;
    }

    for pair in parts.windows(2) {
        let left = pair[0].trim();
        let right = pair[1].trim();
        if (left.contains("curl") || left.contains("wget"))
            && SHELLS
                .iter()
                .any(|shell| right == *shell || right.starts_with(shell))
        {
            return true;
        }
    }
    false
}

pub struct CurlPipeShell;

impl Rule for CurlPipeShell {
    fn id(&self) -> &'static str {
        "SEC004"
    }

    fn name(&self) -> &'static str {
        "curl-pipe-shell"
    }

    fn description(&self) -> &'static str {
        "curl/wget piped to shell is dangerous. Downloads should be verified before execution."
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
            for run in stage.instructions.iter().filter_map(|i| i.as_run()) {
                let cmd = run.command_text();
                if CURL_PIPE.is_match(cmd)
                    || SHELL_SUBST.is_match(cmd)
                    || SHELL_PROCSUB.is_match(cmd)
                    || is_download_pipe(cmd)
                {
                    diags.push(
                        self.diagnostic()
                            .message("curl/wget output piped directly to shell")
                            .pos(run.span.start)
                            .context(ctx.line(run.span.start.line))
                            .help("Download the script first, verify its checksum, then execute. Example: curl -o script.sh URL && sha256sum -c script.sha256 && sh script.sh")
                            .build(),
                    );
                }
            }
        }

        diags
    }
}

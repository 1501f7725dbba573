//! SEC006: copying sensitive files into the image.

use crate::analyzer::{Category, Diagnostic, Severity};
use crate::lexer::Position;
use crate::parser::{Dockerfile, Instruction};
use crate::rules::{Context, Rule};
use regex::Regex;
use std::sync::LazyLock;

const SENSITIVE_PATTERNS: &[(&str, &str)] = &[
    (".env", "environment file"),
    (".env.*", "environment file"),
    ("*.pem", "PEM certificate/key"),
    ("*.key", "private key"),
    ("*.p12", "PKCS12 certificate"),
    ("*.pfx", "PKCS12 certificate"),
    ("id_rsa", "SSH private key"),
    ("id_dsa", "SSH private key"),
    ("id_ecdsa", "SSH private key"),
    ("id_ed25519", "SSH private key"),
    (".ssh/*", "SSH files"),
    (".git/*", "Git repository"),
    (".gitconfig", "Git config"),
    ("*.log", "log file"),
    (".dockerenv", "Docker environment"),
    ("docker-compose*.yml", "Docker Compose file"),
    ("docker-compose*.yaml", "Docker Compose file"),
    (".aws/*", "AWS credentials"),
    (".kube/*", "Kubernetes config"),
    ("credentials.json", "credentials file"),
    ("secrets.json", "secrets file"),
    ("*.secret", "secret file"),
    (".npmrc", "NPM config (may contain tokens)"),
    (".pypirc", "PyPI config (may contain tokens)"),
];

static COMPILED: LazyLock<Vec<(Regex, &'static str, &'static str)>> = LazyLock::new(|| {
    SENSITIVE_PATTERNS
        .iter()
        .map(|(pattern, desc)| {
            let escaped = regex::escape(pattern).replace(r"\*", ".*");
            let re = Regex::new(&format!("^{}$", escaped)).unwrap();
            (re, *pattern, *desc)
        })
        .collect()
});

fn sensitive_file(path: &str) -> Option<&'static str> {
    let base = path.rsplit('/').next().unwrap_or(path);

    for (re, pattern, desc) in COMPILED.iter() {
        if re.is_match(base) {
            return Some(desc);
        }
        // A path that merely contains the fixed part of the pattern is
        // suspicious too (e.g. `config/.aws/credentials`).
        let fixed = pattern.trim_start_matches('*');
        if !fixed.is_empty() && path.contains(fixed) {
            return Some(desc);
        }
    }
    None
}

pub struct SensitiveFiles;

impl Rule for SensitiveFiles {
    fn id(&self) -> &'static str {
        "SEC006"
    }

    fn name(&self) -> &'static str {
        "sensitive-files"
    }

    fn description(&self) -> &'static str {
        "Sensitive files should not be copied into Docker images."
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
            for inst in &stage.instructions {
                let (sources, pos): (&[String], Position) = match inst {
                    Instruction::Copy(c) => (&c.sources, c.span.start),
                    Instruction::Add(a) => (&a.sources, a.span.start),
                    _ => continue,
                };

                for src in sources {
                    if let Some(desc) = sensitive_file(src) {
                        diags.push(
                            self.diagnostic()
                                .message(format!("Copying {} ({}) into image", src, desc))
                                .pos(pos)
                                .context(ctx.line(pos.line))
                                .help("Add this file to .dockerignore or use Docker secrets/BuildKit secrets for sensitive data")
                                .build(),
                        );
                    }
                }
            }
        }

        diags
    }
}

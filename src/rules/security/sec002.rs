//! SEC002: secrets must not be baked into ENV or ARG.

use crate::analyzer::{Category, Diagnostic, Severity};
use crate::parser::{Dockerfile, Instruction};
use crate::rules::{Context, Rule};
use regex::Regex;
use std::sync::LazyLock;

static SECRET_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (Regex::new(r"(?i)(password|passwd|pwd)").unwrap(), "password"),
        (
            Regex::new(r"(?i)(secret|api_?key|apikey|auth_?token)").unwrap(),
            "secret/API key",
        ),
        (
            Regex::new(r"(?i)(private_?key|priv_?key)").unwrap(),
            "private key",
        ),
        (
            Regex::new(r"(?i)(access_?key|secret_?key)").unwrap(),
            "access key",
        ),
        (
            Regex::new(r"(?i)(credentials?|creds?)").unwrap(),
            "credentials",
        ),
        (Regex::new(r"(?i)(token)$").unwrap(), "token"),
        (
            Regex::new(r"(?i)^(aws_|azure_|gcp_|github_|gitlab_)").unwrap(),
            "cloud/service credential",
        ),
    ]
});

fn secret_kind(key: &str) -> Option<&'static str> {
    SECRET_PATTERNS
        .iter()
        .find(|(re, _)| re.is_match(key))
        .map(|(_, kind)| *kind)
}

pub struct SecretsInEnv;

impl Rule for SecretsInEnv {
    fn id(&self) -> &'static str {
        "SEC002"
    }

    fn name(&self) -> &'static str {
        "secrets-in-env"
    }

    fn description(&self) -> &'static str {
        "Secrets should not be passed via ENV or ARG instructions as they are visible in image history."
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
                match inst {
                    Instruction::Env(env) => {
                        for kv in &env.variables {
                            if let Some(kind) = secret_kind(&kv.key) {
                                diags.push(
                                    self.diagnostic()
                                        .message(format!(
                                            "ENV variable {:?} appears to contain a {}",
                                            kv.key, kind
                                        ))
                                        .pos(env.span.start)
                                        .context(ctx.line(env.span.start.line))
                                        .help("Use Docker secrets, BuildKit secrets (--mount=type=secret), or runtime environment variables instead")
                                        .build(),
                                );
                            }
                        }
                    }
                    Instruction::Arg(arg) => {
                        if let Some(kind) = secret_kind(&arg.name) {
                            diags.push(
                                self.diagnostic()
                                    .message(format!(
                                        "ARG {:?} appears to contain a {}",
                                        arg.name, kind
                                    ))
                                    .pos(arg.span.start)
                                    .context(ctx.line(arg.span.start.line))
                                    .help("ARG values are visible in image history. Use BuildKit secrets (--mount=type=secret) instead")
                                    .build(),
                            );
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
        SecretsInEnv.check(&df, &Context::new("Dockerfile", source))
    }

    #[test]
    fn env_password_fires() {
        let diags = check("FROM a\nENV DB_PASSWORD=hunter2\n");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("password"));
    }

    #[test]
    fn arg_api_key_fires() {
        let diags = check("FROM a\nARG API_KEY\n");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn cloud_prefix_fires() {
        let diags = check("FROM a\nENV AWS_SECRET_ACCESS_KEY=xyz\n");
        assert!(!diags.is_empty());
    }

    #[test]
    fn token_suffix_fires() {
        let diags = check("FROM a\nARG GITHUB_TOKEN\n");
        assert!(!diags.is_empty());
    }

    #[test]
    fn benign_names_pass() {
        let diags = check("FROM a\nENV NODE_ENV=production PORT=8080\n");
        assert!(diags.is_empty());
    }
}

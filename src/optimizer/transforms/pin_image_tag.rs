//! pin-image-tag: resolve unpinned base images to sha256 digests.
//!
//! The digest lookup is injected behind [`DigestResolver`] so tests and
//! offline runs need no network. Lookup failures are swallowed; the image
//! reference is simply left unchanged.

use crate::analyzer::Diagnostic;
use crate::error::{KeelError, Result};
use crate::optimizer::Transform;
use crate::parser::Dockerfile;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolves an `image:tag` pair to a `sha256:…` digest.
pub trait DigestResolver: Send + Sync {
    fn digest(&self, image: &str, tag: &str) -> Result<String>;
}

/// Pins `FROM` references by filling in their digest.
#[derive(Default)]
pub struct PinImageTag {
    resolver: Option<Box<dyn DigestResolver>>,
}

impl PinImageTag {
    pub fn new(resolver: Box<dyn DigestResolver>) -> Self {
        Self {
            resolver: Some(resolver),
        }
    }
}

impl Transform for PinImageTag {
    fn name(&self) -> &'static str {
        "pin-image-tag"
    }

    fn description(&self) -> &'static str {
        "Pin base image tags with sha256 digests for reproducible builds"
    }

    fn rules(&self) -> &'static [&'static str] {
        &["SEC003"]
    }

    fn apply(&self, df: &mut Dockerfile, _diagnostics: &[Diagnostic]) -> bool {
        let resolver = match &self.resolver {
            Some(r) => r,
            None => return false,
        };

        // Collect stage aliases up front; `FROM builder` must stay symbolic.
        let aliases: Vec<String> = df
            .stages
            .iter()
            .filter_map(|s| s.name.clone())
            .collect();

        let mut changed = false;

        for stage in &mut df.stages {
            let from = &mut stage.from;

            if from.digest.is_some() || from.is_scratch() || from.is_variable() {
                continue;
            }
            if aliases.iter().any(|a| a.eq_ignore_ascii_case(&from.image)) {
                continue;
            }

            let tag = from.tag.as_deref().unwrap_or("latest");
            match resolver.digest(&from.image, tag) {
                Ok(digest) => {
                    from.digest = Some(digest);
                    changed = true;
                }
                Err(err) => {
                    log::debug!("digest lookup failed for {}:{}: {}", from.image, tag, err);
                }
            }
        }

        changed
    }
}

/// Docker Hub digest lookup: anonymous token exchange followed by a HEAD on
/// the manifest, reading the `Docker-Content-Digest` header.
pub struct DockerHubResolver {
    client: reqwest::blocking::Client,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

impl DockerHubResolver {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KeelError::Config(format!("http client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_default_timeout() -> Result<Self> {
        Self::new(DEFAULT_TIMEOUT)
    }

    fn lookup_error(&self, image: &str, tag: &str, reason: impl ToString) -> KeelError {
        KeelError::DigestLookup {
            image: image.to_string(),
            tag: tag.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl DigestResolver for DockerHubResolver {
    fn digest(&self, image: &str, tag: &str) -> Result<String> {
        // Official images live under the library/ namespace.
        let repository = if image.contains('/') {
            image.to_string()
        } else {
            format!("library/{}", image)
        };

        let token_url = format!(
            "https://auth.docker.io/token?service=registry.docker.io&scope=repository:{}:pull",
            repository
        );
        let token: TokenResponse = self
            .client
            .get(&token_url)
            .send()
            .map_err(|e| self.lookup_error(image, tag, e))?
            .error_for_status()
            .map_err(|e| self.lookup_error(image, tag, e))?
            .json()
            .map_err(|e| self.lookup_error(image, tag, e))?;

        let manifest_url = format!(
            "https://registry-1.docker.io/v2/{}/manifests/{}",
            repository, tag
        );
        let response = self
            .client
            .head(&manifest_url)
            .bearer_auth(&token.token)
            .header(
                reqwest::header::ACCEPT,
                "application/vnd.docker.distribution.manifest.v2+json, application/vnd.oci.image.manifest.v1+json",
            )
            .send()
            .map_err(|e| self.lookup_error(image, tag, e))?
            .error_for_status()
            .map_err(|e| self.lookup_error(image, tag, e))?;

        response
            .headers()
            .get("Docker-Content-Digest")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| self.lookup_error(image, tag, "no digest in response"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    struct FixedResolver(&'static str);

    impl DigestResolver for FixedResolver {
        fn digest(&self, _image: &str, _tag: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingResolver;

    impl DigestResolver for FailingResolver {
        fn digest(&self, image: &str, tag: &str) -> Result<String> {
            Err(KeelError::DigestLookup {
                image: image.to_string(),
                tag: tag.to_string(),
                reason: "unreachable".to_string(),
            })
        }
    }

    const DIGEST: &str = "sha256:0123456789abcdef";

    fn pin(source: &str) -> (Dockerfile, bool) {
        let (mut df, _) = parse(source);
        let transform = PinImageTag::new(Box::new(FixedResolver(DIGEST)));
        let changed = transform.apply(&mut df, &[]);
        (df, changed)
    }

    #[test]
    fn unpinned_image_gets_digest() {
        let (df, changed) = pin("FROM ubuntu\n");
        assert!(changed);
        assert_eq!(df.stages[0].from.digest.as_deref(), Some(DIGEST));
    }

    #[test]
    fn tagged_image_gets_digest_too() {
        let (df, changed) = pin("FROM ubuntu:22.04\n");
        assert!(changed);
        assert_eq!(df.stages[0].from.tag.as_deref(), Some("22.04"));
        assert_eq!(df.stages[0].from.digest.as_deref(), Some(DIGEST));
    }

    #[test]
    fn pinned_image_untouched() {
        let (df, changed) = pin("FROM ubuntu@sha256:feedface\n");
        assert!(!changed);
        assert_eq!(df.stages[0].from.digest.as_deref(), Some("sha256:feedface"));
    }

    #[test]
    fn scratch_and_variables_untouched() {
        let (_, changed) = pin("FROM scratch\n");
        assert!(!changed);
        let (_, changed) = pin("FROM ${BASE}\n");
        assert!(!changed);
    }

    #[test]
    fn stage_alias_untouched() {
        let (df, changed) = pin("FROM golang:1.21 AS builder\nRUN true\n\nFROM builder\nRUN true\n");
        assert!(changed); // the first stage is still pinned
        assert!(df.stages[1].from.digest.is_none());
    }

    #[test]
    fn lookup_failure_skips_image() {
        let (mut df, _) = parse("FROM ubuntu\n");
        let transform = PinImageTag::new(Box::new(FailingResolver));
        assert!(!transform.apply(&mut df, &[]));
        assert!(df.stages[0].from.digest.is_none());
    }

    #[test]
    fn no_resolver_is_a_noop() {
        let (mut df, _) = parse("FROM ubuntu\n");
        assert!(!PinImageTag::default().apply(&mut df, &[]));
    }
}

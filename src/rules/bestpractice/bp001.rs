//! BP001: missing recommended labels on the final image.

use crate::analyzer::{Category, Diagnostic, Severity};
use crate::parser::Dockerfile;
use crate::rules::{Context, Rule};
use std::collections::HashSet;

const RECOMMENDED: &[(&str, &[&str])] = &[
    ("maintainer", &["org.opencontainers.image.authors", "maintainer"]),
    ("version", &["org.opencontainers.image.version", "version"]),
    (
        "description",
        &["org.opencontainers.image.description", "description"],
    ),
];

pub struct MissingLabels;

impl Rule for MissingLabels {
    fn id(&self) -> &'static str {
        "BP001"
    }

    fn name(&self) -> &'static str {
        "missing-labels"
    }

    fn description(&self) -> &'static str {
        "Images should have maintainer, version, and description labels for documentation."
    }

    fn category(&self) -> Category {
        Category::BestPractice
    }

    fn severity(&self) -> Severity {
        Severity::Info
    }

    fn check(&self, df: &Dockerfile, _ctx: &Context) -> Vec<Diagnostic> {
        let final_stage = match df.final_stage() {
            Some(s) => s,
            None => return Vec::new(),
        };

        let present: HashSet<String> = final_stage
            .instructions
            .iter()
            .filter_map(|i| i.as_label())
            .flat_map(|l| l.labels.iter())
            .map(|kv| kv.key.to_lowercase())
            .collect();

        let missing: Vec<&str> = RECOMMENDED
            .iter()
            .filter(|(_, variants)| !variants.iter().any(|v| present.contains(&v.to_lowercase())))
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            return Vec::new();
        }

        vec![self
            .diagnostic()
            .message(format!("Missing recommended labels: {}", missing.join(", ")))
            .pos(final_stage.from.span.start)
            .help("Add LABEL instructions, e.g., LABEL maintainer=\"you@example.com\" version=\"1.0\" description=\"My app\"")
            .build()]
    }
}

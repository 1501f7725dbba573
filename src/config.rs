//! Configuration loaded from `.keel.yaml`.

use crate::analyzer::{Analyzer, Severity};
use crate::error::{KeelError, Result};
use crate::rules::builtin_rules;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

const DEFAULT_CONFIG_FILE: &str = ".keel.yaml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KeelConfig {
    pub rules: RuleSelection,
    /// Minimum severity to report: hint, info, warning, or error.
    pub min_severity: Option<String>,
    pub parallel: ParallelConfig,
    pub format: FormatConfig,
    /// Per-rule settings, keyed by rule id.
    pub rule_config: HashMap<String, HashMap<String, serde_json::Value>>,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuleSelection {
    /// When non-empty, only these rules run.
    pub enabled: Vec<String>,
    pub disabled: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParallelConfig {
    /// Run rules on a worker pool.
    pub rules: bool,
    /// Worker count; 0 means available parallelism.
    pub workers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FormatConfig {
    pub indent: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub max_entries: usize,
    pub max_age_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            max_age_secs: 300,
        }
    }
}

impl KeelConfig {
    /// Load configuration. An explicit path must exist; otherwise
    /// `.keel.yaml` is used when present and defaults apply when not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|source| {
                    KeelError::ReadFile {
                        path: path.to_path_buf(),
                        source,
                    }
                })?;
                Self::from_yaml(&content)
            }
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    let content =
                        std::fs::read_to_string(default).map_err(|source| KeelError::ReadFile {
                            path: default.to_path_buf(),
                            source,
                        })?;
                    Self::from_yaml(&content)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| KeelError::Config(e.to_string()))
    }

    pub fn min_severity(&self) -> Result<Severity> {
        match &self.min_severity {
            None => Ok(Severity::Hint),
            Some(s) => Severity::parse(s)
                .ok_or_else(|| KeelError::Config(format!("invalid min_severity: {}", s))),
        }
    }

    /// An analyzer loaded with the built-in rules and this configuration.
    pub fn build_analyzer(&self) -> Result<Analyzer> {
        let mut analyzer = Analyzer::new()
            .with_rules(builtin_rules())
            .enable(self.rules.enabled.iter().cloned())
            .disable(self.rules.disabled.iter().cloned())
            .min_severity(self.min_severity()?)
            .parallel(self.parallel.rules)
            .max_workers(self.parallel.workers);

        for (rule_id, config) in &self.rule_config {
            analyzer = analyzer.rule_config(rule_id.clone(), config.clone());
        }

        Ok(analyzer)
    }

    /// The commented scaffold written by `keel init`.
    pub fn default_yaml() -> &'static str {
        r#"# keel configuration
#
# Rule selection: with a non-empty `enabled` list only those rules run;
# otherwise all rules run except the ones in `disabled`.
rules:
  enabled: []
  disabled: []

# Minimum severity to report: hint, info, warning, or error.
min_severity: hint

# Rule execution.
parallel:
  rules: false
  workers: 0

# Rewriter output.
format:
  indent: "    "

# Per-rule settings.
rule_config:
  PERF004:
    max_consecutive: 2

# Parsed-AST cache.
cache:
  max_entries: 100
  max_age_secs: 300
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_permissive() {
        let config = KeelConfig::default();
        assert!(config.rules.enabled.is_empty());
        assert_eq!(config.min_severity().unwrap(), Severity::Hint);
        assert_eq!(config.format.indent, "    ");
        assert_eq!(config.cache.max_entries, 100);
    }

    #[test]
    fn scaffold_round_trips() {
        let config = KeelConfig::from_yaml(KeelConfig::default_yaml()).unwrap();
        assert_eq!(config.min_severity().unwrap(), Severity::Hint);
        let perf004 = &config.rule_config["PERF004"];
        assert_eq!(perf004["max_consecutive"], serde_json::json!(2));
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config = KeelConfig::from_yaml("rules:\n  disabled: [SEC008]\n").unwrap();
        assert_eq!(config.rules.disabled, vec!["SEC008"]);
        assert_eq!(config.cache.max_age_secs, 300);
    }

    #[test]
    fn invalid_severity_rejected() {
        let config = KeelConfig::from_yaml("min_severity: loud\n").unwrap();
        assert!(config.min_severity().is_err());
    }

    #[test]
    fn invalid_yaml_is_a_config_error() {
        assert!(KeelConfig::from_yaml(": not yaml :").is_err());
    }
}

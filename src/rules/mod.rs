//! Rule framework: the [`Rule`] trait, the per-check [`Context`], and the
//! built-in rule set.
//!
//! Rules are side-effect-free: they read the AST and the context and return
//! diagnostics. They never mutate the AST and never retain references past
//! the `check` call.

pub mod bestpractice;
pub mod performance;
pub mod registry;
pub mod security;
pub mod style;

pub use registry::Registry;

use crate::analyzer::{Category, Diagnostic, DiagnosticBuilder, Severity};
use crate::parser::Dockerfile;
use std::collections::HashMap;
use std::sync::Arc;

/// A pluggable check over a parsed Dockerfile.
pub trait Rule: Send + Sync {
    /// Stable public identifier, e.g. `SEC001`.
    fn id(&self) -> &'static str;

    /// Short human-readable name, e.g. `root-user`.
    fn name(&self) -> &'static str;

    /// What the rule checks and why it matters.
    fn description(&self) -> &'static str;

    fn category(&self) -> Category;

    /// Default severity; the analyzer may filter below a configured floor.
    fn severity(&self) -> Severity;

    /// Analyze the Dockerfile and return any findings.
    fn check(&self, df: &Dockerfile, ctx: &Context) -> Vec<Diagnostic>;

    /// A builder pre-populated with this rule's id, category, and severity.
    fn diagnostic(&self) -> DiagnosticBuilder {
        Diagnostic::builder(self.id(), self.category()).severity(self.severity())
    }
}

/// Context handed to each rule invocation.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub filename: String,
    pub source: String,
    lines: Vec<String>,
    /// Rule-specific configuration values.
    pub config: HashMap<String, serde_json::Value>,
}

impl Context {
    pub fn new(filename: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let lines = source.lines().map(str::to_string).collect();
        Self {
            filename: filename.into(),
            source,
            lines,
            config: HashMap::new(),
        }
    }

    pub fn with_config(mut self, config: HashMap<String, serde_json::Value>) -> Self {
        self.config = config;
        self
    }

    /// The source line at `line_num` (1-based), or empty when out of range.
    pub fn line(&self, line_num: u32) -> &str {
        let idx = line_num as usize;
        if idx == 0 || idx > self.lines.len() {
            return "";
        }
        &self.lines[idx - 1]
    }

    /// All source lines, 0-indexed.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// An integer config value, when present.
    pub fn config_int(&self, key: &str) -> Option<i64> {
        self.config.get(key).and_then(|v| v.as_i64())
    }
}

/// Every built-in rule, ready for registration.
pub fn builtin_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(security::sec001::RootUser),
        Arc::new(security::sec002::SecretsInEnv),
        Arc::new(security::sec003::UnpinnedImageTag),
        Arc::new(security::sec004::CurlPipeShell),
        Arc::new(security::sec005::SudoUsage),
        Arc::new(security::sec006::SensitiveFiles),
        Arc::new(security::sec007::AddRemoteUrl),
        Arc::new(security::sec008::MissingHealthcheck),
        Arc::new(security::sec009::PrivilegedPorts),
        Arc::new(security::sec010::ChmodExecutable),
        Arc::new(performance::perf001::CopyBeforeInstall),
        Arc::new(performance::perf002::MissingMultistage),
        Arc::new(performance::perf003::CacheNotCleaned),
        Arc::new(performance::perf004::ConsecutiveRuns),
        Arc::new(performance::perf005::NoInstallRecommends),
        Arc::new(performance::perf006::SeparateDownloadExtract),
        Arc::new(bestpractice::bp001::MissingLabels),
        Arc::new(bestpractice::bp002::AddVsCopy),
        Arc::new(bestpractice::bp003::MultipleCmd),
        Arc::new(bestpractice::bp004::DeprecatedMaintainer),
        Arc::new(bestpractice::bp005::WorkdirRelative),
        Arc::new(style::sty001::InstructionCase),
    ]
}

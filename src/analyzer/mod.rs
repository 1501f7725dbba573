//! Analyzer: runs selected rules against a parsed Dockerfile.
//!
//! Rules run either sequentially or on a fixed-size worker pool. The AST is
//! shared read-only across workers; each worker builds its own [`Context`]
//! and appends into a mutex-guarded list. The final list is stably sorted by
//! position, so both execution modes yield identical output.

mod diagnostic;

pub use diagnostic::{AnalysisResult, Category, Diagnostic, DiagnosticBuilder, Severity};

use crate::parser::{self, Dockerfile, ParseError};
use crate::rules::{Context, Rule};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

/// Configurable rule runner.
pub struct Analyzer {
    rules: Vec<Arc<dyn Rule>>,
    enabled: HashSet<String>,
    disabled: HashSet<String>,
    min_severity: Severity,
    rule_config: HashMap<String, HashMap<String, serde_json::Value>>,
    parallel: bool,
    max_workers: usize,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            enabled: HashSet::new(),
            disabled: HashSet::new(),
            min_severity: Severity::Hint,
            rule_config: HashMap::new(),
            parallel: false,
            max_workers: 0,
        }
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(mut self, rules: impl IntoIterator<Item = Arc<dyn Rule>>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// When non-empty, only these rule ids run.
    pub fn enable(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.enabled.extend(ids);
        self
    }

    pub fn disable(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.disabled.extend(ids);
        self
    }

    pub fn min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    pub fn rule_config(
        mut self,
        rule_id: impl Into<String>,
        config: HashMap<String, serde_json::Value>,
    ) -> Self {
        self.rule_config.insert(rule_id.into(), config);
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Worker count for parallel mode; 0 means available parallelism.
    pub fn max_workers(mut self, n: usize) -> Self {
        self.max_workers = n;
        self
    }

    fn should_run(&self, rule: &dyn Rule) -> bool {
        if self.disabled.contains(rule.id()) {
            return false;
        }
        if !self.enabled.is_empty() {
            return self.enabled.contains(rule.id());
        }
        true
    }

    fn context_for(&self, rule: &dyn Rule, filename: &str, source: &str) -> Context {
        let mut ctx = Context::new(filename, source);
        if let Some(config) = self.rule_config.get(rule.id()) {
            ctx = ctx.with_config(config.clone());
        }
        ctx
    }

    /// Run all selected rules and return position-sorted diagnostics.
    pub fn analyze(&self, df: &Dockerfile, filename: &str, source: &str) -> AnalysisResult {
        let selected: Vec<&Arc<dyn Rule>> = self
            .rules
            .iter()
            .filter(|r| self.should_run(r.as_ref()))
            .collect();

        let mut diagnostics = if self.parallel && selected.len() > 1 {
            self.run_parallel(df, filename, source, &selected)
        } else {
            self.run_sequential(df, filename, source, &selected)
        };

        // Stable sort: rule-internal ordering remains the tiebreak.
        diagnostics.sort_by_key(|d| (d.pos.line, d.pos.column));

        AnalysisResult {
            filename: filename.to_string(),
            diagnostics,
        }
    }

    /// Parse and analyze in one step, surfacing parse errors alongside.
    pub fn analyze_source(&self, source: &str, filename: &str) -> (AnalysisResult, Vec<ParseError>) {
        let (df, parse_errors) = parser::parse(source);
        (self.analyze(&df, filename, source), parse_errors)
    }

    fn run_sequential(
        &self,
        df: &Dockerfile,
        filename: &str,
        source: &str,
        rules: &[&Arc<dyn Rule>],
    ) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for rule in rules {
            let ctx = self.context_for(rule.as_ref(), filename, source);
            log::trace!("running rule {}", rule.id());
            diagnostics.extend(
                rule.check(df, &ctx)
                    .into_iter()
                    .filter(|d| d.severity >= self.min_severity),
            );
        }
        diagnostics
    }

    fn run_parallel(
        &self,
        df: &Dockerfile,
        filename: &str,
        source: &str,
        rules: &[&Arc<dyn Rule>],
    ) -> Vec<Diagnostic> {
        let workers = match self.max_workers {
            0 => thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            n => n,
        }
        .min(rules.len());

        let next = AtomicUsize::new(0);
        let diagnostics: Mutex<Vec<Diagnostic>> = Mutex::new(Vec::new());

        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    let idx = next.fetch_add(1, Ordering::Relaxed);
                    if idx >= rules.len() {
                        break;
                    }
                    let rule = rules[idx].as_ref();
                    let ctx = self.context_for(rule, filename, source);
                    let found: Vec<Diagnostic> = rule
                        .check(df, &ctx)
                        .into_iter()
                        .filter(|d| d.severity >= self.min_severity)
                        .collect();
                    if !found.is_empty() {
                        diagnostics.lock().extend(found);
                    }
                });
            }
        });

        diagnostics.into_inner()
    }
}

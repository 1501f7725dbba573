//! Diagnostic types shared by rules, the analyzer, and reporters.

use crate::lexer::Position;
use std::collections::HashMap;
use std::fmt;

/// Severity of a diagnostic, ordered `Hint < Info < Warning < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Hint,
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Parse a severity from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "hint" => Some(Self::Hint),
            "info" => Some(Self::Info),
            "warning" | "warn" => Some(Self::Warning),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hint => "hint",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Security,
    Performance,
    BestPractice,
    Style,
}

impl Category {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "security" => Some(Self::Security),
            "performance" => Some(Self::Performance),
            "bestpractice" | "best-practice" => Some(Self::BestPractice),
            "style" => Some(Self::Style),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Security => "security",
            Self::Performance => "performance",
            Self::BestPractice => "bestpractice",
            Self::Style => "style",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single issue reported by a rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub rule: String,
    pub category: Category,
    pub severity: Severity,
    pub message: String,
    pub pos: Position,
    pub end_pos: Option<Position>,
    /// The offending source line.
    pub context: Option<String>,
    pub help: Option<String>,
    /// Whether an optimizer transform can address this issue.
    pub fixable: bool,
    pub fix_suggestion: Option<String>,
}

impl Diagnostic {
    /// Start building a diagnostic for the given rule.
    pub fn builder(rule: impl Into<String>, category: Category) -> DiagnosticBuilder {
        DiagnosticBuilder {
            diag: Diagnostic {
                rule: rule.into(),
                category,
                severity: Severity::Warning,
                message: String::new(),
                pos: Position::default(),
                end_pos: None,
                context: None,
                help: None,
                fixable: false,
                fix_suggestion: None,
            },
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} at {}",
            self.rule, self.severity, self.message, self.pos
        )
    }
}

/// Fluent builder for diagnostics.
pub struct DiagnosticBuilder {
    diag: Diagnostic,
}

impl DiagnosticBuilder {
    pub fn severity(mut self, severity: Severity) -> Self {
        self.diag.severity = severity;
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.diag.message = message.into();
        self
    }

    pub fn pos(mut self, pos: Position) -> Self {
        self.diag.pos = pos;
        self
    }

    pub fn range(mut self, pos: Position, end_pos: Position) -> Self {
        self.diag.pos = pos;
        self.diag.end_pos = Some(end_pos);
        self
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        let text = context.into();
        if !text.is_empty() {
            self.diag.context = Some(text);
        }
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.diag.help = Some(help.into());
        self
    }

    pub fn fix(mut self, suggestion: impl Into<String>) -> Self {
        self.diag.fixable = true;
        self.diag.fix_suggestion = Some(suggestion.into());
        self
    }

    pub fn build(self) -> Diagnostic {
        self.diag
    }
}

/// The outcome of analyzing one Dockerfile.
#[derive(Debug, Clone, Default)]
pub struct AnalysisResult {
    pub filename: String,
    /// Sorted by `(line, column)`.
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn count_by_severity(&self) -> HashMap<Severity, usize> {
        let mut counts = HashMap::new();
        for d in &self.diagnostics {
            *counts.entry(d.severity).or_insert(0) += 1;
        }
        counts
    }

    pub fn filter_by_severity(&self, min: Severity) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity >= min)
            .collect()
    }

    pub fn filter_by_category(&self, category: Category) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.category == category)
            .collect()
    }

    /// The rule ids that produced at least one diagnostic.
    pub fn triggered_rules(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.diagnostics.iter().map(|d| d.rule.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        assert!(Severity::Info > Severity::Hint);
    }

    #[test]
    fn severity_round_trip() {
        for s in [
            Severity::Hint,
            Severity::Info,
            Severity::Warning,
            Severity::Error,
        ] {
            assert_eq!(Severity::parse(s.as_str()), Some(s));
        }
        assert_eq!(Severity::parse("bogus"), None);
    }

    #[test]
    fn category_round_trip() {
        for c in [
            Category::Security,
            Category::Performance,
            Category::BestPractice,
            Category::Style,
        ] {
            assert_eq!(Category::parse(c.as_str()), Some(c));
        }
        assert_eq!(Category::parse("best-practice"), Some(Category::BestPractice));
    }

    #[test]
    fn builder_sets_fields() {
        let diag = Diagnostic::builder("SEC001", Category::Security)
            .severity(Severity::Error)
            .message("runs as root")
            .pos(Position::new(3, 1, 20))
            .context("USER root")
            .help("switch to a non-root user")
            .fix("USER nobody")
            .build();

        assert_eq!(diag.rule, "SEC001");
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.pos.line, 3);
        assert!(diag.fixable);
        assert_eq!(diag.fix_suggestion.as_deref(), Some("USER nobody"));
    }

    #[test]
    fn result_helpers() {
        let mk = |rule: &str, sev: Severity, line: u32| {
            Diagnostic::builder(rule, Category::Security)
                .severity(sev)
                .message("m")
                .pos(Position::new(line, 1, 0))
                .build()
        };
        let result = AnalysisResult {
            filename: "Dockerfile".into(),
            diagnostics: vec![
                mk("SEC001", Severity::Error, 1),
                mk("SEC003", Severity::Warning, 2),
                mk("SEC001", Severity::Error, 9),
            ],
        };
        assert!(result.has_errors());
        assert_eq!(result.count_by_severity()[&Severity::Error], 2);
        assert_eq!(result.filter_by_severity(Severity::Error).len(), 2);
        assert_eq!(result.triggered_rules(), vec!["SEC001", "SEC003"]);
    }
}

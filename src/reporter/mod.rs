//! Output reporters for analysis results.
//!
//! Five formats: colored terminal output, JSON, SARIF 2.1.0, Markdown, and
//! GitHub Actions workflow commands.

mod github;
mod json;
mod markdown;
mod sarif;
mod terminal;

pub use github::GitHubReporter;
pub use json::JsonReporter;
pub use markdown::MarkdownReporter;
pub use sarif::SarifReporter;
pub use terminal::TerminalReporter;

use crate::analyzer::AnalysisResult;
use std::io::Write;

/// Output format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Terminal,
    Json,
    Sarif,
    Markdown,
    GitHub,
}

impl Format {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "terminal" | "tty" | "text" => Some(Self::Terminal),
            "json" => Some(Self::Json),
            "sarif" => Some(Self::Sarif),
            "markdown" | "md" => Some(Self::Markdown),
            "github" => Some(Self::GitHub),
            _ => None,
        }
    }

    pub fn all_names() -> &'static [&'static str] {
        &["terminal", "json", "sarif", "markdown", "github"]
    }

    /// Build the reporter for this format.
    pub fn reporter(self) -> Box<dyn Reporter> {
        match self {
            Self::Terminal => Box::new(TerminalReporter::new()),
            Self::Json => Box::new(JsonReporter),
            Self::Sarif => Box::new(SarifReporter),
            Self::Markdown => Box::new(MarkdownReporter),
            Self::GitHub => Box::new(GitHubReporter),
        }
    }
}

/// Renders an analysis result to a writer.
pub trait Reporter {
    fn report(
        &self,
        result: &AnalysisResult,
        source: &str,
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;

    fn report_to_string(&self, result: &AnalysisResult, source: &str) -> String {
        let mut buf = Vec::new();
        self.report(result, source, &mut buf).unwrap_or_default();
        String::from_utf8(buf).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing() {
        assert_eq!(Format::parse("json"), Some(Format::Json));
        assert_eq!(Format::parse("SARIF"), Some(Format::Sarif));
        assert_eq!(Format::parse("tty"), Some(Format::Terminal));
        assert_eq!(Format::parse("md"), Some(Format::Markdown));
        assert_eq!(Format::parse("github"), Some(Format::GitHub));
        assert_eq!(Format::parse("xml"), None);
    }
}

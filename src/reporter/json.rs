//! JSON reporter: one object per invocation with diagnostics and a summary.

use super::Reporter;
use crate::analyzer::{AnalysisResult, Severity};
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct JsonOutput<'a> {
    filename: &'a str,
    diagnostics: Vec<JsonDiagnostic<'a>>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    rule: &'a str,
    category: &'a str,
    severity: &'a str,
    message: &'a str,
    line: u32,
    column: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_column: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    help: Option<&'a str>,
    fixable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    fix: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonSummary {
    total: usize,
    errors: usize,
    warnings: usize,
    info: usize,
    hints: usize,
}

pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn report(
        &self,
        result: &AnalysisResult,
        _source: &str,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let counts = result.count_by_severity();
        let output = JsonOutput {
            filename: &result.filename,
            diagnostics: result
                .diagnostics
                .iter()
                .map(|d| JsonDiagnostic {
                    rule: &d.rule,
                    category: d.category.as_str(),
                    severity: d.severity.as_str(),
                    message: &d.message,
                    line: d.pos.line,
                    column: d.pos.column,
                    end_line: d.end_pos.map(|p| p.line),
                    end_column: d.end_pos.map(|p| p.column),
                    context: d.context.as_deref(),
                    help: d.help.as_deref(),
                    fixable: d.fixable,
                    fix: d.fix_suggestion.as_deref(),
                })
                .collect(),
            summary: JsonSummary {
                total: result.diagnostics.len(),
                errors: counts.get(&Severity::Error).copied().unwrap_or(0),
                warnings: counts.get(&Severity::Warning).copied().unwrap_or(0),
                info: counts.get(&Severity::Info).copied().unwrap_or(0),
                hints: counts.get(&Severity::Hint).copied().unwrap_or(0),
            },
        };

        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        writeln!(writer, "{}", json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{Category, Diagnostic};
    use crate::lexer::Position;

    #[test]
    fn json_shape() {
        let result = AnalysisResult {
            filename: "Dockerfile".into(),
            diagnostics: vec![Diagnostic::builder("SEC003", Category::Security)
                .severity(Severity::Error)
                .message("Base image uses 'latest' tag")
                .pos(Position::new(1, 1, 0))
                .help("pin the tag")
                .build()],
        };

        let output = JsonReporter.report_to_string(&result, "");
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["filename"], "Dockerfile");
        assert_eq!(value["summary"]["total"], 1);
        assert_eq!(value["summary"]["errors"], 1);
        let diag = &value["diagnostics"][0];
        assert_eq!(diag["rule"], "SEC003");
        assert_eq!(diag["severity"], "error");
        assert_eq!(diag["category"], "security");
        assert_eq!(diag["line"], 1);
        assert_eq!(diag["fixable"], false);
        assert!(diag.get("end_line").is_none());
    }
}

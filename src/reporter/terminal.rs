//! Colored terminal reporter with source context and help lines.

use super::Reporter;
use crate::analyzer::{AnalysisResult, Severity};
use colored::{ColoredString, Colorize};
use std::io::Write;

pub struct TerminalReporter {
    _private: (),
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self { _private: () }
    }

    fn paint(&self, severity: Severity, text: &str) -> ColoredString {
        match severity {
            Severity::Error => text.red(),
            Severity::Warning => text.yellow(),
            Severity::Info => text.blue(),
            Severity::Hint => text.cyan(),
        }
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for TerminalReporter {
    fn report(
        &self,
        result: &AnalysisResult,
        source: &str,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let lines: Vec<&str> = source.split('\n').collect();

        for diag in &result.diagnostics {
            let location = format!("{}:{}:{}", result.filename, diag.pos.line, diag.pos.column);
            writeln!(
                writer,
                "{} {} {}: {}",
                location,
                format!("[{}]", diag.rule).dimmed(),
                self.paint(diag.severity, diag.severity.as_str()),
                diag.message
            )?;

            let line_idx = diag.pos.line as usize;
            if line_idx >= 1 && line_idx <= lines.len() {
                let line = lines[line_idx - 1];
                writeln!(writer, "  {} │ {}", format!("{:4}", line_idx).dimmed(), line)?;

                if diag.pos.column >= 1 {
                    let padding = " ".repeat(diag.pos.column as usize - 1);
                    let underline = match diag.end_pos {
                        Some(end)
                            if end.line == diag.pos.line && end.column > diag.pos.column =>
                        {
                            "─".repeat((end.column - diag.pos.column) as usize)
                        }
                        _ => "^".to_string(),
                    };
                    writeln!(
                        writer,
                        "       │ {}{}",
                        padding,
                        self.paint(diag.severity, &underline)
                    )?;
                }
            }

            if let Some(help) = &diag.help {
                writeln!(writer, "       │")?;
                writeln!(writer, "       = {}: {}", "help".cyan(), help)?;
            }

            writeln!(writer)?;
        }

        let counts = result.count_by_severity();
        let mut parts: Vec<String> = Vec::new();
        if let Some(&n) = counts.get(&Severity::Error) {
            parts.push(format!("{}", format!("{} error(s)", n).red()));
        }
        if let Some(&n) = counts.get(&Severity::Warning) {
            parts.push(format!("{}", format!("{} warning(s)", n).yellow()));
        }
        if let Some(&n) = counts.get(&Severity::Info) {
            parts.push(format!("{}", format!("{} info", n).blue()));
        }
        if let Some(&n) = counts.get(&Severity::Hint) {
            parts.push(format!("{}", format!("{} hint(s)", n).cyan()));
        }

        if parts.is_empty() {
            writeln!(
                writer,
                "{} No issues found in {}",
                "✓".green(),
                result.filename
            )
        } else {
            writeln!(
                writer,
                "Found {} in {}",
                parts.join(", "),
                result.filename
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{Category, Diagnostic};
    use crate::lexer::Position;

    fn render(result: &AnalysisResult, source: &str) -> String {
        colored::control::set_override(false);
        let out = TerminalReporter::new().report_to_string(result, source);
        colored::control::unset_override();
        out
    }

    #[test]
    fn includes_location_rule_and_context() {
        let source = "FROM ubuntu\n";
        let result = AnalysisResult {
            filename: "Dockerfile".into(),
            diagnostics: vec![Diagnostic::builder("SEC003", Category::Security)
                .severity(Severity::Error)
                .message("Base image has no tag")
                .pos(Position::new(1, 1, 0))
                .help("pin it")
                .build()],
        };

        let out = render(&result, source);
        assert!(out.contains("Dockerfile:1:1"));
        assert!(out.contains("[SEC003]"));
        assert!(out.contains("error: Base image has no tag"));
        assert!(out.contains("│ FROM ubuntu"));
        assert!(out.contains("help: pin it"));
        assert!(out.contains("1 error(s)"));
    }

    #[test]
    fn clean_result_prints_checkmark() {
        let result = AnalysisResult {
            filename: "Dockerfile".into(),
            diagnostics: vec![],
        };
        let out = render(&result, "FROM ubuntu:22.04\n");
        assert!(out.contains("No issues found"));
    }
}

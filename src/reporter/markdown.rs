//! Markdown reporter: summary table plus per-issue sections.

use super::Reporter;
use crate::analyzer::{AnalysisResult, Severity};
use std::io::Write;

fn severity_emoji(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "🔴",
        Severity::Warning => "🟡",
        Severity::Info => "🔵",
        Severity::Hint => "💡",
    }
}

pub struct MarkdownReporter;

impl Reporter for MarkdownReporter {
    fn report(
        &self,
        result: &AnalysisResult,
        _source: &str,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if result.diagnostics.is_empty() {
            writeln!(
                writer,
                "## ✅ No issues found\n\nDockerfile `{}` passed all checks.",
                result.filename
            )?;
            return Ok(());
        }

        writeln!(writer, "## Dockerfile Linting Results: `{}`\n", result.filename)?;

        let counts = result.count_by_severity();
        writeln!(writer, "| Severity | Count |")?;
        writeln!(writer, "|----------|-------|")?;
        for (severity, label) in [
            (Severity::Error, "Error"),
            (Severity::Warning, "Warning"),
            (Severity::Info, "Info"),
            (Severity::Hint, "Hint"),
        ] {
            if let Some(&n) = counts.get(&severity) {
                writeln!(writer, "| {} {} | {} |", severity_emoji(severity), label, n)?;
            }
        }
        writeln!(writer)?;

        writeln!(writer, "### Issues\n")?;
        for diag in &result.diagnostics {
            writeln!(
                writer,
                "#### {} `{}` - Line {}\n",
                severity_emoji(diag.severity),
                diag.rule,
                diag.pos.line
            )?;
            writeln!(writer, "{}\n", diag.message)?;

            if let Some(context) = &diag.context {
                writeln!(writer, "```dockerfile\n{}\n```\n", context)?;
            }
            if let Some(help) = &diag.help {
                writeln!(writer, "> 💡 {}\n", help)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{Category, Diagnostic};
    use crate::lexer::Position;

    #[test]
    fn renders_table_and_sections() {
        let result = AnalysisResult {
            filename: "Dockerfile".into(),
            diagnostics: vec![Diagnostic::builder("BP004", Category::BestPractice)
                .severity(Severity::Warning)
                .message("MAINTAINER instruction is deprecated")
                .pos(Position::new(2, 1, 10))
                .context("MAINTAINER x@y.z")
                .help("Use LABEL instead")
                .build()],
        };

        let out = MarkdownReporter.report_to_string(&result, "");
        assert!(out.contains("| Severity | Count |"));
        assert!(out.contains("| 🟡 Warning | 1 |"));
        assert!(out.contains("#### 🟡 `BP004` - Line 2"));
        assert!(out.contains("```dockerfile\nMAINTAINER x@y.z\n```"));
        assert!(out.contains("> 💡 Use LABEL instead"));
    }

    #[test]
    fn clean_file_message() {
        let result = AnalysisResult {
            filename: "Dockerfile".into(),
            diagnostics: vec![],
        };
        let out = MarkdownReporter.report_to_string(&result, "");
        assert!(out.contains("No issues found"));
    }
}

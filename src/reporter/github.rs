//! GitHub Actions workflow-command reporter.

use super::Reporter;
use crate::analyzer::{AnalysisResult, Severity};
use std::io::Write;

fn github_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info | Severity::Hint => "notice",
    }
}

pub struct GitHubReporter;

impl Reporter for GitHubReporter {
    fn report(
        &self,
        result: &AnalysisResult,
        _source: &str,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        for diag in &result.diagnostics {
            writeln!(
                writer,
                "::{} file={},line={},col={},title={}::{}",
                github_level(diag.severity),
                result.filename,
                diag.pos.line,
                diag.pos.column,
                diag.rule,
                diag.message
            )?;
        }

        let counts = result.count_by_severity();
        let errors = counts.get(&Severity::Error).copied().unwrap_or(0);
        let warnings = counts.get(&Severity::Warning).copied().unwrap_or(0);
        if errors > 0 || warnings > 0 {
            writeln!(writer, "::group::Summary")?;
            writeln!(
                writer,
                "Found {} issue(s) in {}",
                result.diagnostics.len(),
                result.filename
            )?;
            writeln!(writer, "::endgroup::")?;
        }

        Ok(())
    }
}

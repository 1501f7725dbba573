//! SARIF 2.1.0 reporter for code-scanning integrations.

use super::Reporter;
use crate::analyzer::{AnalysisResult, Severity};
use serde::Serialize;
use std::collections::HashSet;
use std::io::Write;

const SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLog {
    #[serde(rename = "$schema")]
    schema: &'static str,
    version: &'static str,
    runs: Vec<SarifRun>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifDriver {
    name: &'static str,
    version: &'static str,
    information_uri: &'static str,
    rules: Vec<SarifRule>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRule {
    id: String,
    name: String,
    short_description: SarifMessage,
    default_configuration: SarifRuleConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRuleConfig {
    level: &'static str,
}

#[derive(Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult {
    rule_id: String,
    level: &'static str,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLocation {
    physical_location: SarifPhysicalLocation,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifPhysicalLocation {
    artifact_location: SarifArtifactLocation,
    region: SarifRegion,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifArtifactLocation {
    uri: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRegion {
    start_line: u32,
    start_column: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_column: Option<u32>,
}

fn sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "note",
        Severity::Hint => "none",
    }
}

pub struct SarifReporter;

impl Reporter for SarifReporter {
    fn report(
        &self,
        result: &AnalysisResult,
        _source: &str,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        // Rule metadata is collected from the diagnostics actually observed.
        let mut seen = HashSet::new();
        let mut rules = Vec::new();
        for diag in &result.diagnostics {
            if seen.insert(diag.rule.as_str()) {
                rules.push(SarifRule {
                    id: diag.rule.clone(),
                    name: diag.rule.clone(),
                    short_description: SarifMessage {
                        text: diag.message.clone(),
                    },
                    default_configuration: SarifRuleConfig {
                        level: sarif_level(diag.severity),
                    },
                });
            }
        }

        let results = result
            .diagnostics
            .iter()
            .map(|d| SarifResult {
                rule_id: d.rule.clone(),
                level: sarif_level(d.severity),
                message: SarifMessage {
                    text: d.message.clone(),
                },
                locations: vec![SarifLocation {
                    physical_location: SarifPhysicalLocation {
                        artifact_location: SarifArtifactLocation {
                            uri: result.filename.clone(),
                        },
                        region: SarifRegion {
                            start_line: d.pos.line,
                            start_column: d.pos.column,
                            end_line: d.end_pos.map(|p| p.line),
                            end_column: d.end_pos.map(|p| p.column),
                        },
                    },
                }],
            })
            .collect();

        let log = SarifLog {
            schema: SCHEMA,
            version: "2.1.0",
            runs: vec![SarifRun {
                tool: SarifTool {
                    driver: SarifDriver {
                        name: "keel",
                        version: env!("CARGO_PKG_VERSION"),
                        information_uri: "https://github.com/HueCodes/keel",
                        rules,
                    },
                },
                results,
            }],
        };

        let json = serde_json::to_string_pretty(&log)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        writeln!(writer, "{}", json)
    }
}

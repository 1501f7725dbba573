//! keel: Dockerfile linter, analyzer, and optimizer.
//!
//! The pipeline runs lexer → parser → rules → analyzer → optimizer →
//! rewriter; each stage depends only on the stages before it. Rules and
//! transforms are plain values registered at startup.
//!
//! # Example
//!
//! ```
//! use keel::analyzer::Analyzer;
//! use keel::rules::builtin_rules;
//!
//! let source = "FROM ubuntu\n";
//! let analyzer = Analyzer::new().with_rules(builtin_rules());
//! let (result, parse_errors) = analyzer.analyze_source(source, "Dockerfile");
//!
//! assert!(parse_errors.is_empty());
//! assert!(result.diagnostics.iter().any(|d| d.rule == "SEC003"));
//! ```

pub mod analyzer;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod diff;
pub mod error;
pub mod lexer;
pub mod optimizer;
pub mod parallel;
pub mod parser;
pub mod reporter;
pub mod rules;

pub use error::{KeelError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

use cli::{Cli, Commands};
use reporter::Format;

/// Execute a parsed CLI invocation; returns the process exit code.
pub fn run(cli: Cli) -> Result<i32> {
    let config = config::KeelConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Lint {
            paths,
            format,
            min_severity,
            enable,
            disable,
            parallel,
            workers,
        } => {
            let format = Format::parse(&format).ok_or(KeelError::UnknownFormat(format))?;
            let min_severity = match min_severity {
                None => None,
                Some(s) => Some(
                    analyzer::Severity::parse(&s)
                        .ok_or_else(|| KeelError::Config(format!("invalid severity: {}", s)))?,
                ),
            };
            commands::lint(
                &config,
                commands::LintOptions {
                    paths,
                    format,
                    min_severity,
                    enable,
                    disable,
                    parallel,
                    workers,
                },
            )
        }
        Commands::Fix {
            path,
            write,
            diff,
            dry_run,
            pin,
        } => commands::fix(&config, &path, write, diff, dry_run, pin),
        Commands::Fmt {
            path,
            write,
            indent,
        } => commands::fmt(&config, &path, write, indent),
        Commands::Explain { rule } => commands::explain(rule.as_deref()),
        Commands::Init { force } => commands::init(force),
    }
}

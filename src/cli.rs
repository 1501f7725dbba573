//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "keel")]
#[command(version)]
#[command(about = "Dockerfile linter, analyzer, and optimizer")]
#[command(
    long_about = "Keel analyzes Dockerfiles for security issues, performance problems,\n\
                  best practice violations, and style inconsistencies. It can also\n\
                  automatically fix many issues and rewrite Dockerfiles."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (default .keel.yaml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze Dockerfiles and report issues
    Lint {
        /// Dockerfiles to lint (default: ./Dockerfile)
        #[arg(value_name = "PATH")]
        paths: Vec<PathBuf>,

        /// Output format: terminal, json, sarif, markdown, github
        #[arg(short, long, default_value = "terminal")]
        format: String,

        /// Minimum severity to report: hint, info, warning, error
        #[arg(long)]
        min_severity: Option<String>,

        /// Run only these rules
        #[arg(long, value_delimiter = ',')]
        enable: Vec<String>,

        /// Skip these rules
        #[arg(long, value_delimiter = ',')]
        disable: Vec<String>,

        /// Run rules on a worker pool
        #[arg(long)]
        parallel: bool,

        /// Worker count for parallel execution (0 = auto)
        #[arg(long, default_value_t = 0)]
        workers: usize,
    },

    /// Apply automated fixes and rewrite the Dockerfile
    Fix {
        /// Dockerfile to fix
        #[arg(value_name = "PATH", default_value = "Dockerfile")]
        path: PathBuf,

        /// Write the result back to the file
        #[arg(short, long)]
        write: bool,

        /// Print a unified diff instead of the full result
        #[arg(long, conflicts_with = "write")]
        diff: bool,

        /// Report which fixes would apply without changing anything
        #[arg(long, conflicts_with_all = ["write", "diff"])]
        dry_run: bool,

        /// Resolve unpinned base images to digests via the registry
        #[arg(long)]
        pin: bool,
    },

    /// Rewrite a Dockerfile in canonical style
    Fmt {
        /// Dockerfile to format
        #[arg(value_name = "PATH", default_value = "Dockerfile")]
        path: PathBuf,

        /// Write the result back to the file
        #[arg(short, long)]
        write: bool,

        /// Continuation indent
        #[arg(long)]
        indent: Option<String>,
    },

    /// List rules or show details for one rule
    Explain {
        /// Rule id, e.g. SEC001
        #[arg(value_name = "RULE")]
        rule: Option<String>,
    },

    /// Write a default .keel.yaml configuration
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn lint_args_parse() {
        let cli = Cli::parse_from([
            "keel", "lint", "a/Dockerfile", "b/Dockerfile", "--format", "json",
            "--disable", "SEC008,SEC009", "--parallel",
        ]);
        match cli.command {
            Commands::Lint {
                paths,
                format,
                disable,
                parallel,
                ..
            } => {
                assert_eq!(paths.len(), 2);
                assert_eq!(format, "json");
                assert_eq!(disable, vec!["SEC008", "SEC009"]);
                assert!(parallel);
            }
            _ => panic!("expected lint"),
        }
    }

    #[test]
    fn fix_defaults_to_dockerfile() {
        let cli = Cli::parse_from(["keel", "fix"]);
        match cli.command {
            Commands::Fix { path, write, .. } => {
                assert_eq!(path, PathBuf::from("Dockerfile"));
                assert!(!write);
            }
            _ => panic!("expected fix"),
        }
    }
}

//! Command handlers backing the CLI.

use crate::analyzer::Severity;
use crate::cache::{AstCache, CachedParser};
use crate::config::KeelConfig;
use crate::diff::unified_diff;
use crate::error::{KeelError, Result};
use crate::optimizer::transforms::pin_image_tag::{DockerHubResolver, PinImageTag};
use crate::optimizer::{builtin_transforms, Optimizer, Rewriter, RewriterOptions, Transform};
use crate::parallel::Processor;
use crate::reporter::Format;
use crate::rules::Registry;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| KeelError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|source| KeelError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Options carried from the `lint` CLI flags.
pub struct LintOptions {
    pub paths: Vec<PathBuf>,
    pub format: Format,
    pub min_severity: Option<Severity>,
    pub enable: Vec<String>,
    pub disable: Vec<String>,
    pub parallel: bool,
    pub workers: usize,
}

/// Lint one or more Dockerfiles; returns the process exit code.
pub fn lint(config: &KeelConfig, opts: LintOptions) -> Result<i32> {
    let mut analyzer = config
        .build_analyzer()?
        .enable(opts.enable)
        .disable(opts.disable)
        .parallel(opts.parallel || config.parallel.rules);
    if let Some(min) = opts.min_severity {
        analyzer = analyzer.min_severity(min);
    }
    if opts.workers > 0 {
        analyzer = analyzer.max_workers(opts.workers);
    }

    let files: Vec<String> = if opts.paths.is_empty() {
        vec!["Dockerfile".to_string()]
    } else {
        opts.paths
            .iter()
            .map(|p| p.display().to_string())
            .collect()
    };

    let cache = Arc::new(AstCache::new(
        config.cache.max_entries,
        Duration::from_secs(config.cache.max_age_secs),
    ));

    let results = Processor::new().process(&files, |filename| {
        let source = read_file(Path::new(filename))?;
        let parser = CachedParser::new(Arc::clone(&cache));
        let (df, parse_errors) = parser.parse(filename, &source);
        for err in parse_errors.iter() {
            eprintln!("{}: {}", filename, err);
        }
        let result = analyzer.analyze(&df, filename, &source);
        Ok((result, source))
    });

    let reporter = opts.format.reporter();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let mut io_failures = 0usize;
    let mut has_errors = false;

    for file_result in &results {
        match &file_result.result {
            Ok((result, source)) => {
                reporter.report(result, source, &mut out)?;
                if result.has_errors() {
                    has_errors = true;
                }
            }
            Err(err) => {
                eprintln!("{}", err);
                io_failures += 1;
            }
        }
    }
    out.flush()?;

    Ok(if has_errors || io_failures > 0 { 1 } else { 0 })
}

fn fix_transforms(pin: bool) -> Result<Vec<Box<dyn Transform>>> {
    let mut transforms = builtin_transforms();
    if pin {
        let resolver = DockerHubResolver::with_default_timeout()?;
        transforms.retain(|t| t.name() != "pin-image-tag");
        transforms.push(Box::new(PinImageTag::new(Box::new(resolver))));
    }
    Ok(transforms)
}

/// Run analyzer + optimizer + rewriter over one Dockerfile.
pub fn fix(
    config: &KeelConfig,
    path: &Path,
    write: bool,
    show_diff: bool,
    dry_run: bool,
    pin: bool,
) -> Result<i32> {
    let source = read_file(path)?;
    let filename = path.display().to_string();

    let (mut df, parse_errors) = crate::parser::parse(&source);
    for err in &parse_errors {
        eprintln!("{}: {}", filename, err);
    }

    let analyzer = config.build_analyzer()?;
    let result = analyzer.analyze(&df, &filename, &source);

    let optimizer = Optimizer::new()
        .with_transforms(fix_transforms(pin)?)
        .dry_run(dry_run);
    let outcome = optimizer.optimize(&mut df, &result.diagnostics);

    if dry_run {
        if outcome.changes.is_empty() {
            println!("Nothing to fix in {}", filename);
        } else {
            println!("Would apply to {}:", filename);
            for change in &outcome.changes {
                println!("  {} - {}", change.transform, change.description);
            }
        }
        return Ok(0);
    }

    let rewriter = Rewriter::with_options(RewriterOptions {
        indent: config.format.indent.clone(),
        ..RewriterOptions::default()
    });
    let rewritten = rewriter.rewrite(&df);

    if write {
        write_file(path, &rewritten)?;
        for change in &outcome.changes {
            println!("applied {} to {}", change.transform, filename);
        }
        if outcome.changes.is_empty() {
            println!("No fixes applied to {}", filename);
        }
    } else if show_diff {
        print!("{}", unified_diff(&filename, &source, &rewritten));
    } else {
        print!("{}", rewritten);
    }

    Ok(0)
}

/// Rewrite one Dockerfile in canonical style.
pub fn fmt(config: &KeelConfig, path: &Path, write: bool, indent: Option<String>) -> Result<i32> {
    let source = read_file(path)?;
    let filename = path.display().to_string();

    let (df, parse_errors) = crate::parser::parse(&source);
    if !parse_errors.is_empty() {
        for err in &parse_errors {
            eprintln!("{}: {}", filename, err);
        }
        return Ok(1);
    }

    let rewriter = Rewriter::with_options(RewriterOptions {
        indent: indent.unwrap_or_else(|| config.format.indent.clone()),
        ..RewriterOptions::formatter()
    });
    let formatted = rewriter.rewrite(&df);

    if write {
        if formatted != source {
            write_file(path, &formatted)?;
            println!("formatted {}", filename);
        }
    } else {
        print!("{}", formatted);
    }

    Ok(0)
}

/// List all rules, or print details for one.
pub fn explain(rule_id: Option<&str>) -> Result<i32> {
    let registry = Registry::with_builtin_rules();

    match rule_id {
        None => {
            println!("{:<8} {:<13} {:<9} {}", "ID", "CATEGORY", "SEVERITY", "NAME");
            for rule in registry.all() {
                println!(
                    "{:<8} {:<13} {:<9} {}",
                    rule.id(),
                    rule.category().as_str(),
                    rule.severity().as_str(),
                    rule.name()
                );
            }
        }
        Some(id) => {
            let rule = registry
                .get(&id.to_uppercase())
                .ok_or_else(|| KeelError::UnknownRule(id.to_string()))?;
            println!("{} ({})", rule.id(), rule.name());
            println!("Category: {}", rule.category());
            println!("Severity: {}", rule.severity());
            println!();
            println!("{}", rule.description());
        }
    }

    Ok(0)
}

/// Write the default configuration scaffold.
pub fn init(force: bool) -> Result<i32> {
    let path = Path::new(".keel.yaml");
    if path.exists() && !force {
        eprintln!(".keel.yaml already exists (use --force to overwrite)");
        return Ok(1);
    }
    write_file(path, KeelConfig::default_yaml())?;
    println!("wrote {}", path.display());
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explain_lists_without_error() {
        assert_eq!(explain(None).unwrap(), 0);
    }

    #[test]
    fn explain_known_rule() {
        assert_eq!(explain(Some("sec001")).unwrap(), 0);
    }

    #[test]
    fn explain_unknown_rule_errors() {
        assert!(matches!(
            explain(Some("NOPE42")),
            Err(KeelError::UnknownRule(_))
        ));
    }

    #[test]
    fn fix_writes_transformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Dockerfile");
        std::fs::write(&path, "FROM alpine:3.18\nMAINTAINER x@y.z\nUSER app\n").unwrap();

        let code = fix(&KeelConfig::default(), &path, true, false, false, false).unwrap();
        assert_eq!(code, 0);

        let fixed = std::fs::read_to_string(&path).unwrap();
        assert!(fixed.contains("LABEL maintainer=x@y.z"));
        assert!(!fixed.contains("MAINTAINER"));
    }

    #[test]
    fn fmt_canonicalizes_keywords() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Dockerfile");
        std::fs::write(&path, "from alpine:3.18\nuser app\n").unwrap();

        let code = fmt(&KeelConfig::default(), &path, true, None).unwrap();
        assert_eq!(code, 0);

        let formatted = std::fs::read_to_string(&path).unwrap();
        assert!(formatted.starts_with("FROM alpine:3.18\n"));
        assert!(formatted.contains("USER app\n"));
    }

    #[test]
    fn lint_missing_file_is_nonzero() {
        let opts = LintOptions {
            paths: vec![PathBuf::from("/definitely/not/here/Dockerfile")],
            format: Format::Json,
            min_severity: None,
            enable: vec![],
            disable: vec![],
            parallel: false,
            workers: 0,
        };
        let code = lint(&KeelConfig::default(), opts).unwrap();
        assert_eq!(code, 1);
    }
}

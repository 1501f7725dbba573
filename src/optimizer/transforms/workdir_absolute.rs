//! workdir-absolute: resolve relative WORKDIR paths against the stage's
//! simulated working directory.

use crate::analyzer::Diagnostic;
use crate::optimizer::Transform;
use crate::parser::Dockerfile;

/// Lexically normalize an absolute path: collapse `//`, resolve `.` and `..`.
fn clean_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}

fn join_path(base: &str, rel: &str) -> String {
    let base = base.trim_end_matches('/');
    let base = if base.is_empty() { "/" } else { base };
    clean_path(&format!("{}/{}", base, rel))
}

pub struct WorkdirAbsolute;

impl Transform for WorkdirAbsolute {
    fn name(&self) -> &'static str {
        "workdir-absolute"
    }

    fn description(&self) -> &'static str {
        "Convert relative WORKDIR paths to absolute"
    }

    fn rules(&self) -> &'static [&'static str] {
        &["BP005"]
    }

    fn apply(&self, df: &mut Dockerfile, _diagnostics: &[Diagnostic]) -> bool {
        let mut changed = false;

        for stage in &mut df.stages {
            // Every stage starts at the root directory.
            let mut current = "/".to_string();

            for inst in &mut stage.instructions {
                let wd = match inst {
                    crate::parser::Instruction::Workdir(w) => w,
                    _ => continue,
                };

                let path = wd.path.clone();

                // Variable paths cannot be resolved; track best effort.
                if path.starts_with('$') || path.contains("${") {
                    if path.starts_with('/') {
                        current = path;
                    }
                    continue;
                }

                if path.starts_with('/') {
                    current = clean_path(&path);
                    continue;
                }

                let absolute = join_path(&current, &path);
                wd.path = absolute.clone();
                current = absolute;
                changed = true;
            }
        }

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn workdir_paths(df: &Dockerfile) -> Vec<&str> {
        df.stages[0]
            .instructions
            .iter()
            .filter_map(|i| i.as_workdir())
            .map(|w| w.path.as_str())
            .collect()
    }

    #[test]
    fn chain_of_relative_paths() {
        let (mut df, _) = parse("FROM a\nWORKDIR app\nWORKDIR src\nWORKDIR nested\n");
        assert!(WorkdirAbsolute.apply(&mut df, &[]));
        assert_eq!(workdir_paths(&df), vec!["/app", "/app/src", "/app/src/nested"]);
    }

    #[test]
    fn absolute_resets_base() {
        let (mut df, _) = parse("FROM a\nWORKDIR /srv\nWORKDIR data\n");
        assert!(WorkdirAbsolute.apply(&mut df, &[]));
        assert_eq!(workdir_paths(&df), vec!["/srv", "/srv/data"]);
    }

    #[test]
    fn dot_and_dotdot_resolved() {
        let (mut df, _) = parse("FROM a\nWORKDIR /srv/www\nWORKDIR ../logs\nWORKDIR ./current\n");
        assert!(WorkdirAbsolute.apply(&mut df, &[]));
        assert_eq!(workdir_paths(&df), vec!["/srv/www", "/srv/logs", "/srv/logs/current"]);
    }

    #[test]
    fn variables_skipped() {
        let (mut df, _) = parse("FROM a\nWORKDIR $HOME\nWORKDIR app\n");
        assert!(WorkdirAbsolute.apply(&mut df, &[]));
        // The variable path stays put; the relative path resolves from /.
        assert_eq!(workdir_paths(&df), vec!["$HOME", "/app"]);
    }

    #[test]
    fn already_absolute_is_no_change() {
        let (mut df, _) = parse("FROM a\nWORKDIR /app\nWORKDIR /app/src\n");
        assert!(!WorkdirAbsolute.apply(&mut df, &[]));
    }

    #[test]
    fn each_stage_restarts_at_root() {
        let (mut df, _) = parse("FROM a AS one\nWORKDIR app\n\nFROM b\nWORKDIR web\n");
        assert!(WorkdirAbsolute.apply(&mut df, &[]));
        let second: Vec<&str> = df.stages[1]
            .instructions
            .iter()
            .filter_map(|i| i.as_workdir())
            .map(|w| w.path.as_str())
            .collect();
        assert_eq!(second, vec!["/web"]);
    }

    #[test]
    fn clean_path_cases() {
        assert_eq!(clean_path("/a/b/../c"), "/a/c");
        assert_eq!(clean_path("/a/./b"), "/a/b");
        assert_eq!(clean_path("/.."), "/");
        assert_eq!(clean_path("//a//b"), "/a/b");
    }
}

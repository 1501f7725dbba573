//! add-cache-cleanup: append package manager cache cleanup to RUN commands.

use crate::analyzer::Diagnostic;
use crate::optimizer::Transform;
use crate::parser::Dockerfile;

const CLEANUPS: &[(&str, &str)] = &[
    ("apt-get install", " && rm -rf /var/lib/apt/lists/*"),
    ("apt install", " && rm -rf /var/lib/apt/lists/*"),
    ("yum install", " && yum clean all && rm -rf /var/cache/yum"),
    ("dnf install", " && dnf clean all"),
];

const EXISTING_CLEANUPS: &[&str] = &[
    "rm -rf /var/lib/apt/lists",
    "apt-get clean",
    "yum clean all",
    "dnf clean all",
];

fn add_cleanup(cmd: &str, changed: &mut bool) -> String {
    let mut cmd = cmd.to_string();

    // apk gets the flag form rather than a trailing cleanup command.
    if cmd.contains("apk add") && !cmd.contains("--no-cache") {
        cmd = cmd.replacen("apk add", "apk add --no-cache", 1);
        *changed = true;
    }

    for (detect, cleanup) in CLEANUPS {
        if cmd.contains(detect) {
            if EXISTING_CLEANUPS.iter().any(|c| cmd.contains(c)) {
                break;
            }
            cmd = format!("{}{}", cmd.trim_end(), cleanup);
            *changed = true;
            break;
        }
    }

    cmd
}

pub struct AddCacheCleanup;

impl Transform for AddCacheCleanup {
    fn name(&self) -> &'static str {
        "add-cache-cleanup"
    }

    fn description(&self) -> &'static str {
        "Add package manager cache cleanup to reduce image size"
    }

    fn rules(&self) -> &'static [&'static str] {
        &["PERF003"]
    }

    fn apply(&self, df: &mut Dockerfile, _diagnostics: &[Diagnostic]) -> bool {
        let mut changed = false;

        for stage in &mut df.stages {
            for run in stage.instructions.iter_mut().filter_map(|i| i.as_run_mut()) {
                if run.heredoc.is_some() || run.is_exec {
                    continue;
                }
                run.command = add_cleanup(&run.command, &mut changed);
            }
        }

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn apply(source: &str) -> (Dockerfile, bool) {
        let (mut df, _) = parse(source);
        let changed = AddCacheCleanup.apply(&mut df, &[]);
        (df, changed)
    }

    fn first_run(df: &Dockerfile) -> &str {
        &df.stages[0].instructions[0].as_run().unwrap().command
    }

    #[test]
    fn apk_gains_no_cache() {
        let (df, changed) = apply("FROM alpine\nRUN apk add curl\n");
        assert!(changed);
        assert_eq!(first_run(&df), "apk add --no-cache curl");
    }

    #[test]
    fn apt_gets_list_removal() {
        let (df, changed) = apply("FROM ubuntu\nRUN apt-get update && apt-get install -y curl\n");
        assert!(changed);
        assert_eq!(
            first_run(&df),
            "apt-get update && apt-get install -y curl && rm -rf /var/lib/apt/lists/*"
        );
    }

    #[test]
    fn yum_gets_clean_all() {
        let (df, changed) = apply("FROM centos\nRUN yum install -y httpd\n");
        assert!(changed);
        assert!(first_run(&df).ends_with("&& yum clean all && rm -rf /var/cache/yum"));
    }

    #[test]
    fn dnf_gets_clean_all() {
        let (df, changed) = apply("FROM fedora\nRUN dnf install -y nginx\n");
        assert!(changed);
        assert!(first_run(&df).ends_with("&& dnf clean all"));
    }

    #[test]
    fn existing_cleanup_untouched() {
        let src = "FROM ubuntu\nRUN apt-get install -y curl && rm -rf /var/lib/apt/lists/*\n";
        let (df, changed) = apply(src);
        assert!(!changed);
        assert_eq!(
            first_run(&df),
            "apt-get install -y curl && rm -rf /var/lib/apt/lists/*"
        );
    }

    #[test]
    fn exec_form_skipped() {
        let (_, changed) = apply("FROM ubuntu\nRUN [\"apt-get\", \"install\", \"-y\", \"curl\"]\n");
        assert!(!changed);
    }
}

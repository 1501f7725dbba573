//! remove-sudo: strip sudo from RUN commands where safe.

use crate::analyzer::Diagnostic;
use crate::optimizer::Transform;
use crate::parser::Dockerfile;
use regex::Regex;
use std::sync::LazyLock;

// sudo with flags that do not change the user is removable.
static SUDO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bsudo(\s+-[EHnPS])*\s+").unwrap());

// sudo -u switches user; that requires a USER instruction, not an auto-fix.
static SUDO_USER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bsudo\s+(-\w+\s+)*-u\s+").unwrap());

fn remove_sudo(cmd: &str, changed: &mut bool) -> String {
    if SUDO_USER.is_match(cmd) {
        return cmd.to_string();
    }

    if !SUDO.is_match(cmd) {
        return cmd.to_string();
    }

    let stripped = SUDO.replace_all(cmd, "");
    // Collapse any doubled spaces left behind.
    let cleaned = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned != cmd {
        *changed = true;
    }
    cleaned
}

pub struct RemoveSudo;

impl Transform for RemoveSudo {
    fn name(&self) -> &'static str {
        "remove-sudo"
    }

    fn description(&self) -> &'static str {
        "Remove sudo from RUN commands (unnecessary in Docker)"
    }

    fn rules(&self) -> &'static [&'static str] {
        &["SEC005"]
    }

    fn apply(&self, df: &mut Dockerfile, _diagnostics: &[Diagnostic]) -> bool {
        let mut changed = false;

        for stage in &mut df.stages {
            for run in stage.instructions.iter_mut().filter_map(|i| i.as_run_mut()) {
                if !run.is_exec && run.heredoc.is_none() {
                    run.command = remove_sudo(&run.command, &mut changed);
                }
                if let Some(heredoc) = &mut run.heredoc {
                    heredoc.content = remove_sudo(&heredoc.content, &mut changed);
                }
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
        let changed = RemoveSudo.apply(&mut df, &[]);
        (df, changed)
    }

    fn first_run(df: &Dockerfile) -> &str {
        &df.stages[0].instructions[0].as_run().unwrap().command
    }

    #[test]
    fn plain_sudo_removed() {
        let (df, changed) = apply("FROM a\nRUN sudo apt-get update\n");
        assert!(changed);
        assert_eq!(first_run(&df), "apt-get update");
    }

    #[test]
    fn sudo_with_safe_flags_removed() {
        let (df, changed) = apply("FROM a\nRUN sudo -E -n make install\n");
        assert!(changed);
        assert_eq!(first_run(&df), "make install");
    }

    #[test]
    fn sudo_mid_command_removed() {
        let (df, changed) = apply("FROM a\nRUN make && sudo make install\n");
        assert!(changed);
        assert_eq!(first_run(&df), "make && make install");
    }

    #[test]
    fn sudo_dash_u_preserved() {
        let (df, changed) = apply("FROM a\nRUN sudo -u appuser npm install\n");
        assert!(!changed);
        assert_eq!(first_run(&df), "sudo -u appuser npm install");
    }

    #[test]
    fn heredoc_body_rewritten() {
        let (df, changed) = apply("FROM a\nRUN <<EOF\nsudo apt-get update\nEOF\n");
        assert!(changed);
        let run = df.stages[0].instructions[0].as_run().unwrap();
        assert_eq!(run.heredoc.as_ref().unwrap().content, "apt-get update");
    }

    #[test]
    fn no_sudo_no_change() {
        let (_, changed) = apply("FROM a\nRUN apt-get update\n");
        assert!(!changed);
    }
}

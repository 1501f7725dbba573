//! add-no-install-recommends: slim down apt installs.

use crate::analyzer::Diagnostic;
use crate::optimizer::Transform;
use crate::parser::Dockerfile;

fn insert_flag(cmd: &str, changed: &mut bool) -> String {
    let mut cmd = cmd.to_string();

    if cmd.contains("--no-install-recommends") {
        return cmd;
    }

    if cmd.contains("apt-get install") {
        cmd = cmd.replacen(
            "apt-get install",
            "apt-get install --no-install-recommends",
            1,
        );
        *changed = true;
    } else if cmd.contains("apt install") {
        cmd = cmd.replacen("apt install", "apt install --no-install-recommends", 1);
        *changed = true;
    }

    cmd
}

pub struct AddNoInstallRecommends;

impl Transform for AddNoInstallRecommends {
    fn name(&self) -> &'static str {
        "add-no-install-recommends"
    }

    fn description(&self) -> &'static str {
        "Add --no-install-recommends to apt install to reduce image size"
    }

    fn rules(&self) -> &'static [&'static str] {
        &["PERF005"]
    }

    fn apply(&self, df: &mut Dockerfile, _diagnostics: &[Diagnostic]) -> bool {
        let mut changed = false;

        for stage in &mut df.stages {
            for run in stage.instructions.iter_mut().filter_map(|i| i.as_run_mut()) {
                if run.heredoc.is_some() || run.is_exec {
                    continue;
                }
                run.command = insert_flag(&run.command, &mut changed);
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
        let changed = AddNoInstallRecommends.apply(&mut df, &[]);
        (df, changed)
    }

    #[test]
    fn apt_get_install_gains_flag() {
        let (df, changed) = apply("FROM ubuntu\nRUN apt-get install -y curl\n");
        assert!(changed);
        assert_eq!(
            df.stages[0].instructions[0].as_run().unwrap().command,
            "apt-get install --no-install-recommends -y curl"
        );
    }

    #[test]
    fn apt_install_gains_flag() {
        let (df, changed) = apply("FROM ubuntu\nRUN apt install -y curl\n");
        assert!(changed);
        assert!(df.stages[0].instructions[0]
            .as_run()
            .unwrap()
            .command
            .contains("apt install --no-install-recommends"));
    }

    #[test]
    fn existing_flag_untouched() {
        let (_, changed) = apply("FROM ubuntu\nRUN apt-get install --no-install-recommends -y curl\n");
        assert!(!changed);
    }

    #[test]
    fn only_first_occurrence_replaced() {
        let (df, changed) =
            apply("FROM ubuntu\nRUN apt-get install -y a && apt-get install -y b\n");
        assert!(changed);
        let cmd = &df.stages[0].instructions[0].as_run().unwrap().command;
        assert_eq!(cmd.matches("--no-install-recommends").count(), 1);
    }
}

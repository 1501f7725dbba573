//! Rewriter: serialize an AST back to canonical Dockerfile text.
//!
//! Keywords come out uppercase, exec forms as JSON arrays, `&&` chains as
//! indented continuations, and MAINTAINER as its LABEL replacement.
//! Formatter mode additionally aligns multi-pair ENV/LABEL blocks.

use crate::parser::{
    AddInstruction, ArgInstruction, CmdInstruction, Comment, CopyInstruction, Dockerfile,
    EntrypointInstruction, EnvInstruction, ExposeInstruction, HealthcheckInstruction, Instruction,
    KeyValue, LabelInstruction, MaintainerInstruction, OnbuildInstruction, RunInstruction,
    ShellInstruction, Stage, StopsignalInstruction, UserInstruction, VolumeInstruction,
    WorkdirInstruction,
};

/// Output options.
#[derive(Debug, Clone)]
pub struct RewriterOptions {
    /// Continuation indent for wrapped commands and aligned pairs.
    pub indent: String,
    /// Align multi-pair ENV/LABEL with backslash continuations.
    pub align_multi_value: bool,
    /// Collapse runs of blank lines down to one.
    pub collapse_blank_lines: bool,
}

impl Default for RewriterOptions {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
            align_multi_value: false,
            collapse_blank_lines: true,
        }
    }
}

impl RewriterOptions {
    /// Options for `fmt`: everything the default does plus pair alignment.
    pub fn formatter() -> Self {
        Self {
            align_multi_value: true,
            ..Self::default()
        }
    }
}

/// Serializes Dockerfile ASTs to text.
#[derive(Default)]
pub struct Rewriter {
    opts: RewriterOptions,
}

impl Rewriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(opts: RewriterOptions) -> Self {
        Self { opts }
    }

    pub fn rewrite(&self, df: &Dockerfile) -> String {
        let mut out = String::new();

        if df.escape != '\\' && df.escape != '\0' {
            out.push_str(&format!("# escape={}\n", df.escape));
        }

        for comment in &df.comments {
            self.write_comment(&mut out, comment);
        }

        for (i, stage) in df.stages.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            self.write_stage(&mut out, stage);
        }

        if self.opts.collapse_blank_lines {
            out = collapse_blank_lines(&out);
        }
        out
    }

    fn write_comment(&self, out: &mut String, comment: &Comment) {
        out.push_str(&comment.text);
        out.push('\n');
    }

    fn write_stage(&self, out: &mut String, stage: &Stage) {
        for comment in &stage.comments {
            self.write_comment(out, comment);
        }

        self.write_from(out, stage);

        for inst in &stage.instructions {
            self.write_instruction(out, inst);
        }
    }

    fn write_from(&self, out: &mut String, stage: &Stage) {
        let from = &stage.from;
        out.push_str("FROM ");

        if let Some(platform) = &from.platform {
            out.push_str("--platform=");
            out.push_str(platform);
            out.push(' ');
        }

        out.push_str(&from.image);
        if let Some(tag) = &from.tag {
            out.push(':');
            out.push_str(tag);
        }
        if let Some(digest) = &from.digest {
            out.push('@');
            out.push_str(digest);
        }
        if let Some(name) = &from.as_name {
            out.push_str(" AS ");
            out.push_str(name);
        }
        out.push('\n');
    }

    fn write_instruction(&self, out: &mut String, inst: &Instruction) {
        match inst {
            Instruction::From(_) => {
                // A nested FROM only appears under ONBUILD; stages carry
                // their own FROM.
            }
            Instruction::Run(run) => self.write_run(out, run),
            Instruction::Cmd(cmd) => self.write_cmd(out, cmd),
            Instruction::Entrypoint(ep) => self.write_entrypoint(out, ep),
            Instruction::Copy(copy) => self.write_copy(out, copy),
            Instruction::Add(add) => self.write_add(out, add),
            Instruction::Env(env) => self.write_env(out, env),
            Instruction::Arg(arg) => self.write_arg(out, arg),
            Instruction::Label(label) => self.write_label(out, label),
            Instruction::Expose(expose) => self.write_expose(out, expose),
            Instruction::Volume(vol) => self.write_volume(out, vol),
            Instruction::User(user) => self.write_user(out, user),
            Instruction::Workdir(wd) => self.write_workdir(out, wd),
            Instruction::Shell(shell) => self.write_shell(out, shell),
            Instruction::Healthcheck(hc) => self.write_healthcheck(out, hc),
            Instruction::Stopsignal(ss) => self.write_stopsignal(out, ss),
            Instruction::Onbuild(ob) => self.write_onbuild(out, ob),
            Instruction::Maintainer(m) => self.write_maintainer(out, m),
        }
    }

    fn write_run(&self, out: &mut String, run: &RunInstruction) {
        out.push_str("RUN ");

        if let Some(mount) = &run.mount {
            out.push_str("--mount=");
            out.push_str(mount);
            out.push(' ');
        }
        if let Some(network) = &run.network {
            out.push_str("--network=");
            out.push_str(network);
            out.push(' ');
        }
        if let Some(security) = &run.security {
            out.push_str("--security=");
            out.push_str(security);
            out.push(' ');
        }

        if let Some(heredoc) = &run.heredoc {
            out.push_str("<<");
            if heredoc.strip_tabs {
                out.push('-');
            }
            out.push_str(&heredoc.delimiter);
            out.push('\n');
            out.push_str(&heredoc.content);
            out.push_str(&heredoc.delimiter);
        } else if run.is_exec {
            self.write_exec_form(out, &run.arguments);
        } else {
            self.write_shell_command(out, &run.command);
        }

        out.push('\n');
    }

    fn write_shell_command(&self, out: &mut String, command: &str) {
        let command = command.trim();
        if !command.contains(" && ") {
            out.push_str(command);
            return;
        }

        for (i, part) in command.split(" && ").enumerate() {
            let part = part.trim().trim_end_matches('\\').trim_end();
            if i == 0 {
                out.push_str(part);
            } else {
                out.push_str(" \\\n");
                out.push_str(&self.opts.indent);
                out.push_str("&& ");
                out.push_str(part);
            }
        }
    }

    fn write_cmd(&self, out: &mut String, cmd: &CmdInstruction) {
        out.push_str("CMD ");
        if cmd.is_exec {
            self.write_exec_form(out, &cmd.arguments);
        } else {
            out.push_str(&cmd.command);
        }
        out.push('\n');
    }

    fn write_entrypoint(&self, out: &mut String, ep: &EntrypointInstruction) {
        out.push_str("ENTRYPOINT ");
        if ep.is_exec {
            self.write_exec_form(out, &ep.arguments);
        } else {
            out.push_str(&ep.command);
        }
        out.push('\n');
    }

    fn write_copy(&self, out: &mut String, copy: &CopyInstruction) {
        out.push_str("COPY ");

        if let Some(from) = &copy.from {
            out.push_str("--from=");
            out.push_str(from);
            out.push(' ');
        }
        if let Some(chown) = &copy.chown {
            out.push_str("--chown=");
            out.push_str(chown);
            out.push(' ');
        }
        if let Some(chmod) = &copy.chmod {
            out.push_str("--chmod=");
            out.push_str(chmod);
            out.push(' ');
        }
        if copy.link {
            out.push_str("--link ");
        }

        for src in &copy.sources {
            out.push_str(&quote_if_needed(src));
            out.push(' ');
        }
        out.push_str(&quote_if_needed(&copy.destination));
        out.push('\n');
    }

    fn write_add(&self, out: &mut String, add: &AddInstruction) {
        out.push_str("ADD ");

        if let Some(chown) = &add.chown {
            out.push_str("--chown=");
            out.push_str(chown);
            out.push(' ');
        }
        if let Some(chmod) = &add.chmod {
            out.push_str("--chmod=");
            out.push_str(chmod);
            out.push(' ');
        }
        if let Some(checksum) = &add.checksum {
            out.push_str("--checksum=");
            out.push_str(checksum);
            out.push(' ');
        }

        for src in &add.sources {
            out.push_str(&quote_if_needed(src));
            out.push(' ');
        }
        out.push_str(&quote_if_needed(&add.destination));
        out.push('\n');
    }

    fn write_pairs(&self, out: &mut String, keyword: &str, pairs: &[KeyValue]) {
        out.push_str(keyword);
        out.push(' ');

        if !self.opts.align_multi_value || pairs.len() <= 1 {
            for (i, kv) in pairs.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                out.push_str(&quote_if_needed(&kv.key));
                out.push('=');
                out.push_str(&quote_if_needed(&kv.value));
            }
            out.push('\n');
            return;
        }

        let max_key = pairs
            .iter()
            .map(|kv| quote_if_needed(&kv.key).len())
            .max()
            .unwrap_or(0);

        for (i, kv) in pairs.iter().enumerate() {
            if i > 0 {
                out.push_str(" \\\n");
                out.push_str(&self.opts.indent);
            }
            let key = quote_if_needed(&kv.key);
            out.push_str(&key);
            out.push_str(&" ".repeat(max_key - key.len()));
            out.push('=');
            out.push_str(&quote_if_needed(&kv.value));
        }
        out.push('\n');
    }

    fn write_env(&self, out: &mut String, env: &EnvInstruction) {
        self.write_pairs(out, "ENV", &env.variables);
    }

    fn write_label(&self, out: &mut String, label: &LabelInstruction) {
        self.write_pairs(out, "LABEL", &label.labels);
    }

    fn write_arg(&self, out: &mut String, arg: &ArgInstruction) {
        out.push_str("ARG ");
        out.push_str(&arg.name);
        if let Some(default) = &arg.default {
            out.push('=');
            out.push_str(&quote_if_needed(default));
        }
        out.push('\n');
    }

    fn write_expose(&self, out: &mut String, expose: &ExposeInstruction) {
        out.push_str("EXPOSE ");
        for (i, port) in expose.ports.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(&port.port);
            if let Some(protocol) = &port.protocol {
                out.push('/');
                out.push_str(protocol);
            }
        }
        out.push('\n');
    }

    fn write_volume(&self, out: &mut String, vol: &VolumeInstruction) {
        out.push_str("VOLUME ");
        match vol.paths.as_slice() {
            [single] => out.push_str(&quote_if_needed(single)),
            paths => self.write_exec_form(out, paths),
        }
        out.push('\n');
    }

    fn write_user(&self, out: &mut String, user: &UserInstruction) {
        out.push_str("USER ");
        out.push_str(&user.user);
        if let Some(group) = &user.group {
            out.push(':');
            out.push_str(group);
        }
        out.push('\n');
    }

    fn write_workdir(&self, out: &mut String, wd: &WorkdirInstruction) {
        out.push_str("WORKDIR ");
        out.push_str(&wd.path);
        out.push('\n');
    }

    fn write_shell(&self, out: &mut String, shell: &ShellInstruction) {
        out.push_str("SHELL ");
        self.write_exec_form(out, &shell.shell);
        out.push('\n');
    }

    fn write_healthcheck(&self, out: &mut String, hc: &HealthcheckInstruction) {
        out.push_str("HEALTHCHECK ");

        if hc.none {
            out.push_str("NONE\n");
            return;
        }

        if let Some(interval) = &hc.interval {
            out.push_str("--interval=");
            out.push_str(interval);
            out.push(' ');
        }
        if let Some(timeout) = &hc.timeout {
            out.push_str("--timeout=");
            out.push_str(timeout);
            out.push(' ');
        }
        if let Some(start_period) = &hc.start_period {
            out.push_str("--start-period=");
            out.push_str(start_period);
            out.push(' ');
        }
        if let Some(retries) = &hc.retries {
            out.push_str("--retries=");
            out.push_str(retries);
            out.push(' ');
        }

        out.push_str("CMD ");
        if hc.is_exec {
            self.write_exec_form(out, &hc.arguments);
        } else {
            out.push_str(&hc.command);
        }
        out.push('\n');
    }

    fn write_stopsignal(&self, out: &mut String, ss: &StopsignalInstruction) {
        out.push_str("STOPSIGNAL ");
        out.push_str(&ss.signal);
        out.push('\n');
    }

    fn write_onbuild(&self, out: &mut String, ob: &OnbuildInstruction) {
        out.push_str("ONBUILD ");
        if let Some(inner) = &ob.instruction {
            let mut nested = String::new();
            self.write_instruction(&mut nested, inner);
            out.push_str(nested.trim_end_matches('\n'));
        }
        out.push('\n');
    }

    fn write_maintainer(&self, out: &mut String, m: &MaintainerInstruction) {
        // MAINTAINER is deprecated; always emit the LABEL replacement.
        let pair = [KeyValue::new("maintainer", m.maintainer.clone())];
        self.write_pairs(out, "LABEL", &pair);
    }

    fn write_exec_form(&self, out: &mut String, args: &[String]) {
        out.push('[');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push('"');
            out.push_str(&escape_string(arg));
            out.push('"');
        }
        out.push(']');
    }
}

/// Quote a value when it contains whitespace or characters that would
/// confuse re-parsing.
fn quote_if_needed(s: &str) -> String {
    if s.is_empty() {
        return "\"\"".to_string();
    }

    let needs_quotes = s
        .chars()
        .any(|c| matches!(c, ' ' | '\t' | '"' | '\'' | '\\' | '$' | '='));
    if !needs_quotes {
        return s.to_string();
    }

    format!("\"{}\"", escape_string(s))
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

fn collapse_blank_lines(s: &str) -> String {
    let mut out = Vec::new();
    let mut blanks = 0;
    for line in s.split('\n') {
        if line.trim().is_empty() {
            blanks += 1;
            if blanks <= 1 {
                out.push(line);
            }
        } else {
            blanks = 0;
            out.push(line);
        }
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn rewrite(source: &str) -> String {
        let (df, _) = parse(source);
        Rewriter::new().rewrite(&df)
    }

    #[test]
    fn from_line_rendering() {
        assert_eq!(
            rewrite("FROM --platform=linux/arm64 ubuntu:22.04@sha256:abc AS base\n"),
            "FROM --platform=linux/arm64 ubuntu:22.04@sha256:abc AS base\n"
        );
    }

    #[test]
    fn keywords_are_uppercased() {
        let out = rewrite("from alpine:3.18\nrun echo hi\nworkdir /app\n");
        assert!(out.starts_with("FROM alpine:3.18\n"));
        assert!(out.contains("RUN echo hi\n"));
        assert!(out.contains("WORKDIR /app\n"));
    }

    #[test]
    fn and_chains_get_continuations() {
        let out = rewrite("FROM a\nRUN apt-get update && apt-get install -y curl\n");
        assert!(out.contains("RUN apt-get update \\\n    && apt-get install -y curl\n"));
    }

    #[test]
    fn exec_form_is_json() {
        let out = rewrite("FROM a\nCMD [\"echo\", \"a b\"]\n");
        assert!(out.contains("CMD [\"echo\", \"a b\"]\n"));
    }

    #[test]
    fn exec_form_escapes_specials() {
        let (df, _) = parse("FROM a\n");
        let mut df = df;
        df.stages[0].instructions.push(Instruction::Cmd(CmdInstruction {
            arguments: vec!["say \"hi\"".to_string()],
            is_exec: true,
            ..Default::default()
        }));
        let out = Rewriter::new().rewrite(&df);
        assert!(out.contains(r#"CMD ["say \"hi\""]"#));
    }

    #[test]
    fn maintainer_always_rewritten_to_label() {
        let out = rewrite("FROM a\nMAINTAINER Jan Novak <jan@example.com>\n");
        assert!(out.contains("LABEL maintainer=\"Jan Novak <jan@example.com>\"\n"));
        assert!(!out.contains("MAINTAINER"));

        let out = rewrite("FROM a\nMAINTAINER x@y.z\n");
        assert!(out.contains("LABEL maintainer=x@y.z\n"));
    }

    #[test]
    fn volume_single_and_multi() {
        let out = rewrite("FROM a\nVOLUME /data\nVOLUME [\"/a\", \"/b\"]\n");
        assert!(out.contains("VOLUME /data\n"));
        assert!(out.contains("VOLUME [\"/a\", \"/b\"]\n"));
    }

    #[test]
    fn blank_line_between_stages() {
        let out = rewrite("FROM a AS one\nRUN x\nFROM b\nRUN y\n");
        assert!(out.contains("RUN x\n\nFROM b\n"));
    }

    #[test]
    fn escape_directive_preserved() {
        let out = rewrite("# escape=`\nFROM a\n");
        assert!(out.starts_with("# escape=`\n"));
    }

    #[test]
    fn env_values_with_spaces_quoted() {
        let out = rewrite("FROM a\nENV GREETING=\"hello world\"\n");
        assert!(out.contains("ENV GREETING=\"hello world\"\n"));
    }

    #[test]
    fn formatter_mode_aligns_pairs() {
        let (df, _) = parse("FROM a\nENV A=1 LONG_NAME=2\n");
        let out = Rewriter::with_options(RewriterOptions::formatter()).rewrite(&df);
        assert!(out.contains("ENV A        =1 \\\n    LONG_NAME=2\n"));
    }

    #[test]
    fn default_mode_keeps_pairs_inline() {
        let out = rewrite("FROM a\nENV A=1 LONG_NAME=2\n");
        assert!(out.contains("ENV A=1 LONG_NAME=2\n"));
    }

    #[test]
    fn healthcheck_rendering() {
        let out = rewrite("FROM a\nHEALTHCHECK --interval=30s CMD curl -f http://localhost/\n");
        assert!(out.contains("HEALTHCHECK --interval=30s CMD curl -f http://localhost/\n"));
        let out = rewrite("FROM a\nHEALTHCHECK NONE\n");
        assert!(out.contains("HEALTHCHECK NONE\n"));
    }

    #[test]
    fn onbuild_nested_rendering() {
        let out = rewrite("FROM a\nONBUILD COPY . /src\n");
        assert!(out.contains("ONBUILD COPY . /src\n"));
    }

    #[test]
    fn heredoc_preserved() {
        let out = rewrite("FROM a\nRUN <<EOF\napt-get update\nEOF\n");
        assert!(out.contains("RUN <<EOF\napt-get update\nEOF\n"));
    }

    #[test]
    fn comments_come_through() {
        let out = rewrite("# top comment\nFROM a\n# inner\nRUN x\n");
        assert!(out.contains("# top comment\n"));
        assert!(out.contains("# inner\n"));
    }

    #[test]
    fn rewrite_is_idempotent_on_canonical_output() {
        let sources = [
            "FROM golang:1.21 AS build\nRUN go build -o /app ./... && ls\n\nFROM alpine:3.18\nCOPY --from=build /app /app\nUSER app\nCMD [\"/app\"]\n",
            "from ubuntu\nmaintainer x@y.z\nrun apt-get update && apt-get install -y curl\nenv PATH=$PATH:/opt/bin\n",
            "# escape=`\nFROM windows/servercore\nRUN dir\n",
            "FROM a\nRUN <<EOF\necho one\necho two\nEOF\nEXPOSE 80 443/tcp\nVOLUME [\"/a\", \"/b\"]\n",
        ];
        for source in sources {
            let first = rewrite(source);
            let second = rewrite(&first);
            assert_eq!(first, second, "not idempotent for {:?}", source);
        }
    }
}

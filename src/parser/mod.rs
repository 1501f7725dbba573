//! Dockerfile parser: token stream to typed AST.
//!
//! Parse errors never abort the whole parse; the parser records them and
//! resumes at the next line that starts with an instruction keyword.

pub mod ast;

pub use ast::*;

use crate::lexer::{self, Position, Token, TokenKind};
use std::fmt;

/// A recoverable parsing error with its source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub pos: Position,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.pos)
    }
}

impl std::error::Error for ParseError {}

/// Parse Dockerfile source into an AST plus any recoverable errors.
pub fn parse(source: &str) -> (Dockerfile, Vec<ParseError>) {
    let tokens = lexer::tokenize(source);
    Parser::new(tokens).parse_dockerfile()
}

/// Token-stream parser with one-token lookahead.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<ParseError>,
    escape: char,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        let tokens = if tokens.is_empty() {
            vec![Token::eof(Position::default())]
        } else {
            tokens
        };
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
            escape: '\\',
        }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn kind(&self) -> TokenKind {
        self.current().kind
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn at_line_end(&self) -> bool {
        matches!(self.kind(), TokenKind::Newline | TokenKind::Eof)
    }

    fn consume_newline(&mut self) {
        if self.kind() == TokenKind::Newline {
            self.advance();
        }
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(ParseError {
            message: message.into(),
            pos: self.current().start,
        });
    }

    /// Skip to the next line that begins with an instruction keyword.
    fn skip_to_next_instruction(&mut self) {
        while self.kind() != TokenKind::Eof {
            if self.kind() == TokenKind::Newline {
                self.advance();
                if self.current().is_instruction() {
                    return;
                }
            } else {
                self.advance();
            }
        }
    }

    fn take_comments_and_newlines(&mut self) -> Vec<Comment> {
        let mut comments = Vec::new();
        loop {
            match self.kind() {
                TokenKind::Comment => {
                    let tok = self.current();
                    comments.push(Comment {
                        text: tok.literal.clone(),
                        span: Span::new(tok.start, tok.end),
                    });
                    self.advance();
                }
                TokenKind::Newline => self.advance(),
                _ => break,
            }
        }
        comments
    }

    /// Parse the entire token stream into a Dockerfile.
    pub fn parse_dockerfile(mut self) -> (Dockerfile, Vec<ParseError>) {
        let mut df = Dockerfile {
            escape: '\\',
            span: Span::new(self.tokens[0].start, self.tokens[self.tokens.len() - 1].end),
            ..Default::default()
        };

        if self.kind() == TokenKind::EscapeDirective {
            if let Some(idx) = self.current().literal.find('=') {
                let rest = self.current().literal[idx + 1..].trim();
                if let Some(c) = rest.chars().next() {
                    df.escape = c;
                    self.escape = c;
                }
            }
            self.advance();
        }

        df.comments = self.take_comments_and_newlines();

        while self.kind() != TokenKind::Eof {
            match self.kind() {
                TokenKind::From => {
                    let stage = self.parse_stage();
                    df.stages.push(stage);
                }
                TokenKind::Comment => {
                    let tok = self.current();
                    df.comments.push(Comment {
                        text: tok.literal.clone(),
                        span: Span::new(tok.start, tok.end),
                    });
                    self.advance();
                }
                TokenKind::Newline => self.advance(),
                _ => {
                    self.error("instruction outside of build stage");
                    self.skip_to_next_instruction();
                }
            }
        }

        (df, self.errors)
    }

    fn parse_stage(&mut self) -> Stage {
        let start = self.current().start;
        let from = self.parse_from();
        let name = from.as_name.clone();

        let mut stage = Stage {
            name,
            from,
            instructions: Vec::new(),
            comments: Vec::new(),
            span: Span::new(start, start),
        };

        while !matches!(self.kind(), TokenKind::Eof | TokenKind::From) {
            let comments = self.take_comments_and_newlines();
            stage.comments.extend(comments);

            if matches!(self.kind(), TokenKind::Eof | TokenKind::From) {
                break;
            }

            if let Some(inst) = self.parse_instruction() {
                stage.instructions.push(inst);
            }
        }

        stage.span.end = stage
            .instructions
            .last()
            .map(|i| i.end())
            .unwrap_or(stage.from.span.end);
        stage
    }

    fn parse_instruction(&mut self) -> Option<Instruction> {
        match self.kind() {
            TokenKind::From => Some(Instruction::From(self.parse_from())),
            TokenKind::Run => Some(Instruction::Run(self.parse_run())),
            TokenKind::Cmd => Some(Instruction::Cmd(self.parse_cmd())),
            TokenKind::Entrypoint => Some(Instruction::Entrypoint(self.parse_entrypoint())),
            TokenKind::Copy => Some(Instruction::Copy(self.parse_copy())),
            TokenKind::Add => Some(Instruction::Add(self.parse_add())),
            TokenKind::Env => Some(Instruction::Env(self.parse_env())),
            TokenKind::Arg => Some(Instruction::Arg(self.parse_arg())),
            TokenKind::Label => Some(Instruction::Label(self.parse_label())),
            TokenKind::Expose => Some(Instruction::Expose(self.parse_expose())),
            TokenKind::Volume => Some(Instruction::Volume(self.parse_volume())),
            TokenKind::User => Some(Instruction::User(self.parse_user())),
            TokenKind::Workdir => Some(Instruction::Workdir(self.parse_workdir())),
            TokenKind::Shell => Some(Instruction::Shell(self.parse_shell())),
            TokenKind::Healthcheck => Some(Instruction::Healthcheck(self.parse_healthcheck())),
            TokenKind::Stopsignal => Some(Instruction::Stopsignal(self.parse_stopsignal())),
            TokenKind::Onbuild => Some(Instruction::Onbuild(self.parse_onbuild())),
            TokenKind::Maintainer => Some(Instruction::Maintainer(self.parse_maintainer())),
            other => {
                self.error(format!("unexpected token: {}", other));
                self.skip_to_next_instruction();
                None
            }
        }
    }

    /// Collect the rest of the line as a command string. A single space is
    /// inserted between tokens only where the source had whitespace between
    /// them, so `a&&b` and `a && b` both render faithfully.
    fn collect_rest_of_line(&mut self) -> String {
        let mut out = String::new();
        let mut last_end: Option<usize> = None;
        while !self.at_line_end() {
            let tok = self.current();
            if let Some(end) = last_end {
                if tok.start.offset > end {
                    out.push(' ');
                }
            }
            out.push_str(&tok.literal);
            last_end = Some(tok.end.offset);
            self.advance();
        }
        out
    }

    /// Collect a value that may span several directly adjacent tokens, e.g.
    /// `$PATH:/usr/local/bin` or `v1.2-rc@sha`. Stops at the first gap.
    fn collect_contiguous_value(&mut self) -> String {
        let mut out = String::new();
        let mut last_end: Option<usize> = None;
        while !self.at_line_end() {
            let tok = self.current();
            if let Some(end) = last_end {
                if tok.start.offset > end {
                    break;
                }
            }
            match tok.kind {
                TokenKind::Word
                | TokenKind::String
                | TokenKind::Variable
                | TokenKind::Colon
                | TokenKind::Equals
                | TokenKind::At
                | TokenKind::Comma => {
                    out.push_str(&tok.literal);
                    last_end = Some(tok.end.offset);
                    self.advance();
                }
                _ => break,
            }
        }
        self.unquote(&out)
    }

    /// Strip matching surrounding quotes and unescape the quote and escape
    /// characters inside.
    fn unquote(&self, s: &str) -> String {
        let mut chars = s.chars();
        let first = chars.next();
        let quote = match first {
            Some(q @ ('"' | '\'')) if s.len() >= 2 && s.ends_with(q) => q,
            _ => return s.to_string(),
        };
        let inner = &s[1..s.len() - 1];
        let mut out = String::with_capacity(inner.len());
        let mut iter = inner.chars().peekable();
        while let Some(c) = iter.next() {
            if c == self.escape {
                match iter.peek() {
                    Some(&n) if n == quote || n == self.escape => {
                        out.push(n);
                        iter.next();
                        continue;
                    }
                    _ => {}
                }
            }
            out.push(c);
        }
        out
    }

    fn drain_line(&mut self) {
        while !self.at_line_end() {
            self.advance();
        }
    }

    /// End the instruction: record the end position and consume the newline.
    fn finish_line(&mut self, span: &mut Span) {
        span.end = self.current().start;
        self.consume_newline();
    }

    fn parse_from(&mut self) -> FromInstruction {
        let mut inst = FromInstruction {
            span: Span::new(self.current().start, self.current().start),
            ..Default::default()
        };
        let start_idx = self.pos;
        self.advance(); // FROM

        if self.kind() == TokenKind::Flag {
            if let Some(value) = self.current().literal.strip_prefix("--platform=") {
                inst.platform = Some(value.to_string());
            }
            self.advance();
        }

        while !self.at_line_end() {
            match self.kind() {
                TokenKind::Word => {
                    let word = self.current().literal.clone();
                    if word.eq_ignore_ascii_case("AS") {
                        self.advance();
                        if self.kind() == TokenKind::Word {
                            inst.as_name = Some(self.current().literal.clone());
                            self.advance();
                        }
                    } else if inst.image.is_empty() {
                        inst.image = word;
                        self.advance();
                    } else {
                        self.advance();
                    }
                }
                TokenKind::Colon => {
                    self.advance();
                    if self.kind() == TokenKind::Word {
                        inst.tag = Some(self.current().literal.clone());
                        self.advance();
                    }
                }
                TokenKind::At => {
                    self.advance();
                    if self.kind() == TokenKind::Word {
                        let mut digest = self.current().literal.clone();
                        self.advance();
                        // Digest references are algo:hex; stitch the two
                        // halves back together across the colon token.
                        if self.kind() == TokenKind::Colon {
                            self.advance();
                            if self.kind() == TokenKind::Word {
                                digest.push(':');
                                digest.push_str(&self.current().literal);
                                self.advance();
                            }
                        }
                        inst.digest = Some(digest);
                    }
                }
                TokenKind::Variable => {
                    if inst.image.is_empty() {
                        inst.image = self.current().literal.clone();
                    }
                    self.advance();
                }
                _ => self.advance(),
            }
        }

        let parts: Vec<&str> = self.tokens[start_idx..self.pos]
            .iter()
            .filter(|t| t.kind != TokenKind::Newline)
            .map(|t| t.literal.as_str())
            .collect();
        inst.raw = Some(parts.join(" "));

        self.finish_line(&mut inst.span);
        inst
    }

    fn parse_run(&mut self) -> RunInstruction {
        let mut inst = RunInstruction {
            span: Span::new(self.current().start, self.current().start),
            ..Default::default()
        };
        self.advance(); // RUN

        while self.kind() == TokenKind::Flag {
            let flag = self.current().literal.clone();
            if let Some(v) = flag.strip_prefix("--mount=") {
                inst.mount = Some(v.to_string());
            } else if let Some(v) = flag.strip_prefix("--network=") {
                inst.network = Some(v.to_string());
            } else if let Some(v) = flag.strip_prefix("--security=") {
                inst.security = Some(v.to_string());
            }
            self.advance();
        }

        if self.kind() == TokenKind::Heredoc {
            inst.heredoc = Some(parse_heredoc_literal(&self.current().literal));
            self.advance();
        } else if self.kind() == TokenKind::LeftBracket {
            inst.is_exec = true;
            inst.arguments = self.parse_exec_form();
            self.drain_line();
        } else {
            inst.command = self.collect_rest_of_line();
        }

        self.finish_line(&mut inst.span);
        inst
    }

    fn parse_exec_form(&mut self) -> Vec<String> {
        let mut args = Vec::new();
        self.advance(); // [

        while !matches!(self.kind(), TokenKind::RightBracket | TokenKind::Eof) {
            if self.kind() == TokenKind::String {
                let lit = self.current().literal.clone();
                args.push(self.unquote(&lit));
            }
            self.advance();
        }
        if self.kind() == TokenKind::RightBracket {
            self.advance();
        }
        args
    }

    fn parse_cmd(&mut self) -> CmdInstruction {
        let mut inst = CmdInstruction {
            span: Span::new(self.current().start, self.current().start),
            ..Default::default()
        };
        self.advance(); // CMD

        if self.kind() == TokenKind::LeftBracket {
            inst.is_exec = true;
            inst.arguments = self.parse_exec_form();
            self.drain_line();
        } else {
            inst.command = self.collect_rest_of_line();
        }

        self.finish_line(&mut inst.span);
        inst
    }

    fn parse_entrypoint(&mut self) -> EntrypointInstruction {
        let mut inst = EntrypointInstruction {
            span: Span::new(self.current().start, self.current().start),
            ..Default::default()
        };
        self.advance(); // ENTRYPOINT

        if self.kind() == TokenKind::LeftBracket {
            inst.is_exec = true;
            inst.arguments = self.parse_exec_form();
            self.drain_line();
        } else {
            inst.command = self.collect_rest_of_line();
        }

        self.finish_line(&mut inst.span);
        inst
    }

    fn parse_copy(&mut self) -> CopyInstruction {
        let mut inst = CopyInstruction {
            span: Span::new(self.current().start, self.current().start),
            ..Default::default()
        };
        self.advance(); // COPY

        while self.kind() == TokenKind::Flag {
            let flag = self.current().literal.clone();
            if let Some(v) = flag.strip_prefix("--from=") {
                inst.from = Some(v.to_string());
            } else if let Some(v) = flag.strip_prefix("--chown=") {
                inst.chown = Some(v.to_string());
            } else if let Some(v) = flag.strip_prefix("--chmod=") {
                inst.chmod = Some(v.to_string());
            } else if flag == "--link" {
                inst.link = true;
            }
            self.advance();
        }

        let mut paths = self.parse_path_list();
        if let Some(dest) = paths.pop() {
            inst.destination = dest;
            inst.sources = paths;
        }

        self.finish_line(&mut inst.span);
        inst
    }

    fn parse_add(&mut self) -> AddInstruction {
        let mut inst = AddInstruction {
            span: Span::new(self.current().start, self.current().start),
            ..Default::default()
        };
        self.advance(); // ADD

        while self.kind() == TokenKind::Flag {
            let flag = self.current().literal.clone();
            if let Some(v) = flag.strip_prefix("--chown=") {
                inst.chown = Some(v.to_string());
            } else if let Some(v) = flag.strip_prefix("--chmod=") {
                inst.chmod = Some(v.to_string());
            } else if let Some(v) = flag.strip_prefix("--checksum=") {
                inst.checksum = Some(v.to_string());
            }
            self.advance();
        }

        let mut paths = self.parse_path_list();
        if let Some(dest) = paths.pop() {
            inst.destination = dest;
            inst.sources = paths;
        }

        self.finish_line(&mut inst.span);
        inst
    }

    /// Exec-form array or whitespace-separated path words until end of line.
    fn parse_path_list(&mut self) -> Vec<String> {
        if self.kind() == TokenKind::LeftBracket {
            let paths = self.parse_exec_form();
            self.drain_line();
            return paths;
        }

        // URLs lex as several adjacent tokens (`https`, `:`, `//host/x`);
        // contiguous collection reassembles each path.
        let mut paths = Vec::new();
        while !self.at_line_end() {
            match self.kind() {
                TokenKind::Word | TokenKind::String | TokenKind::Variable => {
                    paths.push(self.collect_contiguous_value());
                }
                _ => self.advance(),
            }
        }
        paths
    }

    fn parse_env(&mut self) -> EnvInstruction {
        let mut inst = EnvInstruction {
            span: Span::new(self.current().start, self.current().start),
            ..Default::default()
        };
        self.advance(); // ENV

        while !self.at_line_end() {
            if self.kind() == TokenKind::Word {
                let key = self.current().literal.clone();
                self.advance();

                if self.kind() == TokenKind::Equals {
                    self.advance();
                    let value = if self.at_line_end() {
                        String::new()
                    } else {
                        self.collect_contiguous_value()
                    };
                    inst.variables.push(KeyValue::new(key, value));
                } else {
                    // Legacy `ENV KEY value…`: the rest of the line is the
                    // value and the instruction holds exactly one pair.
                    let raw = self.collect_rest_of_line();
                    let value = self.unquote(raw.trim());
                    inst.variables.push(KeyValue::new(key, value));
                    break;
                }
            } else {
                self.advance();
            }
        }

        self.finish_line(&mut inst.span);
        inst
    }

    fn parse_arg(&mut self) -> ArgInstruction {
        let mut inst = ArgInstruction {
            span: Span::new(self.current().start, self.current().start),
            ..Default::default()
        };
        self.advance(); // ARG

        if self.kind() == TokenKind::Word {
            inst.name = self.current().literal.clone();
            self.advance();

            if self.kind() == TokenKind::Equals {
                self.advance();
                if self.at_line_end() {
                    inst.default = Some(String::new());
                } else {
                    inst.default = Some(self.collect_contiguous_value());
                }
            }
        }

        self.drain_line();
        self.finish_line(&mut inst.span);
        inst
    }

    fn parse_label(&mut self) -> LabelInstruction {
        let mut inst = LabelInstruction {
            span: Span::new(self.current().start, self.current().start),
            ..Default::default()
        };
        self.advance(); // LABEL

        while !self.at_line_end() {
            if matches!(self.kind(), TokenKind::Word | TokenKind::String) {
                let raw_key = self.current().literal.clone();
                let key = self.unquote(&raw_key);
                self.advance();

                let mut value = String::new();
                if self.kind() == TokenKind::Equals {
                    self.advance();
                    if !self.at_line_end() {
                        value = self.collect_contiguous_value();
                    }
                }
                inst.labels.push(KeyValue::new(key, value));
            } else {
                self.advance();
            }
        }

        self.finish_line(&mut inst.span);
        inst
    }

    fn parse_expose(&mut self) -> ExposeInstruction {
        let mut inst = ExposeInstruction {
            span: Span::new(self.current().start, self.current().start),
            ..Default::default()
        };
        self.advance(); // EXPOSE

        while !self.at_line_end() {
            if self.kind() == TokenKind::Word {
                let text = self.current().literal.clone();
                let (port, protocol) = match text.split_once('/') {
                    Some((p, proto)) => (p.to_string(), Some(proto.to_string())),
                    None => (text, None),
                };
                inst.ports.push(PortSpec { port, protocol });
            }
            self.advance();
        }

        self.finish_line(&mut inst.span);
        inst
    }

    fn parse_volume(&mut self) -> VolumeInstruction {
        let mut inst = VolumeInstruction {
            span: Span::new(self.current().start, self.current().start),
            ..Default::default()
        };
        self.advance(); // VOLUME

        if self.kind() == TokenKind::LeftBracket {
            inst.paths = self.parse_exec_form();
            self.drain_line();
        } else {
            while !self.at_line_end() {
                if matches!(self.kind(), TokenKind::Word | TokenKind::String) {
                    let lit = self.current().literal.clone();
                    inst.paths.push(self.unquote(&lit));
                }
                self.advance();
            }
        }

        self.finish_line(&mut inst.span);
        inst
    }

    fn parse_user(&mut self) -> UserInstruction {
        let mut inst = UserInstruction {
            span: Span::new(self.current().start, self.current().start),
            ..Default::default()
        };
        self.advance(); // USER

        if matches!(self.kind(), TokenKind::Word | TokenKind::Variable) {
            let text = self.current().literal.clone();
            self.advance();

            if let Some((user, group)) = text.split_once(':') {
                inst.user = user.to_string();
                inst.group = Some(group.to_string());
            } else {
                inst.user = text;
            }

            if self.kind() == TokenKind::Colon {
                self.advance();
                if self.kind() == TokenKind::Word {
                    inst.group = Some(self.current().literal.clone());
                    self.advance();
                }
            }
        }

        self.drain_line();
        self.finish_line(&mut inst.span);
        inst
    }

    fn parse_workdir(&mut self) -> WorkdirInstruction {
        let mut inst = WorkdirInstruction {
            span: Span::new(self.current().start, self.current().start),
            ..Default::default()
        };
        self.advance(); // WORKDIR

        let mut path = String::new();
        while !self.at_line_end() {
            if matches!(
                self.kind(),
                TokenKind::Word | TokenKind::Variable | TokenKind::String
            ) {
                path.push_str(&self.current().literal);
            }
            self.advance();
        }
        inst.path = path;

        self.finish_line(&mut inst.span);
        inst
    }

    fn parse_shell(&mut self) -> ShellInstruction {
        let mut inst = ShellInstruction {
            span: Span::new(self.current().start, self.current().start),
            ..Default::default()
        };
        self.advance(); // SHELL

        if self.kind() == TokenKind::LeftBracket {
            inst.shell = self.parse_exec_form();
        }

        self.drain_line();
        self.finish_line(&mut inst.span);
        inst
    }

    fn parse_healthcheck(&mut self) -> HealthcheckInstruction {
        let mut inst = HealthcheckInstruction {
            span: Span::new(self.current().start, self.current().start),
            ..Default::default()
        };
        self.advance(); // HEALTHCHECK

        if self.kind() == TokenKind::Word && self.current().literal.eq_ignore_ascii_case("NONE") {
            inst.none = true;
            self.advance();
        } else {
            while self.kind() == TokenKind::Flag {
                let flag = self.current().literal.clone();
                if let Some(v) = flag.strip_prefix("--interval=") {
                    inst.interval = Some(v.to_string());
                } else if let Some(v) = flag.strip_prefix("--timeout=") {
                    inst.timeout = Some(v.to_string());
                } else if let Some(v) = flag.strip_prefix("--start-period=") {
                    inst.start_period = Some(v.to_string());
                } else if let Some(v) = flag.strip_prefix("--retries=") {
                    inst.retries = Some(v.to_string());
                }
                self.advance();
            }

            let is_cmd_keyword = self.kind() == TokenKind::Cmd
                || (self.kind() == TokenKind::Word
                    && self.current().literal.eq_ignore_ascii_case("CMD"));
            if is_cmd_keyword {
                self.advance();
                if self.kind() == TokenKind::LeftBracket {
                    inst.is_exec = true;
                    inst.arguments = self.parse_exec_form();
                    self.drain_line();
                } else {
                    inst.command = self.collect_rest_of_line();
                }
            }
        }

        self.drain_line();
        self.finish_line(&mut inst.span);
        inst
    }

    fn parse_stopsignal(&mut self) -> StopsignalInstruction {
        let mut inst = StopsignalInstruction {
            span: Span::new(self.current().start, self.current().start),
            ..Default::default()
        };
        self.advance(); // STOPSIGNAL

        if self.kind() == TokenKind::Word {
            inst.signal = self.current().literal.clone();
            self.advance();
        }

        self.drain_line();
        self.finish_line(&mut inst.span);
        inst
    }

    fn parse_onbuild(&mut self) -> OnbuildInstruction {
        let start = self.current().start;
        let mut inst = OnbuildInstruction {
            span: Span::new(start, start),
            instruction: None,
        };
        self.advance(); // ONBUILD

        if self.current().is_instruction() {
            inst.instruction = self.parse_instruction().map(Box::new);
        } else if self.kind() == TokenKind::Word {
            // Mid-line, the nested keyword lexed as a plain word; reclassify
            // it so the normal dispatch applies.
            let upper = self.current().literal.to_uppercase();
            if let Some(kind) = TokenKind::lookup_keyword(&upper) {
                if kind != TokenKind::Onbuild {
                    self.tokens[self.pos].kind = kind;
                    inst.instruction = self.parse_instruction().map(Box::new);
                }
            }
        }

        if inst.instruction.is_none() {
            self.error("ONBUILD requires a nested instruction");
            self.drain_line();
            self.consume_newline();
        }

        inst.span.end = inst
            .instruction
            .as_ref()
            .map(|i| i.end())
            .unwrap_or(self.current().start);
        inst
    }

    fn parse_maintainer(&mut self) -> MaintainerInstruction {
        let mut inst = MaintainerInstruction {
            span: Span::new(self.current().start, self.current().start),
            ..Default::default()
        };
        self.advance(); // MAINTAINER

        inst.maintainer = self.collect_rest_of_line();

        self.finish_line(&mut inst.span);
        inst
    }
}

/// Split a heredoc token literal (`<<DELIM … DELIM`) into its parts.
fn parse_heredoc_literal(literal: &str) -> Heredoc {
    let rest = literal.strip_prefix("<<").unwrap_or(literal);
    let (strip_tabs, rest) = match rest.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, rest),
    };

    let (delimiter, after) = match rest.chars().next() {
        Some(q @ ('"' | '\'')) => {
            let inner = &rest[1..];
            match inner.find(q) {
                Some(i) => (inner[..i].to_string(), &inner[i + q.len_utf8()..]),
                None => (inner.to_string(), ""),
            }
        }
        _ => {
            let end = rest
                .find(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '/')))
                .unwrap_or(rest.len());
            (rest[..end].to_string(), &rest[end..])
        }
    };

    let mut content = String::new();
    if let Some(nl) = after.find('\n') {
        for line in after[nl + 1..].lines() {
            let candidate = if strip_tabs {
                line.trim_start_matches('\t')
            } else {
                line
            };
            if candidate.trim_end() == delimiter {
                break;
            }
            content.push_str(line);
            content.push('\n');
        }
    }

    Heredoc {
        delimiter,
        content,
        strip_tabs,
    }
}

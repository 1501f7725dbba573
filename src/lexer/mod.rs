//! Streaming Dockerfile lexer.
//!
//! Converts source text into a flat token stream with accurate positions.
//! The lexer never fails: anything it cannot classify degrades to a
//! single-character `Word` token and scanning continues.

mod token;

pub use token::{Position, Token, TokenKind};

/// Tokenizes Dockerfile source text.
///
/// Supports both one-shot use via [`Lexer::tokenize`] and incremental
/// consumption via [`Lexer::next_token`].
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    read_pos: usize,
    ch: Option<char>,
    line: u32,
    column: u32,
    start_line: u32,
    start_column: u32,
    start_offset: usize,
    escape_char: char,
    at_line_start: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut l = Self {
            input,
            pos: 0,
            read_pos: 0,
            ch: None,
            line: 1,
            column: 0,
            start_line: 1,
            start_column: 1,
            start_offset: 0,
            escape_char: '\\',
            at_line_start: true,
        };
        l.read_char();
        l
    }

    /// The currently active escape character.
    pub fn escape_char(&self) -> char {
        self.escape_char
    }

    /// Consume the whole input and return its tokens, terminated by `Eof`.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::with_capacity(64);
        loop {
            let tok = self.next_token();
            let done = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if done {
                break;
            }
        }
        tokens
    }

    fn read_char(&mut self) {
        // Line and column always describe the current character, so a
        // newline is positioned on the line it terminates.
        if self.ch == Some('\n') {
            self.line += 1;
            self.column = 0;
        }
        self.pos = self.read_pos;
        match self.input[self.read_pos.min(self.input.len())..].chars().next() {
            Some(c) => {
                self.column += 1;
                self.ch = Some(c);
                self.read_pos += c.len_utf8();
            }
            None => {
                self.ch = None;
            }
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.read_pos.min(self.input.len())..].chars().next()
    }

    fn mark_start(&mut self) {
        self.start_line = self.line;
        self.start_column = self.column.max(1);
        self.start_offset = self.pos;
    }

    fn make_token(&self, kind: TokenKind, literal: impl Into<String>) -> Token {
        Token {
            kind,
            literal: literal.into(),
            start: Position::new(self.start_line, self.start_column, self.start_offset),
            end: Position::new(self.line, self.column.max(1), self.pos),
        }
    }

    fn slice_from_start(&self) -> &'a str {
        &self.input[self.start_offset..self.pos]
    }

    /// Produce the next token.
    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();
            self.mark_start();

            let ch = match self.ch {
                None => return self.make_token(TokenKind::Eof, ""),
                Some(c) => c,
            };

            if ch == '\n' {
                self.read_char();
                self.at_line_start = true;
                return self.make_token(TokenKind::Newline, "\n");
            }

            if ch == '#' {
                return self.read_comment();
            }

            // Escape character followed by a newline joins logical lines;
            // both characters vanish from the token stream.
            if ch == self.escape_char && self.peek_char() == Some('\n') {
                self.read_char();
                self.read_char();
                continue;
            }

            if ch == '<' && self.peek_char() == Some('<') {
                return self.read_heredoc();
            }

            match ch {
                '=' => {
                    self.read_char();
                    return self.make_token(TokenKind::Equals, "=");
                }
                ':' => {
                    self.read_char();
                    return self.make_token(TokenKind::Colon, ":");
                }
                '@' => {
                    self.read_char();
                    return self.make_token(TokenKind::At, "@");
                }
                ',' => {
                    self.read_char();
                    return self.make_token(TokenKind::Comma, ",");
                }
                '[' => {
                    self.read_char();
                    return self.make_token(TokenKind::LeftBracket, "[");
                }
                ']' => {
                    self.read_char();
                    return self.make_token(TokenKind::RightBracket, "]");
                }
                _ => {}
            }

            if ch == self.escape_char {
                self.read_char();
                return self.make_token(TokenKind::Backslash, ch.to_string());
            }

            if ch == '"' || ch == '\'' {
                return self.read_string(ch);
            }

            if ch == '$' {
                return self.read_variable();
            }

            if ch == '-' && self.peek_char() == Some('-') {
                return self.read_flag();
            }

            if is_word_char(ch) {
                return self.read_word();
            }

            // Unknown character: emit it as a one-character word.
            self.read_char();
            return self.make_token(TokenKind::Word, ch.to_string());
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.ch, Some(' ') | Some('\t') | Some('\r')) {
            self.read_char();
        }
    }

    fn consume_to_eol(&mut self) {
        while self.ch.is_some() && self.ch != Some('\n') {
            self.read_char();
        }
    }

    fn read_comment(&mut self) -> Token {
        // A first-line comment of the form `# escape=X` is the escape
        // parser directive; it switches the continuation character.
        if self.start_line == 1 {
            let rest = &self.input[self.pos..];
            let line = rest.split('\n').next().unwrap_or(rest);
            if let Some(esc) = parse_escape_directive(line) {
                self.escape_char = esc;
                self.consume_to_eol();
                return self.make_token(TokenKind::EscapeDirective, self.slice_from_start());
            }
        }

        self.consume_to_eol();
        self.make_token(TokenKind::Comment, self.slice_from_start())
    }

    fn read_word(&mut self) -> Token {
        while self.ch.map_or(false, is_word_char) {
            self.read_char();
        }
        let literal = self.slice_from_start();

        if self.at_line_start {
            self.at_line_start = false;
            let upper = literal.to_uppercase();
            if let Some(kind) = TokenKind::lookup_keyword(&upper) {
                return self.make_token(kind, literal);
            }
        }
        self.at_line_start = false;
        self.make_token(TokenKind::Word, literal)
    }

    fn read_string(&mut self, quote: char) -> Token {
        self.read_char(); // opening quote

        while let Some(c) = self.ch {
            if c == self.escape_char {
                let next = self.peek_char();
                if next == Some(quote) || next == Some(self.escape_char) {
                    self.read_char();
                    self.read_char();
                    continue;
                }
            }
            if c == quote {
                self.read_char(); // closing quote
                break;
            }
            if c == '\n' {
                // Unterminated string ends at the line boundary; the parser
                // deals with whatever text we collected.
                break;
            }
            self.read_char();
        }

        self.make_token(TokenKind::String, self.slice_from_start())
    }

    fn read_variable(&mut self) -> Token {
        self.read_char(); // $

        if self.ch == Some('{') {
            // ${VAR}, ${VAR:-default}; braces may nest.
            self.read_char();
            let mut depth = 1u32;
            while let Some(c) = self.ch {
                if c == '{' {
                    depth += 1;
                } else if c == '}' {
                    depth -= 1;
                    if depth == 0 {
                        self.read_char();
                        break;
                    }
                }
                self.read_char();
            }
        } else {
            while self.ch.map_or(false, is_var_char) {
                self.read_char();
            }
        }

        self.make_token(TokenKind::Variable, self.slice_from_start())
    }

    fn read_flag(&mut self) -> Token {
        self.read_char(); // -
        self.read_char(); // -

        while self.ch.map_or(false, |c| is_word_char(c) || c == '-') {
            self.read_char();
        }

        if self.ch == Some('=') {
            self.read_char();
            if let Some(quote) = self.ch.filter(|&c| c == '"' || c == '\'') {
                self.read_char();
                while let Some(c) = self.ch {
                    if c == quote || c == '\n' {
                        break;
                    }
                    if c == self.escape_char {
                        self.read_char();
                    }
                    self.read_char();
                }
                if self.ch == Some(quote) {
                    self.read_char();
                }
            } else {
                while self
                    .ch
                    .map_or(false, |c| c != ' ' && c != '\t' && c != '\n')
                {
                    self.read_char();
                }
            }
        }

        self.make_token(TokenKind::Flag, self.slice_from_start())
    }

    fn read_heredoc(&mut self) -> Token {
        self.read_char(); // <
        self.read_char(); // <

        let strip_tabs = if self.ch == Some('-') {
            self.read_char();
            true
        } else {
            false
        };

        let delimiter = if let Some(quote) = self.ch.filter(|&c| c == '"' || c == '\'') {
            self.read_char();
            let start = self.pos;
            while self.ch.map_or(false, |c| c != quote && c != '\n') {
                self.read_char();
            }
            let delim = self.input[start..self.pos].to_string();
            if self.ch == Some(quote) {
                self.read_char();
            }
            delim
        } else {
            let start = self.pos;
            while self.ch.map_or(false, is_word_char) {
                self.read_char();
            }
            self.input[start..self.pos].to_string()
        };

        // The body starts on the next line.
        self.consume_to_eol();
        if self.ch == Some('\n') {
            self.read_char();
        }

        // Accumulate lines until one consists of the delimiter alone
        // (after optional leading-tab stripping).
        while self.ch.is_some() {
            if strip_tabs {
                while self.ch == Some('\t') {
                    self.read_char();
                }
            }

            let word_start = self.pos;
            while self.ch.map_or(false, is_word_char) {
                self.read_char();
            }
            let word = &self.input[word_start..self.pos];

            while matches!(self.ch, Some(' ') | Some('\t')) {
                self.read_char();
            }

            if word == delimiter && (self.ch == Some('\n') || self.ch.is_none()) {
                if self.ch == Some('\n') {
                    self.read_char();
                }
                break;
            }

            self.consume_to_eol();
            if self.ch == Some('\n') {
                self.read_char();
            }
        }

        self.make_token(TokenKind::Heredoc, self.slice_from_start())
    }
}

/// Tokenize source text in one call.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.' || c == '/'
}

fn is_var_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Recognize `# escape=X` (whitespace-tolerant) on a first-line comment.
fn parse_escape_directive(line: &str) -> Option<char> {
    let rest = line.strip_prefix('#')?.trim_start();
    if !rest.get(..6)?.eq_ignore_ascii_case("escape") {
        return None;
    }
    let rest = rest[6..].trim_start();
    let rest = rest.strip_prefix('=')?.trim_start();
    rest.chars().next().filter(|c| !c.is_whitespace())
}

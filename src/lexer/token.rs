//! Token and position types for the Dockerfile lexer.

use std::fmt;

/// A position in the source text.
///
/// Lines and columns are 1-based; columns count code points, not bytes.
/// The offset is a 0-based byte offset into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl Position {
    pub fn new(line: u32, column: u32, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,
    Newline,
    Comment,
    EscapeDirective,

    // Instruction keywords, produced only at the start of a logical line.
    From,
    Run,
    Cmd,
    Label,
    Maintainer,
    Expose,
    Env,
    Add,
    Copy,
    Entrypoint,
    Volume,
    User,
    Workdir,
    Arg,
    Onbuild,
    Stopsignal,
    Healthcheck,
    Shell,

    // Literals.
    Word,
    String,
    Variable,
    Heredoc,

    // Punctuation.
    Equals,
    Colon,
    At,
    Comma,
    LeftBracket,
    RightBracket,
    Backslash,

    // --name or --name=value
    Flag,
}

impl TokenKind {
    /// Map an uppercased identifier to its instruction keyword kind, if any.
    pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
        match ident {
            "FROM" => Some(Self::From),
            "RUN" => Some(Self::Run),
            "CMD" => Some(Self::Cmd),
            "LABEL" => Some(Self::Label),
            "MAINTAINER" => Some(Self::Maintainer),
            "EXPOSE" => Some(Self::Expose),
            "ENV" => Some(Self::Env),
            "ADD" => Some(Self::Add),
            "COPY" => Some(Self::Copy),
            "ENTRYPOINT" => Some(Self::Entrypoint),
            "VOLUME" => Some(Self::Volume),
            "USER" => Some(Self::User),
            "WORKDIR" => Some(Self::Workdir),
            "ARG" => Some(Self::Arg),
            "ONBUILD" => Some(Self::Onbuild),
            "STOPSIGNAL" => Some(Self::Stopsignal),
            "HEALTHCHECK" => Some(Self::Healthcheck),
            "SHELL" => Some(Self::Shell),
            _ => None,
        }
    }

    /// Whether this kind is an instruction keyword.
    pub fn is_instruction(self) -> bool {
        matches!(
            self,
            Self::From
                | Self::Run
                | Self::Cmd
                | Self::Label
                | Self::Maintainer
                | Self::Expose
                | Self::Env
                | Self::Add
                | Self::Copy
                | Self::Entrypoint
                | Self::Volume
                | Self::User
                | Self::Workdir
                | Self::Arg
                | Self::Onbuild
                | Self::Stopsignal
                | Self::Healthcheck
                | Self::Shell
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eof => "EOF",
            Self::Newline => "NEWLINE",
            Self::Comment => "COMMENT",
            Self::EscapeDirective => "ESCAPE_DIRECTIVE",
            Self::From => "FROM",
            Self::Run => "RUN",
            Self::Cmd => "CMD",
            Self::Label => "LABEL",
            Self::Maintainer => "MAINTAINER",
            Self::Expose => "EXPOSE",
            Self::Env => "ENV",
            Self::Add => "ADD",
            Self::Copy => "COPY",
            Self::Entrypoint => "ENTRYPOINT",
            Self::Volume => "VOLUME",
            Self::User => "USER",
            Self::Workdir => "WORKDIR",
            Self::Arg => "ARG",
            Self::Onbuild => "ONBUILD",
            Self::Stopsignal => "STOPSIGNAL",
            Self::Healthcheck => "HEALTHCHECK",
            Self::Shell => "SHELL",
            Self::Word => "WORD",
            Self::String => "STRING",
            Self::Variable => "VARIABLE",
            Self::Heredoc => "HEREDOC",
            Self::Equals => "EQUALS",
            Self::Colon => "COLON",
            Self::At => "AT",
            Self::Comma => "COMMA",
            Self::LeftBracket => "LEFT_BRACKET",
            Self::RightBracket => "RIGHT_BRACKET",
            Self::Backslash => "BACKSLASH",
            Self::Flag => "FLAG",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lexical token with its source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub start: Position,
    pub end: Position,
}

impl Token {
    pub fn eof(pos: Position) -> Self {
        Self {
            kind: TokenKind::Eof,
            literal: String::new(),
            start: pos,
            end: pos,
        }
    }

    pub fn is_instruction(&self) -> bool {
        self.kind.is_instruction()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.literal.chars().count() > 20 {
            let prefix: String = self.literal.chars().take(20).collect();
            write!(f, "{}({:?}...) at {}", self.kind, prefix, self.start)
        } else {
            write!(f, "{}({:?}) at {}", self.kind, self.literal, self.start)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup() {
        assert_eq!(TokenKind::lookup_keyword("FROM"), Some(TokenKind::From));
        assert_eq!(
            TokenKind::lookup_keyword("HEALTHCHECK"),
            Some(TokenKind::Healthcheck)
        );
        assert_eq!(TokenKind::lookup_keyword("NOPE"), None);
        // Lookup expects uppercase input; the lexer uppercases first.
        assert_eq!(TokenKind::lookup_keyword("from"), None);
    }

    #[test]
    fn instruction_predicate() {
        assert!(TokenKind::From.is_instruction());
        assert!(TokenKind::Shell.is_instruction());
        assert!(!TokenKind::Word.is_instruction());
        assert!(!TokenKind::Flag.is_instruction());
    }

    #[test]
    fn position_display() {
        let pos = Position::new(3, 7, 42);
        assert_eq!(pos.to_string(), "3:7");
    }
}

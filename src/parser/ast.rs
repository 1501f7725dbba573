//! Typed AST for parsed Dockerfiles.
//!
//! A [`Dockerfile`] is an ordered sequence of [`Stage`]s; each stage owns its
//! `FROM` plus the instructions up to the next `FROM` or end of input.
//! Instructions are a sum type so rules and transforms dispatch with plain
//! pattern matching.

use crate::lexer::Position;

/// Source span shared by every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// A complete parsed Dockerfile.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dockerfile {
    pub stages: Vec<Stage>,
    pub comments: Vec<Comment>,
    /// Line-continuation character; `\` unless overridden by `# escape=X`.
    pub escape: char,
    pub span: Span,
}

impl Dockerfile {
    /// The stage that produces the output image, if any.
    pub fn final_stage(&self) -> Option<&Stage> {
        self.stages.last()
    }

    pub fn final_stage_mut(&mut self) -> Option<&mut Stage> {
        self.stages.last_mut()
    }

    /// Iterate all instructions across all stages, excluding `FROM`s.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.stages.iter().flat_map(|s| s.instructions.iter())
    }

    /// Whether `name` matches any stage's `AS` alias (case-insensitive).
    pub fn is_stage_alias(&self, name: &str) -> bool {
        self.stages
            .iter()
            .filter_map(|s| s.name.as_deref())
            .any(|alias| alias.eq_ignore_ascii_case(name))
    }
}

/// One build stage: a `FROM` and everything up to the next `FROM`.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    /// The `AS` alias, when present.
    pub name: Option<String>,
    pub from: FromInstruction,
    pub instructions: Vec<Instruction>,
    pub comments: Vec<Comment>,
    pub span: Span,
}

/// A comment line, including its leading `#`.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub text: String,
    pub span: Span,
}

/// A key=value pair in `ENV` or `LABEL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A Dockerfile instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    From(FromInstruction),
    Run(RunInstruction),
    Cmd(CmdInstruction),
    Entrypoint(EntrypointInstruction),
    Copy(CopyInstruction),
    Add(AddInstruction),
    Env(EnvInstruction),
    Arg(ArgInstruction),
    Label(LabelInstruction),
    Expose(ExposeInstruction),
    Volume(VolumeInstruction),
    User(UserInstruction),
    Workdir(WorkdirInstruction),
    Shell(ShellInstruction),
    Healthcheck(HealthcheckInstruction),
    Stopsignal(StopsignalInstruction),
    Onbuild(OnbuildInstruction),
    Maintainer(MaintainerInstruction),
}

impl Instruction {
    /// The uppercase keyword for this instruction.
    pub fn name(&self) -> &'static str {
        match self {
            Self::From(_) => "FROM",
            Self::Run(_) => "RUN",
            Self::Cmd(_) => "CMD",
            Self::Entrypoint(_) => "ENTRYPOINT",
            Self::Copy(_) => "COPY",
            Self::Add(_) => "ADD",
            Self::Env(_) => "ENV",
            Self::Arg(_) => "ARG",
            Self::Label(_) => "LABEL",
            Self::Expose(_) => "EXPOSE",
            Self::Volume(_) => "VOLUME",
            Self::User(_) => "USER",
            Self::Workdir(_) => "WORKDIR",
            Self::Shell(_) => "SHELL",
            Self::Healthcheck(_) => "HEALTHCHECK",
            Self::Stopsignal(_) => "STOPSIGNAL",
            Self::Onbuild(_) => "ONBUILD",
            Self::Maintainer(_) => "MAINTAINER",
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::From(i) => i.span,
            Self::Run(i) => i.span,
            Self::Cmd(i) => i.span,
            Self::Entrypoint(i) => i.span,
            Self::Copy(i) => i.span,
            Self::Add(i) => i.span,
            Self::Env(i) => i.span,
            Self::Arg(i) => i.span,
            Self::Label(i) => i.span,
            Self::Expose(i) => i.span,
            Self::Volume(i) => i.span,
            Self::User(i) => i.span,
            Self::Workdir(i) => i.span,
            Self::Shell(i) => i.span,
            Self::Healthcheck(i) => i.span,
            Self::Stopsignal(i) => i.span,
            Self::Onbuild(i) => i.span,
            Self::Maintainer(i) => i.span,
        }
    }

    pub fn pos(&self) -> Position {
        self.span().start
    }

    pub fn end(&self) -> Position {
        self.span().end
    }

    pub fn as_run(&self) -> Option<&RunInstruction> {
        match self {
            Self::Run(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_run_mut(&mut self) -> Option<&mut RunInstruction> {
        match self {
            Self::Run(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_copy(&self) -> Option<&CopyInstruction> {
        match self {
            Self::Copy(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_add(&self) -> Option<&AddInstruction> {
        match self {
            Self::Add(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_cmd(&self) -> Option<&CmdInstruction> {
        match self {
            Self::Cmd(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_user(&self) -> Option<&UserInstruction> {
        match self {
            Self::User(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_workdir(&self) -> Option<&WorkdirInstruction> {
        match self {
            Self::Workdir(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_label(&self) -> Option<&LabelInstruction> {
        match self {
            Self::Label(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_healthcheck(&self) -> Option<&HealthcheckInstruction> {
        match self {
            Self::Healthcheck(h) => Some(h),
            _ => None,
        }
    }
}

/// `FROM [--platform=…] image[:tag][@digest] [AS name]`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FromInstruction {
    pub span: Span,
    pub image: String,
    pub tag: Option<String>,
    /// Complete digest reference, e.g. `sha256:abcd…`.
    pub digest: Option<String>,
    pub platform: Option<String>,
    pub as_name: Option<String>,
    /// Original source text of the instruction line.
    pub raw: Option<String>,
}

impl FromInstruction {
    /// The full image reference: `image[:tag][@digest]`.
    pub fn image_ref(&self) -> String {
        let mut r = self.image.clone();
        if let Some(tag) = &self.tag {
            r.push(':');
            r.push_str(tag);
        }
        if let Some(digest) = &self.digest {
            r.push('@');
            r.push_str(digest);
        }
        r
    }

    pub fn is_scratch(&self) -> bool {
        self.image.eq_ignore_ascii_case("scratch")
    }

    pub fn is_variable(&self) -> bool {
        self.image.starts_with('$')
    }

    pub fn has_version(&self) -> bool {
        self.tag.is_some() || self.digest.is_some()
    }
}

/// Inline multi-line body attached to a `RUN`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heredoc {
    pub delimiter: String,
    /// Interior body: the lines between `<<DELIM` and the closing delimiter.
    pub content: String,
    pub strip_tabs: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunInstruction {
    pub span: Span,
    /// Shell-form command; empty for exec form and heredocs.
    pub command: String,
    /// Exec-form arguments.
    pub arguments: Vec<String>,
    pub is_exec: bool,
    pub heredoc: Option<Heredoc>,
    pub mount: Option<String>,
    pub network: Option<String>,
    pub security: Option<String>,
}

impl RunInstruction {
    /// Create a shell-form RUN, useful in tests and transforms.
    pub fn shell(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    /// The text rules should inspect: heredoc body when present, otherwise
    /// the shell command.
    pub fn command_text(&self) -> &str {
        match &self.heredoc {
            Some(h) => &h.content,
            None => &self.command,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CmdInstruction {
    pub span: Span,
    pub command: String,
    pub arguments: Vec<String>,
    pub is_exec: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntrypointInstruction {
    pub span: Span,
    pub command: String,
    pub arguments: Vec<String>,
    pub is_exec: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CopyInstruction {
    pub span: Span,
    pub sources: Vec<String>,
    pub destination: String,
    pub from: Option<String>,
    pub chown: Option<String>,
    pub chmod: Option<String>,
    pub link: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AddInstruction {
    pub span: Span,
    pub sources: Vec<String>,
    pub destination: String,
    pub chown: Option<String>,
    pub chmod: Option<String>,
    pub checksum: Option<String>,
}

impl AddInstruction {
    pub fn has_url_source(&self) -> bool {
        self.sources.iter().any(|s| is_remote_url(s))
    }

    pub fn has_archive_source(&self) -> bool {
        self.sources.iter().any(|s| is_tar_archive(s))
    }
}

/// Whether a path is an http/https/ftp URL.
pub fn is_remote_url(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("ftp://")
}

/// Whether a path looks like a tar archive that `ADD` would auto-extract.
pub fn is_tar_archive(s: &str) -> bool {
    const SUFFIXES: &[&str] = &[
        ".tar", ".tar.gz", ".tgz", ".tar.bz2", ".tbz2", ".tar.xz", ".txz", ".tar.zst", ".tar.lz",
        ".tar.lzma",
    ];
    let lower = s.to_ascii_lowercase();
    SUFFIXES.iter().any(|suf| lower.ends_with(suf))
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnvInstruction {
    pub span: Span,
    pub variables: Vec<KeyValue>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArgInstruction {
    pub span: Span,
    pub name: String,
    pub default: Option<String>,
}

impl ArgInstruction {
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LabelInstruction {
    pub span: Span,
    pub labels: Vec<KeyValue>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExposeInstruction {
    pub span: Span,
    pub ports: Vec<PortSpec>,
}

/// One `EXPOSE` entry: the port text and optional protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSpec {
    pub port: String,
    pub protocol: Option<String>,
}

impl PortSpec {
    /// Ports below 1024 require root to bind. For a range the lower bound
    /// decides.
    pub fn is_privileged(&self) -> bool {
        let port = self.port.split('-').next().unwrap_or(&self.port);
        match port.parse::<u32>() {
            Ok(n) => n > 0 && n < 1024,
            Err(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VolumeInstruction {
    pub span: Span,
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserInstruction {
    pub span: Span,
    pub user: String,
    pub group: Option<String>,
}

impl UserInstruction {
    pub fn is_root(&self) -> bool {
        self.user == "root" || self.user == "0"
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkdirInstruction {
    pub span: Span,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShellInstruction {
    pub span: Span,
    pub shell: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HealthcheckInstruction {
    pub span: Span,
    /// `HEALTHCHECK NONE`
    pub none: bool,
    pub interval: Option<String>,
    pub timeout: Option<String>,
    pub start_period: Option<String>,
    pub retries: Option<String>,
    pub command: String,
    pub arguments: Vec<String>,
    pub is_exec: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StopsignalInstruction {
    pub span: Span,
    pub signal: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OnbuildInstruction {
    pub span: Span,
    /// The wrapped instruction; never another `ONBUILD`.
    pub instruction: Option<Box<Instruction>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaintainerInstruction {
    pub span: Span,
    pub maintainer: String,
}

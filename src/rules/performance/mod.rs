//! Performance rules (PERF001–PERF006).

pub mod perf001;
pub mod perf002;
pub mod perf003;
pub mod perf004;
pub mod perf005;
pub mod perf006;

/// Whether a COPY/ADD source copies "everything".
pub(crate) fn is_broad_source(src: &str) -> bool {
    matches!(src, "." | "./" | "*" | "./*")
}

/// Whether a command installs dependencies with a known package manager.
pub(crate) fn is_dependency_install(cmd: &str) -> bool {
    const INSTALL_PATTERNS: &[&str] = &[
        "npm install",
        "npm ci",
        "yarn install",
        "yarn add",
        "pnpm install",
        "pip install",
        "pip3 install",
        "pipenv install",
        "poetry install",
        "go mod download",
        "go get",
        "bundle install",
        "gem install",
        "composer install",
        "cargo fetch",
        "cargo build",
        "apt-get install",
        "apt install",
        "apk add",
        "yum install",
        "dnf install",
    ];

    let lower = cmd.to_lowercase();
    INSTALL_PATTERNS.iter().any(|p| lower.contains(p))
}

//! SEC009: exposing privileged ports.

use crate::analyzer::{Category, Diagnostic, Severity};
use crate::parser::{Dockerfile, Instruction};
use crate::rules::{Context, Rule};

pub struct PrivilegedPorts;

impl Rule for PrivilegedPorts {
    fn id(&self) -> &'static str {
        "SEC009"
    }

    fn name(&self) -> &'static str {
        "privileged-ports"
    }

    fn description(&self) -> &'static str {
        "Privileged ports (< 1024) require root privileges. Consider using unprivileged ports."
    }

    fn category(&self) -> Category {
        Category::Security
    }

    fn severity(&self) -> Severity {
        Severity::Info
    }

    fn check(&self, df: &Dockerfile, ctx: &Context) -> Vec<Diagnostic> {
        let mut diags = Vec::new();

        for stage in &df.stages {
            for inst in &stage.instructions {
                let expose = match inst {
                    Instruction::Expose(e) => e,
                    _ => continue,
                };

                for port in &expose.ports {
                    if port.is_privileged() {
                        diags.push(
                            self.diagnostic()
                                .message(format!("Exposing privileged port {}", port.port))
                                .pos(expose.span.start)
                                .context(ctx.line(expose.span.start.line))
                                .help("Privileged ports require root. Consider using an unprivileged port (>= 1024) and mapping it at runtime with -p 80:8080")
                                .build(),
                        );
                    }
                }
            }
        }

        diags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn check(source: &str) -> Vec<Diagnostic> {
        let (df, _) = parse(source);
        PrivilegedPorts.check(&df, &Context::new("Dockerfile", source))
    }

    #[test]
    fn port_80_fires() {
        let diags = check("FROM a\nEXPOSE 80\n");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn port_8080_passes() {
        let diags = check("FROM a\nEXPOSE 8080\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn mixed_ports_fire_per_privileged_port() {
        let diags = check("FROM a\nEXPOSE 80 443 8080\n");
        assert_eq!(diags.len(), 2);
    }
}

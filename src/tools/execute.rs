use tokio::process::Command;
use tracing::{debug, warn};

use crate::tools::LocalTools;

pub const NO_OUTPUT: &str = "Command executed (no output)";

/// Shell used to interpret `run_command` command lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shell {
    pub program: String,
    pub flag: &'static str,
}

impl Shell {
    /// pwsh (or Windows PowerShell when pwsh is missing) on Windows, bash elsewhere.
    pub fn detect() -> Self {
        if cfg!(windows) {
            if which::which("pwsh").is_ok() {
                Self::named("pwsh")
            } else {
                Self::named("powershell")
            }
        } else {
            Self::named("bash")
        }
    }

    pub fn named(program: impl Into<String>) -> Self {
        let program = program.into();
        let lower = program.to_ascii_lowercase();
        let flag = if lower.contains("pwsh") || lower.contains("powershell") {
            "-Command"
        } else {
            "-c"
        };
        Self { program, flag }
    }
}

impl LocalTools {
    /// Run one command line through the configured shell.
    ///
    /// Never fails: spawn errors and refused commands come back as text so
    /// they can be handed to the model like any other output.
    pub async fn run_command(&self, command: &str) -> String {
        if !self.security.is_command_allowed(command) {
            warn!(command, "command rejected by allow-list");
            return format!("Error: command not allowed: {command}");
        }

        debug!(shell = %self.shell.program, command, "running command");
        match Command::new(&self.shell.program)
            .arg(self.shell.flag)
            .arg(command)
            .output()
            .await
        {
            Ok(output) => {
                debug!(status = %output.status, "command finished");
                format_output(&output.stdout, &output.stderr)
            }
            Err(e) => format!("Error executing command: {e}"),
        }
    }
}

/// Stdout, then `stderr: ...` when stderr is non-empty, or the placeholder.
pub fn format_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut parts = Vec::new();
    if !stdout.is_empty() {
        parts.push(String::from_utf8_lossy(stdout).trim().to_string());
    }
    if !stderr.is_empty() {
        parts.push(format!("stderr: {}", String::from_utf8_lossy(stderr).trim()));
    }
    if parts.is_empty() {
        NO_OUTPUT.to_string()
    } else {
        parts.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::SecurityChecker;

    fn bash_tools() -> LocalTools {
        LocalTools::new(Shell::named("bash"), SecurityChecker::default())
    }

    #[tokio::test]
    async fn echo_returns_stdout() {
        let out = bash_tools().run_command("echo hello").await;
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn stderr_only_is_prefixed() {
        let out = bash_tools().run_command("echo oops >&2").await;
        assert_eq!(out, "stderr: oops");
    }

    #[tokio::test]
    async fn both_streams_are_joined() {
        let out = bash_tools().run_command("echo out; echo err >&2").await;
        assert_eq!(out, "out\nstderr: err");
    }

    #[tokio::test]
    async fn silent_command_returns_placeholder() {
        let out = bash_tools().run_command("true").await;
        assert_eq!(out, NO_OUTPUT);
    }

    #[tokio::test]
    async fn failing_command_reports_stderr() {
        let out = bash_tools().run_command("definitely_not_a_command_xyz").await;
        assert!(out.starts_with("stderr: "));
        assert!(out.contains("definitely_not_a_command_xyz"));
    }

    #[tokio::test]
    async fn missing_shell_is_reported_as_text() {
        let tools = LocalTools::new(
            Shell::named("/nonexistent/shell-binary"),
            SecurityChecker::default(),
        );
        let out = tools.run_command("echo hi").await;
        assert!(out.starts_with("Error executing command:"));
    }

    #[tokio::test]
    async fn disallowed_command_is_refused() {
        let tools = LocalTools::new(
            Shell::named("bash"),
            SecurityChecker::new(vec!["echo".into()]),
        );
        assert_eq!(tools.run_command("echo ok").await, "ok");
        let out = tools.run_command("rm -rf /tmp/nothing").await;
        assert_eq!(out, "Error: command not allowed: rm -rf /tmp/nothing");
    }

    #[tokio::test]
    async fn allowed_prefix_cannot_smuggle_a_second_command() {
        let tools = LocalTools::new(
            Shell::named("bash"),
            SecurityChecker::new(vec!["echo".into()]),
        );
        let command = "echo ok; echo injected-$(id -un)";
        let out = tools.run_command(command).await;
        assert_eq!(out, format!("Error: command not allowed: {command}"));
        assert!(!out.contains("ok\n"));
    }

    #[test]
    fn powershell_uses_command_flag() {
        assert_eq!(Shell::named("pwsh").flag, "-Command");
        assert_eq!(Shell::named("powershell.exe").flag, "-Command");
        assert_eq!(Shell::named("zsh").flag, "-c");
    }
}

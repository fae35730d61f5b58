//! Subprocess runner backed by `tokio::process`

use super::{CommandResult, ProcessRunner, RunOptions};
use crate::error::{Result, SecsyError};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as TokioCommand;
use tracing::debug;

/// Runs commands through the platform shell, one at a time
#[derive(Debug, Clone, Default)]
pub struct CommandRunner;

impl CommandRunner {
    pub fn new() -> Self {
        Self
    }

    fn shell() -> (&'static str, &'static str) {
        if cfg!(windows) { ("cmd", "/C") } else { ("sh", "-c") }
    }
}

/// Apply the timestamp prefix when requested
fn decorate(opts: &RunOptions, line: &str) -> String {
    if opts.print_timestamp {
        format!("[{}] {}", chrono::Local::now().format("%H:%M:%S"), line)
    } else {
        line.to_string()
    }
}

#[async_trait]
impl ProcessRunner for CommandRunner {
    async fn run(&self, cmd: &str, opts: &RunOptions) -> Result<CommandResult> {
        if opts.print_cmd {
            println!("{}", decorate(opts, cmd));
        }
        debug!("Executing: {}", cmd);

        let (shell, flag) = Self::shell();
        let mut command = TokioCommand::new(shell);
        command
            .arg(flag)
            .arg(cmd)
            .envs(opts.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        let mut child = command
            .spawn()
            .map_err(|source| SecsyError::Spawn { command: cmd.to_string(), source })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("child stdout was not captured"))?;

        let mut output = Vec::new();
        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await? {
            if opts.print_line {
                println!("{}", decorate(opts, &line));
            }
            output.push(line);
        }

        let status = child.wait().await?;
        // Killed by a signal: no code, report a plain failure
        let return_code = status.code().unwrap_or(1);
        debug!("Command exited with {}", return_code);

        Ok(CommandResult { return_code, output })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_lines_and_code() {
        let runner = CommandRunner::new();
        let result = runner
            .run("printf 'one\\ntwo\\n'; exit 3", &RunOptions::default())
            .await
            .unwrap();
        assert_eq!(result.output, vec!["one", "two"]);
        assert_eq!(result.return_code, 3);
        assert!(!result.success());
    }

    #[tokio::test]
    async fn test_env_reaches_child() {
        let runner = CommandRunner::new();
        let opts = RunOptions::default().with_env("TEST_COMMANDS", "dnsxbrute");
        let result = runner.run("echo \"$TEST_COMMANDS\"", &opts).await.unwrap();
        assert_eq!(result.output, vec!["dnsxbrute"]);
        assert!(result.success());
    }

    #[tokio::test]
    async fn test_signal_reports_failure() {
        let runner = CommandRunner::new();
        let result = runner.run("kill -9 $$", &RunOptions::default()).await.unwrap();
        assert_eq!(result.return_code, 1);
    }

    #[test]
    fn test_decorate() {
        let plain = decorate(&RunOptions::default(), "line");
        assert_eq!(plain, "line");

        let stamped = decorate(&RunOptions::verbose(), "line");
        assert!(stamped.starts_with('['));
        assert!(stamped.ends_with("] line"));
    }
}

//! Task execution: descriptor + targets + options to findings

use super::{ProcessRunner, RunOptions};
use crate::error::{Result, SecsyError};
use crate::output_types::Finding;
use crate::tasks::{TaskDescriptor, TaskOptions};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Result of running one task
#[derive(Debug, Clone)]
pub struct TaskRun {
    pub task: String,
    /// Shell form of the invocation
    pub command: String,
    pub return_code: i32,
    pub findings: Vec<Finding>,
}

impl TaskRun {
    pub fn success(&self) -> bool {
        self.return_code == 0
    }
}

/// Runs task descriptors through a [`ProcessRunner`]
pub struct TaskRunner<'a> {
    runner: &'a dyn ProcessRunner,
    opts: RunOptions,
    check_binary: bool,
}

impl<'a> TaskRunner<'a> {
    pub fn new(runner: &'a dyn ProcessRunner) -> Self {
        Self { runner, opts: RunOptions::default(), check_binary: true }
    }

    /// Echo the command line before running
    pub fn with_print_cmd(mut self, print_cmd: bool) -> Self {
        self.opts.print_cmd = print_cmd;
        self
    }

    /// Look the binary up on PATH before spawning
    pub fn with_binary_check(mut self, check_binary: bool) -> Self {
        self.check_binary = check_binary;
        self
    }

    pub async fn run(
        &self,
        task: &TaskDescriptor,
        targets: &[String],
        options: &TaskOptions,
    ) -> Result<TaskRun> {
        if self.check_binary && which::which(&task.cmd).is_err() {
            return Err(SecsyError::MissingBinary { task: task.name.clone(), cmd: task.cmd.clone() });
        }

        // Keeps the target file alive until the process is done
        let command_line = task.build_command(targets, options)?;
        let command = command_line.to_shell_string();
        info!("Running task '{}' on {} target(s)", task.name, targets.len());

        let result = self.runner.run(&command, &self.opts).await?;
        drop(command_line);

        let findings = parse_findings(task, &result.output);
        if result.success() {
            info!("Task '{}' produced {} finding(s)", task.name, findings.len());
        } else {
            warn!("Task '{}' exited with {}", task.name, result.return_code);
        }

        Ok(TaskRun {
            task: task.name.clone(),
            command,
            return_code: result.return_code,
            findings,
        })
    }
}

/// Normalize captured output lines. Lines that are not JSON (banners,
/// progress) and items that do not fit the output type are dropped.
pub fn parse_findings(task: &TaskDescriptor, lines: &[String]) -> Vec<Finding> {
    let mut findings = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let raw: Value = match serde_json::from_str(line) {
            Ok(raw) => raw,
            Err(_) => {
                debug!("[{}] {}", task.name, line);
                continue;
            }
        };
        match task.output_map.apply(&raw) {
            Ok(finding) => findings.push(finding),
            Err(e) => warn!("Skipping {} output item: {}", task.name, e),
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::CommandResult;
    use crate::tasks::builtin;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays canned output and remembers the commands it saw
    struct Replay {
        output: Vec<String>,
        return_code: i32,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ProcessRunner for Replay {
        async fn run(&self, cmd: &str, _opts: &RunOptions) -> Result<CommandResult> {
            self.seen.lock().unwrap().push(cmd.to_string());
            Ok(CommandResult { return_code: self.return_code, output: self.output.clone() })
        }
    }

    fn replay(lines: &[&str], return_code: i32) -> Replay {
        Replay {
            output: lines.iter().map(|l| l.to_string()).collect(),
            return_code,
            seen: Mutex::new(Vec::new()),
        }
    }

    #[tokio::test]
    async fn test_run_dnsxbrute() {
        let runner = replay(
            &[
                "      _             __  __",
                r#"{"host":"www.example.com","a":["93.184.216.34"]}"#,
                r#"{"host":"mail.example.com"}"#,
                "",
            ],
            0,
        );
        let task_runner = TaskRunner::new(&runner).with_binary_check(false);

        let run = task_runner
            .run(&builtin::dnsxbrute(), &["example.com".to_string()], &TaskOptions::new())
            .await
            .unwrap();

        assert!(run.success());
        assert_eq!(run.findings.len(), 2);
        assert_eq!(run.findings[1].target(), Some("mail.example.com"));
        assert!(runner.seen.lock().unwrap()[0].starts_with("dnsx -json -domain example.com"));
    }

    #[tokio::test]
    async fn test_failed_run_keeps_partial_findings() {
        let runner = replay(&[r#"{"host":"a.example.com","input":"example.com","source":"crtsh"}"#], 2);
        let task_runner = TaskRunner::new(&runner).with_binary_check(false);

        let run = task_runner
            .run(&builtin::subfinder(), &["example.com".to_string()], &TaskOptions::new())
            .await
            .unwrap();
        assert_eq!(run.return_code, 2);
        assert_eq!(run.findings.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let runner = replay(&[], 0);
        let mut task = builtin::naabu();
        task.cmd = "secsy-definitely-not-installed".to_string();

        let result = TaskRunner::new(&runner)
            .run(&task, &["example.com".to_string()], &TaskOptions::new())
            .await;
        assert!(matches!(result, Err(SecsyError::MissingBinary { .. })));
        assert!(runner.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_parse_findings_skips_invalid_items() {
        let lines = vec![
            "[INF] Current naabu version".to_string(),
            r#"{"ip":"10.0.0.1","port":22}"#.to_string(),
            r#"{"ip":"10.0.0.1","port":"ssh"}"#.to_string(),
            "[1, 2]".to_string(),
        ];
        let findings = parse_findings(&builtin::naabu(), &lines);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].to_string(), "[port] 10.0.0.1:22");
    }
}

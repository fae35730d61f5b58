//! Process execution
//!
//! [`ProcessRunner`] is the seam between secsy and the operating system:
//! [`CommandRunner`] spawns real processes, tests substitute a recorder.
//! [`TaskRunner`] drives one task descriptor through a runner and
//! normalizes its output.

pub mod process;
pub mod task;

pub use process::CommandRunner;
pub use task::{TaskRun, TaskRunner, parse_findings};

use crate::error::Result;
use async_trait::async_trait;

/// Display and environment settings for one command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Prefix echoed lines with `[HH:MM:SS]`
    pub print_timestamp: bool,
    /// Echo each stdout line
    pub print_line: bool,
    /// Echo the command before running it
    pub print_cmd: bool,
    /// Extra variables for the child environment
    pub env: Vec<(String, String)>,
}

impl RunOptions {
    /// Everything echoed, as used for worker and test commands
    pub fn verbose() -> Self {
        Self { print_timestamp: true, print_line: true, print_cmd: true, env: Vec::new() }
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }
}

/// Outcome of one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub return_code: i32,
    /// Captured stdout lines
    pub output: Vec<String>,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.return_code == 0
    }
}

/// Runs a shell command line to completion
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, cmd: &str, opts: &RunOptions) -> Result<CommandResult>;
}

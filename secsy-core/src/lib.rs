//! Core functionality for secsy
//!
//! This crate holds everything behind the CLI: configuration, the declarative
//! task descriptors wrapping external reconnaissance tools, the process
//! runner that executes them, and the workflow and scan presets composed
//! from them.

pub mod config;
pub mod definitions;
pub mod error;
pub mod output_types;
pub mod runner;
pub mod tasks;
pub mod workflows;

pub use config::Config;
pub use error::{Result, SecsyError};
pub use output_types::{Finding, OutputType};
pub use runner::{CommandResult, CommandRunner, ProcessRunner, RunOptions, TaskRunner};
pub use tasks::{TaskDescriptor, TaskOptions, TaskRegistry};
pub use workflows::{ScanRegistry, WorkflowRegistry, WorkflowRunner};

/// Everything one CLI invocation can dispatch to
#[derive(Debug, Clone)]
pub struct Registries {
    pub tasks: TaskRegistry,
    pub workflows: WorkflowRegistry,
    pub scans: ScanRegistry,
}

impl Registries {
    /// Discover tasks and check that every preset refers to known entries
    pub fn load(config: &Config) -> Result<Self> {
        let tasks = TaskRegistry::discover(&config.tasks)?;
        let workflows = WorkflowRegistry::builtin();
        workflows.check_tasks(&tasks)?;
        let scans = ScanRegistry::builtin();
        scans.check_workflows(&workflows)?;
        Ok(Self { tasks, workflows, scans })
    }

    pub fn builtin() -> Self {
        Self {
            tasks: TaskRegistry::builtin(),
            workflows: WorkflowRegistry::builtin(),
            scans: ScanRegistry::builtin(),
        }
    }
}

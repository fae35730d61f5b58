//! Workflows and scans
//!
//! A workflow is an ordered list of task steps. A scan is an ordered list of
//! workflows bound to the kind of target it accepts. Both are static
//! registries built at startup and executed sequentially by
//! [`WorkflowRunner`].

pub mod executor;
pub mod scan;

pub use executor::{Findings, WorkflowReport, WorkflowRunner};
pub use scan::{Scan, ScanRegistry, TargetKind};

use crate::definitions::TOP_PORTS;
use crate::error::{Result, SecsyError};
use crate::tasks::{TaskOptions, TaskRegistry};

/// Where a step takes its targets from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepInput {
    /// The targets the workflow was started with
    Targets,
    /// Hosts found by earlier steps
    Findings,
}

#[derive(Debug, Clone)]
pub struct Step {
    pub task: String,
    pub input: StepInput,
    /// Fixed options; user options win over these
    pub options: TaskOptions,
}

impl Step {
    pub fn on_targets(task: &str) -> Self {
        Self { task: task.to_string(), input: StepInput::Targets, options: TaskOptions::new() }
    }

    pub fn on_findings(task: &str) -> Self {
        Self { task: task.to_string(), input: StepInput::Findings, options: TaskOptions::new() }
    }

    pub fn with_option(mut self, name: &str, value: &str) -> Self {
        self.options.set(name, value);
        self
    }
}

/// A named composition of tasks
#[derive(Debug, Clone)]
pub struct Workflow {
    pub name: String,
    pub description: String,
    pub steps: Vec<Step>,
}

impl Workflow {
    pub fn new(name: &str, description: &str, steps: Vec<Step>) -> Self {
        Self { name: name.to_string(), description: description.to_string(), steps }
    }

    pub fn task_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.task.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorkflowRegistry {
    workflows: Vec<Workflow>,
}

impl WorkflowRegistry {
    pub fn builtin() -> Self {
        Self {
            workflows: vec![
                Workflow::new(
                    "subdomain_recon",
                    "Passive and brute-force subdomain discovery",
                    vec![Step::on_targets("subfinder"), Step::on_targets("dnsxbrute")],
                ),
                Workflow::new(
                    "port_discovery",
                    "Top 100 ports on the targets",
                    vec![Step::on_targets("naabu").with_option(TOP_PORTS, "100")],
                ),
                Workflow::new(
                    "full_recon",
                    "Subdomain discovery, then port discovery on every host found",
                    vec![
                        Step::on_targets("subfinder"),
                        Step::on_targets("dnsxbrute"),
                        Step::on_findings("naabu").with_option(TOP_PORTS, "100"),
                    ],
                ),
            ],
        }
    }

    pub fn get(&self, name: &str) -> Option<&Workflow> {
        self.workflows.iter().find(|w| w.name == name)
    }

    pub fn resolve(&self, name: &str) -> Result<&Workflow> {
        self.get(name).ok_or_else(|| SecsyError::UnknownWorkflow { name: name.to_string() })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Workflow> {
        self.workflows.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.workflows.iter().map(|w| w.name.as_str()).collect()
    }

    /// Every step must name a registered task
    pub fn check_tasks(&self, tasks: &TaskRegistry) -> Result<()> {
        for workflow in &self.workflows {
            for step in &workflow.steps {
                tasks.resolve(&step.task)?;
            }
        }
        Ok(())
    }
}

//! Sequential workflow and scan execution

use super::{Scan, StepInput, Workflow, WorkflowRegistry};
use crate::error::Result;
use crate::output_types::Finding;
use crate::runner::TaskRunner;
use crate::tasks::{TaskOptions, TaskRegistry};
use std::collections::HashSet;
use tracing::{info, warn};

/// Findings deduplicated in first-seen order
#[derive(Debug, Clone, Default)]
pub struct Findings {
    items: Vec<Finding>,
    seen: HashSet<Finding>,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many findings were new
    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) -> usize {
        let before = self.items.len();
        for finding in findings {
            if self.seen.insert(finding.clone()) {
                self.items.push(finding);
            }
        }
        self.items.len() - before
    }

    /// Distinct hosts, in order of discovery
    pub fn hosts(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.items
            .iter()
            .filter_map(Finding::target)
            .filter(|host| seen.insert(*host))
            .map(str::to_string)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<Finding> {
        self.items
    }
}

/// Outcome of a workflow or scan
#[derive(Debug, Clone, Default)]
pub struct WorkflowReport {
    pub name: String,
    pub findings: Findings,
    /// Steps that failed to start or exited non-zero
    pub failed_steps: Vec<String>,
}

impl WorkflowReport {
    pub fn success(&self) -> bool {
        self.failed_steps.is_empty()
    }
}

/// Runs workflows and scans one task at a time
pub struct WorkflowRunner<'a> {
    tasks: &'a TaskRegistry,
    runner: TaskRunner<'a>,
}

impl<'a> WorkflowRunner<'a> {
    pub fn new(tasks: &'a TaskRegistry, runner: TaskRunner<'a>) -> Self {
        Self { tasks, runner }
    }

    /// Run every step in order. A failing step is recorded and the
    /// workflow moves on; an unknown task aborts before anything runs.
    pub async fn run_workflow(
        &self,
        workflow: &Workflow,
        targets: &[String],
        options: &TaskOptions,
    ) -> Result<WorkflowReport> {
        for step in &workflow.steps {
            self.tasks.resolve(&step.task)?;
        }

        info!("Starting workflow '{}' on {} target(s)", workflow.name, targets.len());
        let mut report = WorkflowReport { name: workflow.name.clone(), ..Default::default() };

        for step in &workflow.steps {
            let task = self.tasks.resolve(&step.task)?;
            let inputs = match step.input {
                StepInput::Targets => targets.to_vec(),
                StepInput::Findings => report.findings.hosts(),
            };
            if inputs.is_empty() {
                info!("Skipping '{}': nothing to run on", step.task);
                continue;
            }

            let step_options = step.options.merged(options);
            match self.runner.run(task, &inputs, &step_options).await {
                Ok(run) => {
                    if !run.success() {
                        report.failed_steps.push(step.task.clone());
                    }
                    let added = report.findings.extend(run.findings);
                    info!("Step '{}' added {} new finding(s)", step.task, added);
                }
                Err(e) => {
                    warn!("Step '{}' failed: {}", step.task, e);
                    report.failed_steps.push(step.task.clone());
                }
            }
        }

        info!(
            "Workflow '{}' finished with {} finding(s)",
            workflow.name,
            report.findings.len()
        );
        Ok(report)
    }

    /// Validate the target, then run the scan's workflows in order
    pub async fn run_scan(
        &self,
        scan: &Scan,
        workflows: &WorkflowRegistry,
        target: &str,
        options: &TaskOptions,
    ) -> Result<WorkflowReport> {
        scan.check_target(target)?;
        let resolved = scan
            .workflows
            .iter()
            .map(|name| workflows.resolve(name))
            .collect::<Result<Vec<_>>>()?;

        info!("Starting scan '{}' on {}", scan.name, target);
        let mut report = WorkflowReport { name: scan.name.clone(), ..Default::default() };
        let targets = vec![target.trim().to_string()];

        for workflow in resolved {
            let result = self.run_workflow(workflow, &targets, options).await?;
            report.findings.extend(result.findings.into_vec());
            report
                .failed_steps
                .extend(result.failed_steps.into_iter().map(|s| format!("{}/{}", workflow.name, s)));
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output_types::Subdomain;

    fn subdomain(host: &str) -> Finding {
        Finding::Subdomain(Subdomain {
            host: host.to_string(),
            domain: "example.com".to_string(),
            sources: vec![],
        })
    }

    #[test]
    fn test_findings_dedup_keeps_first_seen_order() {
        let mut findings = Findings::new();
        assert_eq!(findings.extend(vec![subdomain("b.example.com"), subdomain("a.example.com")]), 2);
        assert_eq!(findings.extend(vec![subdomain("a.example.com"), subdomain("c.example.com")]), 1);

        let hosts = findings.hosts();
        assert_eq!(hosts, vec!["b.example.com", "a.example.com", "c.example.com"]);
    }

    #[test]
    fn test_hosts_are_distinct_across_types() {
        let mut findings = Findings::new();
        findings.extend(vec![
            subdomain("a.example.com"),
            Finding::Subdomain(Subdomain {
                host: "a.example.com".to_string(),
                domain: "example.com".to_string(),
                sources: vec!["crtsh".to_string()],
            }),
        ]);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings.hosts(), vec!["a.example.com"]);
    }
}

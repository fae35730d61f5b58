//! `cmd`, `workflow` and `scan` handlers

use crate::cli::dynamic::{self, Display};
use anyhow::{Context, Result};
use clap::ArgMatches;
use secsy_core::workflows::WorkflowRunner;
use secsy_core::{Finding, ProcessRunner, Registries, TaskRunner};
use std::io::{self, Write};
use tracing::{error, info};

/// Run one task; the exit code is the tool's own
pub async fn run_task(
    registries: &Registries,
    name: &str,
    matches: &ArgMatches,
    runner: &dyn ProcessRunner,
) -> Result<i32> {
    let task = registries.tasks.resolve(name)?;
    let display = Display::from_matches(matches);
    let options = dynamic::task_options(task, matches);
    let targets = dynamic::targets(matches);

    let run = TaskRunner::new(runner)
        .with_print_cmd(display.print_cmd)
        .run(task, &targets, &options)
        .await
        .with_context(|| format!("Failed to run '{}'", task.name))?;

    print_findings(&mut io::stdout().lock(), &run.findings, display.json)?;
    Ok(run.return_code)
}

pub async fn run_workflow(
    registries: &Registries,
    name: &str,
    matches: &ArgMatches,
    runner: &dyn ProcessRunner,
) -> Result<i32> {
    let workflow = registries.workflows.resolve(name)?;
    let display = Display::from_matches(matches);
    let task_runner = TaskRunner::new(runner).with_print_cmd(display.print_cmd);

    let report = WorkflowRunner::new(&registries.tasks, task_runner)
        .run_workflow(workflow, &dynamic::targets(matches), &dynamic::preset_options(matches))
        .await?;

    let findings = report.findings.iter().cloned().collect::<Vec<_>>();
    print_findings(&mut io::stdout().lock(), &findings, display.json)?;
    Ok(exit_code(&report.name, &report.failed_steps))
}

pub async fn run_scan(
    registries: &Registries,
    name: &str,
    matches: &ArgMatches,
    runner: &dyn ProcessRunner,
) -> Result<i32> {
    let scan = registries.scans.resolve(name)?;
    let display = Display::from_matches(matches);
    let target = dynamic::targets(matches).into_iter().next().unwrap_or_default();
    let task_runner = TaskRunner::new(runner).with_print_cmd(display.print_cmd);

    let report = WorkflowRunner::new(&registries.tasks, task_runner)
        .run_scan(scan, &registries.workflows, &target, &dynamic::preset_options(matches))
        .await?;

    let findings = report.findings.iter().cloned().collect::<Vec<_>>();
    print_findings(&mut io::stdout().lock(), &findings, display.json)?;
    Ok(exit_code(&report.name, &report.failed_steps))
}

fn exit_code(name: &str, failed_steps: &[String]) -> i32 {
    if failed_steps.is_empty() {
        info!("'{}' completed", name);
        0
    } else {
        error!("'{}' had failing steps: {}", name, failed_steps.join(", "));
        1
    }
}

/// One finding per line, either JSON or human-readable
pub fn print_findings<W: Write>(out: &mut W, findings: &[Finding], json: bool) -> Result<()> {
    for finding in findings {
        if json {
            writeln!(out, "{}", serde_json::to_string(finding)?)?;
        } else {
            writeln!(out, "{}", finding)?;
        }
    }
    Ok(())
}

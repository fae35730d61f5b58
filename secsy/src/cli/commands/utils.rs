//! `utils install` and `utils test`

use crate::cli::app::TestSuite;
use anyhow::Result;
use secsy_core::config::{TEST_COMMANDS_ENV, TestConfig};
use secsy_core::{ProcessRunner, RunOptions, TaskRegistry};
use tracing::{debug, info, warn};

/// Run the install command of each selected task. A failing install is
/// logged and the rest still run.
pub async fn install(
    registry: &TaskRegistry,
    cmds: Option<&str>,
    runner: &dyn ProcessRunner,
) -> Result<i32> {
    let selected = registry.select(cmds);
    debug!("Installing {} task(s)", selected.len());

    for task in selected {
        let Some(install_cmd) = &task.install_cmd else {
            debug!("Task '{}' has no install command", task.name);
            continue;
        };
        info!("Installing {}", task.name);
        match runner.run(install_cmd, &RunOptions::verbose()).await {
            Ok(result) if result.success() => info!("Installed {}", task.name),
            Ok(result) => warn!("Installing {} exited with {}", task.name, result.return_code),
            Err(e) => warn!("Installing {} failed: {}", task.name, e),
        }
    }
    Ok(0)
}

/// Run a test suite; the exit code is the suite's own
pub async fn run_test_suite(
    suite: &TestSuite,
    config: &TestConfig,
    runner: &dyn ProcessRunner,
) -> Result<i32> {
    let result = match suite {
        TestSuite::Integration => runner.run(&config.integration, &RunOptions::verbose()).await?,
        TestSuite::Lint => runner.run(&config.lint, &RunOptions::verbose()).await?,
        TestSuite::Unit { commands, coverage } => {
            let opts = RunOptions::verbose().with_env(TEST_COMMANDS_ENV, commands);
            let result = runner.run(&config.unit, &opts).await?;
            if *coverage {
                // Report whatever was collected even when tests failed
                if let Err(e) = runner.run(&config.coverage_report, &RunOptions::verbose()).await {
                    warn!("Coverage report failed: {}", e);
                }
            }
            result
        }
    };
    Ok(result.return_code)
}

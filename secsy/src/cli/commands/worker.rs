//! `worker`: hand over to the configured task-queue worker

use anyhow::Result;
use secsy_core::config::WorkerConfig;
use secsy_core::{ProcessRunner, RunOptions};
use tracing::info;

pub async fn execute(config: &WorkerConfig, runner: &dyn ProcessRunner) -> Result<i32> {
    info!("Starting worker");
    let opts = RunOptions { print_timestamp: true, print_line: true, ..Default::default() };
    let result = runner.run(&config.command, &opts).await?;
    Ok(result.return_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use secsy_core::CommandResult;
    use std::sync::Mutex;

    struct Recorder(Mutex<Vec<(String, RunOptions)>>);

    #[async_trait]
    impl ProcessRunner for Recorder {
        async fn run(&self, cmd: &str, opts: &RunOptions) -> secsy_core::Result<CommandResult> {
            self.0.lock().unwrap().push((cmd.to_string(), opts.clone()));
            Ok(CommandResult { return_code: 3, output: vec![] })
        }
    }

    #[tokio::test]
    async fn test_worker_runs_configured_command() {
        let recorder = Recorder(Mutex::new(Vec::new()));
        let config = WorkerConfig { command: "celery -A secsy.celery.app worker".to_string() };

        let code = execute(&config, &recorder).await.unwrap();

        assert_eq!(code, 3);
        let calls = recorder.0.lock().unwrap();
        assert_eq!(calls[0].0, "celery -A secsy.celery.app worker");
        assert!(calls[0].1.print_timestamp && calls[0].1.print_line);
        assert!(!calls[0].1.print_cmd);
    }
}

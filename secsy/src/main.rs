use anyhow::{Context, Result};
use clap::{ArgMatches, FromArgMatches};
use secsy_core::{CommandRunner, Config, ProcessRunner, Registries};
use tracing::debug;

mod cli;
mod logging;

use cli::commands::{run, utils, worker};
use cli::{Cli, Commands, EarlyArgs, UtilsSubcommand};
use logging::LoggingConfig;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    // Configuration decides which tasks exist, so it is read before the
    // full command line can be parsed
    let early = EarlyArgs::scan(&args);
    let config = Config::load(early.config.as_deref()).context("Failed to load configuration")?;
    LoggingConfig::new(config.debug, early.verbose).init();
    debug!("Configuration: {:?}", config);

    let registries = Registries::load(&config)?;
    let matches = cli::build_command(&registries).get_matches_from(args.iter());
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let runner = CommandRunner::new();
    let code = runtime.block_on(dispatch(&cli, &matches, &config, &registries, &runner))?;

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

async fn dispatch(
    cli: &Cli,
    matches: &ArgMatches,
    config: &Config,
    registries: &Registries,
    runner: &dyn ProcessRunner,
) -> Result<i32> {
    match &cli.command {
        Commands::Cmd => {
            let (name, sub) = selected(matches)?;
            run::run_task(registries, name, sub, runner).await
        }
        Commands::Workflow => {
            let (name, sub) = selected(matches)?;
            run::run_workflow(registries, name, sub, runner).await
        }
        Commands::Scan => {
            let (name, sub) = selected(matches)?;
            run::run_scan(registries, name, sub, runner).await
        }
        Commands::Utils(args) => match &args.subcommand {
            UtilsSubcommand::Install { cmds } => {
                utils::install(&registries.tasks, cmds.as_deref(), runner).await
            }
            UtilsSubcommand::Test { suite } => {
                utils::run_test_suite(suite, &config.test, runner).await
            }
        },
        Commands::Worker => worker::execute(&config.worker, runner).await,
    }
}

/// Name and matches of the task, workflow or scan under a group
fn selected(matches: &ArgMatches) -> Result<(&str, &ArgMatches)> {
    matches
        .subcommand()
        .and_then(|(_, group)| group.subcommand())
        .context("No subcommand given")
}

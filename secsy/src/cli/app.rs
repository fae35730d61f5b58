use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "secsy",
    version,
    about = "Secsy CLI",
    long_about = "Secsy wraps security reconnaissance tools behind one interface and composes them into workflows and scans."
)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Task, workflow and scan subcommands are attached at runtime from the
/// registries, see [`super::dynamic`].
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a command
    #[command(subcommand_required = true, arg_required_else_help = true)]
    Cmd,

    /// Run a workflow
    #[command(subcommand_required = true, arg_required_else_help = true)]
    Workflow,

    /// Run a scan
    #[command(subcommand_required = true, arg_required_else_help = true)]
    Scan,

    /// Run a utility
    Utils(UtilsCommand),

    /// Run a task-queue worker
    Worker,
}

#[derive(Debug, Args)]
pub struct UtilsCommand {
    #[command(subcommand)]
    pub subcommand: UtilsSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum UtilsSubcommand {
    /// Install commands
    Install {
        /// Comma-separated task names (all tasks when omitted)
        #[arg(value_name = "CMDS")]
        cmds: Option<String>,
    },

    /// Run secsy tests
    Test {
        #[command(subcommand)]
        suite: TestSuite,
    },
}

#[derive(Debug, Clone, Subcommand, PartialEq, Eq)]
pub enum TestSuite {
    /// Run the integration test suite
    Integration,

    /// Run unit tests
    Unit {
        /// Secsy commands to test (comma-separated)
        #[arg(short = 'c', long, default_value = "")]
        commands: String,

        /// Run coverage on results
        #[arg(short = 'x', long)]
        coverage: bool,
    },

    /// Run the linter
    Lint,
}

//! Runtime subcommands for tasks, workflows and scans
//!
//! The derive-based [`Cli`] declares the `cmd`, `workflow` and `scan`
//! groups empty; this module fills them from the registries and reads
//! option values back out of the matches.

use super::app::Cli;
use clap::{Arg, ArgAction, ArgMatches, Command, CommandFactory};
use secsy_core::Registries;
use secsy_core::tasks::{MetaOption, OptionKind, OptionSpec, TaskDescriptor, TaskOptions, cli_name};
use secsy_core::workflows::{Scan, Workflow};
use std::path::PathBuf;

/// Full command tree for this invocation
pub fn build_command(registries: &Registries) -> Command {
    Cli::command()
        .mut_subcommand("cmd", |group| group.subcommands(registries.tasks.iter().map(task_command)))
        .mut_subcommand("workflow", |group| {
            group.subcommands(registries.workflows.iter().map(workflow_command))
        })
        .mut_subcommand("scan", |group| group.subcommands(registries.scans.iter().map(scan_command)))
}

fn task_command(task: &TaskDescriptor) -> Command {
    let about = format!("{} [{}]", task.description, task.category);
    let mut command = Command::new(task.name.clone()).about(about).arg(
        Arg::new("targets")
            .value_name("TARGETS")
            .required(true)
            .num_args(1..)
            .help("Targets to run on"),
    );
    for opt in &task.opts {
        command = command.arg(option_arg(opt));
    }
    for meta in task.opt_key_map.supported() {
        command = command.arg(meta_arg(meta));
    }
    display_args(command)
}

fn workflow_command(workflow: &Workflow) -> Command {
    let about = format!("{} ({})", workflow.description, workflow.task_names().join(" -> "));
    let command = Command::new(workflow.name.clone()).about(about).arg(
        Arg::new("targets")
            .value_name("TARGETS")
            .required(true)
            .num_args(1..)
            .help("Targets to run on"),
    );
    display_args(MetaOption::ALL.into_iter().fold(command, |c, meta| c.arg(meta_arg(meta))))
}

fn scan_command(scan: &Scan) -> Command {
    let command = Command::new(scan.name.clone()).about(scan.description.clone()).arg(
        Arg::new("targets")
            .value_name("TARGET")
            .required(true)
            .num_args(1)
            .help(format!("Target, {}", scan.target_kind)),
    );
    display_args(MetaOption::ALL.into_iter().fold(command, |c, meta| c.arg(meta_arg(meta))))
}

fn option_arg(opt: &OptionSpec) -> Arg {
    let mut arg = Arg::new(opt.name.clone())
        .long(cli_name(&opt.name))
        .help(opt.help.clone());
    if let Some(short) = opt.short {
        arg = arg.short(short);
    }
    match opt.kind {
        OptionKind::Flag => arg.action(ArgAction::SetTrue),
        OptionKind::Int => {
            arg = arg.value_name("INT").value_parser(clap::value_parser!(i64));
            match &opt.default {
                Some(default) => arg.default_value(default.clone()),
                None => arg,
            }
        }
        OptionKind::Str => {
            arg = arg.value_name("VALUE");
            match &opt.default {
                Some(default) => arg.default_value(default.clone()),
                None => arg,
            }
        }
    }
}

fn meta_arg(meta: MetaOption) -> Arg {
    Arg::new(meta.name())
        .long(cli_name(meta.name()))
        .value_name("N")
        .value_parser(clap::value_parser!(u32))
        .help(meta.help())
}

fn display_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print findings as JSON lines"),
        )
        .arg(
            Arg::new("print_cmd")
                .long("print-cmd")
                .action(ArgAction::SetTrue)
                .help("Print each tool command line before running it"),
        )
}

/// How findings are shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Display {
    pub json: bool,
    pub print_cmd: bool,
}

impl Display {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self { json: matches.get_flag("json"), print_cmd: matches.get_flag("print_cmd") }
    }
}

pub fn targets(matches: &ArgMatches) -> Vec<String> {
    matches
        .get_many::<String>("targets")
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

/// Option values for a task subcommand
pub fn task_options(task: &TaskDescriptor, matches: &ArgMatches) -> TaskOptions {
    let mut options = TaskOptions::new();
    for opt in &task.opts {
        match opt.kind {
            OptionKind::Flag => {
                if matches.get_flag(&opt.name) {
                    options.enable(&opt.name);
                }
            }
            OptionKind::Int => {
                if let Some(value) = matches.get_one::<i64>(&opt.name) {
                    options.set(&opt.name, value.to_string());
                }
            }
            OptionKind::Str => {
                if let Some(value) = matches.get_one::<String>(&opt.name) {
                    options.set(&opt.name, value.clone());
                }
            }
        }
    }
    meta_options(&mut options, matches, &task.opt_key_map.supported());
    options
}

/// Meta option values for a workflow or scan subcommand
pub fn preset_options(matches: &ArgMatches) -> TaskOptions {
    let mut options = TaskOptions::new();
    meta_options(&mut options, matches, &MetaOption::ALL);
    options
}

fn meta_options(options: &mut TaskOptions, matches: &ArgMatches, metas: &[MetaOption]) {
    for meta in metas {
        if let Some(value) = matches.get_one::<u32>(meta.name()) {
            options.set(meta.name(), value.to_string());
        }
    }
}

/// Flags needed before the command tree exists: the config file decides
/// which external tasks are registered, and logging starts before that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EarlyArgs {
    pub config: Option<PathBuf>,
    pub verbose: u8,
}

impl EarlyArgs {
    pub fn scan(args: &[String]) -> Self {
        let mut early = Self::default();
        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--" => break,
                "--config" => early.config = iter.next().map(PathBuf::from),
                "--verbose" => early.verbose = early.verbose.saturating_add(1),
                other => {
                    if let Some(path) = other.strip_prefix("--config=") {
                        early.config = Some(PathBuf::from(path));
                    } else if other.len() > 1
                        && other.starts_with('-')
                        && !other.starts_with("--")
                        && other[1..].chars().all(|c| c == 'v')
                    {
                        early.verbose = early.verbose.saturating_add((other.len() - 1) as u8);
                    }
                }
            }
        }
        early
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_command_tree_is_consistent() {
        build_command(&Registries::builtin()).debug_assert();
    }

    #[test]
    fn test_task_subcommand_options() {
        let registries = Registries::builtin();
        let matches = build_command(&registries)
            .try_get_matches_from(args(&[
                "secsy", "cmd", "dnsxbrute", "example.com", "-w", "/opt/words.txt", "--threads", "20",
                "--json",
            ]))
            .unwrap();

        let (group, group_matches) = matches.subcommand().unwrap();
        assert_eq!(group, "cmd");
        let (name, task_matches) = group_matches.subcommand().unwrap();
        assert_eq!(name, "dnsxbrute");

        let task = registries.tasks.resolve(name).unwrap();
        let options = task_options(task, task_matches);
        assert_eq!(options.get("wordlist"), Some("/opt/words.txt"));
        assert_eq!(options.get("threads"), Some("20"));
        assert_eq!(options.get("rate_limit"), None);
        assert_eq!(targets(task_matches), vec!["example.com"]);
        assert_eq!(Display::from_matches(task_matches), Display { json: true, print_cmd: false });
    }

    #[test]
    fn test_external_option_cannot_shadow_meta_flag() {
        use secsy_core::Config;
        use secsy_core::config::TasksConfig;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("clash.toml"),
            "name = \"clash\"\ncmd = \"clash\"\ninput_flag = \"-u\"\n\
             output_map = { type = \"subdomain\" }\n\
             [opt_key_map]\nrate_limit = \"rl\"\n\
             [[opts]]\nname = \"rate-limit\"\ntype = \"int\"\n",
        )
        .unwrap();
        let config = Config {
            tasks: TasksConfig { external_dir: Some(dir.path().to_path_buf()) },
            ..Config::default()
        };

        let registries = Registries::load(&config).unwrap();
        assert!(!registries.tasks.contains("clash"));

        let command = build_command(&registries);
        command.clone().debug_assert();
        let result = command.try_get_matches_from(args(&[
            "secsy", "cmd", "naabu", "10.0.0.1", "--rate-limit", "5",
        ]));
        assert!(result.is_ok());
    }

    #[test]
    fn test_task_help_shows_category() {
        let command = build_command(&Registries::builtin());
        let about = command
            .find_subcommand("cmd")
            .and_then(|group| group.find_subcommand("naabu"))
            .and_then(|task| task.get_about())
            .map(|about| about.to_string())
            .unwrap();
        assert_eq!(about, "Scan hosts for open ports [recon/port]");
    }

    #[test]
    fn test_unsupported_meta_option_is_rejected() {
        let result = build_command(&Registries::builtin()).try_get_matches_from(args(&[
            "secsy", "cmd", "subfinder", "example.com", "--retries", "3",
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_int_option_is_validated() {
        let result = build_command(&Registries::builtin()).try_get_matches_from(args(&[
            "secsy", "cmd", "subfinder", "example.com", "--max-time", "soon",
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_task_is_rejected() {
        let result = build_command(&Registries::builtin())
            .try_get_matches_from(args(&["secsy", "cmd", "nmap", "example.com"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_scan_takes_one_target() {
        let command = build_command(&Registries::builtin());
        let matches = command
            .clone()
            .try_get_matches_from(args(&["secsy", "scan", "host", "10.0.0.1", "--rate-limit", "10"]))
            .unwrap();
        let scan_matches = matches.subcommand_matches("scan").unwrap().subcommand_matches("host").unwrap();
        assert_eq!(targets(scan_matches), vec!["10.0.0.1"]);
        assert_eq!(preset_options(scan_matches).get("rate_limit"), Some("10"));

        let result = command.try_get_matches_from(args(&["secsy", "scan", "host", "a.com", "b.com"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_early_args() {
        let early = EarlyArgs::scan(&args(&["secsy", "-vv", "--config", "/etc/secsy.toml", "worker"]));
        assert_eq!(early, EarlyArgs { config: Some(PathBuf::from("/etc/secsy.toml")), verbose: 2 });

        let early = EarlyArgs::scan(&args(&["secsy", "cmd", "dnsxbrute", "--config=a.toml", "-w", "x"]));
        assert_eq!(early, EarlyArgs { config: Some(PathBuf::from("a.toml")), verbose: 0 });

        let early = EarlyArgs::scan(&args(&["secsy", "--", "--verbose"]));
        assert_eq!(early, EarlyArgs::default());
    }
}

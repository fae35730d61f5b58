//! Declarative task descriptors
//!
//! A [`TaskDescriptor`] says how to invoke one external binary: which flags
//! enable JSON output and take input, how shared options are spelled by the
//! tool, which tool-specific options exist and how output lines become
//! findings. Descriptors are plain data; [`TaskDescriptor::build_command`]
//! turns one into an argv.

use crate::error::{Result, SecsyError};
use crate::tasks::output_map::OutputMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Names the CLI adds to every task subcommand
pub const RESERVED_OPTION_NAMES: [&str; 6] =
    ["targets", "json", "print_cmd", "verbose", "config", "help"];
/// Short flags taken by help and the global verbosity flag
pub const RESERVED_SHORTS: [char; 2] = ['h', 'v'];

/// Options every task may accept, spelled differently by each tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetaOption {
    RateLimit,
    Retries,
    Threads,
}

impl MetaOption {
    pub const ALL: [MetaOption; 3] = [MetaOption::RateLimit, MetaOption::Retries, MetaOption::Threads];

    pub fn name(self) -> &'static str {
        match self {
            MetaOption::RateLimit => "rate_limit",
            MetaOption::Retries => "retries",
            MetaOption::Threads => "threads",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            MetaOption::RateLimit => "Max requests per second",
            MetaOption::Retries => "Retries on failure",
            MetaOption::Threads => "Number of concurrent threads",
        }
    }
}

/// Native flag names for the meta options a tool supports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptKeyMap {
    pub rate_limit: Option<String>,
    pub retries: Option<String>,
    pub threads: Option<String>,
}

impl OptKeyMap {
    pub fn get(&self, option: MetaOption) -> Option<&str> {
        match option {
            MetaOption::RateLimit => self.rate_limit.as_deref(),
            MetaOption::Retries => self.retries.as_deref(),
            MetaOption::Threads => self.threads.as_deref(),
        }
    }

    /// Meta options the tool understands, in emission order
    pub fn supported(&self) -> Vec<MetaOption> {
        MetaOption::ALL.into_iter().filter(|o| self.get(*o).is_some()).collect()
    }
}

/// Value type of a task option
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    #[default]
    Str,
    Int,
    Flag,
}

/// A tool-specific option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSpec {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: OptionKind,
    /// Native flag name, defaults to `name` with `_` replaced by `-`
    #[serde(default)]
    pub flag: Option<String>,
    #[serde(default)]
    pub short: Option<char>,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub help: String,
}

impl OptionSpec {
    pub fn new(name: &str, kind: OptionKind, help: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            flag: None,
            short: None,
            default: None,
            help: help.to_string(),
        }
    }

    pub fn with_flag(mut self, flag: &str) -> Self {
        self.flag = Some(flag.to_string());
        self
    }

    pub fn with_short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn with_default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }

    pub fn native_flag(&self) -> String {
        self.flag.clone().unwrap_or_else(|| self.name.replace('_', "-"))
    }
}

/// Tool family, shown in task help
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ReconDns,
    ReconPort,
    #[default]
    Other,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::ReconDns => "recon/dns",
            Category::ReconPort => "recon/port",
            Category::Other => "other",
        })
    }
}

/// Immutable description of one wrapped tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Category,
    /// Binary to run
    pub cmd: String,
    #[serde(default)]
    pub json_flag: Option<String>,
    /// Flag taking a single target
    #[serde(default)]
    pub input_flag: Option<String>,
    /// Flag taking a file of targets, one per line
    #[serde(default)]
    pub file_flag: Option<String>,
    #[serde(default = "default_opt_prefix")]
    pub opt_prefix: String,
    #[serde(default)]
    pub opt_key_map: OptKeyMap,
    #[serde(default)]
    pub opts: Vec<OptionSpec>,
    pub output_map: OutputMap,
    #[serde(default)]
    pub install_cmd: Option<String>,
}

fn default_opt_prefix() -> String {
    "-".to_string()
}

/// Long flag spelling of an option name
pub fn cli_name(name: &str) -> String {
    name.replace('_', "-")
}

/// User-supplied option values, keyed by option name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskOptions {
    values: BTreeMap<String, String>,
    flags: BTreeSet<String>,
}

impl TaskOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    pub fn enable(&mut self, name: &str) -> &mut Self {
        self.flags.insert(name.to_string());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    /// Values from `other` win
    pub fn merged(&self, other: &TaskOptions) -> TaskOptions {
        let mut merged = self.clone();
        merged.values.extend(other.values.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged.flags.extend(other.flags.iter().cloned());
        merged
    }
}

/// A ready-to-run invocation
#[derive(Debug)]
pub struct CommandLine {
    pub argv: Vec<String>,
    /// Target list handed over via `file_flag`; removed on drop
    input_file: Option<NamedTempFile>,
}

impl CommandLine {
    /// Shell-quoted form for `sh -c`
    pub fn to_shell_string(&self) -> String {
        shell_words::join(&self.argv)
    }

    pub fn input_file(&self) -> Option<&Path> {
        self.input_file.as_ref().map(|f| f.path())
    }
}

impl TaskDescriptor {
    /// Check internal consistency; run at registration
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SecsyError::descriptor("<unnamed>", "name is empty"));
        }
        if self.cmd.trim().is_empty() {
            return Err(SecsyError::descriptor(&self.name, "cmd is empty"));
        }
        if self.input_flag.is_none() && self.file_flag.is_none() {
            return Err(SecsyError::descriptor(&self.name, "needs an input_flag or a file_flag"));
        }

        // Compared in CLI spelling: `max_time` and `max-time` are both `--max-time`
        let mut names = HashSet::new();
        let mut shorts = HashSet::new();
        for opt in &self.opts {
            let long = cli_name(&opt.name);
            let reserved = RESERVED_OPTION_NAMES.iter().any(|r| cli_name(r) == long)
                || MetaOption::ALL.iter().any(|m| cli_name(m.name()) == long);
            if reserved {
                return Err(SecsyError::descriptor(
                    &self.name,
                    format!("option '{}' is reserved", opt.name),
                ));
            }
            if !names.insert(long) {
                return Err(SecsyError::descriptor(
                    &self.name,
                    format!("duplicate option '{}'", opt.name),
                ));
            }
            if let Some(short) = opt.short {
                if RESERVED_SHORTS.contains(&short) || !shorts.insert(short) {
                    return Err(SecsyError::descriptor(
                        &self.name,
                        format!("short flag '-{}' is taken", short),
                    ));
                }
            }
            if opt.kind == OptionKind::Int {
                if let Some(default) = &opt.default {
                    if default.parse::<i64>().is_err() {
                        return Err(SecsyError::descriptor(
                            &self.name,
                            format!("default '{}' of '{}' is not an integer", default, opt.name),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Build the argv for `targets` with the given options
    pub fn build_command(&self, targets: &[String], options: &TaskOptions) -> Result<CommandLine> {
        let mut argv = vec![self.cmd.clone()];
        if let Some(json_flag) = &self.json_flag {
            argv.push(json_flag.clone());
        }

        let mut input_file = None;
        match targets {
            [] => return Err(SecsyError::NoTargets { task: self.name.clone() }),
            [single] if self.input_flag.is_some() => {
                argv.extend(self.input_flag.clone());
                argv.push(single.clone());
            }
            many => {
                // Without a file flag the tool takes one target per invocation
                let Some(flag) = self.file_flag.clone() else {
                    return Err(SecsyError::descriptor(
                        &self.name,
                        format!("needs a file_flag to take {} targets", many.len()),
                    ));
                };
                let mut file = NamedTempFile::new()?;
                for target in many {
                    writeln!(file, "{}", target)?;
                }
                file.flush()?;
                argv.push(flag);
                argv.push(file.path().display().to_string());
                input_file = Some(file);
            }
        }

        for opt in &self.opts {
            let flag = format!("{}{}", self.opt_prefix, opt.native_flag());
            match opt.kind {
                OptionKind::Flag => {
                    if options.is_enabled(&opt.name) || opt.default.as_deref() == Some("true") {
                        argv.push(flag);
                    }
                }
                OptionKind::Str | OptionKind::Int => {
                    if let Some(value) = options.get(&opt.name).or(opt.default.as_deref()) {
                        argv.push(flag);
                        argv.push(value.to_string());
                    }
                }
            }
        }

        for meta in MetaOption::ALL {
            if let (Some(native), Some(value)) = (self.opt_key_map.get(meta), options.get(meta.name())) {
                argv.push(format!("{}{}", self.opt_prefix, native));
                argv.push(value.to_string());
            }
        }

        Ok(CommandLine { argv, input_file })
    }
}

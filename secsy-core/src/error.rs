//! Error types for secsy operations
//!
//! This module defines strongly-typed errors for configuration, descriptor
//! loading and task execution, using thiserror for the trait implementations.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for secsy operations
#[derive(Debug, Error)]
pub enum SecsyError {
    /// Configuration could not be loaded or an environment flag is malformed
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Filesystem or pipe error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The external process could not be started
    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The wrapped binary is not on PATH
    #[error("'{cmd}' not found for task '{task}' (try `secsy utils install {task}`)")]
    MissingBinary { task: String, cmd: String },

    #[error("Unknown task '{name}'")]
    UnknownTask { name: String },

    #[error("Unknown workflow '{name}'")]
    UnknownWorkflow { name: String },

    #[error("Unknown scan '{name}'")]
    UnknownScan { name: String },

    /// Target does not match what the scan accepts
    #[error("Invalid target '{target}': expected {expected}")]
    InvalidTarget { target: String, expected: String },

    #[error("Task '{task}' needs at least one target")]
    NoTargets { task: String },

    /// A task descriptor is inconsistent (duplicate name, bad option, ...)
    #[error("Invalid descriptor '{name}': {message}")]
    Descriptor { name: String, message: String },

    /// TOML file could not be parsed
    #[error("Failed to parse {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, SecsyError>;

impl SecsyError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn descriptor(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Descriptor { name: name.into(), message: message.into() }
    }
}

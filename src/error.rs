//! Error types for sitetask

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sitetask operations
pub type Result<T> = std::result::Result<T, SitetaskError>;

/// Main error type for sitetask
#[derive(Error, Debug)]
pub enum SitetaskError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Task execution errors
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Configuration parsing and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to read config file '{path}': {error}")]
    Read { path: PathBuf, error: String },

    #[error("'{0}' is not a valid environment variable name")]
    InvalidEnvName(String),

    #[error("Content target '{0}' must be a relative path")]
    AbsoluteTarget(PathBuf),

    #[error("Failed to load env file '{path}': {error}")]
    EnvFile { path: PathBuf, error: String },

    #[error("Task '{0}' is not defined")]
    TaskNotFound(String),
}

/// Task execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Command failed with {}", describe_exit(.0))]
    CommandFailed(Option<i32>),

    #[error("Failed waiting for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Command was cancelled")]
    Cancelled,

    #[error(transparent)]
    Symlink(#[from] SymlinkError),

    #[error("Invalid argument template: {0}")]
    Template(#[from] InterpolationError),
}

/// No exit code means the child was terminated by a signal
fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "a signal".to_string(),
    }
}

/// Errors from creating the content symlink
#[derive(Error, Debug)]
pub enum SymlinkError {
    /// Something already occupies the link path; nothing was changed
    #[error("'{0}' already exists")]
    AlreadyExists(PathBuf),

    #[error("reading symlink path file info: {0}")]
    Metadata(#[source] io::Error),

    #[error(transparent)]
    Create(io::Error),
}

impl SymlinkError {
    /// Whether the link path was already taken.
    ///
    /// A dangling symlink passes the metadata check but makes creation fail
    /// with `AlreadyExists`, so both cases count.
    pub fn is_already_exists(&self) -> bool {
        match self {
            SymlinkError::AlreadyExists(_) => true,
            SymlinkError::Create(err) => err.kind() == io::ErrorKind::AlreadyExists,
            SymlinkError::Metadata(_) => false,
        }
    }
}

/// Argument template interpolation errors
#[derive(Error, Debug)]
pub enum InterpolationError {
    #[error("Variable '{0}' is not defined")]
    UndefinedVariable(String),
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;

/// Specialized result type for interpolation operations
pub type InterpolationResult<T> = std::result::Result<T, InterpolationError>;

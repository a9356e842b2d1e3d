//! Core configuration types
//!
//! This module defines the data structures that represent a sitetask.yml file.
//! Every key is optional; defaults describe the standard Hugo blog layout.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Top-level configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Site generator invocation
    #[serde(default)]
    pub generator: Generator,

    /// Content symlink location
    #[serde(default)]
    pub content: Content,

    /// Production build settings
    #[serde(default)]
    pub production: Production,

    /// Development server settings
    #[serde(default)]
    pub server: Server,

    /// What to do when the generator exits unsuccessfully
    #[serde(default)]
    pub on_failure: FailurePolicy,

    /// Dotenv file loaded before any task runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_file: Option<PathBuf>,
}

/// The external site generator
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Generator {
    /// Binary name, resolved on PATH
    #[serde(default = "default_binary")]
    pub binary: String,

    /// Site source directory, passed as `--source`
    #[serde(default = "default_source")]
    pub source: String,
}

impl Default for Generator {
    fn default() -> Self {
        Generator {
            binary: default_binary(),
            source: default_source(),
        }
    }
}

/// Symlink that pulls the content repository into the site
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Content {
    /// Where the link is created, relative to the project root
    #[serde(default = "default_link")]
    pub link: PathBuf,

    /// What the link points to, relative to the link's directory
    #[serde(default = "default_target")]
    pub target: PathBuf,
}

impl Default for Content {
    fn default() -> Self {
        Content {
            link: default_link(),
            target: default_target(),
        }
    }
}

/// Production build settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Production {
    /// Arguments appended after `--source`; `${base_url}` is expanded
    #[serde(default = "default_production_args")]
    pub args: Vec<String>,

    /// Environment overrides for the build
    #[serde(default = "default_production_environment")]
    pub environment: BTreeMap<String, String>,
}

impl Default for Production {
    fn default() -> Self {
        Production {
            args: default_production_args(),
            environment: default_production_environment(),
        }
    }
}

/// Development server settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Server {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Server {
            port: default_port(),
        }
    }
}

/// How a failed generator run is reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Print the failure and carry on as if the run succeeded
    #[default]
    #[serde(alias = "log-and-continue")]
    Log,

    /// Return the failure to the caller
    #[serde(alias = "fail-fast")]
    Fail,
}

fn default_binary() -> String {
    "hugo".to_string()
}

fn default_source() -> String {
    "./hugo".to_string()
}

fn default_link() -> PathBuf {
    PathBuf::from("./hugo/content")
}

fn default_target() -> PathBuf {
    PathBuf::from("../blog-content")
}

fn default_production_args() -> Vec<String> {
    ["--gc", "--minify", "--baseURL", "${base_url}"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_production_environment() -> BTreeMap<String, String> {
    ["HUGO_ENVIRONMENT", "HUGO_ENV"]
        .iter()
        .map(|k| (k.to_string(), "production".to_string()))
        .collect()
}

fn default_port() -> u16 {
    1313
}

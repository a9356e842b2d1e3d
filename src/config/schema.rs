//! Configuration validation
//!
//! This module provides validation logic for configuration files.

use crate::config::types::{Config, Content, Generator, Production};
use crate::error::{ConfigError, ConfigResult};
use crate::runner::placeholders;
use regex::Regex;
use std::sync::LazyLock;

static ENV_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid env name pattern"));

/// Placeholders a production argument template may use
const PRODUCTION_VARS: &[&str] = &["base_url"];

/// Validate a complete configuration
pub fn validate_config(config: &Config) -> ConfigResult<()> {
    validate_generator(&config.generator)?;
    validate_content(&config.content)?;
    validate_production(&config.production)?;

    if config.server.port == 0 {
        return Err(ConfigError::Invalid(
            "server.port must be between 1 and 65535".to_string(),
        ));
    }

    Ok(())
}

fn validate_generator(generator: &Generator) -> ConfigResult<()> {
    if generator.binary.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "generator.binary must not be empty".to_string(),
        ));
    }
    if generator.source.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "generator.source must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_content(content: &Content) -> ConfigResult<()> {
    if content.link.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("content.link must not be empty".to_string()));
    }
    if content.target.as_os_str().is_empty() {
        return Err(ConfigError::Invalid(
            "content.target must not be empty".to_string(),
        ));
    }
    if content.target.is_absolute() {
        return Err(ConfigError::AbsoluteTarget(content.target.clone()));
    }
    Ok(())
}

fn validate_production(production: &Production) -> ConfigResult<()> {
    for name in production.environment.keys() {
        if !is_valid_env_name(name) {
            return Err(ConfigError::InvalidEnvName(name.clone()));
        }
    }

    for arg in &production.args {
        for var in placeholders(arg) {
            if !PRODUCTION_VARS.contains(&var) {
                return Err(ConfigError::Invalid(format!(
                    "unknown placeholder '${{{}}}' in production.args (available: {})",
                    var,
                    PRODUCTION_VARS.join(", ")
                )));
            }
        }
    }

    Ok(())
}

/// Whether `name` is usable as an environment variable name
pub fn is_valid_env_name(name: &str) -> bool {
    ENV_NAME.is_match(name)
}

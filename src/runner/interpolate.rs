//! Variable interpolation for argument templates
//!
//! Configured arguments may reference task inputs with the `${var}` syntax,
//! e.g. `--baseURL ${base_url}`.

use crate::error::{InterpolationError, InterpolationResult};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid placeholder pattern"));

/// Replace every `${var}` in `s`. Undefined variables are an error.
///
/// Substituted values are not scanned again, so a value containing `${...}`
/// is passed through literally.
pub fn interpolate(s: &str, vars: &HashMap<String, String>) -> InterpolationResult<String> {
    if let Some(missing) = placeholders(s).find(|name| !vars.contains_key(*name)) {
        return Err(InterpolationError::UndefinedVariable(missing.to_string()));
    }

    let result = PLACEHOLDER.replace_all(s, |caps: &Captures| vars[&caps[1]].clone());
    Ok(result.into_owned())
}

/// Interpolate a list of strings
pub fn interpolate_list(
    list: &[String],
    vars: &HashMap<String, String>,
) -> InterpolationResult<Vec<String>> {
    list.iter().map(|s| interpolate(s, vars)).collect()
}

/// Names of all placeholders referenced by `s`, in order of appearance
pub fn placeholders(s: &str) -> impl Iterator<Item = &str> {
    PLACEHOLDER
        .captures_iter(s)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

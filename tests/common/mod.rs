//! Common test utilities

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create a project directory with a `hugo/` site dir and a `blog-content/`
/// sibling, laid out like a real blog checkout.
pub fn create_project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir(temp_dir.path().join("hugo")).unwrap();
    fs::create_dir(temp_dir.path().join("blog-content")).unwrap();
    temp_dir
}

/// Write a sitetask.yml into `dir`
pub fn write_config(dir: &Path, content: &str) -> PathBuf {
    let config_path = dir.join("sitetask.yml");
    fs::write(&config_path, content).unwrap();
    config_path
}

/// Write an executable shell script standing in for the site generator.
///
/// It prints its arguments on one line as `args=<a b c>`, the production
/// environment variables, writes `to-stderr` on stderr, and exits with
/// `exit_code`.
#[cfg(unix)]
pub fn fake_generator(dir: &Path, exit_code: i32) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("fake-hugo");
    let body = format!(
        r#"#!/bin/sh
echo "args=$*"
echo "HUGO_ENV=${{HUGO_ENV:-unset}}"
echo "HUGO_ENVIRONMENT=${{HUGO_ENVIRONMENT:-unset}}"
echo "to-stderr" 1>&2
exit {}
"#,
        exit_code
    );
    fs::write(&script, body).unwrap();

    let mut perms = fs::metadata(&script).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&script, perms).unwrap();
    script
}

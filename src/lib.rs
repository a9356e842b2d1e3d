//! sitetask - build and dev tasks for a Hugo static site
//!
//! Wraps the site generator binary, keeps the content symlink in place, and
//! exposes the production build, development server and tidy tasks.

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod runner;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use error::{Result, SitetaskError};

/// Current version of sitetask
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

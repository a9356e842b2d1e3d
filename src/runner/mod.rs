//! Task execution engine
//!
//! This module handles running generator commands, expanding argument
//! templates, and executing tasks with their dependencies.

pub mod command;
pub mod context;
pub mod interpolate;
pub mod task;

// Re-export main types
pub use command::*;
pub use context::*;
pub use interpolate::*;
pub use task::*;

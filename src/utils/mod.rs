//! Filesystem helpers

pub mod symlink;

pub use symlink::*;

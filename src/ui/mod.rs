//! Terminal output helpers
//!
//! Colored pass-through writers used for child process output.

pub mod writer;

pub use writer::*;

//! Pass-through writers
//!
//! A `ColorWriter` forwards every byte it receives to an inner writer,
//! bracketed by terminal color codes when coloring is enabled. The bytes
//! themselves are never decoded, filtered or rewritten.

use colored::control::SHOULD_COLORIZE;
use colored::Color;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

/// Writer that colors everything written through it
#[derive(Debug, Clone)]
pub struct ColorWriter<W> {
    color: Color,
    inner: W,
}

impl<W: Write> ColorWriter<W> {
    /// Wrap `inner`, rendering all output in `color`
    pub fn new(color: Color, inner: W) -> Self {
        ColorWriter { color, inner }
    }

    /// Writer used for a child's standard output
    pub fn success(inner: W) -> Self {
        Self::new(Color::Green, inner)
    }

    /// Writer used for a child's standard error and diagnostics
    pub fn failure(inner: W) -> Self {
        Self::new(Color::Red, inner)
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

const RESET: &[u8] = b"\x1B[0m";

impl<W: Write> Write for ColorWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        if SHOULD_COLORIZE.should_colorize() {
            // One write per chunk keeps it whole on a shared sink.
            let prefix = format!("\x1B[{}m", self.color.to_fg_str());
            let mut chunk = Vec::with_capacity(prefix.len() + buf.len() + RESET.len());
            chunk.extend_from_slice(prefix.as_bytes());
            chunk.extend_from_slice(buf);
            chunk.extend_from_slice(RESET);
            self.inner.write_all(&chunk)?;
        } else {
            self.inner.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Cloneable handle to one sink shared by several writers
#[derive(Debug)]
pub struct SharedWriter<W> {
    inner: Arc<Mutex<W>>,
}

impl<W> SharedWriter<W> {
    pub fn new(inner: W) -> Self {
        SharedWriter {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Lock the underlying sink. A poisoned lock is recovered since the sink
    /// holds no invariants of its own.
    pub fn lock(&self) -> MutexGuard<'_, W> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<W> Clone for SharedWriter<W> {
    fn clone(&self) -> Self {
        SharedWriter {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W: Write> Write for SharedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.lock().write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock().flush()
    }
}

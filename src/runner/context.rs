//! Execution context for task running
//!
//! The context tracks all the state needed during one sitetask invocation.

use crate::config::FailurePolicy;
use crate::runner::TaskId;
use std::collections::HashSet;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

/// Execution context that tracks state during task execution
pub struct Context {
    /// Project root; commands run here and relative paths resolve against it
    pub working_dir: PathBuf,

    /// What a failed generator run means for the caller
    pub failure_policy: FailurePolicy,

    /// Cancels running commands when triggered
    pub cancel: CancelSignal,

    /// Tasks that already ran in this invocation
    pub completed: HashSet<TaskId>,

    /// Verbosity level
    pub verbosity: Verbosity,
}

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    Normal = 2,
    Verbose = 3,
}

impl Context {
    /// Create a new context with default settings
    pub fn new() -> Self {
        Context {
            working_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            failure_policy: FailurePolicy::default(),
            cancel: CancelSignal::new(),
            completed: HashSet::new(),
            verbosity: Verbosity::Normal,
        }
    }

    /// Create a context with a specific working directory
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = dir;
        self
    }

    /// Set the failure policy
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Use an existing cancellation signal
    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    /// Set verbosity level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Record that a task finished
    pub fn mark_completed(&mut self, task: TaskId) {
        self.completed.insert(task);
    }

    /// Whether a task already finished in this invocation
    pub fn is_completed(&self, task: TaskId) -> bool {
        self.completed.contains(&task)
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("[INFO] {}", message);
        }
    }

    /// Print debug message (only in verbose mode)
    pub fn print_debug(&self, message: &str) {
        if self.verbosity >= Verbosity::Verbose {
            eprintln!("[DEBUG] {}", message);
        }
    }

    /// Print task start message
    pub fn print_task_start(&self, task: TaskId) {
        self.print_info(&format!("Running task: {}", task));
    }

    /// Print task complete message
    pub fn print_task_complete(&self, task: TaskId) {
        self.print_debug(&format!("Task completed: {}", task));
    }

    /// Print task skip message
    pub fn print_task_skip(&self, task: TaskId, reason: &str) {
        self.print_debug(&format!("Skipping task '{}': {}", task, reason));
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable cancellation handle shared between the CLI and running commands
#[derive(Debug, Clone)]
pub struct CancelSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        CancelSignal { tx: Arc::new(tx) }
    }

    /// Trigger cancellation. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

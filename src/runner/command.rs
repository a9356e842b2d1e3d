//! Command execution
//!
//! This module builds and runs external generator commands. Output from the
//! child is streamed through colored pass-through writers: stdout in green,
//! stderr in red, both onto the same sink.

use crate::config::FailurePolicy;
use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::Context;
use crate::ui::{ColorWriter, SharedWriter};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command as TokioCommand;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A command line to run: program, ordered arguments and environment overrides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    env: BTreeMap<String, String>,
}

impl CommandSpec {
    /// Start a command for `program` with no arguments
    pub fn new(program: impl Into<String>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    /// Start a command for `program` with initial arguments
    pub fn with_args<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(program).args(args)
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append arguments in order
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment override. A later value for the same name wins.
    pub fn env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }

    /// Set several environment overrides
    pub fn envs<I, K, V>(self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        vars.into_iter().fold(self, |cmd, (k, v)| cmd.env(k, v))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn get_envs(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Shell-like rendering for log output
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the command with output on stdout
    pub async fn run(&self, ctx: &Context) -> ExecutionResult<()> {
        self.run_to(ctx, io::stdout()).await
    }

    /// Run the command, writing colored output to `sink`.
    ///
    /// A spawn failure or unsuccessful exit is written to the sink as
    /// `failed to run command:` plus the error. Under [`FailurePolicy::Log`]
    /// the run still reports success; under [`FailurePolicy::Fail`] the error
    /// is returned. Cancellation is always returned as an error.
    pub async fn run_to<W>(&self, ctx: &Context, sink: W) -> ExecutionResult<()>
    where
        W: Write + Send + 'static,
    {
        let sink = SharedWriter::new(sink);
        let stdout = ColorWriter::success(sink.clone());
        let mut stderr = ColorWriter::failure(sink);

        ctx.print_debug(&format!("[RUN] {}", self.display()));

        let result = self.execute(ctx, stdout, stderr.clone()).await;
        let Err(err) = result else {
            return Ok(());
        };

        let message = format!("failed to run command:\n{}\n", err);
        if let Err(write_err) = stderr.write_all(message.as_bytes()) {
            warn!(error = %write_err, "could not write command failure");
        }

        let cancelled = matches!(err, ExecutionError::Cancelled);
        if cancelled || ctx.failure_policy == FailurePolicy::Fail {
            return Err(err);
        }

        warn!(program = %self.program, error = %err, "command failed, continuing");
        Ok(())
    }

    async fn execute<W>(
        &self,
        ctx: &Context,
        stdout: ColorWriter<SharedWriter<W>>,
        stderr: ColorWriter<SharedWriter<W>>,
    ) -> ExecutionResult<()>
    where
        W: Write + Send + 'static,
    {
        if ctx.cancel.is_cancelled() {
            return Err(ExecutionError::Cancelled);
        }

        let mut command = TokioCommand::new(&self.program);
        command
            .args(&self.args)
            .envs(&self.env)
            .current_dir(&ctx.working_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        info!(cmd = %self.display(), dir = %ctx.working_dir.display(), "spawning command");

        let mut child = command.spawn().map_err(|source| ExecutionError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        // Both pipes are drained while the child runs so neither can fill up.
        let pumps: Vec<JoinHandle<io::Result<()>>> = [
            child.stdout.take().map(|out| tokio::spawn(pump(out, stdout))),
            child.stderr.take().map(|err| tokio::spawn(pump(err, stderr))),
        ]
        .into_iter()
        .flatten()
        .collect();

        let waited: Option<io::Result<ExitStatus>> = tokio::select! {
            status = child.wait() => Some(status),
            _ = ctx.cancel.cancelled() => None,
        };

        let status = match waited {
            Some(status) => status.map_err(|source| ExecutionError::Wait {
                program: self.program.clone(),
                source,
            })?,
            None => {
                warn!(program = %self.program, "cancelled, killing child");
                if let Err(err) = child.kill().await {
                    debug!(error = %err, "kill after cancellation failed");
                }
                for pump in pumps {
                    pump.abort();
                }
                return Err(ExecutionError::Cancelled);
            }
        };

        for pump in pumps {
            match pump.await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => debug!(error = %err, "output stream closed with error"),
                Err(err) => debug!(error = %err, "output pump did not finish"),
            }
        }

        info!(program = %self.program, code = ?status.code(), success = status.success(), "command exited");

        if !status.success() {
            return Err(ExecutionError::CommandFailed(status.code()));
        }

        Ok(())
    }
}

/// Copy a child stream into `writer` line by line until EOF
async fn pump<R, W>(reader: R, mut writer: W) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: Write,
{
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        writer.write_all(&line)?;
    }

    writer.flush()
}

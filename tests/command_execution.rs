//! Integration tests for running generator commands

#![cfg(unix)]

mod common;

use colored::Colorize;
use sitetask::config::{Config, FailurePolicy};
use sitetask::error::{ExecutionError, SitetaskError};
use sitetask::runner::{CommandSpec, Context, Task, TaskId, Verbosity};
use sitetask::ui::SharedWriter;
use std::fs;
use std::time::{Duration, Instant};

fn captured(sink: &SharedWriter<Vec<u8>>) -> String {
    String::from_utf8(sink.lock().clone()).unwrap()
}

#[tokio::test]
async fn test_stdout_and_stderr_reach_the_sink() {
    let ctx = Context::new();
    let sink = SharedWriter::new(Vec::new());

    CommandSpec::new("sh")
        .args(["-c", "echo out-line; echo err-line 1>&2"])
        .run_to(&ctx, sink.clone())
        .await
        .unwrap();

    let out = captured(&sink);
    assert!(out.contains("out-line\n"));
    assert!(out.contains("err-line\n"));
}

#[tokio::test]
async fn test_stdout_is_green_and_stderr_is_red() {
    colored::control::set_override(true);
    let ctx = Context::new();
    let sink = SharedWriter::new(Vec::new());

    CommandSpec::new("sh")
        .args(["-c", "echo o; echo e 1>&2"])
        .run_to(&ctx, sink.clone())
        .await
        .unwrap();

    let out = captured(&sink);
    assert!(out.contains(&"o\n".green().to_string()));
    assert!(out.contains(&"e\n".red().to_string()));
}

#[tokio::test]
async fn test_non_utf8_output_is_passed_through() {
    let ctx = Context::new();
    let sink = SharedWriter::new(Vec::new());

    CommandSpec::new("printf")
        .arg("caf\\351\\n")
        .run_to(&ctx, sink.clone())
        .await
        .unwrap();

    let bytes = sink.lock().clone();
    assert!(bytes.windows(5).any(|w| w == &b"caf\xe9\n"[..]));
    assert!(!bytes.windows(3).any(|w| w == "\u{FFFD}".as_bytes()));
}

#[tokio::test]
async fn test_env_overrides_are_visible_to_child() {
    let ctx = Context::new();
    let sink = SharedWriter::new(Vec::new());

    CommandSpec::new("sh")
        .args(["-c", "echo \"value=$SITETASK_TEST_VALUE\""])
        .env("SITETASK_TEST_VALUE", "first")
        .env("SITETASK_TEST_VALUE", "second")
        .run_to(&ctx, sink.clone())
        .await
        .unwrap();

    assert!(captured(&sink).contains("value=second"));
}

#[tokio::test]
async fn test_override_wins_over_inherited_env() {
    let ctx = Context::new();
    let sink = SharedWriter::new(Vec::new());

    // HOME is inherited from the test process
    CommandSpec::new("sh")
        .args(["-c", "echo \"home=$HOME\""])
        .env("HOME", "/override")
        .run_to(&ctx, sink.clone())
        .await
        .unwrap();

    assert!(captured(&sink).contains("home=/override"));
}

#[tokio::test]
async fn test_runs_in_working_dir() {
    let project = common::create_project();
    let ctx = Context::new().with_working_dir(project.path().to_path_buf());
    let sink = SharedWriter::new(Vec::new());

    CommandSpec::new("ls")
        .run_to(&ctx, sink.clone())
        .await
        .unwrap();

    let out = captured(&sink);
    assert!(out.contains("blog-content"));
    assert!(out.contains("hugo"));
}

#[tokio::test]
async fn test_large_output_does_not_block() {
    let ctx = Context::new().with_failure_policy(FailurePolicy::Fail);
    let sink = SharedWriter::new(Vec::new());

    // Well beyond a pipe buffer on both streams
    CommandSpec::new("sh")
        .args(["-c", "i=0; while [ $i -lt 5000 ]; do echo \"line $i\"; echo \"err $i\" 1>&2; i=$((i+1)); done"])
        .run_to(&ctx, sink.clone())
        .await
        .unwrap();

    let out = captured(&sink);
    assert!(out.contains("line 4999"));
    assert!(out.contains("err 4999"));
}

#[tokio::test]
async fn test_failed_run_is_swallowed_with_log_policy() {
    let ctx = Context::new().with_failure_policy(FailurePolicy::Log);
    let sink = SharedWriter::new(Vec::new());

    let result = CommandSpec::new("sh")
        .args(["-c", "exit 3"])
        .run_to(&ctx, sink.clone())
        .await;

    assert!(result.is_ok());
    let out = captured(&sink);
    assert!(out.contains("failed to run command:"));
    assert!(out.contains("exit code 3\n"));
}

#[tokio::test]
async fn test_failed_run_is_returned_with_fail_policy() {
    let ctx = Context::new().with_failure_policy(FailurePolicy::Fail);
    let sink = SharedWriter::new(Vec::new());

    let result = CommandSpec::new("sh")
        .args(["-c", "exit 3"])
        .run_to(&ctx, sink.clone())
        .await;

    assert!(matches!(result, Err(ExecutionError::CommandFailed(Some(3)))));
    assert!(captured(&sink).contains("failed to run command:"));
}

#[tokio::test]
async fn test_missing_binary_is_reported() {
    let ctx = Context::new();
    let sink = SharedWriter::new(Vec::new());

    let result = CommandSpec::new("sitetask-definitely-missing")
        .run_to(&ctx, sink.clone())
        .await;

    assert!(result.is_ok());
    let out = captured(&sink);
    assert!(out.contains("failed to run command:"));
    assert!(out.contains("sitetask-definitely-missing"));
}

#[tokio::test]
async fn test_cancel_kills_child_promptly() {
    let ctx = Context::new();
    let trigger = ctx.cancel.clone();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let result = CommandSpec::new("sleep")
        .arg("30")
        .run_to(&ctx, std::io::sink())
        .await;

    assert!(matches!(result, Err(ExecutionError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_prod_build_with_fake_generator() {
    let project = common::create_project();
    let generator = common::fake_generator(project.path(), 0);

    let mut config = Config::default();
    config.generator.binary = generator.display().to_string();

    let mut ctx = Context::new()
        .with_working_dir(project.path().to_path_buf())
        .with_failure_policy(FailurePolicy::Fail)
        .with_verbosity(Verbosity::Silent);

    Task::ProdBuild {
        base_url: "https://example.com/".to_string(),
    }
    .execute(&mut ctx, &config)
    .await
    .unwrap();

    // The dependency ran first
    assert!(ctx.is_completed(TaskId::LinkContent));
    assert!(ctx.is_completed(TaskId::ProdBuild));
    assert!(fs::symlink_metadata(project.path().join("hugo/content"))
        .unwrap()
        .file_type()
        .is_symlink());
}

#[tokio::test]
async fn test_failing_generator_with_fail_policy() {
    let project = common::create_project();
    let generator = common::fake_generator(project.path(), 2);

    let mut config = Config::default();
    config.generator.binary = generator.display().to_string();

    let mut ctx = Context::new()
        .with_working_dir(project.path().to_path_buf())
        .with_failure_policy(FailurePolicy::Fail)
        .with_verbosity(Verbosity::Silent);

    let result = Task::DevTidy.execute(&mut ctx, &config).await;
    assert!(matches!(
        result,
        Err(SitetaskError::Execution(ExecutionError::CommandFailed(Some(2))))
    ));
    assert!(!ctx.is_completed(TaskId::DevTidy));
}

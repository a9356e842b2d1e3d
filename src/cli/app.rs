//! Main CLI application

use crate::config::{load_config_auto, load_env_file, validate_config, FailurePolicy};
use crate::error::{ConfigError, SitetaskError};
use crate::logging;
use crate::runner::{CancelSignal, Context, Task, TaskId, Verbosity};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use colored::Colorize;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use tracing::{debug, warn};

/// CLI application
pub struct App {
    /// The clap command
    command: Command,
}

impl App {
    pub fn new() -> Self {
        App {
            command: build_command(),
        }
    }

    /// Run the application with the process arguments
    pub async fn run(self) -> Result<(), SitetaskError> {
        self.run_from(std::env::args_os()).await
    }

    /// Run the application with the given arguments
    pub async fn run_from<I, T>(mut self, args: I) -> Result<(), SitetaskError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.command.clone().get_matches_from(args);

        // Handle global flags first
        let verbosity = get_verbosity(&matches);
        if let Err(err) = logging::init_logging(verbosity) {
            // Only fails when a subscriber is already installed
            debug!(error = %err, "keeping existing log subscriber");
        }

        match matches.subcommand() {
            Some(("list", _)) => {
                print_task_list();
                return Ok(());
            }
            Some(("completions", sub_matches)) => {
                if let Some(shell) = sub_matches.get_one::<Shell>("shell").copied() {
                    clap_complete::generate(shell, &mut self.command, "sitetask", &mut io::stdout());
                }
                return Ok(());
            }
            Some(_) => {}
            None => {
                // No task specified, show help
                self.command.print_help()?;
                println!();
                return Ok(());
            }
        }

        let task = parse_task(&matches)?;

        let file = matches.get_one::<PathBuf>("file").map(PathBuf::as_path);
        let loaded = load_config_auto(file)?;
        validate_config(&loaded.config)?;
        if let Some(env_path) = load_env_file(&loaded.config, &loaded.root)? {
            debug!(path = %env_path.display(), "loaded env file");
        }

        let failure_policy = if matches.get_flag("fail-fast") {
            FailurePolicy::Fail
        } else {
            loaded.config.on_failure
        };

        let mut ctx = Context::new()
            .with_working_dir(loaded.root.clone())
            .with_failure_policy(failure_policy)
            .with_verbosity(verbosity)
            .with_cancel(cancel_on_ctrl_c());

        if let Some(path) = &loaded.path {
            ctx.print_debug(&format!("Using config {}", path.display()));
        }

        task.execute(&mut ctx, &loaded.config).await
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancellation signal triggered by Ctrl+C
fn cancel_on_ctrl_c() -> CancelSignal {
    let cancel = CancelSignal::new();
    let trigger = cancel.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            return;
        }
        trigger.cancel();
    });

    cancel
}

/// Build the clap command tree
pub fn build_command() -> Command {
    Command::new("sitetask")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Build and dev tasks for a Hugo static site")
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Path to sitetask.yml config file")
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print command output and errors")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no task messages")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("fail-fast")
                .long("fail-fast")
                .help("Exit with an error when the generator fails")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new(TaskId::LinkContent.namespace())
                .about("Project setup")
                .subcommand_required(true)
                .subcommand(task_command(TaskId::LinkContent)),
        )
        .subcommand(
            Command::new(TaskId::ProdBuild.namespace())
                .about("Production tasks")
                .subcommand_required(true)
                .subcommand(
                    task_command(TaskId::ProdBuild).arg(
                        Arg::new("base-url")
                            .value_name("BASE_URL")
                            .help("Absolute URL the site is served from")
                            .required(true),
                    ),
                ),
        )
        .subcommand(
            Command::new(TaskId::DevServer.namespace())
                .about("Development tasks")
                .subcommand_required(true)
                .subcommand(
                    task_command(TaskId::DevServer).arg(
                        Arg::new("port")
                            .short('p')
                            .long("port")
                            .value_name("PORT")
                            .value_parser(value_parser!(u16).range(1..))
                            .help("Port to listen on (default from config)"),
                    ),
                )
                .subcommand(task_command(TaskId::DevTidy)),
        )
        .subcommand(Command::new("list").about("List all tasks"))
        .subcommand(
            Command::new("completions")
                .about("Print a shell completion script")
                .arg(
                    Arg::new("shell")
                        .value_name("SHELL")
                        .value_parser(value_parser!(Shell))
                        .required(true),
                ),
        )
}

fn task_command(id: TaskId) -> Command {
    Command::new(id.name()).about(id.usage())
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Resolve `<namespace> <task> [inputs]` into a task
fn parse_task(matches: &ArgMatches) -> Result<Task, SitetaskError> {
    let (namespace, ns_matches) = matches
        .subcommand()
        .ok_or_else(|| ConfigError::TaskNotFound(String::new()))?;
    let (name, task_matches) = ns_matches
        .subcommand()
        .ok_or_else(|| ConfigError::TaskNotFound(namespace.to_string()))?;

    let qualified = format!("{}:{}", namespace, name);
    let id = TaskId::from_qualified(&qualified)
        .ok_or(ConfigError::TaskNotFound(qualified))?;

    let task = match id {
        TaskId::LinkContent => Task::LinkContent,
        TaskId::ProdBuild => Task::ProdBuild {
            base_url: task_matches
                .get_one::<String>("base-url")
                .cloned()
                .unwrap_or_default(),
        },
        TaskId::DevServer => Task::DevServer {
            port: task_matches.get_one::<u16>("port").copied(),
        },
        TaskId::DevTidy => Task::DevTidy,
    };

    Ok(task)
}

fn print_task_list() {
    for id in TaskId::ALL {
        let deps: Vec<String> = id.dependencies().iter().map(TaskId::to_string).collect();
        let after = if deps.is_empty() {
            String::new()
        } else {
            format!(" (after {})", deps.join(", "))
        };
        println!("  {:<20} {}{}", id.to_string().bold(), id.usage(), after.dimmed());
    }
}

/// Run the CLI application with the process arguments
pub async fn run() -> Result<(), SitetaskError> {
    App::new().run().await
}

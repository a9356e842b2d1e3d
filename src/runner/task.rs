//! Task definitions and execution
//!
//! Tasks are grouped in namespaces (`setup`, `prod`, `dev`) and addressed as
//! `namespace:name`. A task's dependencies run before it, each at most once per
//! invocation.

use crate::config::Config;
use crate::error::{ConfigError, ConfigResult, ExecutionError, ExecutionResult, Result};
use crate::runner::{interpolate_list, CommandSpec, Context};
use crate::utils::ensure_symlink;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Identifies a task independently of its inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskId {
    LinkContent,
    ProdBuild,
    DevServer,
    DevTidy,
}

impl TaskId {
    /// Every task, in listing order
    pub const ALL: [TaskId; 4] = [
        TaskId::LinkContent,
        TaskId::ProdBuild,
        TaskId::DevServer,
        TaskId::DevTidy,
    ];

    pub fn namespace(self) -> &'static str {
        match self {
            TaskId::LinkContent => "setup",
            TaskId::ProdBuild => "prod",
            TaskId::DevServer | TaskId::DevTidy => "dev",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TaskId::LinkContent => "link-content",
            TaskId::ProdBuild => "build",
            TaskId::DevServer => "server",
            TaskId::DevTidy => "tidy",
        }
    }

    /// One-line description for help and listings
    pub fn usage(self) -> &'static str {
        match self {
            TaskId::LinkContent => "Link the content repository into the site",
            TaskId::ProdBuild => "Build the site for production",
            TaskId::DevServer => "Run the local development server",
            TaskId::DevTidy => "Tidy the site's module dependencies",
        }
    }

    /// Tasks that must finish before this one starts
    pub fn dependencies(self) -> &'static [TaskId] {
        match self {
            TaskId::ProdBuild | TaskId::DevServer => &[TaskId::LinkContent],
            TaskId::LinkContent | TaskId::DevTidy => &[],
        }
    }

    /// Look up a task by `namespace:name`
    pub fn from_qualified(name: &str) -> Option<TaskId> {
        TaskId::ALL.into_iter().find(|id| id.to_string() == name)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace(), self.name())
    }
}

/// A task together with its inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    LinkContent,
    ProdBuild { base_url: String },
    DevServer { port: Option<u16> },
    DevTidy,
}

impl Task {
    pub fn id(&self) -> TaskId {
        match self {
            Task::LinkContent => TaskId::LinkContent,
            Task::ProdBuild { .. } => TaskId::ProdBuild,
            Task::DevServer { .. } => TaskId::DevServer,
            Task::DevTidy => TaskId::DevTidy,
        }
    }

    /// Build the task a dependency edge refers to. Only tasks without inputs
    /// can be dependencies.
    pub fn from_dependency(id: TaskId) -> ConfigResult<Task> {
        match id {
            TaskId::LinkContent => Ok(Task::LinkContent),
            other => Err(ConfigError::Invalid(format!(
                "task '{}' cannot be a dependency",
                other
            ))),
        }
    }

    /// The generator command this task runs, if any. Each call builds a
    /// fresh command.
    pub fn command(&self, config: &Config) -> ExecutionResult<Option<CommandSpec>> {
        let cmd = match self {
            Task::LinkContent => return Ok(None),
            Task::ProdBuild { base_url } => {
                let vars = HashMap::from([("base_url".to_string(), base_url.clone())]);
                let args = interpolate_list(&config.production.args, &vars)?;
                generator(config)
                    .args(args)
                    .envs(&config.production.environment)
            }
            Task::DevServer { port } => {
                let port = port.unwrap_or(config.server.port).to_string();
                generator(config).args(["server", "-p", port.as_str()])
            }
            Task::DevTidy => generator(config).args(["mod", "tidy"]),
        };
        Ok(Some(cmd))
    }

    /// Run the task after its dependencies
    pub async fn execute(&self, ctx: &mut Context, config: &Config) -> Result<()> {
        let id = self.id();
        let order = dependency_order(id);

        for dep in order {
            if ctx.is_completed(dep) {
                ctx.print_task_skip(dep, "already ran");
                continue;
            }
            Task::from_dependency(dep)?.run_body(ctx, config).await?;
        }

        self.run_body(ctx, config).await?;
        Ok(())
    }

    async fn run_body(&self, ctx: &mut Context, config: &Config) -> ExecutionResult<()> {
        if ctx.cancel.is_cancelled() {
            return Err(ExecutionError::Cancelled);
        }

        let id = self.id();
        ctx.print_task_start(id);

        match self {
            Task::LinkContent => link_content(ctx, config)?,
            Task::ProdBuild { base_url } => {
                ctx.print_info(&format!(
                    "Running production build process for base URL {:?}...",
                    base_url
                ));
            }
            Task::DevServer { port } => {
                let port = port.unwrap_or(config.server.port);
                ctx.print_info(&format!(
                    "Running development server on http://localhost:{}",
                    port
                ));
            }
            Task::DevTidy => {}
        }

        if let Some(cmd) = self.command(config)? {
            cmd.run(ctx).await?;
        }

        ctx.mark_completed(id);
        ctx.print_task_complete(id);
        Ok(())
    }
}

/// Base generator invocation shared by every task
fn generator(config: &Config) -> CommandSpec {
    CommandSpec::with_args(&config.generator.binary, ["--source", config.generator.source.as_str()])
}

fn link_content(ctx: &Context, config: &Config) -> ExecutionResult<()> {
    let content = &config.content;
    let link = ctx.working_dir.join(&content.link);

    ctx.print_info("Ensuring Hugo site content symlink");
    ctx.print_info(&format!(
        "Creating a symlink at {:?} pointing to {:?}...",
        content.link, content.target
    ));

    match ensure_symlink(&link, &content.target) {
        Ok(()) => ctx.print_info("Content symbolic link successfully created!"),
        Err(err) if err.is_already_exists() => {
            debug!(link = %link.display(), error = %err, "content link present");
            ctx.print_info(&format!(
                "Content symbolic link already exists at {:?}, skipping creation...",
                content.link
            ));
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}

/// Order in which `root`'s dependencies run, deepest first, without `root`.
///
/// The graph is fixed by [`TaskId::dependencies`]; a dependency always comes
/// before its dependent in [`TaskId::ALL`], so the walk terminates.
pub fn dependency_order(root: TaskId) -> Vec<TaskId> {
    let mut order = Vec::new();
    for &dep in root.dependencies() {
        visit(dep, &mut order);
    }
    order
}

fn visit(id: TaskId, order: &mut Vec<TaskId>) {
    if order.contains(&id) {
        return;
    }
    for &dep in id.dependencies() {
        visit(dep, order);
    }
    order.push(id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_qualified_names() {
        assert_eq!(TaskId::LinkContent.to_string(), "setup:link-content");
        assert_eq!(TaskId::ProdBuild.to_string(), "prod:build");
        assert_eq!(TaskId::DevServer.to_string(), "dev:server");
        assert_eq!(TaskId::DevTidy.to_string(), "dev:tidy");
    }

    #[test]
    fn test_from_qualified() {
        assert_eq!(TaskId::from_qualified("dev:tidy"), Some(TaskId::DevTidy));
        assert_eq!(TaskId::from_qualified("dev:deploy"), None);
    }

    #[test]
    fn test_dependencies() {
        assert_eq!(TaskId::ProdBuild.dependencies(), &[TaskId::LinkContent]);
        assert_eq!(TaskId::DevServer.dependencies(), &[TaskId::LinkContent]);
        assert!(TaskId::DevTidy.dependencies().is_empty());
        assert!(TaskId::LinkContent.dependencies().is_empty());
    }

    #[test]
    fn test_production_command() {
        let task = Task::ProdBuild {
            base_url: "https://blog.example.com/".to_string(),
        };
        let cmd = task.command(&Config::default()).unwrap().unwrap();

        assert_eq!(cmd.program(), "hugo");
        assert_eq!(
            cmd.get_args(),
            &[
                "--source",
                "./hugo",
                "--gc",
                "--minify",
                "--baseURL",
                "https://blog.example.com/"
            ]
        );

        let expected: BTreeMap<String, String> = [
            ("HUGO_ENV".to_string(), "production".to_string()),
            ("HUGO_ENVIRONMENT".to_string(), "production".to_string()),
        ]
        .into();
        assert_eq!(cmd.get_envs(), &expected);
    }

    #[test]
    fn test_server_command() {
        let cmd = Task::DevServer { port: None }
            .command(&Config::default())
            .unwrap()
            .unwrap();

        assert_eq!(
            cmd.get_args(),
            &["--source", "./hugo", "server", "-p", "1313"]
        );
        assert!(cmd.get_envs().is_empty());
    }

    #[test]
    fn test_server_port_override() {
        let cmd = Task::DevServer { port: Some(8080) }
            .command(&Config::default())
            .unwrap()
            .unwrap();

        assert_eq!(cmd.get_args().last().map(String::as_str), Some("8080"));
    }

    #[test]
    fn test_tidy_command() {
        let cmd = Task::DevTidy.command(&Config::default()).unwrap().unwrap();
        assert_eq!(cmd.get_args(), &["--source", "./hugo", "mod", "tidy"]);
    }

    #[test]
    fn test_commands_do_not_accumulate() {
        let config = Config::default();
        let first = Task::DevTidy.command(&config).unwrap().unwrap();
        let second = Task::DevTidy.command(&config).unwrap().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_link_content_has_no_command() {
        assert!(Task::LinkContent.command(&Config::default()).unwrap().is_none());
    }

    #[test]
    fn test_custom_generator() {
        let mut config = Config::default();
        config.generator.binary = "/usr/local/bin/hugo".to_string();
        config.generator.source = "site".to_string();

        let cmd = Task::DevTidy.command(&config).unwrap().unwrap();
        assert_eq!(cmd.program(), "/usr/local/bin/hugo");
        assert_eq!(cmd.get_args()[..2], ["--source", "site"]);
    }

    #[test]
    fn test_dependency_order() {
        assert_eq!(dependency_order(TaskId::ProdBuild), vec![TaskId::LinkContent]);
        assert_eq!(dependency_order(TaskId::DevServer), vec![TaskId::LinkContent]);
        assert!(dependency_order(TaskId::DevTidy).is_empty());
        assert!(dependency_order(TaskId::LinkContent).is_empty());
    }

    #[test]
    fn test_dependencies_precede_dependents() {
        let position = |id: TaskId| TaskId::ALL.iter().position(|t| *t == id);
        for id in TaskId::ALL {
            for &dep in id.dependencies() {
                assert!(position(dep) < position(id), "{} must come before {}", dep, id);
            }
        }
    }

    #[test]
    fn test_every_dependency_can_be_built() {
        for id in TaskId::ALL {
            for &dep in id.dependencies() {
                assert_eq!(Task::from_dependency(dep).unwrap().id(), dep);
            }
        }
    }

    #[test]
    fn test_tasks_with_inputs_cannot_be_dependencies() {
        assert!(Task::from_dependency(TaskId::ProdBuild).is_err());
        assert!(Task::from_dependency(TaskId::DevServer).is_err());
        assert_eq!(
            Task::from_dependency(TaskId::LinkContent).unwrap(),
            Task::LinkContent
        );
    }
}

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{error, info};

use crate::pipeline::ExitCode;
use crate::process::{CommandSpec, ProcessOutcome, ProcessRunner};
use crate::tools::trait_def::{BuildTool, ToolContext};
use crate::variables::{names, VariableSet};

/// Runs the shell command configured for one build step in the source root
pub struct CommandTool {
    name: &'static str,
    command_key: &'static str,
    enabled_key: &'static str,
}

impl CommandTool {
    pub fn new(name: &'static str, command_key: &'static str, enabled_key: &'static str) -> Self {
        Self {
            name,
            command_key,
            enabled_key,
        }
    }

    pub fn restore() -> Self {
        Self::new("restore", names::RESTORE_COMMAND, names::RESTORE_ENABLED)
    }

    pub fn compile() -> Self {
        Self::new("compile", names::COMPILE_COMMAND, names::COMPILE_ENABLED)
    }

    pub fn test() -> Self {
        Self::new("test", names::TEST_COMMAND, names::TEST_ENABLED)
    }

    pub fn package() -> Self {
        Self::new("package", names::PACKAGE_COMMAND, names::PACKAGE_ENABLED)
    }
}

/// Environment handed to child processes: every defined variable under its
/// underscore spelling, first definition wins
pub fn child_environment(variables: &VariableSet) -> BTreeMap<String, String> {
    let mut environment = BTreeMap::new();
    for variable in variables {
        if let Some(value) = variable.value() {
            environment
                .entry(variable.key().replace('.', "_"))
                .or_insert_with(|| value.to_string());
        }
    }
    environment
}

#[async_trait]
impl BuildTool for CommandTool {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn execute(&self, context: &ToolContext<'_>) -> Result<ExitCode> {
        let variables = context.variables;
        if !variables.bool_or(self.enabled_key, true)? {
            info!(tool = self.name, "Step disabled");
            return Ok(ExitCode::SUCCESS);
        }

        let Some(command) = variables
            .value(self.command_key)?
            .filter(|command| !command.trim().is_empty())
        else {
            info!(tool = self.name, key = self.command_key, "No command configured");
            return Ok(ExitCode::SUCCESS);
        };

        if context.cancel.is_cancelled() {
            return Ok(ExitCode::CANCELLED);
        }

        let root = variables.require_path(names::SOURCE_ROOT)?;
        let mut spec = CommandSpec::shell(command)
            .current_dir(&root)
            .timeout(context.build.config.tool_timeout);
        for (key, value) in child_environment(variables) {
            spec = spec.env(key, value);
        }

        info!(tool = self.name, command = %command, "Running command");
        let output = ProcessRunner::new()
            .run(&spec, context.cancel)
            .await
            .with_context(|| format!("Could not run {} command", self.name))?;

        let exit_code = match output.outcome {
            ProcessOutcome::Exited(code) => ExitCode::new(code),
            ProcessOutcome::Signalled => ExitCode::FAILURE,
            ProcessOutcome::Cancelled => ExitCode::CANCELLED,
            ProcessOutcome::TimedOut => ExitCode::FAILURE,
        };
        if !exit_code.is_success() {
            error!(tool = self.name, command = %command, outcome = ?output.outcome, "Command failed");
        }

        Ok(exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::BuildContext;
    use crate::variables::Variable;
    use tokio_util::sync::CancellationToken;

    #[test]
    fn test_child_environment_uses_underscores() {
        let variables: VariableSet = [
            Variable::new("Arbor.Build.Version", "1.2.3"),
            Variable::new("Arbor_Build_Version", "ignored"),
            Variable::empty("Arbor.Build.Empty"),
        ]
        .into_iter()
        .collect();

        let environment = child_environment(&variables);

        assert_eq!(environment.get("Arbor_Build_Version").map(String::as_str), Some("1.2.3"));
        assert!(!environment.contains_key("Arbor_Build_Empty"));
    }

    #[tokio::test]
    async fn test_missing_command_succeeds() {
        let (build, _fs) = BuildContext::with_mocks(&[]);
        let variables = VariableSet::new();
        let cancel = CancellationToken::new();
        let context = ToolContext {
            variables: &variables,
            args: &[],
            build: &build,
            cancel: &cancel,
        };

        assert_eq!(CommandTool::compile().execute(&context).await.unwrap(), ExitCode::SUCCESS);
    }

    #[tokio::test]
    async fn test_disabled_step_is_not_run() {
        let (build, _fs) = BuildContext::with_mocks(&[]);
        let variables: VariableSet = [
            Variable::new(names::TEST_COMMAND, "exit 7"),
            Variable::new(names::TEST_ENABLED, "false"),
        ]
        .into_iter()
        .collect();
        let cancel = CancellationToken::new();
        let context = ToolContext {
            variables: &variables,
            args: &[],
            build: &build,
            cancel: &cancel,
        };

        assert_eq!(CommandTool::test().execute(&context).await.unwrap(), ExitCode::SUCCESS);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_code_is_returned() {
        let dir = tempfile::TempDir::new().unwrap();
        let (build, _fs) = BuildContext::with_mocks(&[]);
        let variables: VariableSet = [
            Variable::new(names::SOURCE_ROOT, dir.path().display().to_string()),
            Variable::new(names::COMPILE_COMMAND, "test \"$Arbor_Build_Version\" = 2.0 && exit 7"),
            Variable::new(names::VERSION, "2.0"),
        ]
        .into_iter()
        .collect();
        let cancel = CancellationToken::new();
        let context = ToolContext {
            variables: &variables,
            args: &[],
            build: &build,
            cancel: &cancel,
        };

        assert_eq!(CommandTool::compile().execute(&context).await.unwrap(), ExitCode::new(7));
    }
}

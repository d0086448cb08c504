//! Whole-run control flow: resolve variables, alias them, run the tools

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::BuildError;
use crate::progress::{ProgressEvent, ProgressHandler};
use crate::tools::{ExecutionReport, ToolContext, ToolExecutor, ToolRegistry};
use crate::variables::{add_compatibility_aliases, ProviderRegistry, VariableResolver, VariableSet};

use super::context::BuildContext;
use super::exit_code::ExitCode;

pub struct BuildPipeline {
    providers: ProviderRegistry,
    tools: ToolRegistry,
    progress: Option<Arc<dyn ProgressHandler>>,
}

impl BuildPipeline {
    pub fn new(providers: ProviderRegistry, tools: ToolRegistry) -> Self {
        Self {
            providers,
            tools,
            progress: None,
        }
    }

    /// Pipeline with the standard providers and tools
    pub fn with_defaults() -> Self {
        Self::new(ProviderRegistry::with_defaults(), ToolRegistry::with_defaults())
    }

    pub fn with_progress(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.progress = Some(handler);
        self
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run every provider, then add compatibility aliases when enabled.
    ///
    /// `seed` holds explicit overrides; providers see them first and leave
    /// them alone.
    pub async fn resolve_variables(
        &self,
        context: &mut BuildContext,
        seed: VariableSet,
        cancel: &CancellationToken,
    ) -> Result<VariableSet, BuildError> {
        let mut resolver = VariableResolver::new(&self.providers);
        if let Some(handler) = &self.progress {
            resolver = resolver.with_progress(handler.clone());
        }

        let resolved = resolver.resolve(context, seed, cancel).await?;
        let total = resolved.len();

        let variables = if context.config.compatibility_aliases {
            add_compatibility_aliases(&resolved)
        } else {
            debug!("Compatibility aliases disabled");
            resolved
        };

        self.emit(&ProgressEvent::VariablesResolved {
            total,
            aliases: variables.len() - total,
        });
        Ok(variables)
    }

    /// Resolve variables and execute every tool in priority order.
    ///
    /// Tool failures are part of the report. An `Err` means the run could not
    /// finish: a configuration problem, an error escaping a provider or tool,
    /// or cancellation during resolution.
    pub async fn run_with_report(
        &self,
        context: &mut BuildContext,
        seed: VariableSet,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Result<ExecutionReport, BuildError> {
        let start = Instant::now();
        self.emit(&ProgressEvent::Started {
            source: context.working_directory.display().to_string(),
        });

        let result = self.execute(context, seed, args, cancel).await;
        match &result {
            Ok(report) => self.emit(&ProgressEvent::Completed {
                exit_code: report.exit_code.code(),
                total_time: start.elapsed(),
            }),
            Err(error) => self.emit(&ProgressEvent::Failed {
                error: error.to_string(),
            }),
        }
        result
    }

    /// Run the build and return its final exit code
    pub async fn run(
        &self,
        context: &mut BuildContext,
        seed: VariableSet,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Result<ExitCode, BuildError> {
        self.run_with_report(context, seed, args, cancel)
            .await
            .map(|report| report.exit_code)
    }

    async fn execute(
        &self,
        context: &mut BuildContext,
        seed: VariableSet,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Result<ExecutionReport, BuildError> {
        let variables = self.resolve_variables(context, seed, cancel).await?;

        let tools = self.tools.ordered();
        info!(
            variables = variables.len(),
            tools = tools.len(),
            "Running build tools"
        );

        let mut executor = ToolExecutor::new();
        if let Some(handler) = &self.progress {
            executor = executor.with_progress(handler.clone());
        }

        let tool_context = ToolContext {
            variables: &variables,
            args,
            build: context,
            cancel,
        };
        executor.execute(&tools, &tool_context).await
    }

    fn emit(&self, event: &ProgressEvent) {
        if let Some(handler) = &self.progress {
            handler.on_progress(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InvocationLog, ScriptedTool, StaticProvider};
    use crate::tools::ToolRegistration;
    use crate::variables::{names, Variable};

    fn pipeline(providers: Vec<StaticProvider>, tools: Vec<ToolRegistration>) -> BuildPipeline {
        let mut provider_registry = ProviderRegistry::new();
        for provider in providers {
            provider_registry.register(Arc::new(provider));
        }
        let mut tool_registry = ToolRegistry::new();
        for tool in tools {
            tool_registry.register(tool);
        }
        BuildPipeline::new(provider_registry, tool_registry)
    }

    #[tokio::test]
    async fn test_aliases_are_added_before_tools_run() {
        let provider = StaticProvider::new("legacy", 0).with_variable("Arbor.X.Foo", "bar");
        let tool = ToolRegistration::new(Arc::new(
            ScriptedTool::new("reads_alias", ExitCode::SUCCESS).requires("Arbor_Build_Foo"),
        ));

        let (mut context, _fs) = BuildContext::with_mocks(&[]);
        let exit_code = pipeline(vec![provider], vec![tool])
            .run(&mut context, VariableSet::new(), &[], &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(exit_code, ExitCode::SUCCESS);
    }

    #[tokio::test]
    async fn test_aliases_can_be_disabled() {
        let provider = StaticProvider::new("legacy", 0).with_variable("Arbor.X.Foo", "bar");
        let (build, _fs) = BuildContext::with_mocks(&[]);
        let mut context = build;
        context.config = context.config.clone().with_compatibility_aliases(false);

        let variables = pipeline(vec![provider], vec![])
            .resolve_variables(&mut context, VariableSet::new(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(variables.len(), 1);
    }

    #[tokio::test]
    async fn test_seed_overrides_reach_tools() {
        let log = InvocationLog::new();
        let tool = ToolRegistration::new(Arc::new(
            ScriptedTool::new("needs_version", ExitCode::SUCCESS)
                .requires("Arbor.Build.Version")
                .with_log(log.clone()),
        ));
        let seed: VariableSet = [Variable::new("Arbor.Build.Version", "9.9.9")]
            .into_iter()
            .collect();

        let (mut context, _fs) = BuildContext::with_mocks(&[]);
        let report = pipeline(vec![], vec![tool])
            .run_with_report(&mut context, seed, &[], &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.exit_code, ExitCode::SUCCESS);
        assert_eq!(log.entries(), vec!["needs_version"]);
    }

    #[tokio::test]
    async fn test_cancelled_before_resolution() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let log = InvocationLog::new();
        let provider = StaticProvider::new("p", 0).with_log(log.clone());

        let (mut context, _fs) = BuildContext::with_mocks(&[]);
        let error = pipeline(vec![provider], vec![])
            .run(&mut context, VariableSet::new(), &[], &cancel)
            .await
            .unwrap_err();

        assert!(matches!(error, BuildError::Cancelled { .. }));
        assert!(log.entries().is_empty());
    }

    #[tokio::test]
    async fn test_underscore_environment_override_beats_defaults() {
        let (mut context, _fs) =
            BuildContext::with_mocks(&[("ARBOR_BUILD_CONFIGURATION", "Release")]);

        let variables = BuildPipeline::with_defaults()
            .resolve_variables(&mut context, VariableSet::new(), &CancellationToken::new())
            .await
            .unwrap();

        for key in [
            names::CONFIGURATION,
            "ARBOR_BUILD_CONFIGURATION",
            "Arbor.X.Configuration",
            "Arbor_X_Configuration",
        ] {
            assert_eq!(variables.require(key).unwrap(), "Release", "{}", key);
        }
    }

    #[tokio::test]
    async fn test_legacy_seed_beats_defaults() {
        let seed: VariableSet = [Variable::new("Arbor.X.Configuration", "Release")]
            .into_iter()
            .collect();
        let (mut context, _fs) = BuildContext::with_mocks(&[]);

        let variables = BuildPipeline::with_defaults()
            .resolve_variables(&mut context, seed, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(variables.require(names::CONFIGURATION).unwrap(), "Release");
        assert_eq!(variables.count(names::CONFIGURATION), 1);
    }

    #[tokio::test]
    async fn test_reject_policy_sees_other_spellings() {
        let first = StaticProvider::new("first", 0).with_variable("Arbor_Build_Version", "1.0");
        let second = StaticProvider::new("second", 1).with_variable("Arbor.Build.Version", "2.0");
        let (mut context, _fs) = BuildContext::with_mocks(&[]);
        context.config = context
            .config
            .clone()
            .with_duplicate_policy(crate::pipeline::DuplicateKeyPolicy::Reject);

        let error = pipeline(vec![first, second], vec![])
            .resolve_variables(&mut context, VariableSet::new(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(error.is_configuration());
    }

    #[derive(Default)]
    struct EventLog {
        events: std::sync::Mutex<Vec<ProgressEvent>>,
    }

    impl ProgressHandler for EventLog {
        fn on_progress(&self, event: &ProgressEvent) {
            if let Ok(mut events) = self.events.lock() {
                events.push(event.clone());
            }
        }
    }

    #[tokio::test]
    async fn test_tool_error_reports_failure_once() {
        let events = Arc::new(EventLog::default());
        let tool = ToolRegistration::new(Arc::new(ScriptedTool::failing("publish", "boom")));
        let (mut context, _fs) = BuildContext::with_mocks(&[]);

        let result = pipeline(vec![], vec![tool])
            .with_progress(events.clone())
            .run(&mut context, VariableSet::new(), &[], &CancellationToken::new())
            .await;

        assert!(result.is_err());
        let failures = events
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Failed { .. }))
            .count();
        assert_eq!(failures, 1);
    }
}

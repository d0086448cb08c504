//! Recording fakes for providers and tools
//!
//! Used by the unit tests and, behind the `testing` feature, by integration
//! tests that drive a whole [`BuildPipeline`](crate::pipeline::BuildPipeline).

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::pipeline::{BuildContext, ExitCode};
use crate::tools::{BuildTool, ToolContext};
use crate::variables::{ResolveContext, Variable, VariableProvider, VariableSet};

/// Shared, ordered record of which fakes ran
#[derive(Debug, Clone, Default)]
pub struct InvocationLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl InvocationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, name: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(name.to_string());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// Provider returning a fixed list of variables
pub struct StaticProvider {
    name: &'static str,
    order: i32,
    variables: Vec<(String, String)>,
    required: Vec<String>,
    only_if_absent: bool,
    failure: Option<String>,
    log: Option<InvocationLog>,
}

impl StaticProvider {
    pub fn new(name: &'static str, order: i32) -> Self {
        Self {
            name,
            order,
            variables: Vec::new(),
            required: Vec::new(),
            only_if_absent: false,
            failure: None,
            log: None,
        }
    }

    pub fn with_variable(mut self, key: &str, value: &str) -> Self {
        self.variables.push((key.to_string(), value.to_string()));
        self
    }

    /// Look the key up with `require` before emitting anything
    pub fn requires(mut self, key: &str) -> Self {
        self.required.push(key.to_string());
        self
    }

    /// Skip variables that are already defined
    pub fn only_if_absent(mut self) -> Self {
        self.only_if_absent = true;
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn with_log(mut self, log: InvocationLog) -> Self {
        self.log = Some(log);
        self
    }
}

#[async_trait]
impl VariableProvider for StaticProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn order(&self) -> i32 {
        self.order
    }

    async fn resolve(&self, context: &mut ResolveContext<'_>) -> Result<Vec<Variable>> {
        if let Some(log) = &self.log {
            log.record(self.name);
        }
        if let Some(message) = &self.failure {
            return Err(anyhow!("{}", message));
        }
        for key in &self.required {
            context.variables.require(key)?;
        }

        Ok(self
            .variables
            .iter()
            .filter(|(key, _)| !(self.only_if_absent && context.variables.contains(key)))
            .map(|(key, value)| Variable::new(key.clone(), value.clone()))
            .collect())
    }
}

/// Tool returning a fixed exit code or error
pub struct ScriptedTool {
    name: &'static str,
    exit_code: ExitCode,
    failure: Option<String>,
    required: Vec<String>,
    cancels: Option<CancellationToken>,
    log: Option<InvocationLog>,
}

impl ScriptedTool {
    pub fn new(name: &'static str, exit_code: ExitCode) -> Self {
        Self {
            name,
            exit_code,
            failure: None,
            required: Vec::new(),
            cancels: None,
            log: None,
        }
    }

    /// Tool whose `execute` returns an error
    pub fn failing(name: &'static str, message: &str) -> Self {
        let mut tool = Self::new(name, ExitCode::SUCCESS);
        tool.failure = Some(message.to_string());
        tool
    }

    pub fn requires(mut self, key: &str) -> Self {
        self.required.push(key.to_string());
        self
    }

    /// Cancel `token` while running, as a Ctrl-C during this tool would
    pub fn cancelling(mut self, token: CancellationToken) -> Self {
        self.cancels = Some(token);
        self
    }

    pub fn with_log(mut self, log: InvocationLog) -> Self {
        self.log = Some(log);
        self
    }
}

#[async_trait]
impl BuildTool for ScriptedTool {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn execute(&self, context: &ToolContext<'_>) -> Result<ExitCode> {
        if let Some(log) = &self.log {
            log.record(self.name);
        }
        if let Some(token) = &self.cancels {
            token.cancel();
        }
        if let Some(message) = &self.failure {
            return Err(anyhow!("{}", message));
        }
        for key in &self.required {
            context.variables.require(key)?;
        }
        Ok(self.exit_code)
    }
}

/// Run a single provider against `variables`
pub async fn resolve_provider(
    provider: &dyn VariableProvider,
    build: &mut BuildContext,
    variables: &VariableSet,
) -> Result<Vec<Variable>> {
    let cancel = CancellationToken::new();
    let mut context = ResolveContext {
        build,
        variables,
        cancel: &cancel,
    };
    provider.resolve(&mut context).await
}

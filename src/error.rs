//! Fatal build errors
//!
//! Ordinary tool failures are [`ExitCode`](crate::pipeline::ExitCode) values,
//! not errors. A [`BuildError`] means the run itself is broken: configuration
//! could not be resolved unambiguously, a provider or tool escaped with an
//! error, or the run was cancelled before tools could start. Every variant
//! carries the redacted variable snapshot taken at the point of failure.

use crate::diagnostics::{SecretMatcher, VariableSnapshot};
use crate::variables::{VariableError, VariableSet};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    /// Ambiguous, missing or malformed variable
    #[error("Configuration error: {source}")]
    Configuration {
        #[source]
        source: VariableError,
        snapshot: VariableSnapshot,
    },

    #[error("Variable provider '{provider}' failed: {source:#}")]
    Provider {
        provider: String,
        #[source]
        source: anyhow::Error,
        snapshot: VariableSnapshot,
    },

    #[error("Tool '{tool}' failed: {source:#}")]
    Tool {
        tool: String,
        #[source]
        source: anyhow::Error,
        snapshot: VariableSnapshot,
    },

    #[error("Build cancelled")]
    Cancelled { snapshot: VariableSnapshot },
}

impl BuildError {
    pub fn configuration(
        source: VariableError,
        variables: &VariableSet,
        matcher: &SecretMatcher,
    ) -> Self {
        BuildError::Configuration {
            source,
            snapshot: VariableSnapshot::capture(variables, matcher),
        }
    }

    /// Wrap an error escaping a provider. A [`VariableError`] anywhere in the
    /// chain makes it a configuration error.
    pub fn from_provider(
        provider: &str,
        error: anyhow::Error,
        variables: &VariableSet,
        matcher: &SecretMatcher,
    ) -> Self {
        if let Some(source) = find_variable_error(&error) {
            return Self::configuration(source, variables, matcher);
        }

        BuildError::Provider {
            provider: provider.to_string(),
            source: error,
            snapshot: VariableSnapshot::capture(variables, matcher),
        }
    }

    /// Wrap an error escaping a tool
    pub fn from_tool(
        tool: &str,
        error: anyhow::Error,
        variables: &VariableSet,
        matcher: &SecretMatcher,
    ) -> Self {
        if let Some(source) = find_variable_error(&error) {
            return Self::configuration(source, variables, matcher);
        }

        BuildError::Tool {
            tool: tool.to_string(),
            source: error,
            snapshot: VariableSnapshot::capture(variables, matcher),
        }
    }

    pub fn cancelled(variables: &VariableSet, matcher: &SecretMatcher) -> Self {
        BuildError::Cancelled {
            snapshot: VariableSnapshot::capture(variables, matcher),
        }
    }

    pub fn snapshot(&self) -> &VariableSnapshot {
        match self {
            BuildError::Configuration { snapshot, .. }
            | BuildError::Provider { snapshot, .. }
            | BuildError::Tool { snapshot, .. }
            | BuildError::Cancelled { snapshot } => snapshot,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, BuildError::Configuration { .. })
    }
}

fn find_variable_error(error: &anyhow::Error) -> Option<VariableError> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<VariableError>())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::REDACTED;
    use crate::variables::Variable;
    use anyhow::{anyhow, Context};

    fn variables() -> VariableSet {
        let mut variables = VariableSet::new();
        variables.push(Variable::new("Arbor.Build.SourceRoot", "/src"));
        variables.push(Variable::new("Arbor.Build.Token", "s3cr3t"));
        variables
    }

    #[test]
    fn test_tool_error_carries_redacted_snapshot() {
        let err = BuildError::from_tool(
            "compile",
            anyhow!("disk full"),
            &variables(),
            &SecretMatcher::default(),
        );

        assert!(matches!(err, BuildError::Tool { .. }));
        assert_eq!(err.to_string(), "Tool 'compile' failed: disk full");
        assert_eq!(err.snapshot().len(), 2);
        assert_eq!(err.snapshot().get("Arbor.Build.Token"), Some(REDACTED));
    }

    #[test]
    fn test_variable_error_in_chain_becomes_configuration() {
        let source: anyhow::Result<()> = Err(VariableError::Ambiguous {
            key: "Version".to_string(),
            count: 2,
        }
        .into());
        let error = source.context("reading version").unwrap_err();

        let err = BuildError::from_provider(
            "version",
            error,
            &variables(),
            &SecretMatcher::default(),
        );

        assert!(err.is_configuration());
        assert!(err.to_string().contains("'Version' is defined 2 times"));
    }

    #[test]
    fn test_cancelled_snapshot() {
        let err = BuildError::cancelled(&variables(), &SecretMatcher::default());
        assert_eq!(err.to_string(), "Build cancelled");
        assert_eq!(err.snapshot().get("Arbor.Build.SourceRoot"), Some("/src"));
    }
}

use anyhow::Result;
use async_trait::async_trait;

use crate::variables::names;
use crate::variables::provider::{DefineIfAbsent, ProviderOrder, ResolveContext, VariableProvider};
use crate::variables::Variable;

/// Defaults for running arbor by hand during development, enabled with
/// `ARBOR_DEBUG=true`
pub struct DebugDefaultsProvider;

#[async_trait]
impl VariableProvider for DebugDefaultsProvider {
    fn name(&self) -> &'static str {
        "debug_defaults"
    }

    fn order(&self) -> i32 {
        ProviderOrder::DEBUG_DEFAULTS
    }

    async fn resolve(&self, context: &mut ResolveContext<'_>) -> Result<Vec<Variable>> {
        if !context.build.config.debug_defaults {
            return Ok(Vec::new());
        }

        let mut output = DefineIfAbsent::new(context.variables);
        output.define(names::CONFIGURATION, "Debug");
        output.define(names::BRANCH_NAME, "develop");
        output.define(names::LOG_VARIABLES, "true");
        Ok(output.into_variables())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::BuildContext;
    use crate::variables::VariableSet;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn test_disabled_by_default() {
        let (mut build, _fs) = BuildContext::with_mocks(&[]);
        let variables = VariableSet::new();
        let cancel = CancellationToken::new();
        let mut context = ResolveContext {
            build: &mut build,
            variables: &variables,
            cancel: &cancel,
        };

        assert!(DebugDefaultsProvider.resolve(&mut context).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_enabled_respects_seeded_values() {
        let (mut build, _fs) = BuildContext::with_mocks(&[]);
        build.config.debug_defaults = true;
        let mut variables = VariableSet::new();
        variables.push(Variable::new(names::CONFIGURATION, "Release"));
        let cancel = CancellationToken::new();
        let mut context = ResolveContext {
            build: &mut build,
            variables: &variables,
            cancel: &cancel,
        };

        let produced = DebugDefaultsProvider.resolve(&mut context).await.unwrap();
        let keys: Vec<&str> = produced.iter().map(|v| v.key()).collect();
        assert_eq!(keys, vec![names::BRANCH_NAME, names::LOG_VARIABLES]);
    }
}

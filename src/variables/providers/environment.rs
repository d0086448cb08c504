use anyhow::Result;
use async_trait::async_trait;

use crate::variables::provider::{DefineIfAbsent, ProviderOrder, ResolveContext, VariableProvider};
use crate::variables::aliasing::canonical_key;
use crate::variables::Variable;

const PREFIXES: &[&str] = &["Arbor.Build.", "Arbor_Build_", "Arbor.X.", "Arbor_X_"];

/// Imports environment variables that use one of the arbor prefixes under
/// their `Arbor.Build.*` spelling
pub struct EnvironmentVariableProvider;

fn has_arbor_prefix(name: &str) -> bool {
    PREFIXES.iter().any(|prefix| {
        name.len() > prefix.len()
            && name
                .get(..prefix.len())
                .map(|head| head.eq_ignore_ascii_case(prefix))
                .unwrap_or(false)
    })
}

#[async_trait]
impl VariableProvider for EnvironmentVariableProvider {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn order(&self) -> i32 {
        ProviderOrder::ENVIRONMENT
    }

    async fn resolve(&self, context: &mut ResolveContext<'_>) -> Result<Vec<Variable>> {
        let mut output = DefineIfAbsent::new(context.variables);

        for (name, value) in context.build.environment() {
            if has_arbor_prefix(name) {
                output.define(&canonical_key(name), value.clone());
            }
        }

        Ok(output.into_variables())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::BuildContext;
    use crate::variables::VariableSet;
    use tokio_util::sync::CancellationToken;

    #[yare::parameterized(
        current_dotted = { "Arbor.Build.Configuration", true },
        current_underscore = { "ARBOR_BUILD_CONFIGURATION", true },
        legacy_dotted = { "Arbor.X.Version", true },
        legacy_underscore = { "arbor_x_version", true },
        bare_prefix = { "Arbor_Build_", false },
        other = { "PATH", false },
    )]
    fn test_has_arbor_prefix(name: &str, expected: bool) {
        assert_eq!(has_arbor_prefix(name), expected);
    }

    #[tokio::test]
    async fn test_imports_prefixed_variables_only() {
        let (mut build, _fs) = BuildContext::with_mocks(&[
            ("Arbor_Build_Configuration", "Release"),
            ("Arbor.X.Version", "2.0.0"),
            ("HOME", "/home/build"),
        ]);
        let mut variables = VariableSet::new();
        variables.push(Variable::new("Arbor.X.Version", "from-cli"));
        let cancel = CancellationToken::new();
        let mut context = ResolveContext {
            build: &mut build,
            variables: &variables,
            cancel: &cancel,
        };

        let produced = EnvironmentVariableProvider
            .resolve(&mut context)
            .await
            .unwrap();

        assert_eq!(produced.len(), 1);
        assert_eq!(produced[0].key(), "Arbor.Build.Configuration");
        assert_eq!(produced[0].value(), Some("Release"));
    }
}

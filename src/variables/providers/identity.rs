use anyhow::Result;
use async_trait::async_trait;
use chrono::SecondsFormat;

use crate::variables::names;
use crate::variables::provider::{
    DefineIfAbsent, ProviderOrder, ResolveContext, VariableProvider,
};
use crate::variables::Variable;

/// Names the build from everything resolved before it. Runs last.
pub struct BuildIdentityProvider;

#[async_trait]
impl VariableProvider for BuildIdentityProvider {
    fn name(&self) -> &'static str {
        "build_identity"
    }

    fn order(&self) -> i32 {
        ProviderOrder::IGNORED
    }

    async fn resolve(&self, context: &mut ResolveContext<'_>) -> Result<Vec<Variable>> {
        let variables = context.variables;

        let directory = variables
            .get_path(names::SOURCE_ROOT)?
            .and_then(|root| root.file_name().map(|n| n.to_string_lossy().into_owned()));
        let version = variables.value(names::VERSION)?.map(str::to_string);
        let branch = variables
            .value(names::BRANCH_NAME)?
            .map(|b| b.replace(['/', '\\'], "-"));
        let configuration = variables.value(names::CONFIGURATION)?.map(str::to_string);

        let parts: Vec<String> = [directory, version, branch, configuration]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect();

        let mut output = DefineIfAbsent::new(variables);
        if !parts.is_empty() {
            output.define(names::BUILD_ID, parts.join("-"));
        }
        output.define(
            names::START_TIME,
            context
                .build
                .start_time
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        );

        Ok(output.into_variables())
    }
}

use anyhow::Result;
use async_trait::async_trait;

use crate::variables::names;
use crate::variables::provider::{DefineIfAbsent, ResolveContext, VariableProvider};
use crate::variables::Variable;

pub const ARTIFACTS_DIRECTORY: &str = "Artifacts";

/// Lays out the artifacts directories under the source root
pub struct ArtifactsProvider;

#[async_trait]
impl VariableProvider for ArtifactsProvider {
    fn name(&self) -> &'static str {
        "artifacts"
    }

    async fn resolve(&self, context: &mut ResolveContext<'_>) -> Result<Vec<Variable>> {
        let mut output = DefineIfAbsent::new(context.variables);

        let artifacts = match context.variables.get_path(names::ARTIFACTS)? {
            Some(path) => path,
            None => {
                let path = context
                    .variables
                    .require_path(names::SOURCE_ROOT)?
                    .join(ARTIFACTS_DIRECTORY);
                output.define(names::ARTIFACTS, path.display().to_string());
                path
            }
        };

        output.define(
            names::ARTIFACTS_PACKAGES,
            artifacts.join("packages").display().to_string(),
        );
        output.define(
            names::ARTIFACTS_TEST_REPORTS,
            artifacts.join("test-reports").display().to_string(),
        );

        Ok(output.into_variables())
    }
}

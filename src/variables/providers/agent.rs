use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::variables::names;
use crate::variables::provider::{DefineIfAbsent, ResolveContext, VariableProvider};
use crate::variables::Variable;

/// Environment markers of the supported CI agents, checked in order
const AGENTS: &[(&str, &str)] = &[
    ("GITHUB_ACTIONS", "github-actions"),
    ("GITLAB_CI", "gitlab"),
    ("TEAMCITY_VERSION", "teamcity"),
    ("JENKINS_URL", "jenkins"),
    ("TF_BUILD", "azure-pipelines"),
];

/// Detects the CI agent the build runs on. Local runs emit nothing.
pub struct BuildAgentProvider;

#[async_trait]
impl VariableProvider for BuildAgentProvider {
    fn name(&self) -> &'static str {
        "build_agent"
    }

    fn order(&self) -> i32 {
        1
    }

    async fn resolve(&self, context: &mut ResolveContext<'_>) -> Result<Vec<Variable>> {
        let detected = AGENTS
            .iter()
            .find(|(marker, _)| context.build.env_var(marker).is_some())
            .map(|(_, agent)| *agent);

        let Some(agent) = detected else {
            debug!("No build agent detected");
            return Ok(Vec::new());
        };

        let mut output = DefineIfAbsent::new(context.variables);
        output.define(names::AGENT_TYPE, agent);
        output.define(names::IS_RUNNING_ON_BUILD_AGENT, "true");
        Ok(output.into_variables())
    }
}

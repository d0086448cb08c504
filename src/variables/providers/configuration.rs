use anyhow::Result;
use async_trait::async_trait;

use crate::variables::names;
use crate::variables::provider::{DefineIfAbsent, ResolveContext, VariableProvider};
use crate::variables::providers::branch::is_main_branch;
use crate::variables::Variable;

pub const RELEASE: &str = "Release";
pub const DEBUG: &str = "Debug";

/// Picks Release for main, master and release branches, Debug otherwise
pub struct BuildConfigurationProvider;

fn configuration_for(branch: Option<&str>) -> &'static str {
    match branch {
        Some(branch) if is_main_branch(branch) => RELEASE,
        Some(branch) if branch.to_ascii_lowercase().starts_with("release") => RELEASE,
        _ => DEBUG,
    }
}

#[async_trait]
impl VariableProvider for BuildConfigurationProvider {
    fn name(&self) -> &'static str {
        "build_configuration"
    }

    fn order(&self) -> i32 {
        3
    }

    async fn resolve(&self, context: &mut ResolveContext<'_>) -> Result<Vec<Variable>> {
        let mut output = DefineIfAbsent::new(context.variables);
        if output.is_defined(names::CONFIGURATION) {
            return Ok(Vec::new());
        }

        let branch = context.variables.value(names::BRANCH_NAME)?;
        output.define(names::CONFIGURATION, configuration_for(branch));
        Ok(output.into_variables())
    }
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::variables::names;
use crate::variables::provider::{DefineIfAbsent, ResolveContext, VariableProvider};
use crate::variables::{Variable, VariableSet};

pub const VERSION_FILE_NAME: &str = "version.json";

/// Agent variables carrying a build counter
const BUILD_NUMBER_VARIABLES: &[&str] = &[
    "GITHUB_RUN_NUMBER",
    "CI_PIPELINE_IID",
    "BUILD_NUMBER",
    "BUILD_BUILDID",
];

#[derive(Debug, Deserialize)]
struct VersionFile {
    major: u64,
    #[serde(default)]
    minor: u64,
    #[serde(default)]
    patch: u64,
}

/// Composes `major.minor.patch.build` from `version.json` and the agent's
/// build counter. Components that are already defined take precedence over
/// the file.
pub struct VersionProvider;

fn component(variables: &VariableSet, key: &str, fallback: Option<u64>) -> Result<Option<u64>> {
    match variables.get_i64(key)? {
        Some(value) => u64::try_from(value)
            .map(Some)
            .with_context(|| format!("Variable '{}' must not be negative", key)),
        None => Ok(fallback),
    }
}

#[async_trait]
impl VariableProvider for VersionProvider {
    fn name(&self) -> &'static str {
        "version"
    }

    fn order(&self) -> i32 {
        4
    }

    async fn resolve(&self, context: &mut ResolveContext<'_>) -> Result<Vec<Variable>> {
        let file = match context.variables.get_path(names::SOURCE_ROOT)? {
            Some(root) => {
                let path = root.join(VERSION_FILE_NAME);
                let fs = &context.build.file_system;
                if fs.is_file(&path) {
                    let content = fs.read_to_string(&path)?;
                    let parsed: VersionFile = serde_json::from_str(&content)
                        .with_context(|| format!("Failed to parse {}", path.display()))?;
                    Some(parsed)
                } else {
                    None
                }
            }
            None => None,
        };

        let variables = context.variables;
        let file = file.as_ref();
        let Some(major) = component(variables, names::VERSION_MAJOR, file.map(|f| f.major))? else {
            return Ok(Vec::new());
        };
        let minor = component(variables, names::VERSION_MINOR, file.map(|f| f.minor))?
            .unwrap_or_default();
        let patch = component(variables, names::VERSION_PATCH, file.map(|f| f.patch))?
            .unwrap_or_default();

        let agent_build = BUILD_NUMBER_VARIABLES.iter().find_map(|name| {
            let value = context.build.env_var(name)?;
            match value.trim().parse::<u64>() {
                Ok(number) => Some(number),
                Err(_) => {
                    warn!(variable = name, value, "Ignoring non-numeric build number");
                    None
                }
            }
        });
        let build = component(variables, names::VERSION_BUILD, agent_build)?.unwrap_or_default();

        let mut output = DefineIfAbsent::new(variables);
        output.define(names::VERSION_MAJOR, major.to_string());
        output.define(names::VERSION_MINOR, minor.to_string());
        output.define(names::VERSION_PATCH, patch.to_string());
        output.define(names::VERSION_BUILD, build.to_string());
        output.define(
            names::VERSION,
            format!("{}.{}.{}.{}", major, minor, patch, build),
        );
        Ok(output.into_variables())
    }
}

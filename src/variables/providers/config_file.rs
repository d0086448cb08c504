use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::variables::names;
use crate::variables::aliasing::canonical_key;
use crate::variables::provider::{DefineIfAbsent, ProviderOrder, ResolveContext, VariableProvider};
use crate::variables::Variable;

/// Name of the per-repository configuration file
pub const CONFIG_FILE_NAME: &str = "arbor.toml";

/// Imports the `[variables]` table of `arbor.toml` in the source root
pub struct ConfigFileProvider;

fn render(key: &str, value: &toml::Value) -> Result<String> {
    match value {
        toml::Value::String(s) => Ok(s.clone()),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        toml::Value::Datetime(d) => Ok(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => {
            bail!("Variable '{}' must be a string, number or boolean", key)
        }
    }
}

#[async_trait]
impl VariableProvider for ConfigFileProvider {
    fn name(&self) -> &'static str {
        "config_file"
    }

    fn order(&self) -> i32 {
        ProviderOrder::CONFIG_FILE
    }

    async fn resolve(&self, context: &mut ResolveContext<'_>) -> Result<Vec<Variable>> {
        let Some(root) = context.variables.get_path(names::SOURCE_ROOT)? else {
            return Ok(Vec::new());
        };

        let path = root.join(CONFIG_FILE_NAME);
        let fs = &context.build.file_system;
        if !fs.is_file(&path) {
            return Ok(Vec::new());
        }

        let content = fs.read_to_string(&path)?;
        let document: toml::Table = content
            .parse()
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        let Some(table) = document.get("variables") else {
            return Ok(Vec::new());
        };
        let table = table
            .as_table()
            .with_context(|| format!("[variables] in {} must be a table", path.display()))?;

        let mut output = DefineIfAbsent::new(context.variables);
        for (key, value) in table {
            let value = render(key, value).with_context(|| format!("In {}", path.display()))?;
            if !output.define(&canonical_key(key), value) {
                debug!(key = %key, "Variable already defined, ignoring config file value");
            }
        }

        Ok(output.into_variables())
    }
}

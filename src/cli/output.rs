//! Output formatting for the `variables` and `tools` commands

use anyhow::{Context, Result};
use serde::Serialize;

use crate::diagnostics::VariableSnapshot;
use crate::tools::ToolRegistration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// Human-readable formatted text
    Human,
}

#[derive(Debug, Serialize)]
struct ToolEntry<'a> {
    name: &'a str,
    priority: i32,
    run_always: bool,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats an already redacted snapshot
    pub fn format_variables(&self, snapshot: &VariableSnapshot) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(snapshot.entries())
                .context("Failed to serialize variables to JSON"),
            OutputFormat::Human => Ok(snapshot.to_string()),
        }
    }

    /// Formats tools in execution order
    pub fn format_tools(&self, tools: &[ToolRegistration]) -> Result<String> {
        let entries: Vec<ToolEntry<'_>> = tools
            .iter()
            .map(|r| ToolEntry {
                name: r.name(),
                priority: r.priority,
                run_always: r.run_always,
            })
            .collect();

        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&entries)
                .context("Failed to serialize tools to JSON"),
            OutputFormat::Human => {
                let mut output = format!("{:>12}  {:<10}  {}\n", "PRIORITY", "RUN-ALWAYS", "NAME");
                for entry in &entries {
                    output.push_str(&format!(
                        "{:>12}  {:<10}  {}\n",
                        entry.priority,
                        if entry.run_always { "yes" } else { "no" },
                        entry.name
                    ));
                }
                Ok(output)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::SecretMatcher;
    use crate::tools::ToolRegistry;
    use crate::variables::{Variable, VariableSet};

    fn snapshot() -> VariableSnapshot {
        let variables: VariableSet = [
            Variable::new("Arbor.Build.Version", "1.0.0"),
            Variable::new("Arbor.Build.Token", "secret-value"),
        ]
        .into_iter()
        .collect();
        VariableSnapshot::capture(&variables, &SecretMatcher::default())
    }

    #[test]
    fn test_human_variables() {
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_variables(&snapshot())
            .unwrap();

        assert_eq!(output, "Arbor.Build.Version: 1.0.0\nArbor.Build.Token: *****");
    }

    #[test]
    fn test_json_variables_are_redacted() {
        let output = OutputFormatter::new(OutputFormat::Json)
            .format_variables(&snapshot())
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed[1]["key"], "Arbor.Build.Token");
        assert_eq!(parsed[1]["value"], "*****");
        assert!(!output.contains("secret-value"));
    }

    #[test]
    fn test_tools_table() {
        let tools = ToolRegistry::with_defaults().ordered();
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_tools(&tools)
            .unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), tools.len() + 1);
        assert!(lines[1].ends_with("help"));
        assert!(lines.last().unwrap().contains("yes"));
    }

    #[test]
    fn test_tools_json() {
        let tools = ToolRegistry::with_defaults().ordered();
        let output = OutputFormatter::new(OutputFormat::Json)
            .format_tools(&tools)
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed[0]["name"], "help");
        assert_eq!(parsed[0]["priority"], i32::MIN);
    }
}

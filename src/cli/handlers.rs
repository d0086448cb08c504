//! Command handlers. Each returns the process exit status.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::commands::{BuildArgs, ToolsArgs, VariablesArgs};
use super::output::OutputFormatter;
use crate::config::ArborConfig;
use crate::diagnostics::{process_exit_status, report_outcome, VariableSnapshot};
use crate::pipeline::{BuildContext, BuildPipeline, ExitCode};
use crate::progress::LoggingHandler;
use crate::variables::aliasing::canonical_key;
use crate::variables::{Variable, VariableSet};

fn build_context(
    config: &ArborConfig,
    repository_path: Option<&Path>,
    no_aliases: bool,
) -> Result<BuildContext> {
    config.validate()?;
    let pipeline_config = config.to_pipeline_config()?;
    let aliases = pipeline_config.compatibility_aliases && !no_aliases;
    let mut context =
        BuildContext::from_process(pipeline_config.with_compatibility_aliases(aliases))?;

    if let Some(path) = repository_path {
        context.working_directory = path
            .canonicalize()
            .with_context(|| format!("Repository path not found: {}", path.display()))?;
    }
    if let Some(root) = &config.source_root {
        context = context.with_source_root(root);
    }

    Ok(context)
}

fn seed(variables: &[(String, String)]) -> VariableSet {
    variables
        .iter()
        .map(|(key, value)| Variable::new(canonical_key(key), value.clone()))
        .collect()
}

/// Token cancelled on the first Ctrl-C
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling build");
            trigger.cancel();
        }
    });
    cancel
}

pub async fn handle_build(args: &BuildArgs, config: &ArborConfig) -> i32 {
    let mut context = match build_context(config, args.repository_path.as_deref(), args.no_aliases)
    {
        Ok(context) => context,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::FAILURE.code();
        }
    };
    debug!(config = %config, "Configuration loaded");

    let pipeline = BuildPipeline::with_defaults().with_progress(Arc::new(LoggingHandler));
    let cancel = cancel_on_ctrl_c();

    let result = pipeline
        .run(&mut context, seed(&args.variables), &args.tool_args, &cancel)
        .await;

    report_outcome(&result);
    process_exit_status(&result)
}

pub async fn handle_variables(args: &VariablesArgs, config: &ArborConfig) -> i32 {
    let mut context = match build_context(config, args.repository_path.as_deref(), args.no_aliases)
    {
        Ok(context) => context,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::FAILURE.code();
        }
    };

    let pipeline = BuildPipeline::with_defaults();
    let cancel = cancel_on_ctrl_c();
    let variables = match pipeline
        .resolve_variables(&mut context, seed(&args.variables), &cancel)
        .await
    {
        Ok(variables) => variables,
        Err(e) => {
            let result = Err(e);
            report_outcome(&result);
            return process_exit_status(&result);
        }
    };

    let snapshot = VariableSnapshot::capture(&variables, context.secrets());
    match OutputFormatter::new(args.format.into()).format_variables(&snapshot) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS.code()
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE.code()
        }
    }
}

pub fn handle_tools(args: &ToolsArgs) -> i32 {
    let pipeline = BuildPipeline::with_defaults();
    match OutputFormatter::new(args.format.into()).format_tools(&pipeline.tools().ordered()) {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS.code()
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE.code()
        }
    }
}

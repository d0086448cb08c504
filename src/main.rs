use arbor::cli::commands::{CliArgs, Commands};
use arbor::cli::handlers::{handle_build, handle_tools, handle_variables};
use arbor::util::logging::{config_from_env, init_logging, parse_level};
use arbor::{ArborConfig, VERSION};

use clap::Parser;
use tracing::debug;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("arbor v{} starting", VERSION);
    debug!(
        command = args.command.name(),
        overrides = ?args.command.override_keys(),
        "Parsed arguments"
    );

    let config = ArborConfig::from_env();
    let exit_code = match &args.command {
        Commands::Build(build_args) => handle_build(build_args, &config).await,
        Commands::Variables(variables_args) => handle_variables(variables_args, &config).await,
        Commands::Tools(tools_args) => handle_tools(tools_args),
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let mut config = config_from_env();
    if let Some(level) = args.effective_log_level() {
        config.level = parse_level(level);
    }
    init_logging(config);
}

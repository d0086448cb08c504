use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Convention-driven build runner
#[derive(Parser, Debug)]
#[command(
    name = "arbor",
    about = "Convention-driven build runner",
    version,
    author,
    long_about = "arbor resolves build variables from the environment, the repository and \
                  CI agent conventions, then runs the build tools in priority order. Cleanup \
                  tools run even when an earlier step fails."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Verbose output (debug level)")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

impl CliArgs {
    /// Log level chosen on the command line, if any. `--log-level` wins over
    /// `-v` and `-q`.
    pub fn effective_log_level(&self) -> Option<&str> {
        if let Some(level) = &self.log_level {
            Some(level.as_str())
        } else if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("error")
        } else {
            None
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Run the build",
        long_about = "Resolves variables and runs every build tool. The exit status is the \
                      exit code of the first failing tool.\n\n\
                      Examples:\n  \
                      arbor build\n  \
                      arbor build /path/to/repo --var Arbor.Build.Configuration=Release\n  \
                      arbor build -- --help"
    )]
    Build(BuildArgs),

    #[command(
        about = "Print the resolved variables",
        long_about = "Resolves variables without running any tool and prints them with \
                      secrets redacted.\n\n\
                      Examples:\n  \
                      arbor variables\n  \
                      arbor variables --format json"
    )]
    Variables(VariablesArgs),

    #[command(about = "List build tools in execution order")]
    Tools(ToolsArgs),
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Build(_) => "build",
            Commands::Variables(_) => "variables",
            Commands::Tools(_) => "tools",
        }
    }

    /// Keys of the `--var` overrides. Values are never exposed here since
    /// they may be secrets.
    pub fn override_keys(&self) -> Vec<&str> {
        let variables = match self {
            Commands::Build(args) => &args.variables,
            Commands::Variables(args) => &args.variables,
            Commands::Tools(_) => return Vec::new(),
        };
        variables.iter().map(|(key, _)| key.as_str()).collect()
    }
}

#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to repository (defaults to current directory)"
    )]
    pub repository_path: Option<PathBuf>,

    #[arg(
        long = "var",
        value_name = "KEY=VALUE",
        value_parser = parse_variable,
        help = "Define a variable before any provider runs (repeatable)"
    )]
    pub variables: Vec<(String, String)>,

    #[arg(long, help = "Do not add compatibility aliases for legacy variable names")]
    pub no_aliases: bool,

    #[arg(
        last = true,
        value_name = "TOOL_ARGS",
        help = "Arguments passed through to tools"
    )]
    pub tool_args: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct VariablesArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to repository (defaults to current directory)"
    )]
    pub repository_path: Option<PathBuf>,

    #[arg(
        long = "var",
        value_name = "KEY=VALUE",
        value_parser = parse_variable,
        help = "Define a variable before any provider runs (repeatable)"
    )]
    pub variables: Vec<(String, String)>,

    #[arg(long, help = "Do not add compatibility aliases for legacy variable names")]
    pub no_aliases: bool,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ToolsArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

/// Parses `KEY=VALUE`; the value may be empty and may contain `=`
pub fn parse_variable(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid variable '{}'. Expected KEY=VALUE", s))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Invalid variable '{}'. Key must not be empty", s));
    }

    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_build_args() {
        let args = CliArgs::parse_from(["arbor", "build"]);
        match args.command {
            Commands::Build(build_args) => {
                assert!(build_args.repository_path.is_none());
                assert!(build_args.variables.is_empty());
                assert!(!build_args.no_aliases);
                assert!(build_args.tool_args.is_empty());
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_build_with_options() {
        let args = CliArgs::parse_from([
            "arbor",
            "build",
            "/tmp/repo",
            "--var",
            "Arbor.Build.Configuration=Release",
            "--var",
            "Arbor.Build.Token=a=b",
            "--no-aliases",
            "--",
            "--help",
        ]);
        match args.command {
            Commands::Build(build_args) => {
                assert_eq!(build_args.repository_path, Some(PathBuf::from("/tmp/repo")));
                assert_eq!(
                    build_args.variables,
                    vec![
                        ("Arbor.Build.Configuration".to_string(), "Release".to_string()),
                        ("Arbor.Build.Token".to_string(), "a=b".to_string()),
                    ]
                );
                assert!(build_args.no_aliases);
                assert_eq!(build_args.tool_args, vec!["--help"]);
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_override_keys_omit_values() {
        let args = CliArgs::parse_from([
            "arbor",
            "variables",
            "--var",
            "Arbor.Build.Nuget.ApiKey=hunter2",
        ]);

        assert_eq!(args.command.name(), "variables");
        assert_eq!(args.command.override_keys(), vec!["Arbor.Build.Nuget.ApiKey"]);
        assert!(CliArgs::parse_from(["arbor", "tools"])
            .command
            .override_keys()
            .is_empty());
    }

    #[test]
    fn test_variables_command() {
        let args = CliArgs::parse_from(["arbor", "variables", "--format", "json"]);
        match args.command {
            Commands::Variables(variables_args) => {
                assert_eq!(variables_args.format, OutputFormatArg::Json);
            }
            _ => panic!("Expected Variables command"),
        }
    }

    #[test]
    fn test_tools_command() {
        let args = CliArgs::parse_from(["arbor", "tools"]);
        assert!(matches!(args.command, Commands::Tools(_)));
    }

    #[test]
    fn test_global_verbose_flag() {
        let args = CliArgs::parse_from(["arbor", "-v", "tools"]);
        assert!(args.verbose);
        assert_eq!(args.effective_log_level(), Some("debug"));
    }

    #[test]
    fn test_global_quiet_flag() {
        let args = CliArgs::parse_from(["arbor", "tools", "-q"]);
        assert!(args.quiet);
        assert_eq!(args.effective_log_level(), Some("error"));
    }

    #[test]
    fn test_log_level_wins() {
        let args = CliArgs::parse_from(["arbor", "--log-level", "trace", "-v", "tools"]);
        assert_eq!(args.effective_log_level(), Some("trace"));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(CliArgs::try_parse_from(["arbor", "-v", "-q", "tools"]).is_err());
    }

    #[yare::parameterized(
        simple = { "A=1", Some(("A", "1")) },
        empty_value = { "A=", Some(("A", "")) },
        nested_equals = { "A=b=c", Some(("A", "b=c")) },
        no_equals = { "A", None },
        empty_key = { "=1", None },
    )]
    fn test_parse_variable(input: &str, expected: Option<(&str, &str)>) {
        let expected = expected.map(|(k, v)| (k.to_string(), v.to_string()));
        assert_eq!(parse_variable(input).ok(), expected);
    }
}

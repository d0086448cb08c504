use std::fmt;
use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::fs::FileSystem;
use crate::variables::names;
use crate::variables::provider::{DefineIfAbsent, ResolveContext, VariableProvider};
use crate::variables::providers::configuration::RELEASE;
use crate::variables::Variable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildSystem {
    Cargo,
    Npm,
    Dotnet,
    Make,
}

impl BuildSystem {
    /// Detection order; the first build system with a manifest wins
    pub const ALL: [BuildSystem; 4] = [
        BuildSystem::Cargo,
        BuildSystem::Npm,
        BuildSystem::Dotnet,
        BuildSystem::Make,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            BuildSystem::Cargo => "cargo",
            BuildSystem::Npm => "npm",
            BuildSystem::Dotnet => "dotnet",
            BuildSystem::Make => "make",
        }
    }

    fn manifest_patterns(&self) -> &'static [&'static str] {
        match self {
            BuildSystem::Cargo => &["Cargo.toml"],
            BuildSystem::Npm => &["package.json"],
            BuildSystem::Dotnet => &["*.sln", "*.csproj"],
            BuildSystem::Make => &["Makefile", "makefile", "GNUmakefile"],
        }
    }

    fn detect(&self, file_names: &[String]) -> bool {
        self.manifest_patterns().iter().any(|pattern| {
            file_names.iter().any(|name| match pattern.strip_prefix('*') {
                Some(extension) => name.to_ascii_lowercase().ends_with(extension),
                None => name.as_str() == *pattern,
            })
        })
    }

    /// Restore, compile, test and package commands
    pub fn commands(&self, release: bool, packages: Option<&str>) -> BuildCommands {
        match self {
            BuildSystem::Cargo => {
                let profile = if release { " --release" } else { "" };
                BuildCommands {
                    restore: Some("cargo fetch".to_string()),
                    compile: Some(format!("cargo build{}", profile)),
                    test: Some(format!("cargo test{}", profile)),
                    package: Some("cargo package --no-verify".to_string()),
                }
            }
            BuildSystem::Npm => BuildCommands {
                restore: Some("npm ci".to_string()),
                compile: Some("npm run build --if-present".to_string()),
                test: Some("npm test".to_string()),
                package: Some(match packages {
                    Some(dir) => format!("npm pack --pack-destination \"{}\"", dir),
                    None => "npm pack".to_string(),
                }),
            },
            BuildSystem::Dotnet => {
                let configuration = if release { "Release" } else { "Debug" };
                BuildCommands {
                    restore: Some("dotnet restore".to_string()),
                    compile: Some(format!("dotnet build --no-restore -c {}", configuration)),
                    test: Some(format!("dotnet test --no-build -c {}", configuration)),
                    package: Some(match packages {
                        Some(dir) => {
                            format!("dotnet pack --no-build -c {} -o \"{}\"", configuration, dir)
                        }
                        None => format!("dotnet pack --no-build -c {}", configuration),
                    }),
                }
            }
            BuildSystem::Make => BuildCommands {
                restore: None,
                compile: Some("make".to_string()),
                test: Some("make test".to_string()),
                package: None,
            },
        }
    }

    pub fn detect_in(fs: &dyn FileSystem, root: &Path) -> Result<Option<BuildSystem>> {
        if !fs.is_dir(root) {
            return Ok(None);
        }
        let file_names: Vec<String> = fs
            .read_dir(root)?
            .into_iter()
            .filter(|entry| entry.is_file())
            .map(|entry| entry.file_name().to_string())
            .collect();

        Ok(Self::ALL
            .into_iter()
            .find(|system| system.detect(&file_names)))
    }
}

impl fmt::Display for BuildSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildCommands {
    pub restore: Option<String>,
    pub compile: Option<String>,
    pub test: Option<String>,
    pub package: Option<String>,
}

/// Detects the build system from manifests in the source root and proposes
/// commands for the command tools
pub struct BuildSystemProvider;

#[async_trait]
impl VariableProvider for BuildSystemProvider {
    fn name(&self) -> &'static str {
        "build_system"
    }

    fn order(&self) -> i32 {
        10
    }

    async fn resolve(&self, context: &mut ResolveContext<'_>) -> Result<Vec<Variable>> {
        let variables = context.variables;
        let Some(root) = variables.get_path(names::SOURCE_ROOT)? else {
            return Ok(Vec::new());
        };

        let Some(system) = BuildSystem::detect_in(context.build.file_system.as_ref(), &root)?
        else {
            debug!(root = %root.display(), "No build system detected");
            return Ok(Vec::new());
        };
        info!(build_system = %system, "Detected build system");

        let release = variables
            .value(names::CONFIGURATION)?
            .map(|c| c.eq_ignore_ascii_case(RELEASE))
            .unwrap_or(false);
        let commands = system.commands(release, variables.value(names::ARTIFACTS_PACKAGES)?);

        let mut output = DefineIfAbsent::new(variables);
        output.define(names::BUILD_SYSTEM, system.id());
        for (key, command) in [
            (names::RESTORE_COMMAND, commands.restore),
            (names::COMPILE_COMMAND, commands.compile),
            (names::TEST_COMMAND, commands.test),
            (names::PACKAGE_COMMAND, commands.package),
        ] {
            if let Some(command) = command {
                output.define(key, command);
            }
        }

        Ok(output.into_variables())
    }
}

//! Variable providers shipped with arbor

mod agent;
mod artifacts;
mod branch;
mod build_system;
mod config_file;
mod configuration;
mod debug_defaults;
mod environment;
mod identity;
mod source_root;
mod version;

pub use agent::BuildAgentProvider;
pub use artifacts::ArtifactsProvider;
pub use branch::BranchProvider;
pub use build_system::{BuildCommands, BuildSystem, BuildSystemProvider};
pub use config_file::ConfigFileProvider;
pub use configuration::BuildConfigurationProvider;
pub use debug_defaults::DebugDefaultsProvider;
pub use environment::EnvironmentVariableProvider;
pub use identity::BuildIdentityProvider;
pub use source_root::SourceRootProvider;
pub use version::VersionProvider;

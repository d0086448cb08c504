//! Per-run build context shared by providers and tools

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::diagnostics::SecretMatcher;
use crate::fs::{FileSystem, RealFileSystem};

use super::config::PipelineConfig;

/// Facts shared across the run that are cheaper to pass by reference than as
/// variables.
///
/// Providers may mutate it while variables are resolved; tools only ever see
/// a shared reference. A new context is built for every run.
pub struct BuildContext {
    /// Set by configuration or detected by the source root provider
    pub source_root: Option<PathBuf>,

    pub working_directory: PathBuf,

    pub file_system: Arc<dyn FileSystem>,

    pub start_time: DateTime<Utc>,

    pub config: PipelineConfig,

    environment: BTreeMap<String, String>,

    secrets: SecretMatcher,
}

impl BuildContext {
    pub fn new(
        working_directory: PathBuf,
        file_system: Arc<dyn FileSystem>,
        environment: BTreeMap<String, String>,
        config: PipelineConfig,
    ) -> Self {
        let secrets = config.secret_matcher();
        Self {
            source_root: None,
            working_directory,
            file_system,
            start_time: Utc::now(),
            config,
            environment,
            secrets,
        }
    }

    /// Context for the current process: real file system, current directory
    /// and a copy of the process environment
    pub fn from_process(config: PipelineConfig) -> Result<Self> {
        let working_directory =
            std::env::current_dir().context("Failed to determine the working directory")?;
        let environment = std::env::vars().collect();

        Ok(Self::new(
            working_directory,
            Arc::new(RealFileSystem::new()),
            environment,
            config,
        ))
    }

    pub fn with_source_root(mut self, source_root: impl Into<PathBuf>) -> Self {
        self.source_root = Some(source_root.into());
        self
    }

    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = start_time;
        self
    }

    pub fn source_root(&self) -> Option<&Path> {
        self.source_root.as_deref()
    }

    /// Environment variable captured when the context was built. Exact match
    /// first, then case-insensitive.
    pub fn env_var(&self, name: &str) -> Option<&str> {
        self.environment
            .get(name)
            .or_else(|| {
                self.environment
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .map(|(_, v)| v)
            })
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.environment
    }

    pub fn secrets(&self) -> &SecretMatcher {
        &self.secrets
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    impl BuildContext {
        /// Context over a mock file system rooted at `/repo`
        pub fn with_mocks(environment: &[(&str, &str)]) -> (Self, Arc<MockFileSystem>) {
            let fs = Arc::new(MockFileSystem::with_root(PathBuf::from("/repo")));
            let environment = environment
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();

            let context = Self::new(
                PathBuf::from("/repo"),
                fs.clone(),
                environment,
                PipelineConfig::default(),
            );

            (context, fs)
        }
    }

    #[test]
    fn test_env_var_lookup() {
        let (context, _fs) = BuildContext::with_mocks(&[("GITHUB_ACTIONS", "true"), ("EMPTY", "")]);

        assert_eq!(context.env_var("GITHUB_ACTIONS"), Some("true"));
        assert_eq!(context.env_var("github_actions"), Some("true"));
        assert_eq!(context.env_var("EMPTY"), None);
        assert_eq!(context.env_var("MISSING"), None);
    }

    #[test]
    fn test_with_source_root() {
        let (context, _fs) = BuildContext::with_mocks(&[]);
        assert!(context.source_root().is_none());

        let context = context.with_source_root("/repo");
        assert_eq!(context.source_root(), Some(Path::new("/repo")));
    }

    #[test]
    fn test_from_process() {
        let context = BuildContext::from_process(PipelineConfig::default()).unwrap();
        assert!(context.working_directory.is_absolute());
    }
}

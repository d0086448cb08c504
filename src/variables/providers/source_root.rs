use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::fs::FileSystem;
use crate::variables::names;
use crate::variables::provider::{ProviderOrder, ResolveContext, VariableProvider};
use crate::variables::Variable;

/// Determines the repository root and records it in the build context.
///
/// An explicit root (variable or context) wins; otherwise the nearest ancestor
/// of the working directory holding `.git`, falling back to the working
/// directory itself.
pub struct SourceRootProvider;

fn find_vcs_root(fs: &dyn FileSystem, start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| fs.exists(&dir.join(".git")))
        .map(Path::to_path_buf)
}

#[async_trait]
impl VariableProvider for SourceRootProvider {
    fn name(&self) -> &'static str {
        "source_root"
    }

    fn order(&self) -> i32 {
        ProviderOrder::SOURCE_ROOT
    }

    async fn resolve(&self, context: &mut ResolveContext<'_>) -> Result<Vec<Variable>> {
        if let Some(defined) = context.variables.get_path(names::SOURCE_ROOT)? {
            if context.build.source_root.is_none() {
                context.build.source_root = Some(defined);
            }
            return Ok(Vec::new());
        }

        let root = match &context.build.source_root {
            Some(root) => root.clone(),
            None => {
                let working_directory = &context.build.working_directory;
                match find_vcs_root(context.build.file_system.as_ref(), working_directory) {
                    Some(root) => root,
                    None => {
                        debug!(
                            directory = %working_directory.display(),
                            "No .git directory found, using working directory as source root"
                        );
                        working_directory.clone()
                    }
                }
            }
        };

        context.build.source_root = Some(root.clone());
        Ok(vec![Variable::new(
            names::SOURCE_ROOT,
            root.display().to_string(),
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::BuildContext;
    use crate::testing::resolve_provider;
    use crate::variables::VariableSet;

    #[tokio::test]
    async fn test_detects_git_ancestor() {
        let (mut build, fs) = BuildContext::with_mocks(&[]);
        fs.add_dir("/repo/.git");
        fs.add_dir("/repo/src/app");
        build.working_directory = PathBuf::from("/repo/src/app");

        let produced = resolve_provider(&SourceRootProvider, &mut build, &VariableSet::new())
            .await
            .unwrap();

        assert_eq!(produced[0].value(), Some("/repo"));
        assert_eq!(build.source_root(), Some(Path::new("/repo")));
    }

    #[tokio::test]
    async fn test_falls_back_to_working_directory() {
        let (mut build, fs) = BuildContext::with_mocks(&[]);
        fs.add_dir("/repo/tool");
        build.working_directory = PathBuf::from("/repo/tool");

        let produced = resolve_provider(&SourceRootProvider, &mut build, &VariableSet::new())
            .await
            .unwrap();

        assert_eq!(produced[0].value(), Some("/repo/tool"));
    }

    #[tokio::test]
    async fn test_context_override_wins_over_detection() {
        let (build, fs) = BuildContext::with_mocks(&[]);
        fs.add_dir("/repo/.git");
        let mut build = build.with_source_root("/elsewhere");

        let produced = resolve_provider(&SourceRootProvider, &mut build, &VariableSet::new())
            .await
            .unwrap();

        assert_eq!(produced[0].value(), Some("/elsewhere"));
    }

    #[tokio::test]
    async fn test_defined_variable_is_adopted_by_context() {
        let (mut build, _fs) = BuildContext::with_mocks(&[]);
        let mut variables = VariableSet::new();
        variables.push(Variable::new(names::SOURCE_ROOT, "/from/cli"));

        let produced = resolve_provider(&SourceRootProvider, &mut build, &variables)
            .await
            .unwrap();

        assert!(produced.is_empty());
        assert_eq!(build.source_root(), Some(Path::new("/from/cli")));
    }
}

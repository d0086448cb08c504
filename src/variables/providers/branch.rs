use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::process::{CommandSpec, ProcessOutcome, ProcessRunner};
use crate::variables::names;
use crate::variables::provider::{DefineIfAbsent, ResolveContext, VariableProvider};
use crate::variables::Variable;

/// Agent variables carrying the branch name, most specific first
const BRANCH_VARIABLES: &[&str] = &[
    "GITHUB_HEAD_REF",
    "GITHUB_REF_NAME",
    "CI_COMMIT_REF_NAME",
    "BRANCH_NAME",
    "BUILD_SOURCEBRANCHNAME",
];

const MAIN_BRANCHES: &[&str] = &["main", "master"];

/// Determines the branch being built, from the agent or from git
pub struct BranchProvider;

pub fn normalize_branch(name: &str) -> &str {
    let name = name.trim();
    name.strip_prefix("refs/heads/").unwrap_or(name)
}

pub fn is_main_branch(name: &str) -> bool {
    MAIN_BRANCHES
        .iter()
        .any(|main| main.eq_ignore_ascii_case(name))
}

#[async_trait]
impl VariableProvider for BranchProvider {
    fn name(&self) -> &'static str {
        "branch"
    }

    fn order(&self) -> i32 {
        2
    }

    async fn resolve(&self, context: &mut ResolveContext<'_>) -> Result<Vec<Variable>> {
        let mut output = DefineIfAbsent::new(context.variables);

        let branch = match context.variables.value(names::BRANCH_NAME)? {
            Some(defined) => Some(defined.to_string()),
            None => {
                let from_agent = BRANCH_VARIABLES
                    .iter()
                    .find_map(|name| context.build.env_var(name))
                    .map(|name| normalize_branch(name).to_string());

                let detected = match from_agent {
                    Some(branch) => Some(branch),
                    None => git_branch(context).await,
                };

                if let Some(branch) = &detected {
                    output.define(names::BRANCH_NAME, branch.clone());
                }
                detected
            }
        };

        if let Some(branch) = branch {
            output.define(names::BRANCH_IS_MAIN, is_main_branch(&branch).to_string());
        }

        Ok(output.into_variables())
    }
}

async fn git_branch(context: &ResolveContext<'_>) -> Option<String> {
    let root = context.build.source_root()?.to_path_buf();
    if !context.build.file_system.exists(&root.join(".git")) {
        return None;
    }

    let spec = CommandSpec::new("git")
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .current_dir(&root);

    match ProcessRunner::quiet().run(&spec, context.cancel).await {
        Ok(output) if output.outcome == ProcessOutcome::Exited(0) => {
            let branch = output.stdout.trim();
            // Detached checkouts report HEAD
            if branch.is_empty() || branch == "HEAD" {
                None
            } else {
                Some(branch.to_string())
            }
        }
        Ok(output) => {
            debug!(outcome = ?output.outcome, "git could not determine the branch");
            None
        }
        Err(e) => {
            debug!(error = %e, "git is not available");
            None
        }
    }
}

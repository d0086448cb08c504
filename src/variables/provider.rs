use anyhow::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::pipeline::BuildContext;

use super::aliasing::alias_keys;
use super::variable::{Variable, VariableSet};

/// Well-known provider positions; lower runs earlier
pub struct ProviderOrder;

impl ProviderOrder {
    pub const MIN: i32 = i32::MIN;
    /// Debug-only defaults run before everything else
    pub const DEBUG_DEFAULTS: i32 = Self::MIN;
    pub const ENVIRONMENT: i32 = -3;
    pub const SOURCE_ROOT: i32 = -2;
    pub const CONFIG_FILE: i32 = -1;
    pub const DEFAULT: i32 = 0;
    /// Runs last, after nearly everything else is known
    pub const IGNORED: i32 = i32::MAX;
}

/// What a provider sees while it runs
pub struct ResolveContext<'a> {
    /// Mutable only during resolution
    pub build: &'a mut BuildContext,
    /// Everything resolved by earlier providers
    pub variables: &'a VariableSet,
    pub cancel: &'a CancellationToken,
}

/// Contributes variables to the run.
///
/// Providers must not emit a key that is already defined: check
/// [`VariableSet::contains`] first. Returning nothing is the normal way to
/// say "not applicable here".
#[async_trait]
pub trait VariableProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn order(&self) -> i32 {
        ProviderOrder::DEFAULT
    }

    async fn resolve(&self, context: &mut ResolveContext<'_>) -> Result<Vec<Variable>>;
}

/// Collects a provider's output while skipping keys that are already defined,
/// either in the accumulated set or earlier in the same output.
pub(crate) struct DefineIfAbsent<'a> {
    existing: &'a VariableSet,
    emitted: Vec<Variable>,
}

impl<'a> DefineIfAbsent<'a> {
    pub fn new(existing: &'a VariableSet) -> Self {
        Self {
            existing,
            emitted: Vec::new(),
        }
    }

    /// Any spelling of the key counts, so an `Arbor_Build_*` override is
    /// not shadowed by a default for `Arbor.Build.*`
    pub fn is_defined(&self, key: &str) -> bool {
        if self.existing.defines(key) {
            return true;
        }
        let aliases = alias_keys(key);
        self.emitted
            .iter()
            .any(|v| v.has_key(key) || aliases.iter().any(|alias| v.has_key(alias)))
    }

    pub fn define(&mut self, key: &str, value: impl Into<String>) -> bool {
        if self.is_defined(key) {
            return false;
        }
        self.emitted.push(Variable::new(key, value));
        true
    }

    pub fn into_variables(self) -> Vec<Variable> {
        self.emitted
    }
}

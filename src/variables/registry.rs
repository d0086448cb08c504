//! Variable provider registry

use std::sync::Arc;

use super::provider::VariableProvider;
use super::providers::*;

/// Explicit list of providers known to this distribution
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn VariableProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DebugDefaultsProvider));
        registry.register(Arc::new(EnvironmentVariableProvider));
        registry.register(Arc::new(SourceRootProvider));
        registry.register(Arc::new(ConfigFileProvider));
        registry.register(Arc::new(ArtifactsProvider));
        registry.register(Arc::new(BuildAgentProvider));
        registry.register(Arc::new(BranchProvider));
        registry.register(Arc::new(BuildConfigurationProvider));
        registry.register(Arc::new(VersionProvider));
        registry.register(Arc::new(BuildSystemProvider));
        registry.register(Arc::new(BuildIdentityProvider));
        registry
    }

    pub fn register(&mut self, provider: Arc<dyn VariableProvider>) {
        self.providers.push(provider);
    }

    /// Providers by ascending order, registration order on ties
    pub fn ordered(&self) -> Vec<Arc<dyn VariableProvider>> {
        let mut providers = self.providers.clone();
        providers.sort_by_key(|p| p.order());
        providers
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

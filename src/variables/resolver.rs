//! Variable resolution: runs providers in order and accumulates their output

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::BuildError;
use crate::pipeline::{BuildContext, DuplicateKeyPolicy};
use crate::progress::{ProgressEvent, ProgressHandler};

use super::provider::{ResolveContext, VariableProvider};
use super::registry::ProviderRegistry;
use super::variable::{VariableError, VariableSet};

pub struct VariableResolver {
    providers: Vec<Arc<dyn VariableProvider>>,
    progress: Option<Arc<dyn ProgressHandler>>,
}

impl VariableResolver {
    pub fn new(registry: &ProviderRegistry) -> Self {
        Self {
            providers: registry.ordered(),
            progress: None,
        }
    }

    pub fn with_progress(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.progress = Some(handler);
        self
    }

    /// Run every provider once, strictly in sequence, starting from `seed`.
    ///
    /// Each provider sees everything resolved before it. Returned variables are
    /// appended as-is; what happens to a key that is already defined depends on
    /// the context's [`DuplicateKeyPolicy`].
    pub async fn resolve(
        &self,
        context: &mut BuildContext,
        seed: VariableSet,
        cancel: &CancellationToken,
    ) -> Result<VariableSet, BuildError> {
        let mut variables = seed;
        let policy = context.config.duplicate_policy;

        if !variables.is_empty() {
            debug!(count = variables.len(), "Seeded variables");
        }

        for provider in &self.providers {
            if cancel.is_cancelled() {
                info!(provider = provider.name(), "Cancelled before provider");
                return Err(BuildError::cancelled(&variables, context.secrets()));
            }

            self.emit(&ProgressEvent::ProviderStarted {
                provider: provider.name().to_string(),
                order: provider.order(),
            });
            let start = Instant::now();

            let produced = {
                let mut resolve_context = ResolveContext {
                    build: &mut *context,
                    variables: &variables,
                    cancel,
                };
                provider.resolve(&mut resolve_context).await
            };

            let produced = match produced {
                Ok(produced) => produced,
                Err(error) => {
                    return Err(BuildError::from_provider(
                        provider.name(),
                        error,
                        &variables,
                        context.secrets(),
                    ));
                }
            };

            let count = produced.len();
            for variable in produced {
                if variables.defines(variable.key()) {
                    match policy {
                        DuplicateKeyPolicy::Allow => {
                            warn!(
                                provider = provider.name(),
                                key = variable.key(),
                                "Provider redefined an existing variable"
                            );
                        }
                        DuplicateKeyPolicy::Reject => {
                            let error = VariableError::Redefined {
                                key: variable.key().to_string(),
                                provider: provider.name().to_string(),
                            };
                            return Err(BuildError::configuration(
                                error,
                                &variables,
                                context.secrets(),
                            ));
                        }
                    }
                }

                debug!(provider = provider.name(), key = variable.key(), "Variable defined");
                variables.push(variable);
            }

            self.emit(&ProgressEvent::ProviderComplete {
                provider: provider.name().to_string(),
                variables: count,
                duration: start.elapsed(),
            });
        }

        Ok(variables)
    }

    fn emit(&self, event: &ProgressEvent) {
        if let Some(handler) = &self.progress {
            handler.on_progress(event);
        }
    }
}

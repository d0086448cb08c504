//! Build variables: the data model, the provider contract and the resolution
//! stage that turns an ordered set of providers into one variable set.

pub mod aliasing;
pub mod names;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod resolver;
pub mod variable;

pub use aliasing::add_compatibility_aliases;
pub use provider::{ProviderOrder, ResolveContext, VariableProvider};
pub use registry::ProviderRegistry;
pub use resolver::VariableResolver;
pub use variable::{keys_equal, Variable, VariableError, VariableSet};

use crate::diagnostics::SecretMatcher;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// What the resolver does when a provider returns a key that is already defined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateKeyPolicy {
    /// Append and warn; any single-key lookup of the key then fails
    #[default]
    Allow,
    /// Fail the run with a configuration error
    Reject,
}

impl FromStr for DuplicateKeyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "allow" => Ok(DuplicateKeyPolicy::Allow),
            "reject" => Ok(DuplicateKeyPolicy::Reject),
            other => Err(format!(
                "Invalid duplicate key policy: {}. Valid options: allow, reject",
                other
            )),
        }
    }
}

impl fmt::Display for DuplicateKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicateKeyPolicy::Allow => write!(f, "allow"),
            DuplicateKeyPolicy::Reject => write!(f, "reject"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub duplicate_policy: DuplicateKeyPolicy,
    pub compatibility_aliases: bool,
    pub debug_defaults: bool,
    pub tool_timeout: Option<Duration>,
    /// Added to the default secret markers
    pub secret_markers: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicateKeyPolicy::Allow,
            compatibility_aliases: true,
            debug_defaults: false,
            tool_timeout: None,
            secret_markers: Vec::new(),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicateKeyPolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    pub fn with_compatibility_aliases(mut self, enabled: bool) -> Self {
        self.compatibility_aliases = enabled;
        self
    }

    pub fn with_debug_defaults(mut self, enabled: bool) -> Self {
        self.debug_defaults = enabled;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.tool_timeout = timeout;
        self
    }

    pub fn with_secret_markers(mut self, markers: Vec<String>) -> Self {
        self.secret_markers = markers;
        self
    }

    pub fn secret_matcher(&self) -> SecretMatcher {
        SecretMatcher::with_extra_markers(self.secret_markers.iter().cloned())
    }
}

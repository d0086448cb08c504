//! Diagnostics: redacted variable snapshots and exit status reporting
//!
//! This is the only place that formats variable values for output. Every value
//! leaves the process through [`SecretMatcher::render_value`], so keys that look
//! like credentials are never printed.

pub mod exit;
pub mod redaction;
pub mod snapshot;

pub use exit::{process_exit_status, report_outcome};
pub use redaction::{SecretMatcher, DEFAULT_SECRET_MARKERS, EMPTY_VALUE, REDACTED};
pub use snapshot::{SnapshotEntry, VariableSnapshot};

//! Point-in-time, redacted copy of a variable set

use super::redaction::SecretMatcher;
use crate::variables::VariableSet;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotEntry {
    pub key: String,
    pub value: String,
}

/// Ordered `key: value` lines, secrets already replaced.
///
/// Values are redacted at capture time so the snapshot can travel inside
/// errors and be debug-printed without leaking anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariableSnapshot {
    entries: Vec<SnapshotEntry>,
}

impl VariableSnapshot {
    pub fn capture(variables: &VariableSet, matcher: &SecretMatcher) -> Self {
        let entries = variables
            .iter()
            .map(|v| SnapshotEntry {
                key: v.key().to_string(),
                value: matcher.render_value(v.key(), v.value()),
            })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First rendered value for a key, case-insensitive
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| crate::variables::keys_equal(&e.key, key))
            .map(|e| e.value.as_str())
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| format!("{}: {}", e.key, e.value))
            .collect()
    }
}

impl fmt::Display for VariableSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", line)?;
        }
        Ok(())
    }
}

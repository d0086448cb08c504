//! Compatibility aliases between the historical variable naming schemes.
//!
//! Keys exist in two product prefixes (`Arbor.X` legacy, `Arbor.Build`
//! current) and two separator styles (`.` and `_`). For every prefixed key the
//! other three spellings are added with the same value, so
//! `Arbor.X.Foo=bar` also yields `Arbor.Build.Foo`, `Arbor_X_Foo` and
//! `Arbor_Build_Foo`.

use tracing::debug;

use super::variable::{Variable, VariableSet};

const CURRENT_PREFIX: [&str; 2] = ["Arbor", "Build"];
const LEGACY_PREFIX: [&str; 2] = ["Arbor", "X"];
const SEPARATORS: [char; 2] = ['.', '_'];

/// The remainder of `key` after a known prefix, if it has one
fn strip_known_prefix(key: &str) -> Option<&str> {
    for prefix in [CURRENT_PREFIX, LEGACY_PREFIX] {
        for separator in SEPARATORS {
            let candidate = format!(
                "{}{}",
                prefix.join(&separator.to_string()),
                separator
            );
            if key.len() <= candidate.len() {
                continue;
            }
            if let Some(head) = key.get(..candidate.len()) {
                if head.eq_ignore_ascii_case(&candidate) {
                    return key.get(candidate.len()..);
                }
            }
        }
    }
    None
}

/// All four spellings of a prefixed key; empty for keys without a known prefix
pub fn alias_keys(key: &str) -> Vec<String> {
    let Some(rest) = strip_known_prefix(key) else {
        return Vec::new();
    };

    let dotted = rest.replace('_', ".");
    let underscored = rest.replace('.', "_");

    let mut keys = Vec::with_capacity(4);
    for prefix in [CURRENT_PREFIX, LEGACY_PREFIX] {
        keys.push(format!("{}.{}", prefix.join("."), dotted));
        keys.push(format!("{}_{}", prefix.join("_"), underscored));
    }
    keys
}

/// The current dotted spelling (`Arbor.Build.*`) of a prefixed key; other
/// keys are returned unchanged
pub fn canonical_key(key: &str) -> String {
    alias_keys(key)
        .into_iter()
        .next()
        .unwrap_or_else(|| key.to_string())
}

/// Return `variables` followed by every missing alias.
///
/// Existing entries are never touched and an alias is only added when no
/// entry has that key yet, so the output has no new ambiguous keys and running
/// it again adds nothing.
pub fn add_compatibility_aliases(variables: &VariableSet) -> VariableSet {
    let mut result = variables.clone();

    for variable in variables {
        for alias in alias_keys(variable.key()) {
            if result.contains(&alias) {
                continue;
            }
            debug!(key = variable.key(), alias = %alias, "Adding compatibility alias");
            result.push(Variable::with_optional_value(
                alias,
                variable.value().map(str::to_string),
            ));
        }
    }

    result
}

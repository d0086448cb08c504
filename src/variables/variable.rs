//! Build variables and the append-only set they are resolved into

use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use thiserror::Error;

use super::aliasing::alias_keys;

/// Minimum Jaro-Winkler score for a defined key to be offered as a suggestion
const SUGGESTION_THRESHOLD: f64 = 0.85;

/// Errors raised by single-key lookups over a [`VariableSet`]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VariableError {
    /// More than one entry shares the key
    #[error("Variable '{key}' is defined {count} times; a single-key lookup requires one definition")]
    Ambiguous { key: String, count: usize },

    /// A required key is absent or has no value
    #[error("Required variable '{key}' is not defined{}", format_suggestion(.suggestion))]
    Missing {
        key: String,
        suggestion: Option<String>,
    },

    /// A provider returned a key that was already defined
    #[error("Provider '{provider}' redefined variable '{key}'")]
    Redefined { key: String, provider: String },

    /// The value could not be interpreted as the requested type
    #[error("Variable '{key}' has invalid value '{value}', expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

fn format_suggestion(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(key) => format!(" (did you mean '{}'?)", key),
        None => String::new(),
    }
}

/// Ordinal case-insensitive key comparison
pub fn keys_equal(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        a.eq_ignore_ascii_case(b)
    } else {
        a.to_lowercase() == b.to_lowercase()
    }
}

/// One resolved piece of build configuration.
///
/// Identity is the key alone, compared case-insensitively: two variables with
/// equal keys are the same variable whatever their values are.
#[derive(Debug, Clone)]
pub struct Variable {
    key: String,
    value: Option<String>,
}

impl Variable {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    /// A variable whose definer deliberately left the value out
    pub fn empty(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }

    pub fn with_optional_value(key: impl Into<String>, value: Option<String>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn has_key(&self, key: &str) -> bool {
        keys_equal(&self.key, key)
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        keys_equal(&self.key, &other.key)
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.to_lowercase().hash(state);
    }
}

/// Insertion-ordered, append-only collection of resolved variables.
///
/// The set itself tolerates repeated keys so the resolver can record what
/// providers actually returned; single-key lookups refuse to pick between
/// repeated entries and fail with [`VariableError::Ambiguous`] instead.
#[derive(Debug, Clone, Default)]
pub struct VariableSet {
    variables: Vec<Variable>,
}

impl VariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Variable> {
        self.variables.iter()
    }

    pub fn push(&mut self, variable: Variable) {
        self.variables.push(variable);
    }

    pub fn extend(&mut self, variables: impl IntoIterator<Item = Variable>) {
        self.variables.extend(variables);
    }

    /// True when at least one entry has the key, ambiguous or not
    pub fn contains(&self, key: &str) -> bool {
        self.variables.iter().any(|v| v.has_key(key))
    }

    /// True when the key is defined under any of its compatibility spellings
    pub fn defines(&self, key: &str) -> bool {
        self.contains(key) || alias_keys(key).iter().any(|alias| self.contains(alias))
    }

    pub fn count(&self, key: &str) -> usize {
        self.variables.iter().filter(|v| v.has_key(key)).count()
    }

    /// Keys that appear more than once, in first-seen order
    pub fn ambiguous_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for variable in &self.variables {
            if self.count(variable.key()) > 1 && !keys.iter().any(|k| keys_equal(k, variable.key()))
            {
                keys.push(variable.key().to_string());
            }
        }
        keys
    }

    /// Single-key lookup
    pub fn get(&self, key: &str) -> Result<Option<&Variable>, VariableError> {
        let mut matches = self.variables.iter().filter(|v| v.has_key(key));
        let first = matches.next();
        let extra = matches.count();

        if extra > 0 {
            return Err(VariableError::Ambiguous {
                key: key.to_string(),
                count: extra + 1,
            });
        }

        Ok(first)
    }

    /// Value of a key; `None` when the key is absent or was defined without a value
    pub fn value(&self, key: &str) -> Result<Option<&str>, VariableError> {
        Ok(self.get(key)?.and_then(|v| v.value()))
    }

    /// Value of a key that must be defined with a non-empty value
    pub fn require(&self, key: &str) -> Result<&str, VariableError> {
        match self.value(key)? {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(VariableError::Missing {
                key: key.to_string(),
                suggestion: self.suggest(key),
            }),
        }
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, VariableError> {
        let Some(raw) = self.value(key)? else {
            return Ok(None);
        };

        match raw.trim().to_lowercase().as_str() {
            "" => Ok(None),
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(VariableError::InvalidValue {
                key: key.to_string(),
                value: raw.to_string(),
                expected: "a boolean",
            }),
        }
    }

    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool, VariableError> {
        Ok(self.get_bool(key)?.unwrap_or(default))
    }

    pub fn get_i64(&self, key: &str) -> Result<Option<i64>, VariableError> {
        let Some(raw) = self.value(key)? else {
            return Ok(None);
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        trimmed
            .parse::<i64>()
            .map(Some)
            .map_err(|_| VariableError::InvalidValue {
                key: key.to_string(),
                value: raw.to_string(),
                expected: "an integer",
            })
    }

    pub fn get_path(&self, key: &str) -> Result<Option<PathBuf>, VariableError> {
        Ok(self
            .value(key)?
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from))
    }

    pub fn require_path(&self, key: &str) -> Result<PathBuf, VariableError> {
        self.require(key).map(PathBuf::from)
    }

    fn suggest(&self, key: &str) -> Option<String> {
        let wanted = key.to_lowercase();
        self.variables
            .iter()
            .filter(|v| !v.has_key(key))
            .map(|v| {
                let score = strsim::jaro_winkler(&wanted, &v.key().to_lowercase());
                (score, v.key())
            })
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(_, key)| key.to_string())
    }
}

impl FromIterator<Variable> for VariableSet {
    fn from_iter<I: IntoIterator<Item = Variable>>(iter: I) -> Self {
        Self {
            variables: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a VariableSet {
    type Item = &'a Variable;
    type IntoIter = std::slice::Iter<'a, Variable>;

    fn into_iter(self) -> Self::IntoIter {
        self.variables.iter()
    }
}

impl IntoIterator for VariableSet {
    type Item = Variable;
    type IntoIter = std::vec::IntoIter<Variable>;

    fn into_iter(self) -> Self::IntoIter {
        self.variables.into_iter()
    }
}

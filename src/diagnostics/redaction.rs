//! Secret-like key detection

use regex::Regex;

/// Rendered in place of any secret value
pub const REDACTED: &str = "*****";

/// Rendered for variables defined without a value
pub const EMPTY_VALUE: &str = "<empty>";

/// Key fragments that mark a variable as secret
pub const DEFAULT_SECRET_MARKERS: &[&str] = &["password", "token", "apikey", "api_key", "secret"];

/// Decides which keys are secret.
///
/// A key is secret when it contains any marker, ignoring case.
#[derive(Debug, Clone)]
pub struct SecretMatcher {
    markers: Vec<String>,
    pattern: Option<Regex>,
}

impl SecretMatcher {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for marker in markers {
            let marker = marker.into().trim().to_lowercase();
            if !marker.is_empty() && !normalized.contains(&marker) {
                normalized.push(marker);
            }
        }

        let pattern = if normalized.is_empty() {
            None
        } else {
            let alternation = normalized
                .iter()
                .map(|m| regex::escape(m))
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&format!("(?i)(?:{})", alternation)).ok()
        };

        Self {
            markers: normalized,
            pattern,
        }
    }

    /// Default markers plus any extra ones
    pub fn with_extra_markers<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let markers = DEFAULT_SECRET_MARKERS
            .iter()
            .map(|m| m.to_string())
            .chain(extra.into_iter().map(Into::into));
        Self::new(markers)
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn is_secret(&self, key: &str) -> bool {
        match &self.pattern {
            Some(pattern) => pattern.is_match(key),
            None => {
                let key = key.to_lowercase();
                self.markers.iter().any(|m| key.contains(m.as_str()))
            }
        }
    }

    /// The display form of a value, redacted when the key is secret
    pub fn render_value(&self, key: &str, value: Option<&str>) -> String {
        if self.is_secret(key) {
            return REDACTED.to_string();
        }

        match value {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => EMPTY_VALUE.to_string(),
        }
    }
}

impl Default for SecretMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_SECRET_MARKERS.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[yare::parameterized(
        password = { "Arbor.Build.NuGet.Password" },
        upper_token = { "GITHUB_TOKEN" },
        apikey = { "Arbor.Build.NuGet.ApiKey" },
        snake_api_key = { "deploy_api_key" },
        secret = { "ClientSecret" },
    )]
    fn test_secret_keys_are_redacted(key: &str) {
        let matcher = SecretMatcher::default();
        assert!(matcher.is_secret(key));
        assert_eq!(matcher.render_value(key, Some("hunter2")), REDACTED);
    }

    #[test]
    fn test_secret_redacted_even_when_empty() {
        let matcher = SecretMatcher::default();
        assert_eq!(matcher.render_value("Password", None), REDACTED);
        assert_eq!(matcher.render_value("Password", Some("")), REDACTED);
    }

    #[test]
    fn test_plain_values() {
        let matcher = SecretMatcher::default();
        assert_eq!(
            matcher.render_value("Arbor.Build.Configuration", Some("Release")),
            "Release"
        );
        assert_eq!(matcher.render_value("Arbor.Build.Artifacts", None), EMPTY_VALUE);
        assert_eq!(matcher.render_value("Arbor.Build.Artifacts", Some("")), EMPTY_VALUE);
    }

    #[test]
    fn test_extra_markers() {
        let matcher = SecretMatcher::with_extra_markers(["Credential", " "]);
        assert!(matcher.is_secret("Arbor.Build.Deploy.credential"));
        assert!(matcher.is_secret("token"));
        assert_eq!(matcher.markers().len(), DEFAULT_SECRET_MARKERS.len() + 1);
    }

    #[test]
    fn test_markers_are_literal() {
        let matcher = SecretMatcher::new(["a.b"]);
        assert!(matcher.is_secret("X.A.B"));
        assert!(!matcher.is_secret("aXb"));
    }

    #[test]
    fn test_no_markers_redacts_nothing() {
        let matcher = SecretMatcher::new(Vec::<String>::new());
        assert!(!matcher.is_secret("Password"));
    }
}

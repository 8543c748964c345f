//! Client configuration, loaded from the environment at startup.

use std::time::Duration;

use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_CREDENTIALS_DB: &str = "sqlite://quiz-credentials.sqlite3";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_base_url: Url,
    pub request_timeout: Duration,
    pub credentials_db: String,
    pub log_filter: String,
}

impl ClientConfig {
    /// Load configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = parse_base_url(
            "QUIZ_API_URL",
            &lookup("QUIZ_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()),
        )?;

        let request_timeout = match lookup("QUIZ_HTTP_TIMEOUT_SECS") {
            Some(raw) => parse_timeout("QUIZ_HTTP_TIMEOUT_SECS", &raw)?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let credentials_db = lookup("QUIZ_CREDENTIALS_DB")
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .unwrap_or_else(|| DEFAULT_CREDENTIALS_DB.into());

        let log_filter = lookup("RUST_LOG").unwrap_or_else(|| "info".into());

        Ok(Self {
            api_base_url,
            request_timeout,
            credentials_db,
            log_filter,
        })
    }

    /// Replace the base URL, e.g. from a command-line flag.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL is not an absolute http(s) URL.
    pub fn with_api_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.api_base_url = parse_base_url("--api-url", raw)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if the value is not a positive integer.
    pub fn with_timeout_secs(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.request_timeout = parse_timeout("--timeout-secs", raw)?;
        Ok(self)
    }
}

/// Parse a base URL, forcing a trailing slash so relative joins keep any path prefix.
fn parse_base_url(var: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim()).map_err(|err| ConfigError::InvalidValue {
        var,
        reason: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            var,
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_timeout(var: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .ok_or_else(|| ConfigError::InvalidValue {
            var,
            reason: format!("'{raw}' is not a positive number of seconds"),
        })?;
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.credentials_db, DEFAULT_CREDENTIALS_DB);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn base_url_keeps_path_prefix() {
        let config =
            ClientConfig::from_lookup(lookup(&[("QUIZ_API_URL", "https://quiz.example/api")]))
                .unwrap();
        assert_eq!(
            config.api_base_url.join("login").unwrap().as_str(),
            "https://quiz.example/api/login"
        );
    }

    #[test]
    fn rejects_bad_values() {
        assert!(ClientConfig::from_lookup(lookup(&[("QUIZ_API_URL", "not a url")])).is_err());
        assert!(ClientConfig::from_lookup(lookup(&[("QUIZ_API_URL", "ftp://x")])).is_err());
        assert!(
            ClientConfig::from_lookup(lookup(&[("QUIZ_HTTP_TIMEOUT_SECS", "0")])).is_err()
        );
    }

    #[test]
    fn flags_override_environment() {
        let config = ClientConfig::from_lookup(lookup(&[]))
            .unwrap()
            .with_api_url("http://10.0.0.2:9000")
            .unwrap()
            .with_timeout_secs("3")
            .unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://10.0.0.2:9000/");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }
}

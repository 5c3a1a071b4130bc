use crate::errors::{ClientError, Result};
use crate::resource::IdScheme;
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub id_scheme: IdScheme,
    pub timeout: Option<Duration>,
    pub login: Option<LoginCredentials>,
}

#[derive(Clone)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            id_scheme: IdScheme::default(),
            timeout: None,
            login: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup, so tests need not touch the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup("HABIT_API_URL")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::config(format!(
                "HABIT_API_URL must be an http(s) URL, got '{base_url}'"
            )));
        }

        let token = lookup("HABIT_API_TOKEN").filter(|value| !value.is_empty());

        let id_scheme = match lookup("HABIT_ID_SCHEME") {
            Some(value) => value.parse()?,
            None => IdScheme::default(),
        };

        let timeout = match lookup("HABIT_TIMEOUT_SECS") {
            Some(value) => {
                let secs = value.trim().parse::<u64>().map_err(|_| {
                    ClientError::config(format!("HABIT_TIMEOUT_SECS must be an integer, got '{value}'"))
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let login = match (lookup("HABIT_LOGIN_EMAIL"), lookup("HABIT_LOGIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(LoginCredentials { email, password }),
            (None, None) => None,
            _ => {
                return Err(ClientError::config(
                    "HABIT_LOGIN_EMAIL and HABIT_LOGIN_PASSWORD must be set together",
                ));
            }
        };

        Ok(Self {
            base_url: normalize_base_url(base_url),
            token,
            id_scheme,
            timeout,
            login,
        })
    }

    pub fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().map_err(ClientError::Network)
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.id_scheme, IdScheme::ServerId);
        assert!(config.token.is_none());
        assert!(config.timeout.is_none());
        assert!(config.login.is_none());
    }

    #[test]
    fn reads_all_settings() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("HABIT_API_URL", "https://habits.example/"),
            ("HABIT_API_TOKEN", "abc"),
            ("HABIT_ID_SCHEME", "natural"),
            ("HABIT_TIMEOUT_SECS", "5"),
            ("HABIT_LOGIN_EMAIL", "admin@example.com"),
            ("HABIT_LOGIN_PASSWORD", "secret"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://habits.example");
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.id_scheme, IdScheme::NaturalKey);
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.login.unwrap().email, "admin@example.com");
    }

    #[test]
    fn rejects_bad_values() {
        for pairs in [
            &[("HABIT_API_URL", "localhost:8080")][..],
            &[("HABIT_TIMEOUT_SECS", "soon")][..],
            &[("HABIT_ID_SCHEME", "uuid")][..],
            &[("HABIT_LOGIN_EMAIL", "a@b.c")][..],
        ] {
            let err = ClientConfig::from_lookup(lookup(pairs)).unwrap_err();
            assert!(matches!(err, ClientError::Config(_)), "{pairs:?}: {err}");
        }
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = LoginCredentials {
            email: "a@b.c".into(),
            password: "hunter2".into(),
        };
        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}

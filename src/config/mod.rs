//! Configuration system (layered: CLI > env > settings file > defaults).
//!
//! [`ParleyConfig`] holds secrets and endpoint overrides, which only ever come
//! from the environment or from a per-request [`Credentials`] overlay.
//! Non-secret preferences live in [`Settings`].

pub mod settings;

pub use settings::{Profile, Settings};

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// Environment variables that carry credentials, keyed to the service they unlock.
const CREDENTIAL_ENV: &[(&str, &str)] = &[
    ("OPENAI_API_KEY", "openai"),
    ("GOOGLE_API_KEY", "google"),
    ("GEMINI_API_KEY", "google"),
    ("GITHUB_PERSONAL_ACCESS_TOKEN", "github"),
];

const BASE_URL_ENV: &[(&str, &str)] = &[
    ("OPENAI_BASE_URL", "openai"),
    ("GOOGLE_BASE_URL", "google"),
    ("GITHUB_API_URL", "github"),
    ("DUCKDUCKGO_BASE_URL", "duckduckgo"),
    ("WIKIPEDIA_BASE_URL", "wikipedia"),
];

/// The prompt shown to the user when a credential is absent.
pub fn credential_hint(service: &str) -> &'static str {
    match service {
        "openai" => "Please add your OpenAI API key (OPENAI_API_KEY) to continue.",
        "google" => "Please add your Google API key (GOOGLE_API_KEY or GEMINI_API_KEY) to continue.",
        "github" => {
            "Please add your GitHub access token (GITHUB_PERSONAL_ACCESS_TOKEN) to continue."
        }
        _ => "Please configure the missing credential to continue.",
    }
}

/// Name of the primary environment variable for a service's credential.
pub fn credential_env_var(service: &str) -> &'static str {
    match service {
        "google" => "GOOGLE_API_KEY",
        "github" => "GITHUB_PERSONAL_ACCESS_TOKEN",
        _ => "OPENAI_API_KEY",
    }
}

/// Credentials supplied with a single request, layered over the environment
/// for that turn only. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub github_token: Option<String>,
    pub github_repository: Option<String>,
}

impl Credentials {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Secrets and endpoint overrides.
#[derive(Clone, Default)]
pub struct ParleyConfig {
    api_keys: Arc<RwLock<HashMap<String, String>>>,
    base_urls: Arc<RwLock<HashMap<String, String>>>,
    github_repository: Arc<RwLock<Option<String>>>,
}

impl fmt::Debug for ParleyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut services: Vec<String> = self
            .api_keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        services.sort();
        f.debug_struct("ParleyConfig")
            .field("credentials_for", &services)
            .field("base_urls", &self.base_urls)
            .field("github_repository", &self.github_repository)
            .finish()
    }
}

impl ParleyConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from environment variables, reading `.env` first if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let config = Self::new();

        for (env_var, service) in CREDENTIAL_ENV {
            if let Some(key) = lookup(env_var).filter(|v| !v.trim().is_empty()) {
                if config.get_api_key(service).is_none() {
                    config.set_api_key(service, key);
                }
            }
        }

        for (env_var, service) in BASE_URL_ENV {
            if let Some(url) = lookup(env_var).filter(|v| !v.trim().is_empty()) {
                config.set_base_url(service, url);
            }
        }

        if let Some(repo) = lookup("GITHUB_REPOSITORY").filter(|v| !v.trim().is_empty()) {
            config.set_github_repository(repo);
        }

        config
    }

    /// Independent copy with the given per-request credentials applied.
    pub fn with_credentials(&self, credentials: &Credentials) -> Self {
        let copy = Self {
            api_keys: Arc::new(RwLock::new(
                self.api_keys
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone(),
            )),
            base_urls: Arc::new(RwLock::new(
                self.base_urls
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone(),
            )),
            github_repository: Arc::new(RwLock::new(self.github_repository())),
        };

        let overrides = [
            ("openai", &credentials.openai_api_key),
            ("google", &credentials.google_api_key),
            ("github", &credentials.github_token),
        ];
        for (service, value) in overrides {
            if let Some(key) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                copy.set_api_key(service, key.to_string());
            }
        }
        if let Some(repo) = &credentials.github_repository {
            copy.set_github_repository(repo.clone());
        }
        copy
    }

    pub fn set_api_key(&self, service: &str, key: String) {
        self.api_keys
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(service.to_string(), key);
    }

    pub fn get_api_key(&self, service: &str) -> Option<String> {
        self.api_keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(service)
            .cloned()
    }

    pub fn has_credentials(&self, service: &str) -> bool {
        self.get_api_key(service).is_some()
    }

    pub fn set_base_url(&self, service: &str, url: String) {
        self.base_urls
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(service.to_string(), url);
    }

    pub fn get_base_url(&self, service: &str) -> Option<String> {
        self.base_urls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(service)
            .cloned()
    }

    pub fn set_github_repository(&self, repository: String) {
        *self
            .github_repository
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(repository);
    }

    /// Default `owner/name` repository for the GitHub tools.
    pub fn github_repository(&self) -> Option<String> {
        self.github_repository
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(vars: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn reads_credentials_and_overrides() {
        let config = ParleyConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-env"),
            ("GEMINI_API_KEY", "gm-env"),
            ("WIKIPEDIA_BASE_URL", "http://localhost:9000"),
            ("GITHUB_REPOSITORY", "octo/hello"),
        ]));
        assert_eq!(config.get_api_key("openai").as_deref(), Some("sk-env"));
        assert_eq!(config.get_api_key("google").as_deref(), Some("gm-env"));
        assert_eq!(
            config.get_base_url("wikipedia").as_deref(),
            Some("http://localhost:9000")
        );
        assert_eq!(config.github_repository().as_deref(), Some("octo/hello"));
        assert!(!config.has_credentials("github"));
    }

    #[test]
    fn google_api_key_wins_over_gemini_alias() {
        let config = ParleyConfig::from_lookup(lookup(&[
            ("GOOGLE_API_KEY", "primary"),
            ("GEMINI_API_KEY", "alias"),
        ]));
        assert_eq!(config.get_api_key("google").as_deref(), Some("primary"));
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = ParleyConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "  ")]));
        assert!(!config.has_credentials("openai"));
    }

    #[test]
    fn request_credentials_do_not_leak_into_base_config() {
        let base = ParleyConfig::new();
        base.set_api_key("openai", "sk-base".into());

        let turn = base.with_credentials(&Credentials {
            openai_api_key: Some("sk-turn".into()),
            github_token: Some("ghp_turn".into()),
            ..Default::default()
        });

        assert_eq!(turn.get_api_key("openai").as_deref(), Some("sk-turn"));
        assert_eq!(turn.get_api_key("github").as_deref(), Some("ghp_turn"));
        assert_eq!(base.get_api_key("openai").as_deref(), Some("sk-base"));
        assert!(!base.has_credentials("github"));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = ParleyConfig::new();
        config.set_api_key("openai", "sk-secret".into());
        let rendered = format!("{config:?}");
        assert!(rendered.contains("openai"));
        assert!(!rendered.contains("sk-secret"));
    }
}

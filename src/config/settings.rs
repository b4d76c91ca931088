//! Non-secret preferences loaded from a TOML file and the environment.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{ParleyError, Result};
use crate::tools::Toolkit;

pub const DEFAULT_MODEL: &str = "openai:gpt-3.5-turbo";
pub const DEFAULT_BIND: &str = "127.0.0.1:8501";

/// A preset choosing the enabled toolkits and prompt options.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Profile {
    /// Web search, Wikipedia and currency conversion.
    #[default]
    Basic,
    /// As `Basic`, with today's date and the search retry advisory in the prompt.
    Dated,
    /// Web search plus the GitHub repository tools.
    Github,
}

impl Profile {
    pub fn toolkits(self) -> &'static [Toolkit] {
        match self {
            Self::Basic | Self::Dated => {
                &[Toolkit::Search, Toolkit::Wikipedia, Toolkit::Currency]
            }
            Self::Github => &[Toolkit::Search, Toolkit::Github],
        }
    }

    pub fn inject_date(self) -> bool {
        matches!(self, Self::Dated)
    }

    pub fn retry_advisory(self) -> bool {
        matches!(self, Self::Dated)
    }
}

/// User preferences. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Model in `provider:model` form.
    pub model: String,
    pub profile: Profile,
    pub temperature: f64,
    /// Cap on tokens per model reply. Provider default when unset.
    pub max_tokens: Option<u32>,
    /// Replay prior turns of the session into the model context.
    pub replay_history: bool,
    /// Replaces the profile's system directive.
    pub system_prompt: Option<String>,
    /// Listen address for `parley serve`.
    pub bind: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            profile: Profile::default(),
            temperature: 0.0,
            max_tokens: None,
            replay_history: true,
            system_prompt: None,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

impl Settings {
    /// `<config_dir>/parley/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "parley")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load settings from `path`, or from the default location.
    ///
    /// An explicit path must exist. A missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            ParleyError::Configuration(format!("cannot read {}: {err}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Overlay `PARLEY_*` environment variables.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_lookup(|name| std::env::var(name).ok())
    }

    pub fn apply_lookup(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(model) = lookup("PARLEY_MODEL") {
            self.model = model;
        }
        if let Some(profile) = lookup("PARLEY_PROFILE") {
            self.profile = Profile::from_str(&profile).map_err(|_| {
                ParleyError::Configuration(format!("unknown profile '{profile}'"))
            })?;
        }
        if let Some(temperature) = lookup("PARLEY_TEMPERATURE") {
            self.temperature = temperature.parse().map_err(|_| {
                ParleyError::Configuration(format!("invalid temperature '{temperature}'"))
            })?;
        }
        if let Some(max_tokens) = lookup("PARLEY_MAX_TOKENS") {
            self.max_tokens = Some(max_tokens.parse().map_err(|_| {
                ParleyError::Configuration(format!("invalid max_tokens '{max_tokens}'"))
            })?);
        }
        if let Some(bind) = lookup("PARLEY_BIND") {
            self.bind = bind;
        }
        Ok(())
    }
}

//! Model definitions and selection.

pub mod selector;

#[cfg(feature = "google")]
pub mod google;
#[cfg(feature = "openai")]
pub mod openai;

pub use selector::ModelSelector;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParleyError;

/// Top-level language model enum, dispatching to provider-specific variants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "provider", content = "model")]
pub enum LanguageModel {
    #[cfg(feature = "openai")]
    OpenAi(openai::OpenAiModel),
    #[cfg(feature = "google")]
    Google(google::GoogleModel),
}

impl LanguageModel {
    /// Get the model's API identifier string.
    pub fn model_id(&self) -> &str {
        match self {
            #[cfg(feature = "openai")]
            Self::OpenAi(m) => m.as_str(),
            #[cfg(feature = "google")]
            Self::Google(m) => m.as_str(),
        }
    }

    /// Get the provider name, also the config key for its credentials.
    pub fn provider_name(&self) -> &'static str {
        match self {
            #[cfg(feature = "openai")]
            Self::OpenAi(_) => "openai",
            #[cfg(feature = "google")]
            Self::Google(_) => "google",
        }
    }
}

impl fmt::Display for LanguageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider_name(), self.model_id())
    }
}

impl FromStr for LanguageModel {
    type Err = ParleyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelSelector::parse(s)
    }
}

//! Model selection and parsing.

use std::str::FromStr;

use super::LanguageModel;
use crate::error::ParleyError;

/// Parse a "provider:model" string into a LanguageModel.
pub struct ModelSelector;

impl ModelSelector {
    /// Parse "provider:model_id" into a LanguageModel.
    ///
    /// Examples: "openai:gpt-3.5-turbo", "google:gemini-2.0-flash", "gemini:gemini-1.5-pro"
    pub fn parse(s: &str) -> Result<LanguageModel, ParleyError> {
        let (provider, model_id) = s.split_once(':').ok_or_else(|| {
            ParleyError::InvalidArgument(format!(
                "Invalid model selector '{s}': expected 'provider:model_id'"
            ))
        })?;

        if model_id.trim().is_empty() {
            return Err(ParleyError::InvalidArgument(format!(
                "Invalid model selector '{s}': empty model id"
            )));
        }

        match provider {
            #[cfg(feature = "openai")]
            "openai" => {
                use super::openai::OpenAiModel;
                let m = OpenAiModel::from_str(model_id)
                    .unwrap_or(OpenAiModel::Custom(model_id.to_string()));
                Ok(LanguageModel::OpenAi(m))
            }
            #[cfg(feature = "google")]
            "google" | "gemini" => {
                use super::google::GoogleModel;
                let m = GoogleModel::from_str(model_id)
                    .unwrap_or(GoogleModel::Custom(model_id.to_string()));
                Ok(LanguageModel::Google(m))
            }
            other => Err(ParleyError::ModelNotFound(format!(
                "Unknown or disabled provider '{other}'"
            ))),
        }
    }
}

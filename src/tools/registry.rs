//! Per-request tool registry assembled from the enabled toolkits.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::github::{self, GithubClient};
use super::search::WebSearch;
use super::wikipedia::Wikipedia;
use super::{currency, Tool};
use crate::config::{credential_env_var, credential_hint, ParleyConfig};
use crate::error::ParleyError;
use crate::provider::ToolDefinition;

/// A named group of tools enabled together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Toolkit {
    Search,
    Wikipedia,
    Currency,
    Github,
}

impl Toolkit {
    /// Credential the toolkit cannot work without, if any.
    pub fn required_credential(self) -> Option<&'static str> {
        match self {
            Self::Github => Some("github"),
            _ => None,
        }
    }
}

/// Ordered set of tools with unique names.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry for `toolkits`, wiring endpoints and tokens from `config`.
    pub fn for_toolkits(toolkits: &[Toolkit], config: &ParleyConfig) -> Result<Self, ParleyError> {
        let mut registry = Self::new();
        for toolkit in toolkits {
            match toolkit {
                Toolkit::Search => {
                    registry.register(WebSearch::new(config.get_base_url("duckduckgo")))?
                }
                Toolkit::Wikipedia => {
                    registry.register(Wikipedia::new(config.get_base_url("wikipedia")))?
                }
                Toolkit::Currency => registry.register(currency::tool())?,
                Toolkit::Github => {
                    let token = config.get_api_key("github").ok_or_else(|| {
                        ParleyError::missing_credential(
                            credential_env_var("github"),
                            credential_hint("github"),
                        )
                    })?;
                    let client = GithubClient::new(
                        token,
                        config.get_base_url("github"),
                        config.github_repository(),
                    );
                    for tool in github::tools(client) {
                        registry.register(tool)?;
                    }
                }
            }
        }
        Ok(registry)
    }

    /// Add a tool. Names must be unique.
    pub fn register(&mut self, tool: impl Tool + 'static) -> Result<(), ParleyError> {
        self.register_arc(Arc::new(tool))
    }

    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<(), ParleyError> {
        if self.get(tool.name()).is_some() {
            return Err(ParleyError::InvalidArgument(format!(
                "Duplicate tool name: {}",
                tool.name()
            )));
        }
        self.tools.push(tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

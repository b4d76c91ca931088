//! Convenience re-exports for common use.

pub use crate::agent::{AgentExecutor, AgentShell, ChatService, Session, SessionStore};
pub use crate::config::{Credentials, ParleyConfig, Profile, Settings};
pub use crate::error::{ParleyError, Result};
pub use crate::models::LanguageModel;
pub use crate::prompt::PromptTemplate;
pub use crate::provider::ModelProvider;
pub use crate::tools::{AgentTool, AgentToolParameters, Tool, ToolArguments, ToolRegistry, Toolkit};
pub use crate::types::{AgentOutput, Fragment, GenerationSettings, ModelMessage, Role};

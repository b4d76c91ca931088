//! One chat turn: credential check, history bookkeeping and agent invocation.

use std::sync::Arc;

use tracing::{debug, info};

use super::executor::{ExecutorFactory, ProviderExecutorFactory};
use super::session::Session;
use super::shell::AgentShell;
use crate::config::{credential_env_var, credential_hint, Credentials, ParleyConfig, Settings};
use crate::error::ParleyError;
use crate::models::LanguageModel;
use crate::prompt::PromptTemplate;
use crate::tools::{ToolRegistry, Toolkit};
use crate::types::GenerationSettings;

/// Runs chat turns against sessions. Shared by every front-end.
#[derive(Clone)]
pub struct ChatService {
    config: ParleyConfig,
    model: LanguageModel,
    toolkits: Vec<Toolkit>,
    replay_history: bool,
    factory: Arc<dyn ExecutorFactory>,
}

impl std::fmt::Debug for ChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService")
            .field("model", &self.model)
            .field("toolkits", &self.toolkits)
            .field("replay_history", &self.replay_history)
            .finish()
    }
}

impl ChatService {
    /// Service backed by the real provider for `settings.model`.
    pub fn new(config: ParleyConfig, settings: &Settings) -> Result<Self, ParleyError> {
        let model: LanguageModel = settings.model.parse()?;
        let template = PromptTemplate::for_profile(settings.profile, settings.system_prompt.as_deref());
        let generation = GenerationSettings::builder()
            .temperature(settings.temperature)
            .maybe_max_tokens(settings.max_tokens)
            .build();
        let factory = ProviderExecutorFactory::new(model.clone(), template, generation);
        Ok(Self::with_factory(config, settings, model, Arc::new(factory)))
    }

    /// Service with a caller-supplied executor factory.
    pub fn with_factory(
        config: ParleyConfig,
        settings: &Settings,
        model: LanguageModel,
        factory: Arc<dyn ExecutorFactory>,
    ) -> Self {
        Self {
            config,
            model,
            toolkits: settings.profile.toolkits().to_vec(),
            replay_history: settings.replay_history,
            factory,
        }
    }

    pub fn model(&self) -> &LanguageModel {
        &self.model
    }

    pub fn toolkits(&self) -> &[Toolkit] {
        &self.toolkits
    }

    /// Fail with [`ParleyError::MissingCredential`] if the model or an enabled
    /// toolkit lacks its credential in `config`.
    pub fn check_credentials(&self, config: &ParleyConfig) -> Result<(), ParleyError> {
        let provider = self.model.provider_name();
        let required = std::iter::once(provider)
            .chain(self.toolkits.iter().filter_map(|t| t.required_credential()));
        for service in required {
            if !config.has_credentials(service) {
                return Err(ParleyError::missing_credential(
                    credential_env_var(service),
                    credential_hint(service),
                ));
            }
        }
        Ok(())
    }

    /// [`check_credentials`](Self::check_credentials) against the configured
    /// credentials with `credentials` layered on top.
    pub fn check_request_credentials(
        &self,
        credentials: Option<&Credentials>,
    ) -> Result<(), ParleyError> {
        self.check_credentials(&self.request_config(credentials))
    }

    fn request_config(&self, credentials: Option<&Credentials>) -> ParleyConfig {
        match credentials {
            Some(c) if !c.is_empty() => self.config.with_credentials(c),
            _ => self.config.clone(),
        }
    }

    /// Run one turn in `session` and return the reply.
    ///
    /// A missing credential leaves the session untouched. Any later failure
    /// aborts the turn with the user's message already recorded.
    pub async fn respond(
        &self,
        session: &mut Session,
        input: &str,
        credentials: Option<&Credentials>,
    ) -> Result<String, ParleyError> {
        let config = self.request_config(credentials);
        self.check_credentials(&config)?;

        let tools = ToolRegistry::for_toolkits(&self.toolkits, &config)?;
        let executor = self.factory.create(&config)?;
        let history = session.history_for_model(self.replay_history);

        session.append_user(input);
        info!(session = session.id(), model = %self.model, "Processing message");
        debug!(tools = ?tools.names(), history = history.len(), "Invoking agent");

        let reply = AgentShell::new(executor, tools).invoke(input, &history).await?;
        session.append_assistant(reply.clone());
        Ok(reply)
    }
}

//! Hands one input to an executor and flattens its answer to text.

use std::sync::Arc;

use super::executor::AgentExecutor;
use crate::error::ParleyError;
use crate::tools::ToolRegistry;
use crate::types::ModelMessage;

pub struct AgentShell {
    executor: Arc<dyn AgentExecutor>,
    tools: ToolRegistry,
}

impl AgentShell {
    pub fn new(executor: Arc<dyn AgentExecutor>, tools: ToolRegistry) -> Self {
        Self { executor, tools }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run the executor and normalize its output to a single string.
    pub async fn invoke(&self, input: &str, history: &[ModelMessage]) -> Result<String, ParleyError> {
        let output = self.executor.run(input, &self.tools, history).await?;
        Ok(output.into_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AgentOutput, Fragment};
    use async_trait::async_trait;

    struct Fixed(AgentOutput);

    #[async_trait]
    impl AgentExecutor for Fixed {
        async fn run(
            &self,
            _input: &str,
            _tools: &ToolRegistry,
            _history: &[ModelMessage],
        ) -> Result<AgentOutput, ParleyError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn text_output_passes_through() {
        let shell = AgentShell::new(Arc::new(Fixed(AgentOutput::Text("hi".into()))), ToolRegistry::new());
        assert_eq!(shell.invoke("x", &[]).await.unwrap(), "hi");
    }

    #[tokio::test]
    async fn fragments_keep_only_text() {
        let output = AgentOutput::Fragments(vec![
            Fragment::other("thinking", "hmm"),
            Fragment::text("a"),
            Fragment::text("b"),
        ]);
        let shell = AgentShell::new(Arc::new(Fixed(output)), ToolRegistry::new());
        assert_eq!(shell.invoke("x", &[]).await.unwrap(), "ab");
    }
}

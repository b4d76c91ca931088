//! Tools the model can call, and the toolkits that group them.

pub mod arguments;
pub mod currency;
pub mod github;
pub mod registry;
pub mod search;
pub mod tool;
pub mod types;
pub mod wikipedia;

pub use arguments::ToolArguments;
pub use registry::{ToolRegistry, Toolkit};
pub use tool::{AgentTool, Tool};
pub use types::AgentToolParameters;

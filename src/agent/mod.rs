//! Sessions, the agent executor seam and the chat service built on them.

pub mod executor;
pub mod service;
pub mod session;
pub mod shell;

pub use executor::{AgentExecutor, ExecutorFactory, ProviderExecutorFactory, ToolCallingExecutor};
pub use service::ChatService;
pub use session::{ChatMessage, ChatRole, Session, SessionHandle, SessionStore};
pub use shell::AgentShell;

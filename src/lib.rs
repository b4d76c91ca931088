//! parley: a chat assistant shell.
//!
//! Wires an LLM provider (OpenAI Chat Completions or Google Gemini) to a
//! small set of tools (web search, Wikipedia, a currency converter and an
//! optional read-only GitHub toolkit) and keeps per-session history in memory.
//!
//! ```no_run
//! use parley::agent::{ChatService, Session};
//! use parley::config::{ParleyConfig, Settings};
//!
//! # async fn example() -> parley::error::Result<()> {
//! let service = ChatService::new(ParleyConfig::from_env(), &Settings::default())?;
//! let mut session = Session::new("demo");
//! let reply = service.respond(&mut session, "What is 10 USD in Conchita coins?", None).await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod generation;
pub mod models;
pub mod prelude;
pub mod presentation;
pub mod prompt;
pub mod provider;
pub mod tools;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;

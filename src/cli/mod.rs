//! Command-line interface for parley.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{Profile, Settings};

/// Chat assistant with web search, Wikipedia, currency and GitHub tools
#[derive(Parser, Debug)]
#[command(name = "parley", version, about)]
pub struct Cli {
    /// Settings file (default: <config dir>/parley/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging for parley
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chat in the terminal
    Chat(ChatArgs),
    /// Serve the chat page and HTTP API
    Serve(ServeArgs),
}

/// Options that shape the agent, shared by both commands.
#[derive(Args, Debug, Clone, Default)]
pub struct AgentArgs {
    /// Model to use (format: provider:model, e.g. openai:gpt-4o)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Tool profile (basic, dated, github)
    #[arg(short, long)]
    pub profile: Option<Profile>,

    /// Do not replay earlier turns to the model
    #[arg(long)]
    pub no_history: bool,

    /// Temperature (0.0 - 2.0)
    #[arg(short, long)]
    pub temperature: Option<f64>,

    /// Maximum tokens per reply
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Replace the profile's system prompt
    #[arg(short, long)]
    pub system: Option<String>,
}

impl AgentArgs {
    /// Overlay flags onto settings loaded from file and environment.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(model) = &self.model {
            settings.model = model.clone();
        }
        if let Some(profile) = self.profile {
            settings.profile = profile;
        }
        if self.no_history {
            settings.replay_history = false;
        }
        if let Some(t) = self.temperature {
            settings.temperature = t;
        }
        if let Some(max) = self.max_tokens {
            settings.max_tokens = Some(max);
        }
        if let Some(system) = &self.system {
            settings.system_prompt = Some(system.clone());
        }
    }
}

#[derive(Args, Debug)]
pub struct ChatArgs {
    #[command(flatten)]
    pub agent: AgentArgs,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub agent: AgentArgs,

    /// Listen address (default 127.0.0.1:8501)
    #[arg(long)]
    pub bind: Option<String>,
}

/// Default log filter when `RUST_LOG` is unset.
pub fn default_log_filter(verbose: bool) -> &'static str {
    if verbose {
        "parley=debug"
    } else {
        "parley=info"
    }
}

/// Install the stderr tracing subscriber.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new(default_log_filter(true))
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_log_filter(false)))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_chat_with_defaults() {
        let cli = Cli::try_parse_from(["parley", "chat"]).unwrap();
        assert!(!cli.verbose);
        match cli.command {
            Commands::Chat(args) => {
                assert!(args.agent.model.is_none());
                assert!(args.agent.profile.is_none());
                assert!(!args.agent.no_history);
            }
            other => panic!("expected Chat, got {other:?}"),
        }
    }

    #[test]
    fn parse_chat_with_all_options() {
        let cli = Cli::try_parse_from([
            "parley",
            "chat",
            "--model",
            "google:gemini-2.0-flash",
            "--profile",
            "dated",
            "--no-history",
            "--temperature",
            "0.5",
            "--max-tokens",
            "300",
            "--verbose",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Chat(args) = cli.command else {
            panic!("expected Chat");
        };
        let mut settings = Settings::default();
        args.agent.apply(&mut settings);
        assert_eq!(settings.model, "google:gemini-2.0-flash");
        assert_eq!(settings.profile, Profile::Dated);
        assert!(!settings.replay_history);
        assert_eq!(settings.temperature, 0.5);
        assert_eq!(settings.max_tokens, Some(300));
    }

    #[test]
    fn parse_serve_bind() {
        let cli = Cli::try_parse_from(["parley", "serve", "--bind", "0.0.0.0:9000"]).unwrap();
        match cli.command {
            Commands::Serve(args) => assert_eq!(args.bind.as_deref(), Some("0.0.0.0:9000")),
            other => panic!("expected Serve, got {other:?}"),
        }
    }

    #[test]
    fn unknown_profile_is_rejected() {
        assert!(Cli::try_parse_from(["parley", "chat", "--profile", "turbo"]).is_err());
    }

    #[test]
    fn verbose_switches_filter() {
        assert_eq!(default_log_filter(true), "parley=debug");
        assert_eq!(default_log_filter(false), "parley=info");
    }
}

//! parley binary entry point.

use std::sync::Arc;

use clap::Parser;
use parley::agent::{ChatService, Session, SessionStore};
use parley::cli::{AgentArgs, Cli, Commands};
use parley::config::{ParleyConfig, Settings};
use parley::error::ParleyError;
use parley::presentation::{greeting, repl::Repl, web};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    parley::cli::init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Chat(args) => handle_chat(cli.config.as_deref(), &args.agent).await,
        Commands::Serve(args) => {
            handle_serve(cli.config.as_deref(), &args.agent, args.bind).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Credentials from the environment (and `.env`); settings from file, then
/// `PARLEY_*` variables, then flags.
fn load(
    path: Option<&std::path::Path>,
    args: &AgentArgs,
) -> Result<(ParleyConfig, Settings), ParleyError> {
    let config = ParleyConfig::from_env();
    let mut settings = Settings::load(path)?;
    settings.apply_env()?;
    args.apply(&mut settings);
    tracing::debug!(?settings, ?config, "Loaded configuration");
    Ok((config, settings))
}

async fn handle_chat(
    path: Option<&std::path::Path>,
    args: &AgentArgs,
) -> Result<(), ParleyError> {
    let (config, settings) = load(path, args)?;
    let service = ChatService::new(config, &settings)?;
    let mut session = Session::new(uuid::Uuid::new_v4().to_string());

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    Repl::new(&service, greeting(settings.profile))
        .run(&mut session, stdin, &mut stdout)
        .await
}

async fn handle_serve(
    path: Option<&std::path::Path>,
    args: &AgentArgs,
    bind: Option<String>,
) -> Result<(), ParleyError> {
    let (config, mut settings) = load(path, args)?;
    if let Some(bind) = bind {
        settings.bind = bind;
    }
    let service = ChatService::new(config, &settings)?;
    let state = web::AppState {
        service: Arc::new(service),
        sessions: Arc::new(SessionStore::new()),
        greeting: greeting(settings.profile),
    };
    web::serve(state, &settings.bind).await
}

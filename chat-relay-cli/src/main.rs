//! CLI entry point for chat-relay

use anyhow::{Context, Result};
use chat_relay_core::config::{Config, ConfigLoader, LoggingConfig};
use chat_relay_core::logging::init_logging;
use chat_relay_core::models::ModelCatalog;
use chat_relay_core::session::SessionStore;
use chat_relay_providers::GeminiClient;
use chat_relay_server::state::ServiceInfo;
use chat_relay_server::{run_server, AppState, ChatError, ChatGateway};
use clap::{Parser, Subcommand};
use console::style;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info};

/// Session key used for one-shot `ask` exchanges
const CLI_SESSION: &str = "cli";

#[derive(Parser)]
#[command(name = "chat-relay")]
#[command(about = "Web front-end that relays chat messages to Google Gemini")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration directory
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
    },
    /// List the supported models
    Models,
    /// Send a single message and print the reply
    Ask {
        /// Message to send
        #[arg(short, long)]
        message: String,
        /// Model to use
        #[arg(long)]
        model: Option<String>,
        /// Sampling temperature
        #[arg(short, long)]
        temperature: Option<f64>,
        /// Maximum output tokens
        #[arg(long)]
        max_tokens: Option<u32>,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loader = match &cli.config_dir {
        Some(dir) => ConfigLoader::with_dir(dir),
        None => ConfigLoader::new(),
    };

    match cli.command {
        Commands::Serve { port, host } => run_serve(&loader, port, host).await,
        Commands::Models => run_models(&loader),
        Commands::Ask {
            message,
            model,
            temperature,
            max_tokens,
        } => run_ask(&loader, &message, model, temperature, max_tokens).await,
        Commands::Config => run_config(&loader),
    }
}

/// Relative log directories live under the config directory
fn resolve_logging(config: &LoggingConfig, config_dir: &Path) -> LoggingConfig {
    let mut logging = config.clone();
    if Path::new(&logging.dir).is_relative() {
        logging.dir = config_dir.join(&logging.dir).to_string_lossy().into_owned();
    }
    logging
}

fn build_gateway(config: &Config) -> Result<ChatGateway> {
    let client = GeminiClient::new(&config.providers.gemini)
        .context("Failed to create Gemini client")?;
    Ok(ChatGateway::new(
        Arc::new(client),
        ModelCatalog::from_config(&config.providers.gemini),
        SessionStore::new(),
        config.chat.clone(),
    ))
}

async fn run_serve(loader: &ConfigLoader, port: Option<u16>, host: Option<String>) -> Result<()> {
    let mut config = loader.load()?;
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(host) = host {
        config.server.host = host;
    }

    let _guard = init_logging(&resolve_logging(&config.logging, loader.config_dir()));

    println!("{}", style("Starting chat-relay...").bold().cyan());
    info!(
        host = %config.server.host,
        port = config.server.port,
        api_key_set = config.providers.gemini.has_api_key(),
        "Loaded configuration from {}",
        loader.config_dir().display()
    );

    let state = AppState::new(build_gateway(&config)?, ServiceInfo::from_config(&config));

    let addr = tokio::net::lookup_host((config.server.host.as_str(), config.server.port))
        .await?
        .next()
        .with_context(|| format!("Cannot resolve address {}", config.server.host))?;

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\n{}", style("Shutting down...").yellow());
            let _ = shutdown_tx.send(());
        }
    });

    println!(
        "{}",
        style(format!("Listening on http://{}. Press Ctrl+C to stop.", addr)).green()
    );

    if let Err(e) = run_server(state, addr, config.server.static_dir.clone(), shutdown_rx).await {
        error!("Server error: {}", e);
        return Err(e);
    }

    println!("{}", style("chat-relay stopped.").green());
    Ok(())
}

fn run_models(loader: &ConfigLoader) -> Result<()> {
    let config = loader.load()?;
    let catalog = ModelCatalog::from_config(&config.providers.gemini);

    println!("{}", style("Supported models").bold().cyan());
    for model in catalog.descriptors() {
        if model.id == catalog.default_model() {
            println!("  {} {}", style(&model.id).bold(), style("(default)").dim());
        } else {
            println!("  {}", model.id);
        }
    }
    Ok(())
}

async fn run_ask(
    loader: &ConfigLoader,
    message: &str,
    model: Option<String>,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
) -> Result<()> {
    let config = loader.load()?;
    let _guard = init_logging(&resolve_logging(&config.logging, loader.config_dir()));
    let gateway = build_gateway(&config)?;

    println!("{}", style("Processing...").cyan());

    match gateway
        .send(
            CLI_SESSION,
            Some(message),
            model.as_deref(),
            temperature,
            max_tokens,
        )
        .await
    {
        Ok(outcome) => {
            println!("\n{} {}", style("Response").bold(), style(&outcome.model).dim());
            println!("{}", outcome.assistant.content());
            Ok(())
        }
        Err(e) => {
            println!("{} {}", style("Error:").red().bold(), e);
            if let ChatError::Transport {
                details: Some(details),
                ..
            }
            | ChatError::Schema {
                details: Some(details),
                ..
            } = &e
            {
                println!("  {}", style(details).dim());
            }
            Err(e.into())
        }
    }
}

fn run_config(loader: &ConfigLoader) -> Result<()> {
    let config = loader.load()?;
    println!("{}", style(format!("Config directory: {}", loader.config_dir().display())).dim());
    println!("{}", serde_json::to_string_pretty(&redacted(&config)?)?);
    Ok(())
}

/// Config as JSON with the API key masked
fn redacted(config: &Config) -> Result<Value> {
    let mut value = serde_json::to_value(config)?;
    if config.providers.gemini.has_api_key() {
        if let Some(key) = value.pointer_mut("/providers/gemini/api_key") {
            *key = Value::String("[REDACTED]".to_string());
        }
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_serve_overrides() {
        let cli = Cli::try_parse_from([
            "chat-relay",
            "--config-dir",
            "/tmp/relay",
            "serve",
            "--port",
            "8080",
            "--host",
            "127.0.0.1",
        ])
        .unwrap();

        assert_eq!(cli.config_dir, Some(PathBuf::from("/tmp/relay")));
        match cli.command {
            Commands::Serve { port, host } => {
                assert_eq!(port, Some(8080));
                assert_eq!(host.as_deref(), Some("127.0.0.1"));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_cli_ask_requires_message() {
        assert!(Cli::try_parse_from(["chat-relay", "ask"]).is_err());

        let cli = Cli::try_parse_from([
            "chat-relay",
            "ask",
            "-m",
            "hello",
            "--model",
            "gemini-pro",
            "--max-tokens",
            "64",
        ])
        .unwrap();
        match cli.command {
            Commands::Ask {
                message,
                model,
                temperature,
                max_tokens,
            } => {
                assert_eq!(message, "hello");
                assert_eq!(model.as_deref(), Some("gemini-pro"));
                assert_eq!(temperature, None);
                assert_eq!(max_tokens, Some(64));
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_redacted_hides_api_key() {
        let mut config = Config::default();
        config.providers.gemini.api_key = "secret-key".to_string();

        let value = redacted(&config).unwrap();
        assert_eq!(value["providers"]["gemini"]["api_key"], "[REDACTED]");
        assert!(!value.to_string().contains("secret-key"));

        let value = redacted(&Config::default()).unwrap();
        assert_eq!(value["providers"]["gemini"]["api_key"], "");
    }

    #[test]
    fn test_relative_log_dir_lives_under_config_dir() {
        let temp = tempfile::tempdir().unwrap();
        let logging = resolve_logging(&LoggingConfig::default(), temp.path());
        assert!(Path::new(&logging.dir).starts_with(temp.path()));

        let absolute = LoggingConfig {
            dir: temp.path().join("abs").to_string_lossy().into_owned(),
            ..Default::default()
        };
        assert_eq!(resolve_logging(&absolute, Path::new("/other")).dir, absolute.dir);
    }
}

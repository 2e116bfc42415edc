//! lm-bridge binary entry point

use std::sync::Arc;

use color_eyre::{eyre::bail, Result};
use lm_bridge::{
    cli::{Cli, Commands},
    config::{Config, ProviderType, Settings},
    messages::Message,
    server::{self, AppState},
    services::{create_adapter, ChatAdapter, CompletionResult},
    store::JsonStore,
    validator::EndpointValidator,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Install error handler
    color_eyre::install()?;
    dotenv::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("lm_bridge=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lm_bridge=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = match &cli.config {
        Some(path) => Settings::load_with_env(path)?,
        None => Settings::load()?,
    };

    // Handle commands
    match cli.command {
        Commands::Complete {
            adapter,
            system,
            max_tokens,
            json,
            prompt,
        } => {
            let adapter = create_adapter(ProviderType::LmStudio, adapter.apply(&settings.lm_studio))?;

            let mut messages = Vec::with_capacity(2);
            if let Some(system) = system {
                messages.push(Message::system(system));
            }
            messages.push(Message::user(prompt));

            let result = adapter.complete(&messages, max_tokens).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            match result {
                CompletionResult::Success { content, .. } => {
                    if !json {
                        println!("{content}");
                    }
                }
                CompletionResult::Failure { error, message } => bail!("{error}: {message}"),
            }
        }
        Commands::Models { adapter } => {
            let adapter = create_adapter(ProviderType::LmStudio, adapter.apply(&settings.lm_studio))?;
            for model in adapter.list_models().await {
                println!("{model}");
            }
        }
        Commands::Check { adapter } => {
            let adapter = create_adapter(ProviderType::LmStudio, adapter.apply(&settings.lm_studio))?;
            if adapter.check_reachable(None).await {
                println!("{} is reachable (model {})", adapter.endpoint(), adapter.model());
            } else {
                bail!("{} is not reachable", adapter.endpoint());
            }
        }
        Commands::Validate {
            provider,
            endpoint,
            api_key,
        } => {
            let verdict = EndpointValidator::new(settings.lm_studio.clone())
                .validate(&api_key, &endpoint, &provider)
                .await;
            println!("{}", serde_json::to_string_pretty(&verdict)?);
            if !verdict.success {
                bail!("endpoint validation failed");
            }
        }
        Commands::Serve { host, port } => {
            let mut server_settings = settings.server.clone();
            if let Some(host) = host {
                server_settings.host = host;
            }
            if let Some(port) = port {
                server_settings.port = port;
            }

            let store_path = settings.store_path.clone().unwrap_or_else(Config::store_path);
            let store = Arc::new(JsonStore::open(store_path)?);
            let state = AppState::new(store, settings.lm_studio.clone(), server_settings.scope.clone());
            server::serve(&server_settings, state).await?;
        }
        Commands::Version => {
            println!("lm-bridge version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

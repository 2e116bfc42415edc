//! CLI argument parsing and command routing

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::AdapterConfig;

/// lm-bridge: talk to an LM Studio server
#[derive(Debug, Parser)]
#[command(name = "lm-bridge")]
#[command(about = "Chat-completion adapter and endpoint validator for LM Studio", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Per-invocation overrides for the adapter settings
///
/// `LM_STUDIO_*` variables are read by [`crate::config::Settings`]; these flags
/// sit on top of them.
#[derive(Debug, Clone, Default, Args)]
pub struct AdapterArgs {
    /// LM Studio endpoint, e.g. `localhost:1234`
    #[arg(long)]
    pub endpoint: Option<String>,

    /// API key (`EMPTY` for none)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Model identifier
    #[arg(long)]
    pub model: Option<String>,
}

impl AdapterArgs {
    /// Layer these overrides on top of `base`
    #[must_use]
    pub fn apply(&self, base: &AdapterConfig) -> AdapterConfig {
        let mut config = base.clone();
        if let Some(endpoint) = &self.endpoint {
            config.endpoint.clone_from(endpoint);
        }
        if let Some(api_key) = &self.api_key {
            config.api_key.clone_from(api_key);
        }
        if let Some(model) = &self.model {
            config.model = Some(model.clone());
        }
        config
    }
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a single chat completion
    Complete {
        #[command(flatten)]
        adapter: AdapterArgs,

        /// System prompt merged into the first user turn
        #[arg(long)]
        system: Option<String>,

        /// Maximum tokens for this call
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// The prompt to send
        prompt: String,
    },

    /// List models served by the endpoint
    Models {
        #[command(flatten)]
        adapter: AdapterArgs,
    },

    /// Check whether the endpoint is reachable
    Check {
        #[command(flatten)]
        adapter: AdapterArgs,
    },

    /// Validate an endpoint for a provider and print the verdict
    Validate {
        /// Provider name, e.g. "LM Studio" or "Hugging Face"
        #[arg(long)]
        provider: String,

        /// Endpoint URL
        #[arg(long)]
        endpoint: String,

        /// API key
        #[arg(long, default_value = "EMPTY")]
        api_key: String,
    },

    /// Serve the HTTP API
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to bind
        #[arg(long)]
        port: Option<u16>,
    },

    /// Show version information
    Version,
}

impl Cli {
    /// Parse CLI arguments from environment
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_complete() {
        let cli = Cli::parse_from([
            "lm-bridge",
            "complete",
            "--endpoint",
            "10.0.0.2:1234",
            "--system",
            "Be terse.",
            "--max-tokens",
            "64",
            "Hi there",
        ]);
        match cli.command {
            Commands::Complete {
                adapter,
                system,
                max_tokens,
                prompt,
                ..
            } => {
                assert_eq!(adapter.endpoint.as_deref(), Some("10.0.0.2:1234"));
                assert_eq!(system.as_deref(), Some("Be terse."));
                assert_eq!(max_tokens, Some(64));
                assert_eq!(prompt, "Hi there");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_adapter_args_apply() {
        let args = AdapterArgs {
            endpoint: Some("lm:1234".into()),
            api_key: None,
            model: Some("qwen3-8b".into()),
        };
        let config = args.apply(&AdapterConfig::default());
        assert_eq!(config.endpoint, "lm:1234");
        assert_eq!(config.api_key, "EMPTY");
        assert_eq!(config.model.as_deref(), Some("qwen3-8b"));
    }

    #[test]
    fn test_adapter_args_ignore_env() {
        // Only flags populate AdapterArgs, whatever the environment holds
        let cli = Cli::parse_from(["lm-bridge", "models"]);
        match cli.command {
            Commands::Models { adapter } => {
                assert!(adapter.endpoint.is_none());
                assert!(adapter.api_key.is_none());
                assert!(adapter.model.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_validate_defaults_api_key() {
        let cli = Cli::parse_from([
            "lm-bridge",
            "validate",
            "--provider",
            "LM Studio",
            "--endpoint",
            "host",
        ]);
        assert!(matches!(cli.command, Commands::Validate { ref api_key, .. } if api_key == "EMPTY"));
    }
}

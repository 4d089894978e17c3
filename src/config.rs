use crate::llm::Provider;
use clap::{Parser, Subcommand};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Question used by `ask` when none is given.
pub const DEFAULT_QUESTION: &str = "What is phishing and how can I avoid it?";

#[derive(Parser, Debug)]
#[command(name = "cyber-assistant", author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE", global = true)]
    pub config: Option<String>,

    /// Address to bind
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT", global = true)]
    pub port: Option<u16>,

    /// Model identifier override
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Start the chat web UI (default)
    Serve,
    /// Answer a single question on stdout
    Ask {
        /// The question to ask
        #[arg(default_value = DEFAULT_QUESTION)]
        question: String,

        /// Sampling temperature override
        #[arg(long)]
        temperature: Option<f32>,

        /// Max output tokens override
        #[arg(long)]
        max_tokens: Option<u32>,
    },
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub session_idle_minutes: u64,
}

#[derive(Deserialize, Clone)]
pub struct ModelConfig {
    /// `auto`, `gemini` or `openai`.
    pub provider: String,
    pub base_url: String,
    pub name: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("name", &self.name)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish()
    }
}

/// Configuration failures. Always fatal; never shown to chat users as an answer.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "Missing {env_var} for the {provider} provider. Create a .env with {env_var}=your_api_key_here or set model.api_key in the config file"
    )]
    MissingApiKey {
        provider: &'static str,
        env_var: &'static str,
    },

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error(transparent)]
    Load(#[from] config::ConfigError),
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::from_cli(&cli)
    }

    /// Layer defaults, config file, `CYBER_*` env vars and CLI flags.
    ///
    /// Priority: CLI flag > env var > config file > defaults.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 7860)?
            .set_default("server.request_timeout_secs", 60)?
            .set_default("server.session_idle_minutes", 30)?
            .set_default("model.provider", "auto")?
            .set_default("model.base_url", "https://generativelanguage.googleapis.com")?
            .set_default("model.name", "gemini-2.5-flash-lite")?
            .set_default("model.temperature", 0.2)?
            .set_default("model.max_output_tokens", 512)?;

        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path).required(true)),
            // ./config.{yaml,toml,json} if present
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // E.g. CYBER_SERVER__PORT=8000, CYBER_MODEL__API_KEY=...
        builder = builder.add_source(
            Environment::with_prefix("CYBER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(host) = &cli.host {
            builder = builder.set_override("server.host", host.as_str())?;
        }
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(model) = &cli.model {
            builder = builder.set_override("model.name", model.as_str())?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_temperature(self.model.temperature)?;
        validate_max_tokens(self.model.max_output_tokens)?;
        Provider::from_setting(&self.model.provider, &self.model.base_url)?;
        if self.model.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "model.name",
                reason: "cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Temperatures accepted by both supported APIs.
pub fn validate_temperature(t: f32) -> Result<(), ConfigError> {
    if t.is_finite() && (0.0..=2.0).contains(&t) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key: "model.temperature",
            reason: format!("{t} is outside 0.0..=2.0"),
        })
    }
}

pub fn validate_max_tokens(n: u32) -> Result<(), ConfigError> {
    if n == 0 {
        Err(ConfigError::InvalidValue {
            key: "model.max_output_tokens",
            reason: "must be greater than zero".to_string(),
        })
    } else {
        Ok(())
    }
}

/// `model.api_key` first, then the provider's conventional env var.
pub fn resolve_api_key(model: &ModelConfig, provider: Provider) -> Option<String> {
    model
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| {
            std::env::var(provider.api_key_env())
                .ok()
                .filter(|k| !k.trim().is_empty())
        })
}

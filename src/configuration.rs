use crate::connectors::config::{ChatServiceConfig, IdentityConfig, DEFAULT_CHAT_SERVICE_URL};

/// Environment variable holding the chat service base URL.
pub const CHAT_SERVICE_URL_VAR: &str = "CHAT_SERVICE_URL";

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Settings {
    pub chat_service: ChatServiceConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    load_settings(std::env::var(CHAT_SERVICE_URL_VAR).ok())
}

/// Layer defaults, the optional configuration file and `PARLEY__*` variables,
/// then apply `chat_service_url` over them.
pub fn load_settings(chat_service_url: Option<String>) -> Result<Settings, config::ConfigError> {
    let mut builder = config::Config::builder()
        .set_default("chat_service.base_url", DEFAULT_CHAT_SERVICE_URL)?
        .set_default("log_level", default_log_level())?
        // configuration.yaml / .toml / .json, when present
        .add_source(config::File::with_name("configuration").required(false))
        // PARLEY__CHAT_SERVICE__BASE_URL, PARLEY__IDENTITY__CONVERSATION_ID, ...
        .add_source(config::Environment::with_prefix("PARLEY").separator("__"));

    if let Some(base_url) = chat_service_url {
        builder = builder.set_override("chat_service.base_url", base_url)?;
    }

    let mut settings: Settings = builder.build()?.try_deserialize()?;
    settings.chat_service = ChatServiceConfig::new(&settings.chat_service.base_url);

    Ok(settings)
}

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Json, Toml, Yaml},
};
use tracing::{debug, trace};

use super::LogMonitorConfig;
use super::smart_load;

// Embed the default config at compile time
pub const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

impl LogMonitorConfig {
    /// Load from the standard locations, or from `custom_config` (plus
    /// defaults and environment) when given, and validate the result.
    pub fn load(custom_config: Option<&str>) -> Result<Self> {
        // Optional layers may be absent, a file named on the command line may not
        if let Some(path) = custom_config.filter(|p| !std::path::Path::new(p).is_file()) {
            anyhow::bail!("Configuration file not found: {}", path);
        }

        let figment = Self::figment(custom_config);
        let config: LogMonitorConfig = figment.extract().context("Failed to load configuration")?;
        config.validate().context("Invalid configuration")?;
        trace!("Effective configuration: {:?}", config);
        Ok(config)
    }

    /// The layered configuration sources, lowest priority first
    pub fn figment(custom_config: Option<&str>) -> Figment {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG)); // Embedded defaults

        if let Some(custom_path) = custom_config {
            debug!("Loading configuration from {}", custom_path);
            figment = figment.merge(smart_load::auto(custom_path));
        } else {
            let user_config = Self::user_config_path();
            figment = figment
                // User config - support multiple formats
                .merge(Toml::file(&user_config))
                .merge(Json::file(user_config.replace(".toml", ".json")))
                .merge(Yaml::file(user_config.replace(".toml", ".yaml")))
                .merge(Yaml::file(user_config.replace(".toml", ".yml")))
                // Working directory config - support multiple formats
                .merge(Toml::file("logmonitor.toml"))
                .merge(Json::file("logmonitor.json"))
                .merge(Yaml::file("logmonitor.yaml"))
                .merge(Yaml::file("logmonitor.yml"));
        }

        // Environment variables always have highest priority
        figment.merge(Env::prefixed("LOGMONITOR_").split("__"))
    }

    fn user_config_path() -> String {
        match std::env::var("HOME") {
            Ok(home) => format!("{}/.config/logmonitor/config.toml", home),
            Err(_) => "~/.config/logmonitor/config.toml".to_string(),
        }
    }
}

mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{
    AuthSettings, LogSettings, RetentionSettings, ServerSettings, Settings, StorageSettings,
    TokenGrant,
};


/// Loads the configuration from the default file and environment variables
/// Merges the configuration with default values
/// Returns a `Settings` struct containing the server, storage, retention,
/// logging and auth configurations
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::default().separator("_"));

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    Ok(Settings {
        server: ServerSettings {
            host: partial
                .server
                .as_ref()
                .and_then(|s| s.host.clone())
                .unwrap_or(default.server.host),
            port: partial
                .server
                .as_ref()
                .and_then(|s| s.port)
                .unwrap_or(default.server.port),
        },
        storage: StorageSettings {
            db_path: partial
                .storage
                .as_ref()
                .and_then(|s| s.db_path.clone())
                .unwrap_or(default.storage.db_path),
        },
        retention: RetentionSettings {
            default_expires_secs: partial
                .retention
                .as_ref()
                .and_then(|r| r.default_expires_secs)
                .unwrap_or(default.retention.default_expires_secs),
            default_index_secs: partial
                .retention
                .as_ref()
                .and_then(|r| r.default_index_secs)
                .unwrap_or(default.retention.default_index_secs),
            sweep_interval_secs: partial
                .retention
                .as_ref()
                .and_then(|r| r.sweep_interval_secs)
                .unwrap_or(default.retention.sweep_interval_secs),
        },
        log: LogSettings {
            level: partial
                .log
                .as_ref()
                .and_then(|l| l.level.clone())
                .unwrap_or(default.log.level),
        },
        auth: partial.auth.unwrap_or(default.auth),
    })
}

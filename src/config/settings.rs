use serde::Deserialize;

use crate::auth::PrincipalKind;
use crate::message::RetentionPolicy;

/// Top-level configuration settings for the application.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub retention: RetentionSettings,
    pub log: LogSettings,
    pub auth: AuthSettings,
}

/// Configuration settings for the server.
///
/// Defines the host and port the WebSocket server will bind to.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Configuration settings for the durable message store.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub db_path: String,
}

/// Retention defaults applied to messages that do not specify their own
/// lifecycle, plus the interval of the background expiry sweep.
#[derive(Debug, Deserialize, Clone)]
pub struct RetentionSettings {
    pub default_expires_secs: u64,
    pub default_index_secs: u64,
    pub sweep_interval_secs: u64,
}

/// Logging settings.
#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
}

/// Static credential grants for the token authorizer.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthSettings {
    #[serde(default)]
    pub tokens: Vec<TokenGrant>,
}

/// One token-to-principal grant.
#[derive(Debug, Deserialize, Clone)]
pub struct TokenGrant {
    pub token: String,
    pub principal: String,
    pub kind: PrincipalKind,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub storage: Option<PartialStorageSettings>,
    pub retention: Option<PartialRetentionSettings>,
    pub log: Option<PartialLogSettings>,
    pub auth: Option<AuthSettings>,
}

/// Partial server settings.
#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Partial storage settings.
#[derive(Debug, Deserialize)]
pub struct PartialStorageSettings {
    pub db_path: Option<String>,
}

/// Partial retention settings.
#[derive(Debug, Deserialize)]
pub struct PartialRetentionSettings {
    pub default_expires_secs: Option<u64>,
    pub default_index_secs: Option<u64>,
    pub sweep_interval_secs: Option<u64>,
}

/// Partial logging settings.
#[derive(Debug, Deserialize)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

/// Provides default values for `Settings`.
///
/// Ensures the application has sensible defaults if no configuration is provided.
impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            storage: StorageSettings {
                db_path: "messages_db".to_string(),
            },
            retention: RetentionSettings {
                default_expires_secs: 86_400,
                default_index_secs: 604_800,
                sweep_interval_secs: 60,
            },
            log: LogSettings {
                level: "info".to_string(),
            },
            auth: AuthSettings::default(),
        }
    }
}

impl Settings {
    /// The retention policy the dispatch engine applies to messages that
    /// leave `expires` or `index_until` unset.
    pub fn retention_policy(&self) -> RetentionPolicy {
        RetentionPolicy {
            default_expires: chrono::Duration::seconds(self.retention.default_expires_secs as i64),
            default_index: chrono::Duration::seconds(self.retention.default_index_secs as i64),
        }
    }
}

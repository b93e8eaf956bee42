use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub record_store: RecordStoreSettings,
    pub notifications: NotificationSettings,
    pub reminders: ReminderSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

/// Hosted record store connection. A `memory://` url selects the in-process
/// store, optionally seeded from `seed_path`.
#[derive(Debug, Deserialize, Clone)]
pub struct RecordStoreSettings {
    pub url: String,
    pub project_id: String,
    pub public_key: String,
    pub timeout_secs: u64,
    pub seed_path: Option<String>,
}

impl RecordStoreSettings {
    pub fn is_memory(&self) -> bool {
        self.url.starts_with("memory://")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationSettings {
    /// Path of the JSON blob holding the full notification list.
    pub storage_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReminderSettings {
    pub enabled: bool,
    /// Seconds between scheduler ticks.
    pub interval_secs: u64,
    /// Delay before the first tick after startup.
    pub initial_delay_secs: u64,
    /// Due-soon window, in days ahead of today.
    pub days_ahead: u32,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 300,
            initial_delay_secs: 10,
            days_ahead: 3,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("CLASSHUB"),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 3000)?
            .set_default("app.cors_origins", Vec::<String>::new())?
            .set_default("record_store.url", "memory://local")?
            .set_default("record_store.project_id", "")?
            .set_default("record_store.public_key", "")?
            .set_default("record_store.timeout_secs", 15)?
            .set_default("record_store.seed_path", None::<String>)?
            .set_default("notifications.storage_path", "data/classhub_notifications.json")?
            .set_default("reminders.enabled", true)?
            .set_default("reminders.interval_secs", 300)?
            .set_default("reminders.initial_delay_secs", 10)?
            .set_default("reminders.days_ahead", 3)?
            .build()?;

        config.try_deserialize()
    }
}

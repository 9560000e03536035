use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub version: String,
    pub api: ApiSettings,
    pub session: SessionSettings,
    pub dashboard: DashboardSettings,
    pub notifications: NotificationSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            api: ApiSettings::default(),
            session: SessionSettings::default(),
            dashboard: DashboardSettings::default(),
            notifications: NotificationSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// Credentials handed out by the user service at login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SessionSettings {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSettings {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_upcoming_limit")]
    pub upcoming_limit: usize,
    /// IANA zone name; the machine's local zone when unset.
    #[serde(default)]
    pub timezone: Option<String>,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            upcoming_limit: default_upcoming_limit(),
            timezone: None,
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    crate::services::dashboard_engine::DEFAULT_REFRESH_SECS
}

fn default_upcoming_limit() -> usize {
    crate::services::task_aggregator::DEFAULT_UPCOMING_LIMIT
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub muted_events: Vec<String>,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            muted_events: vec![],
        }
    }
}

fn default_enabled() -> bool {
    true
}

//! Runtime configuration: which front end is running, where the API lives,
//! and where the local session store sits on disk.
//!
//! Values come from the environment (a `.env` file is loaded first through
//! dotenvy), then command-line flags override them.

use std::path::PathBuf;

use crate::logging::{LogFormat, LoggingConfig};
use crate::models::Role;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_DATA_DIR: &str = ".estate_console";

/// The two front ends. Each has its own storage keys, role rule and home view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppProfile {
    Admin,
    Tenant,
}

impl AppProfile {
    pub fn display_name(self) -> &'static str {
        match self {
            AppProfile::Admin => "admin console",
            AppProfile::Tenant => "tenant portal",
        }
    }

    /// sled tree holding this app's entries.
    pub fn namespace(self) -> &'static str {
        match self {
            AppProfile::Admin => "admin",
            AppProfile::Tenant => "tenant",
        }
    }

    pub fn token_key(self) -> &'static str {
        match self {
            AppProfile::Admin => "adminToken",
            AppProfile::Tenant => "token",
        }
    }

    pub fn identity_key(self) -> &'static str {
        match self {
            AppProfile::Admin => "adminUser",
            AppProfile::Tenant => "user",
        }
    }

    /// Admin console needs `admin`; the tenant portal takes any account.
    pub fn accepts(self, role: &Role) -> bool {
        match self {
            AppProfile::Admin => role.is_admin(),
            AppProfile::Tenant => true,
        }
    }

    /// View opened after a login with no preserved return path.
    pub fn home_path(self) -> &'static str {
        match self {
            AppProfile::Admin => "/dashboard",
            AppProfile::Tenant => "/towers",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub data_dir: PathBuf,
    pub logging: LoggingConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            logging: LoggingConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load `.env` (if present) and read `ESTATE_*` variables.
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                eprintln!("warning: ignoring unreadable .env file: {e}");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("ESTATE_API_URL") {
            config.api_url = url;
        }
        if let Some(dir) = get("ESTATE_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(filter) = get("ESTATE_LOG") {
            config.logging.filter = filter;
        }
        if let Some(format) = get("ESTATE_LOG_FORMAT") {
            config.logging.format = match format.to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            };
        }
        if let Some(file) = get("ESTATE_LOG_FILE") {
            config.logging.file = Some(PathBuf::from(file));
        }
        config
    }

    pub fn with_overrides(mut self, api_url: Option<String>, data_dir: Option<PathBuf>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        self
    }

    /// `api_url` without trailing slashes, ready for path joining.
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

// workspace-billing-service/src/config.rs
use log::warn;
use std::env;
use std::path::PathBuf;

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:9090";
const DEFAULT_STORAGE_ROOT: &str = "./storage";
const DEFAULT_JWT_SECRET: &str = "workspace_billing_dev_secret";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_USAGE_REPORT_INTERVAL_SECS: u64 = 86_400;

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub bind_address: String,
    pub storage_root: PathBuf,
    pub jwt_secret: String,
    // Shared with the billing provider; billing endpoints reject everything when unset
    pub billing_webhook_secret: Option<String>,
    pub cors_allowed_origin: String,
    // 0 disables the usage reporting job
    pub usage_report_interval_secs: u64,
}

impl ServiceConfig {
    // Reads configuration from the environment (after dotenv has loaded .env)
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Builds the configuration from any key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) => secret,
            None => {
                warn!("⚠️ JWT_SECRET not set, using development secret");
                defaults.jwt_secret
            }
        };

        let billing_webhook_secret = lookup("BILLING_WEBHOOK_SECRET").filter(|s| !s.trim().is_empty());
        if billing_webhook_secret.is_none() {
            warn!("⚠️ BILLING_WEBHOOK_SECRET not set, subscription updates are disabled");
        }

        let usage_report_interval_secs = match lookup("USAGE_REPORT_INTERVAL_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                format!("USAGE_REPORT_INTERVAL_SECS must be a whole number of seconds: {}", e)
            })?,
            None => defaults.usage_report_interval_secs,
        };

        Ok(Self {
            bind_address: lookup("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            storage_root: lookup("STORAGE_ROOT").map(PathBuf::from).unwrap_or(defaults.storage_root),
            jwt_secret,
            billing_webhook_secret,
            cors_allowed_origin: lookup("CORS_ALLOWED_ORIGIN").unwrap_or(defaults.cors_allowed_origin),
            usage_report_interval_secs,
        })
    }

    pub fn usage_reporting_enabled(&self) -> bool {
        self.usage_report_interval_secs > 0
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            storage_root: PathBuf::from(DEFAULT_STORAGE_ROOT),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            billing_webhook_secret: None,
            cors_allowed_origin: DEFAULT_CORS_ORIGIN.to_string(),
            usage_report_interval_secs: DEFAULT_USAGE_REPORT_INTERVAL_SECS,
        }
    }
}

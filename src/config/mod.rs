//! Service configuration
//!
//! Configuration is layered:
//!
//! 1. Hardcoded defaults (lowest priority)
//! 2. Global config file (`<data dir>/legalform.toml`)
//! 3. Project config file (`./legalform.toml`) or an explicit `--config` path
//! 4. Environment variables (highest priority)
//!
//! Secrets (service role key, payment and email API keys) are normally only
//! provided through the environment.

use crate::error::{common, ErrorCode, LegalFormError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

pub mod loader;

pub use loader::ConfigLoader;

/// Valid log levels for configuration validation.
pub const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

const REDACTED: &str = "********";

/// Get the global LegalForm directory for storing configuration
pub fn get_global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("ci", "legalform", "legalform").map(|dirs| dirs.config_dir().to_path_buf())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub persistence: PersistenceConfig,

    #[serde(default)]
    pub payment: PaymentConfig,

    #[serde(default)]
    pub notification: NotificationConfig,

    #[serde(default)]
    pub pricing: PricingConfig,

    #[serde(default)]
    pub documents: DocumentConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Externally reachable base URL, used to build the payment callback URL.
    #[serde(default)]
    pub public_url: Option<String>,
}

/// Which data store backs the persistence gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// Process-local store, lost on restart.
    #[default]
    Memory,
    /// Hosted Supabase project (PostgREST + storage API).
    Supabase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    #[serde(default)]
    pub backend: BackendType,

    #[serde(default)]
    pub supabase_url: Option<String>,

    #[serde(default)]
    pub service_role_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentConfig {
    /// Payments are only initiated when a secret key is configured.
    #[serde(default)]
    pub secret_key: Option<String>,

    #[serde(default = "default_payment_base_url")]
    pub base_url: String,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default = "default_country")]
    pub country: String,

    /// Overrides the callback URL derived from `server.public_url`.
    #[serde(default)]
    pub callback_url: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Emails are only sent when an API key is configured.
    #[serde(default)]
    pub resend_api_key: Option<String>,

    #[serde(default = "default_resend_endpoint")]
    pub resend_endpoint: String,

    #[serde(default = "default_sender")]
    pub from: String,

    #[serde(default = "default_dashboard_url")]
    pub dashboard_url: String,

    #[serde(default = "default_support_email")]
    pub support_email: String,

    #[serde(default = "default_support_phone")]
    pub support_phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Region billed at the premium price.
    #[serde(default = "default_premium_region")]
    pub premium_region: String,

    #[serde(default = "default_premium_price")]
    pub premium_price: f64,

    /// Price for every other region.
    #[serde(default = "default_standard_price")]
    pub standard_price: f64,

    /// Extra charge per add-on service, keyed by service id (e.g. `domiciliation`).
    #[serde(default)]
    pub service_surcharges: HashMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentConfig {
    #[serde(default = "default_bucket")]
    pub bucket: String,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_payment_base_url() -> String {
    "https://api.fedapay.com".to_string()
}

fn default_currency() -> String {
    "XOF".to_string()
}

fn default_country() -> String {
    "CI".to_string()
}

fn default_resend_endpoint() -> String {
    "https://api.resend.com/emails".to_string()
}

fn default_sender() -> String {
    "LegalForm <entreprise@legalform.ci>".to_string()
}

fn default_dashboard_url() -> String {
    "https://legalform.ci/client/dashboard".to_string()
}

fn default_support_email() -> String {
    "entreprise@legalform.ci".to_string()
}

fn default_support_phone() -> String {
    "+225 07 09 67 79 25".to_string()
}

fn default_premium_region() -> String {
    "Abidjan".to_string()
}

fn default_premium_price() -> f64 {
    150_000.0
}

fn default_standard_price() -> f64 {
    200_000.0
}

fn default_bucket() -> String {
    "company-documents".to_string()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            server: ServerConfig::default(),
            persistence: PersistenceConfig::default(),
            payment: PaymentConfig::default(),
            notification: NotificationConfig::default(),
            pricing: PricingConfig::default(),
            documents: DocumentConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: None,
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: BackendType::default(),
            supabase_url: None,
            service_role_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            base_url: default_payment_base_url(),
            currency: default_currency(),
            country: default_country(),
            callback_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            resend_api_key: None,
            resend_endpoint: default_resend_endpoint(),
            from: default_sender(),
            dashboard_url: default_dashboard_url(),
            support_email: default_support_email(),
            support_phone: default_support_phone(),
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            premium_region: default_premium_region(),
            premium_price: default_premium_price(),
            standard_price: default_standard_price(),
            service_surcharges: HashMap::new(),
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply environment overrides on top of file values
    pub fn merge_env_vars(&mut self) {
        self.merge_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable source
    pub fn merge_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("LEGALFORM_LOG_LEVEL") {
            self.log_level = level;
        }

        if let Some(host) = lookup("LEGALFORM_HOST") {
            self.server.host = host;
        }

        if let Some(port) = lookup("LEGALFORM_PORT") {
            if let Ok(value) = port.parse::<u16>() {
                self.server.port = value;
            }
        }

        if let Some(url) = lookup("LEGALFORM_PUBLIC_URL") {
            self.server.public_url = Some(url);
        }

        if let Some(url) = lookup("SUPABASE_URL") {
            self.persistence.supabase_url = Some(url);
            self.persistence.backend = BackendType::Supabase;
        }

        if let Some(key) = lookup("SUPABASE_SERVICE_ROLE_KEY") {
            self.persistence.service_role_key = Some(key);
        }

        if let Some(key) = lookup("FEDAPAY_SECRET_KEY") {
            self.payment.secret_key = Some(key);
        }

        if let Some(url) = lookup("FEDAPAY_BASE_URL") {
            self.payment.base_url = url;
        }

        if let Some(key) = lookup("RESEND_API_KEY") {
            self.notification.resend_api_key = Some(key);
        }
    }

    /// Check values that serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(LegalFormError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                format!(
                    "Invalid log level '{}', expected one of: {}",
                    self.log_level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }

        if self.persistence.backend == BackendType::Supabase {
            if self.persistence.supabase_url.is_none() {
                return Err(common::missing_setting("persistence.supabase_url"));
            }
            if self.persistence.service_role_key.is_none() {
                return Err(common::missing_setting("persistence.service_role_key"));
            }
        }

        if self.pricing.premium_price < 0.0 || self.pricing.standard_price < 0.0 {
            return Err(LegalFormError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                "Prices must not be negative",
            ));
        }

        Ok(())
    }

    pub fn payments_enabled(&self) -> bool {
        self.payment.secret_key.is_some()
    }

    /// URL the payment gateway calls back once a transaction settles
    pub fn payment_callback_url(&self) -> Option<String> {
        self.payment.callback_url.clone().or_else(|| {
            self.server.public_url.as_ref().map(|base| {
                format!("{}/api/v1/payments/webhook", base.trim_end_matches('/'))
            })
        })
    }

    /// Copy with every secret masked, for display
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        let mask = |value: &mut Option<String>| {
            if value.is_some() {
                *value = Some(REDACTED.to_string());
            }
        };
        mask(&mut copy.persistence.service_role_key);
        mask(&mut copy.payment.secret_key);
        mask(&mut copy.notification.resend_api_key);
        copy
    }
}

#[cfg(test)]
mod tests;

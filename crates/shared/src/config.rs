//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::types::money::Currency;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Outbound email configuration.
    #[serde(default)]
    pub email: EmailConfig,
    /// Storefront settings (currency, shipping).
    #[serde(default)]
    pub store: StoreConfig,
    /// Settings for the stale-budget sweeper job.
    #[serde(default)]
    pub sweeper: SweeperConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
///
/// Tokens are issued by the hosted auth provider; this service only
/// validates them with the shared secret.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    3600 // 1 hour
}

/// SMTP configuration for transactional email.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// When false, notifications are logged instead of sent.
    #[serde(default)]
    pub enabled: bool,
    /// SMTP relay host.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username.
    #[serde(default)]
    pub smtp_username: String,
    /// SMTP password.
    #[serde(default)]
    pub smtp_password: String,
    /// Sender address.
    #[serde(default = "default_from_email")]
    pub from_email: String,
    /// Sender display name.
    #[serde(default = "default_company_name")]
    pub from_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: default_from_email(),
            from_name: default_company_name(),
        }
    }
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    1025
}

fn default_from_email() -> String {
    "noreply@ecojardim.com.br".to_string()
}

fn default_company_name() -> String {
    "EcoJardim".to_string()
}

/// Storefront settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Flat shipping surcharge added to every checkout.
    #[serde(default = "default_shipping_cost")]
    pub shipping_cost: Decimal,
    /// The store's single currency.
    #[serde(default = "default_currency")]
    pub currency: Currency,
    /// Company name used in customer-facing messages.
    #[serde(default = "default_company_name")]
    pub company_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            shipping_cost: default_shipping_cost(),
            currency: default_currency(),
            company_name: default_company_name(),
        }
    }
}

fn default_shipping_cost() -> Decimal {
    Decimal::new(5000, 2)
}

fn default_currency() -> Currency {
    Currency::Brl
}

/// Settings for the stale-budget sweeper.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SweeperConfig {
    /// Actor recorded in audit entries written by automatic expiry.
    #[serde(default)]
    pub actor_id: Uuid,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("JARDIM").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub payment: PaymentConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
}

/// Chain payment settings for the 402 handshake.
///
/// `chain_decimals` fixes the human-unit -> minor-unit (planck) scaling
/// factor as a protocol constant for the target chain; it is not a per-call
/// knob. Paseo's PAS has 10 decimals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    pub network: String,
    pub currency: String,
    pub chain_decimals: u32,
    pub verifier_url: String,
    pub verify_timeout_secs: u64,
    pub default_recipient: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub enable_cors: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout_secs = v.parse().unwrap_or(self.database.connection_timeout_secs);
        }

        // Payment overrides
        if let Ok(v) = env::var("PAYMENT_NETWORK") {
            self.payment.network = v;
        }
        if let Ok(v) = env::var("PAYMENT_CURRENCY") {
            self.payment.currency = v;
        }
        if let Ok(v) = env::var("PAYMENT_CHAIN_DECIMALS") {
            self.payment.chain_decimals = v.parse().unwrap_or(self.payment.chain_decimals);
        }
        if let Ok(v) = env::var("PAYMENT_VERIFIER_URL") {
            self.payment.verifier_url = v;
        }
        if let Ok(v) = env::var("PAYMENT_VERIFY_TIMEOUT_SECS") {
            self.payment.verify_timeout_secs = v.parse().unwrap_or(self.payment.verify_timeout_secs);
        }
        if let Ok(v) = env::var("DEFAULT_RECIPIENT_WALLET") {
            self.payment.default_recipient = Some(v);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_ENABLE_CORS") {
            self.api.enable_cors = v.parse().unwrap_or(self.api.enable_cors);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout_secs: 30,
            },
            payment: PaymentConfig {
                network: "paseo".to_string(),
                currency: "PAS".to_string(),
                chain_decimals: 10,
                verifier_url: "http://localhost:5402".to_string(),
                verify_timeout_secs: 30,
                default_recipient: None,
            },
            api: ApiConfig {
                enable_request_logging: true,
                enable_cors: true,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout_secs: 10,
            },
            payment: PaymentConfig {
                network: "paseo".to_string(),
                currency: "PAS".to_string(),
                chain_decimals: 10,
                verifier_url: "http://localhost:5402".to_string(),
                verify_timeout_secs: 20,
                default_recipient: None,
            },
            api: ApiConfig {
                enable_request_logging: true,
                enable_cors: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout_secs: 5,
            },
            payment: PaymentConfig {
                network: "polkadot".to_string(),
                currency: "DOT".to_string(),
                chain_decimals: 10,
                verifier_url: "http://localhost:5402".to_string(),
                verify_timeout_secs: 15,
                default_recipient: None,
            },
            api: ApiConfig {
                enable_request_logging: false,
                enable_cors: true,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.payment.network, "paseo");
        assert_eq!(config.payment.currency, "PAS");
        assert_eq!(config.payment.chain_decimals, 10);
        assert!(config.api.enable_request_logging);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.payment.chain_decimals, 10);
        assert!(!config.api.enable_request_logging);
    }
}

//! Environment configuration.

use crate::assets::CloudinaryCredentials;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8083;
const DEFAULT_CURRENCY: &str = "usd";
const DEFAULT_SIGN_IN_PATH: &str = "/auth/signin";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("{var} has invalid value {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct StripeConfig {
    pub secret_key: String,
    pub publishable_key: String,
    pub currency: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    pub stripe: StripeConfig,
    pub cloudinary: CloudinaryCredentials,
    pub port: u16,
    pub nats_url: Option<String>,
    pub sign_in_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| lookup(key).filter(|v| !v.is_empty()).ok_or(ConfigError::Missing(key));

        let port = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid { var: "PORT", value: raw })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            session_secret: required("SESSION_SECRET")?,
            stripe: StripeConfig {
                secret_key: required("STRIPE_SECRET_KEY")?,
                publishable_key: required("STRIPE_PUBLISHABLE_KEY")?,
                currency: lookup("PAYMENT_CURRENCY").unwrap_or_else(|| DEFAULT_CURRENCY.to_string()).to_lowercase(),
            },
            cloudinary: CloudinaryCredentials {
                cloud_name: required("CLOUDINARY_CLOUD_NAME")?,
                api_key: required("CLOUDINARY_API_KEY")?,
                api_secret: required("CLOUDINARY_API_SECRET")?,
            },
            port,
            nats_url: lookup("NATS_URL").filter(|v| !v.is_empty()),
            sign_in_path: lookup("SIGN_IN_PATH").unwrap_or_else(|| DEFAULT_SIGN_IN_PATH.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn full() -> HashMap<String, String> {
        env(&[
            ("DATABASE_URL", "postgres://localhost/store"),
            ("SESSION_SECRET", "secret"),
            ("STRIPE_SECRET_KEY", "sk_test"),
            ("STRIPE_PUBLISHABLE_KEY", "pk_test"),
            ("CLOUDINARY_CLOUD_NAME", "demo"),
            ("CLOUDINARY_API_KEY", "key"),
            ("CLOUDINARY_API_SECRET", "shh"),
        ])
    }

    #[test]
    fn test_defaults_applied() {
        let vars = full();
        let cfg = Config::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(cfg.port, 8083);
        assert_eq!(cfg.stripe.currency, "usd");
        assert_eq!(cfg.sign_in_path, "/auth/signin");
        assert!(cfg.nats_url.is_none());
    }

    #[test]
    fn test_missing_variable_is_named() {
        let mut vars = full();
        vars.remove("STRIPE_SECRET_KEY");
        let err = Config::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert_eq!(err, ConfigError::Missing("STRIPE_SECRET_KEY"));
    }

    #[test]
    fn test_bad_port_rejected() {
        let mut vars = full();
        vars.insert("PORT".into(), "eighty".into());
        assert!(matches!(Config::from_lookup(|k| vars.get(k).cloned()), Err(ConfigError::Invalid { var: "PORT", .. })));
    }
}

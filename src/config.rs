use anyhow::Context;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::utils::sanitize::mask_value;

pub const TEST_POST_URL: &str =
    "https://uatcheckout.yagoutpay.com/ms-transaction-core-1-0/paymentRedirection/checksumGatewayPage";
pub const PRODUCTION_POST_URL: &str =
    "https://checkout.yagoutpay.com/ms-transaction-core-1-0/paymentRedirection/checksumGatewayPage";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Test,
    Production,
}

impl Environment {
    pub fn post_url(&self) -> &'static str {
        match self {
            Environment::Test => TEST_POST_URL,
            Environment::Production => PRODUCTION_POST_URL,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Test => f.write_str("test"),
            Environment::Production => f.write_str("production"),
        }
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "test" | "uat" => Ok(Environment::Test),
            "production" | "prod" => Ok(Environment::Production),
            other => anyhow::bail!("unknown environment '{}', expected 'test' or 'production'", other),
        }
    }
}

/// Merchant credentials and gateway selection, passed explicitly to the
/// encoder and decoder.
#[derive(Clone)]
pub struct GatewayConfig {
    pub merchant_id: String,
    /// Base64 of the 32-byte AES key issued by the gateway.
    pub encryption_key: String,
    pub environment: Environment,
    pub post_url_override: Option<String>,
}

impl GatewayConfig {
    pub fn new(
        merchant_id: impl Into<String>,
        encryption_key: impl Into<String>,
        environment: Environment,
    ) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            encryption_key: encryption_key.into(),
            environment,
            post_url_override: None,
        }
    }

    pub fn with_post_url(mut self, post_url: impl Into<String>) -> Self {
        self.post_url_override = Some(post_url.into());
        self
    }

    pub fn post_url(&self) -> &str {
        self.post_url_override
            .as_deref()
            .unwrap_or_else(|| self.environment.post_url())
    }

    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        let environment = env::var("YAGOUT_ENVIRONMENT")
            .unwrap_or_else(|_| "test".to_string())
            .parse()?;

        let post_url_override = env::var("YAGOUT_POST_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(|value| parse_post_url(&value))
            .transpose()?;

        let config = GatewayConfig {
            merchant_id: env::var("YAGOUT_MERCHANT_ID").context("YAGOUT_MERCHANT_ID is required")?,
            encryption_key: env::var("YAGOUT_ENCRYPTION_KEY")
                .context("YAGOUT_ENCRYPTION_KEY is required")?,
            environment,
            post_url_override,
        };

        if config.merchant_id.trim().is_empty() {
            anyhow::bail!("YAGOUT_MERCHANT_ID must not be empty");
        }

        Ok(config)
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("merchant_id", &mask_value(&self.merchant_id))
            .field("encryption_key", &"<redacted>")
            .field("environment", &self.environment)
            .field("post_url", &self.post_url())
            .finish()
    }
}

fn parse_post_url(raw: &str) -> anyhow::Result<String> {
    let url = Url::parse(raw.trim()).context("YAGOUT_POST_URL must be an absolute URL")?;
    if !matches!(url.scheme(), "https" | "http") {
        anyhow::bail!("YAGOUT_POST_URL must use http or https");
    }

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_selects_post_url() {
        assert_eq!(Environment::Test.post_url(), TEST_POST_URL);
        assert_eq!(Environment::Production.post_url(), PRODUCTION_POST_URL);
    }

    #[test]
    fn environment_parses_aliases() {
        assert_eq!("TEST".parse::<Environment>().unwrap(), Environment::Test);
        assert_eq!(" prod ".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!(
            "production".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn post_url_override_wins() {
        let config = GatewayConfig::new("M1", "key", Environment::Production)
            .with_post_url("https://gateway.example/checkout");
        assert_eq!(config.post_url(), "https://gateway.example/checkout");
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = GatewayConfig::new("202508080001", "c2VjcmV0LWtleQ==", Environment::Test);
        let rendered = format!("{config:?}");

        assert!(!rendered.contains("c2VjcmV0LWtleQ=="));
        assert!(!rendered.contains("202508080001"));
        assert!(rendered.contains("2025****0001"));
    }

    #[test]
    fn parses_post_url() {
        assert!(parse_post_url("https://gateway.example/checkout").is_ok());
        assert!(parse_post_url("/relative/path").is_err());
        assert!(parse_post_url("ftp://gateway.example").is_err());
    }
}

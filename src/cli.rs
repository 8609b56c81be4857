use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::GatewayConfig;
use crate::domain::callback::CallbackPayload;
use crate::domain::order::{generate_order_no, OrderData};
use crate::services::{RequestEncoder, ResponseDecoder};
use crate::utils::sanitize::mask_value;
use crate::validation::{sanitize_string, validate_no_delimiters, validate_required};

#[derive(Parser)]
#[command(name = "yagout")]
#[command(about = "YagoutPay checkout request encoder and callback decoder", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encrypt an order (JSON file) into the gateway's checkout form fields
    Encode {
        /// Path to the order JSON
        #[arg(short, long, value_name = "FILE")]
        order: PathBuf,
    },

    /// Verify and decrypt a gateway callback
    Decode {
        /// Encrypted response as posted back by the gateway
        #[arg(long, requires = "hash", conflicts_with = "query")]
        response: Option<String>,

        /// Hash accompanying the encrypted response
        #[arg(long, requires = "response", conflicts_with = "query")]
        hash: Option<String>,

        /// Raw callback query string or form body
        #[arg(long)]
        query: Option<String>,
    },

    /// Generate a fresh order number
    OrderNo {
        #[arg(short, long, default_value = "ORDER")]
        prefix: String,
    },

    /// Configuration validation
    Config,
}

pub fn handle_encode(config: &GatewayConfig, order_path: &Path) -> anyhow::Result<()> {
    let raw = fs::read_to_string(order_path)
        .with_context(|| format!("failed to read order file {}", order_path.display()))?;
    let order: OrderData = serde_json::from_str(&raw).context("order file is not valid order JSON")?;

    let encoder = RequestEncoder::new(config)?;
    let payload = encoder.encode(&order)?;

    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

pub fn handle_decode(
    config: &GatewayConfig,
    response: Option<String>,
    hash: Option<String>,
    query: Option<String>,
) -> anyhow::Result<()> {
    let payload = match query {
        Some(query) => CallbackPayload::from_query(&query),
        None => CallbackPayload {
            encrypted_response: response,
            hash,
        },
    };

    let decoder = ResponseDecoder::new(config)?;
    let record = decoder.decode(&payload)?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

pub fn handle_order_no(prefix: &str) -> anyhow::Result<()> {
    let prefix = sanitize_string(prefix);
    validate_required("prefix", &prefix)?;
    validate_no_delimiters("prefix", &prefix)?;

    println!("{}", generate_order_no(&prefix));
    Ok(())
}

pub fn handle_config_validate(config: &GatewayConfig) -> anyhow::Result<()> {
    tracing::info!("Validating configuration...");

    // constructing an encoder checks the key length and the merchant id
    RequestEncoder::new(config).context("gateway configuration is invalid")?;

    println!("Configuration:");
    println!("  Merchant ID: {}", mask_value(&config.merchant_id));
    println!("  Encryption Key: <redacted> (32 bytes)");
    println!("  Environment: {}", config.environment);
    println!("  Post URL: {}", config.post_url());

    tracing::info!("Configuration is valid");
    println!("✓ Configuration is valid");

    Ok(())
}

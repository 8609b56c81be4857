use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yagout_core::cli::{self, Cli, Commands};
use yagout_core::config::GatewayConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging; stdout is reserved for command output
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(json_logs.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    match cli.command {
        Commands::OrderNo { prefix } => cli::handle_order_no(&prefix),
        Commands::Encode { order } => {
            let config = GatewayConfig::from_env()?;
            cli::handle_encode(&config, &order)
        }
        Commands::Decode {
            response,
            hash,
            query,
        } => {
            let config = GatewayConfig::from_env()?;
            cli::handle_decode(&config, response, hash, query)
        }
        Commands::Config => {
            let config = GatewayConfig::from_env()?;
            cli::handle_config_validate(&config)
        }
    }
}

use anyhow::{Context, Result};
use arb_account::implementations::local::create_account;
use arb_config::{ArbConfig, ConfigLoader};
use arb_core::ArbBuilder;
use arb_delivery::implementations::evm::alloy::create_http_delivery;
use arb_discovery::implementations::marketplace::create_discovery;
use clap::{Parser, Subcommand};
use std::future::Future;
use std::path::PathBuf;
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "nft-arb")]
#[command(about = "NFT marketplace arbitrage bot", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	/// Path to configuration file
	#[arg(
		short,
		long,
		value_name = "FILE",
		env = "ARB_CONFIG",
		default_value = "config/arb.toml"
	)]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
	#[arg(long, env = "ARB_LOG_LEVEL", default_value = "info")]
	log_level: String,
}

#[derive(Subcommand)]
enum Commands {
	/// Run the arbitrage loop
	Start,
	/// Validate the configuration file without contacting any endpoint
	Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
	// A missing .env file is fine; variables may come from the environment.
	dotenvy::dotenv().ok();

	let cli = Cli::parse();
	setup_tracing(&cli.log_level)?;

	match cli.command {
		Some(Commands::Start) | None => start(cli).await,
		Some(Commands::Validate) => validate(cli).await,
	}
}

async fn load_config(cli: &Cli) -> Result<ArbConfig> {
	ConfigLoader::new()
		.with_file(&cli.config)
		.load()
		.await
		.context("Failed to load configuration")
}

async fn start(cli: Cli) -> Result<()> {
	let config = load_config(&cli).await?;
	info!(name = %config.arbitrage.name, "Starting arbitrage bot");

	let engine = ArbBuilder::new(config)
		.with_account_factory(create_account)
		.with_delivery_factory(create_http_delivery)
		.with_discovery_factory(create_discovery)
		.build()
		.await
		.context("Failed to initialise arbitrage engine")?;

	engine
		.run(shutdown_signal())
		.await
		.context("Arbitrage loop failed")?;

	info!("Arbitrage bot stopped");
	Ok(())
}

async fn validate(cli: Cli) -> Result<()> {
	info!("Validating configuration file: {:?}", cli.config);
	let config = load_config(&cli).await?;

	let account_section =
		toml::Value::try_from(&config.account).context("Failed to encode [account]")?;
	let account = create_account(&account_section).context("Invalid signing key")?;

	info!("Configuration is valid");
	info!("Name: {}", config.arbitrage.name);
	info!("Signer: {}", account.address());
	info!("Contract: {}", config.chain.contract_address);
	info!("RPC endpoint: {}", config.chain.rpc_url);
	info!(
		"Feed: {} (chain {}, page {} x {})",
		config.feed.url, config.feed.chain, config.feed.page_num, config.feed.page_size
	);
	info!("Price override: {}", config.arbitrage.price_override);

	Ok(())
}

fn setup_tracing(log_level: &str) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
		.with_context(|| format!("Invalid log level: {}", log_level))?;

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer())
		.try_init()
		.context("Failed to initialise tracing")?;

	Ok(())
}

/// Installs the Ctrl-C and SIGTERM handlers and returns a future that
/// resolves once either signal arrives.
///
/// Handlers are registered before this returns, so a signal that arrives while
/// the first cycle is still running is held until that cycle finishes.
fn shutdown_signal() -> impl Future<Output = ()> {
	let (tx, rx) = oneshot::channel::<()>();

	#[cfg(unix)]
	let streams = (
		signal::unix::signal(signal::unix::SignalKind::interrupt()),
		signal::unix::signal(signal::unix::SignalKind::terminate()),
	);

	tokio::spawn(async move {
		#[cfg(unix)]
		match streams {
			(Ok(mut interrupt), Ok(mut terminate)) => {
				tokio::select! {
					_ = interrupt.recv() => {},
					_ = terminate.recv() => {},
				}
			}
			(Err(e), _) | (_, Err(e)) => {
				error!(error = %e, "Failed to install signal handlers");
				return;
			}
		}

		#[cfg(not(unix))]
		if let Err(e) = signal::ctrl_c().await {
			error!(error = %e, "Failed to install Ctrl+C handler");
			return;
		}

		info!("Shutdown signal received, finishing current cycle");
		let _ = tx.send(());
	});

	async move {
		// Without handlers the loop runs until the process is killed.
		if rx.await.is_err() {
			std::future::pending::<()>().await;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;

	#[test]
	fn test_cli_defaults() {
		let cli = Cli::try_parse_from(["nft-arb", "validate"]).unwrap();
		assert!(matches!(cli.command, Some(Commands::Validate)));
	}

	#[tokio::test]
	async fn test_shutdown_waits_for_a_signal() {
		let shutdown = shutdown_signal();
		assert!(tokio::time::timeout(Duration::from_millis(50), shutdown)
			.await
			.is_err());
	}
}

//! BigBang command-line client
//!
//! Reads account, team and orbit data from the BigBang contract on Ramestta
//! and prepares unsigned registration transactions for an external wallet.

use std::path::PathBuf;
use std::sync::Arc;

use alloy_primitives::{Address, B256};
use anyhow::{anyhow, Context, Result};
use bigbang_chain_client::{NetworkConfig, RpcBigBangChain};
use bigbang_store::metrics::encode_text;
use bigbang_store::referral::{referral_from_url, referral_link, strip_referral};
use bigbang_store::{SessionFile, SponsorRef, Store, StoreMetrics};
use bigbang_types::units::{lower_hex, shorten_address};
use bigbang_types::TracingNotifier;
use clap::{Parser, Subcommand};
use prometheus::Registry;
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "bigbang")]
#[command(about = "BigBang orbit ecosystem client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Network configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured RPC endpoints (repeatable)
    #[arg(long)]
    rpc_url: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long)]
    json_logs: bool,

    /// Session file remembering the connected wallet and viewed profile
    #[arg(long, default_value = "bigbang-session.json")]
    session: PathBuf,

    /// Print store metrics after the command
    #[arg(long)]
    print_metrics: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Load the account snapshot of a wallet
    Snapshot { address: Address },
    /// Resolve a sponsor given as address or user ID
    Resolve { sponsor: String },
    /// Show the current registration cost
    Activation,
    /// Prepare the unsigned registration transaction
    Register {
        /// Registering wallet
        address: String,
        /// Sponsor address or user ID
        sponsor: String,
    },
    /// List the downline at one level
    Team {
        address: Address,
        #[arg(long, default_value = "1")]
        level: u8,
    },
    /// Income per referral level
    Levels { address: Address },
    /// Orbit progress overview
    Orbits { address: Address },
    /// Payments received in one orbit
    PayHistory { address: Address, orbit_id: u64 },
    /// Wait for a transaction receipt
    Receipt { tx_hash: B256 },
    /// Open a profile by user ID in view mode
    View {
        user_id: Option<u64>,
        /// Leave view mode
        #[arg(long, conflicts_with = "user_id")]
        clear: bool,
    },
    /// Extract the sponsor from a referral link
    Referral { url: String },
}

fn init_logging(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    if json {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_line_number(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<NetworkConfig> {
    let mut config = match &cli.config {
        Some(path) => NetworkConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => NetworkConfig::default(),
    };
    if !cli.rpc_url.is_empty() {
        config.rpc_urls = cli.rpc_url.clone();
    }
    config.validate()?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.json_logs)?;

    let config = load_config(&cli)?;
    info!(
        network = %config.network_name,
        chain_id = config.chain_id,
        contract = %lower_hex(&config.contract_address),
        "Starting BigBang client"
    );

    let registry = Registry::new();
    let chain = Arc::new(RpcBigBangChain::from_config(&config)?);
    let store = Store::new(chain, Arc::new(TracingNotifier))
        .with_metrics(StoreMetrics::new(&registry)?);
    let session = SessionFile::new(&cli.session);

    run(&cli.command, &config, &store, &session).await?;

    if cli.print_metrics {
        print!("{}", encode_text(&registry)?);
    }
    Ok(())
}

async fn run(
    command: &Command,
    config: &NetworkConfig,
    store: &Store,
    session: &SessionFile,
) -> Result<()> {
    match command {
        Command::Snapshot { address } => {
            let snapshot = store.load_user_snapshot(*address).await?;
            session
                .remember_connected(*address, snapshot.is_registered)
                .await?;
            print_json(&snapshot)?;
            if snapshot.is_registered {
                println!(
                    "Referral link: {}",
                    referral_link(&config.referral_base_url, snapshot.user_id)
                );
            }
        }
        Command::Resolve { sponsor } => {
            let address = store.resolve_sponsor(sponsor).await?;
            println!("{}", lower_hex(&address));
        }
        Command::Activation => {
            let requirement = store.fetch_activation_requirement().await?;
            println!(
                "Registration cost: {:.4} {}",
                requirement.required_native, config.native_symbol
            );
        }
        Command::Register { address, sponsor } => {
            let tx = store.build_registration_tx(address, sponsor).await?;
            print_json(&tx)?;
        }
        Command::Team { address, level } => {
            let summary = store.team_level_summary(*address, *level).await?;
            for member in &summary.members {
                println!(
                    "{}  {:>12.2} USD  registered {}",
                    shorten_address(&member.wallet_address, 6, 4),
                    member.income_usd(),
                    member.registration_time
                );
            }
            println!(
                "Level {}: {} members, {:.2} USD",
                summary.level,
                summary.members.len(),
                summary.total_income_usd
            );
        }
        Command::Levels { address } => {
            for row in store.all_level_income(*address).await? {
                println!("Level {}  {:>12.2} USD", row.level, row.amount_usd);
            }
        }
        Command::Orbits { address } => {
            for orbit in store.orbit_overview(*address).await? {
                let status = if orbit.is_closed() { "closed" } else { "open" };
                println!(
                    "Orbit {}  {}/10  {status}",
                    orbit.orbit_id + 1,
                    orbit.completed_slots
                );
            }
        }
        Command::PayHistory { address, orbit_id } => {
            let orbit = store.load_orbit(*address, *orbit_id).await?;
            print_json(&orbit)?;
        }
        Command::Receipt { tx_hash } => {
            let receipt = store.wait_for_receipt(config, *tx_hash).await?;
            print_json(&receipt)?;
            println!(
                "{}",
                config.explorer_tx_url(&receipt.transaction_hash.to_string())
            );
        }
        Command::View { user_id, clear } => {
            if *clear {
                session.clear_viewed().await?;
                println!("Left view mode");
                return Ok(());
            }
            let user_id = user_id.ok_or_else(|| anyhow!("a user ID is required"))?;
            let address = store.lookup_user_address(user_id).await?;
            session.remember_viewed(address, user_id).await?;
            print_json(&store.load_user_snapshot(address).await?)?;
        }
        Command::Referral { url } => {
            let raw = referral_from_url(url).ok_or_else(|| anyhow!("no referral in {url}"))?;
            let sponsor = SponsorRef::parse(&raw)?;
            let address = store.resolve_sponsor(&raw).await?;
            println!("Sponsor {sponsor} -> {}", lower_hex(&address));
            if let Some(clean) = strip_referral(url) {
                println!("Clean URL: {clean}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_override() {
        let cli = Cli::try_parse_from([
            "bigbang",
            "--rpc-url",
            "http://localhost:8545",
            "activation",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.rpc_urls, vec!["http://localhost:8545".to_string()]);
    }

    #[test]
    fn test_invalid_rpc_override_rejected() {
        let cli = Cli::try_parse_from(["bigbang", "--rpc-url", "ws://node", "activation"]).unwrap();
        assert!(load_config(&cli).is_err());
    }

    #[test]
    fn test_view_clear_conflicts_with_id() {
        assert!(Cli::try_parse_from(["bigbang", "view", "5", "--clear"]).is_err());
        assert!(Cli::try_parse_from(["bigbang", "view", "--clear"]).is_ok());
    }

    #[test]
    fn test_address_arguments_are_parsed() {
        let address = format!("0x{}", "ab".repeat(20));
        let cli = Cli::try_parse_from(["bigbang", "pay-history", address.as_str(), "2"]).unwrap();
        match cli.command {
            Command::PayHistory { address, orbit_id } => {
                assert_eq!(address, Address::repeat_byte(0xab));
                assert_eq!(orbit_id, 2);
            }
            _ => panic!("unexpected command"),
        }
    }
}

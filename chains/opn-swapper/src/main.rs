use opn_swapper::chain::HttpConnector;
use opn_swapper::{RunSettings, SwapConfig, SwapSpammer};

use anyhow::Result;
use clap::Parser;
use colored::*;
use core_logic::{setup_logger, WorkerRunner};
use dialoguer::{theme::ColorfulTheme, Input};
use dotenv::dotenv;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "OPN testnet swap bot", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "chains/opn-swapper/config.toml")]
    config: String,
    /// Swaps per wallet per cycle; prompted for when omitted.
    #[arg(short, long)]
    swaps: Option<u32>,
    /// Seconds between swaps; prompted for when omitted.
    #[arg(short, long)]
    delay: Option<u64>,
    /// Only use the first key in the key file.
    #[arg(long)]
    single_wallet: bool,
}

fn print_banner(config: &SwapConfig) {
    let line = "=".repeat(56);
    println!("{}", line.cyan());
    println!("{}", "   OPN TESTNET SWAP BOT".bold().cyan());
    println!("   Chain {} | {}", config.chain_id, config.rpc_url);
    println!("   Router {:?}", config.router_address);
    println!("{}", line.cyan());
}

fn prompt_number<T>(prompt: &str, default: T) -> T
where
    T: Clone + ToString + FromStr,
    <T as FromStr>::Err: ToString,
{
    match Input::<T>::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(default.clone())
        .interact_text()
    {
        Ok(value) => value,
        Err(e) => {
            warn!(
                "Cannot prompt ({}), using {} for '{}'",
                e,
                default.to_string(),
                prompt
            );
            default
        }
    }
}

async fn run(args: Args) -> Result<()> {
    info!("Loading config from: {}", args.config);
    let config = SwapConfig::load(&args.config)?;
    print_banner(&config);

    let swaps_per_wallet = match args.swaps {
        Some(swaps) => swaps,
        None => prompt_number("Swaps per wallet", 1u32),
    };
    let delay_secs = match args.delay {
        Some(delay) => delay,
        None => prompt_number("Delay between swaps (seconds)", 10u64),
    };

    let settings = RunSettings {
        swaps_per_wallet,
        swap_delay: Duration::from_secs(delay_secs),
        single_wallet: args.single_wallet,
    };
    info!(
        "Configuration loaded for chain ID: {} | {} swap(s) per wallet | {}s delay",
        config.chain_id, settings.swaps_per_wallet, delay_secs
    );

    let connector = HttpConnector::from_config(&config);
    let spammer = SwapSpammer::new(Arc::new(config), settings, Arc::new(connector))?;

    WorkerRunner::run_spammer(&spammer).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Keep guard alive for file logging
    let _log_guard = setup_logger();
    dotenv().ok();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Critical error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

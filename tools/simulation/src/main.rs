use anyhow::Context;
use clap::Parser;
use rebase_sim::scenario::{run_scenario, ScenarioConfig};
use rebase_types::ids::Address;
use rebase_types::money::{format_cents, format_units, parse_cents};
use rebase_types::numeric::Units;
use tracing_subscriber::EnvFilter;

/// Replay a split-and-dividend lifecycle across the rebasing ledger and its wrapper.
#[derive(Debug, Parser)]
#[command(name = "rebase-sim", version)]
struct Args {
    /// Ticker of the rebasing token
    #[arg(long, default_value = "TSLA")]
    ticker: String,

    /// Address receiving the initial mint
    #[arg(long, default_value = "0xREECE")]
    holder: String,

    /// Contract address that receives auto-wrapped transfers
    #[arg(long, default_value = "0xCONTRACT")]
    contract: String,

    /// Vault address holding the collateral (defaults to the wrapped ticker)
    #[arg(long)]
    vault: Option<String>,

    /// Whole shares minted to the holder
    #[arg(long, default_value_t = 10)]
    shares: u64,

    /// Whole shares sent to the contract
    #[arg(long, default_value_t = 5)]
    transfer: u64,

    /// Initial share price, e.g. "$100.00"
    #[arg(long, default_value = "$100.00", value_parser = parse_cents)]
    price: u64,

    /// Split multiplier
    #[arg(long, default_value_t = 2)]
    split: u64,

    /// Cash dividend per share, e.g. "$1.50"
    #[arg(long, default_value = "$1.50", value_parser = parse_cents)]
    dividend: u64,

    /// Whole wrapped units to claim from the contract
    #[arg(long, default_value_t = 1)]
    claim: u64,

    /// Print the full report as JSON instead of text
    #[arg(long)]
    json: bool,
}

impl From<Args> for ScenarioConfig {
    fn from(args: Args) -> Self {
        Self {
            ticker: args.ticker,
            holder: Address::new(args.holder),
            contract: Address::new(args.contract),
            vault: args.vault.map(Address::new),
            initial_shares: args.shares,
            transfer_shares: args.transfer,
            share_price_cents: args.price,
            split_multiplier: args.split,
            dividend_cents: args.dividend,
            claim_shares: args.claim,
        }
    }
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let json = args.json;
    let report = run_scenario(args.into()).context("scenario failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for step in &report.steps {
        println!("\nAfter {}:", step.step);
        println!("{}", step.balances.render());
    }

    let claim = &report.claim;
    if claim.clamped {
        println!(
            "\nRequested {} exceeded the contract balance; claimed {}",
            format_units(claim.requested),
            format_units(claim.claimed)
        );
    }
    println!(
        "\nClaimed {} wrapped for {} underlying",
        format_units(claim.claimed),
        format_units(claim.underlying)
    );
    let totals = &report.final_totals;
    println!(
        "Total supply {} / wrapped supply {} / vault {}",
        format_units(totals.total_supply),
        format_units(totals.wrapped_supply),
        format_units(totals.vault_balance)
    );
    let price = report
        .steps
        .last()
        .map(|s| Units::from(s.balances.share_price_cents))
        .unwrap_or_default();
    println!("Closing share price {}", format_cents(price));

    Ok(())
}

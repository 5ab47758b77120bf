use std::path::PathBuf;

use anyhow::{Context, Result};
use chain::{
    value_chain, ChainConfig, ContractStore, MarketDataSource, MarketInputs, SqliteContractStore,
    TseDataFetcher,
};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "option-chain")]
#[command(about = "Fetch, store and value exchange option chains")]
struct Cli {
    /// json config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// sqlite file, overrides the config
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the current chain and store it
    Fetch,

    /// List stored contracts of a symbol
    Show {
        #[arg(short, long)]
        symbol: String,
    },

    /// Value stored contracts of a symbol with Black-Scholes
    Price {
        #[arg(short, long)]
        symbol: String,

        /// underlying price
        #[arg(long)]
        spot: f64,

        /// continuously compounded annual rate
        #[arg(long)]
        rate: f64,

        /// annualized volatility
        #[arg(long)]
        volatility: f64,

        /// valuation date (YYYY-MM-DD), today if omitted
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

fn quote(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = ChainConfig::load(cli.config.as_deref()).context("loading config")?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    let store = SqliteContractStore::open(&config.database_path)
        .with_context(|| format!("opening {}", config.database_path.display()))?;

    match cli.command {
        Commands::Fetch => {
            let fetcher = TseDataFetcher::new(&config)?;
            let contracts = fetcher.fetch_contracts().await?;
            let count = store.insert(&contracts)?;
            info!(count, url = fetcher.base_url(), "stored option chain");
        }
        Commands::Show { symbol } => {
            let contracts = store.retrieve(&symbol)?;
            if contracts.is_empty() {
                warn!(%symbol, "no stored contracts");
            }
            for c in contracts {
                println!(
                    "{:>6} {:<8} {:<4} {:>12.2} {} bid {:>10} ask {:>10}",
                    c.id.unwrap_or_default(),
                    c.symbol,
                    c.option_type,
                    c.strike_price,
                    c.expiration_date,
                    quote(c.bid_price),
                    quote(c.ask_price),
                );
            }
        }
        Commands::Price {
            symbol,
            spot,
            rate,
            volatility,
            date,
        } => {
            let valuation_date = date.unwrap_or_else(|| Local::now().date_naive());
            let market = MarketInputs {
                spot,
                risk_free_rate: rate,
                volatility,
            };
            let contracts = store.retrieve(&symbol)?;
            let valued = value_chain(&contracts, &market, valuation_date);
            info!(
                %symbol,
                stored = contracts.len(),
                valued = valued.len(),
                %valuation_date,
                "valued option chain"
            );

            for v in valued {
                let c = &v.contract;
                let g = &v.valuation;
                println!(
                    "{:<4} {:>10.2} {} price {:>10.4} delta {:>7.4} gamma {:>8.6} vega {:>9.4} theta {:>9.4} rho {:>9.4} edge {:>9}",
                    c.option_type,
                    c.strike_price,
                    c.expiration_date,
                    g.price,
                    g.delta,
                    g.gamma,
                    g.vega,
                    g.theta,
                    g.rho,
                    quote(v.edge),
                );
            }
        }
    }

    Ok(())
}

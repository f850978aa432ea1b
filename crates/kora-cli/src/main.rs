//! Kora CLI
//!
//! Command-line interface for running the Kora node and poking at its
//! economics without a running server.

use clap::{Parser, Subcommand};
use kora_directory::fallback_orchestrators;
use kora_economics::{format_currency, EarningsEstimator, RateProvider, TOKEN_SYMBOL};
use kora_node::{KoraConfig, KoraNode};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "kora")]
#[command(author = "Kora Labs")]
#[command(version)]
#[command(about = "Kora - talent marketplace and staking wallet node", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a Kora node
    Node {
        /// Configuration file path
        #[arg(short, long, default_value = "kora.toml")]
        config: PathBuf,
    },

    /// Project staking earnings for a principal
    Estimate {
        /// Principal in display currency
        principal: f64,

        /// APY percent
        #[arg(short, long, default_value = "65.6")]
        apy: f64,

        /// Orchestrator fee as a fraction (0-1)
        #[arg(short, long, default_value = "0.0")]
        fee: f64,

        /// Display currency code
        #[arg(short, long, default_value = "NGN")]
        currency: String,
    },

    /// List the built-in orchestrator set
    Orchestrators,

    /// Version information
    Version,
}

fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Node { config } => {
            let node_config = if config.exists() {
                KoraConfig::load(&config)?
            } else {
                tracing::info!("Config not found at {:?}, using defaults", config);
                KoraConfig::default()
            };

            let mut node = KoraNode::new(node_config)?;
            node.run().await?;
        }

        Commands::Estimate {
            principal,
            apy,
            fee,
            currency,
        } => {
            let estimator = EarningsEstimator::new(RateProvider::new());
            let projection = estimator.project(principal, apy, fee, &currency);

            println!("Principal:  {}", format_currency(principal, &currency));
            println!("Stake:      {:.4} {}", projection.token_amount, TOKEN_SYMBOL);
            println!("APY:        {:.1}% (fee {:.0}%)", apy, fee * 100.0);
            println!();
            println!("Daily:      {}", format_currency(projection.daily, &currency));
            println!("Monthly:    {}", format_currency(projection.monthly, &currency));
            println!("Yearly:     {}", format_currency(projection.yearly, &currency));
        }

        Commands::Orchestrators => {
            println!(
                "{:<44} {:<18} {:>7} {:>6} {:>6}",
                "ADDRESS", "NAME", "APY", "FEE", "PERF"
            );
            for o in fallback_orchestrators() {
                println!(
                    "{:<44} {:<18} {:>6.1}% {:>5.0}% {:>5.0}%",
                    o.address.to_hex(),
                    o.name,
                    o.apy,
                    o.fee * 100.0,
                    o.performance
                );
            }
        }

        Commands::Version => {
            println!("kora {}", env!("CARGO_PKG_VERSION"));
            println!("Token: {} (18 decimals)", TOKEN_SYMBOL);
        }
    }

    Ok(())
}

//! EuroFX Converter Binary
//!
//! Converts amounts at ECB daily reference rates and prices the service fee.

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eurofx_cli::form::{
    parse_amount, render_rate_list, MSG_INVALID_AMOUNT, MSG_NEGATIVE_AMOUNT, MSG_UNEXPECTED,
};
use eurofx_cli::{CliConfig, ConversionForm};
use eurofx_common::{Currency, Money, RateTable};
use eurofx_fx::{ConversionEngine, EcbRateProvider, FxEngineConfig, RateProvider};

/// EuroFX CLI
#[derive(Parser, Debug)]
#[command(name = "eurofx", version)]
#[command(about = "Convert currencies at ECB reference rates with a tiered service fee")]
struct Args {
    /// Reference rate feed URL
    #[arg(long, global = true)]
    feed_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List available currencies and their rates
    Rates,

    /// Convert an amount and show the fee
    Convert {
        /// Amount in the source currency
        #[arg(allow_hyphen_values = true)]
        amount: String,

        /// Source currency code
        #[arg(short, long)]
        from: Option<String>,

        /// Target currency code
        #[arg(short, long)]
        to: Option<String>,

        /// Print the full quote as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the fee for an amount already in EUR
    Fee {
        /// Amount in EUR
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = CliConfig::from_env();
    if let Some(url) = args.feed_url.clone() {
        config.feed_url = url;
    }
    if let Err(e) = config.validate() {
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    init_logging(&config);

    let engine = ConversionEngine::new(FxEngineConfig::default());

    match args.command {
        Command::Rates => {
            let table = build_provider(&config)?.fetch_rates().await?;
            print!("{}", render_rate_list(&table));
        }
        Command::Convert {
            amount,
            from,
            to,
            json,
        } => {
            let rates = load_rates(&config).await?;
            let form = ConversionForm::new(&engine, rates.as_ref());

            let from = from.unwrap_or_else(|| config.default_from.clone());
            let to = to.unwrap_or_else(|| config.default_to.clone());
            let outcome = form.submit(Some(&from), Some(&to), &amount);

            if !outcome.is_ok() {
                let message = outcome.error.as_deref().unwrap_or(MSG_UNEXPECTED);
                if form.is_available() && !(form.is_listed(&from) && form.is_listed(&to)) {
                    fail_with_currencies(message, &form.currencies());
                }
                fail(message);
            }

            match (&outcome.quote, json) {
                (Some(quote), true) => println!("{}", serde_json::to_string_pretty(quote)?),
                (quote, _) => {
                    println!("Converted Amount: {}", outcome.converted);
                    println!("Conversion Fee: {}", outcome.fee);
                    if let Some(quote) = quote {
                        println!("Effective Rate: {}", quote.effective_rate().normalize());
                    }
                }
            }
        }
        Command::Fee { amount } => {
            let amount = match parse_amount(&amount) {
                Some(amount) if amount < Decimal::ZERO => fail(MSG_NEGATIVE_AMOUNT),
                Some(amount) => amount,
                None => fail(MSG_INVALID_AMOUNT),
            };
            let fee = Money::new(engine.calculate_fee(amount), Currency::eur());
            println!("Conversion Fee: {}", fee);
        }
    }

    Ok(())
}

fn init_logging(config: &CliConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if config.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn build_provider(config: &CliConfig) -> anyhow::Result<EcbRateProvider> {
    let mut client = reqwest::Client::builder();
    if let Some(timeout) = config.request_timeout {
        client = client.timeout(timeout);
    }

    Ok(EcbRateProvider::with_feed_url(config.feed_url.clone()).with_client(client.build()?))
}

/// Fetch rates once for this session. A failed fetch leaves the form
/// unavailable rather than aborting.
async fn load_rates(config: &CliConfig) -> anyhow::Result<Option<RateTable>> {
    let provider = build_provider(config)?;
    match provider.fetch_rates().await {
        Ok(table) => {
            info!(provider = provider.name(), currencies = table.len(), "Exchange rates loaded");
            Ok(Some(table))
        }
        Err(e) => {
            error!(provider = provider.name(), error = %e, "Failed to load exchange rates");
            Ok(None)
        }
    }
}

fn fail_with_currencies(message: &str, currencies: &[&Currency]) -> ! {
    let codes: Vec<&str> = currencies.iter().map(|c| c.code()).collect();
    eprintln!("{}", message);
    eprintln!("Available currencies: {}", codes.join(", "));
    std::process::exit(1)
}

fn fail(message: &str) -> ! {
    eprintln!("{}", message);
    std::process::exit(1)
}

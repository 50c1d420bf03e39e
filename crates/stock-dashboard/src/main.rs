//! stock-dashboard: price history, return statistics, annual statements and
//! news for one ticker, printed as a JSON report for the presentation layer.
//!
//! Usage:
//!   cargo run -p stock-dashboard -- --ticker AAPL
//!   cargo run -p stock-dashboard -- --ticker MSFT --start 2024-01-02 --end 2024-02-01

use stock_dashboard::{usage, CliArgs, Dashboard, DashboardConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stock_dashboard=info,market_data=warn".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match CliArgs::parse(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{}\n\n{}", e, usage());
            std::process::exit(2);
        }
    };
    if cli.help {
        println!("{}", usage());
        return Ok(());
    }

    let mut config = DashboardConfig::from_env()?;
    config.apply_args(&cli);
    config.validate()?;

    let dashboard = Dashboard::from_config(&config)?;
    let report = dashboard.build(&config.request()).await;

    let output = if cli.compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{}", output);

    Ok(())
}

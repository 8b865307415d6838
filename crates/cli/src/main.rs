use clap::{Parser, Subcommand};

use flex_pnl_core::record::{AssetCategory, TradeRecord};
use flex_pnl_core::FlexConfig;
use flex_pnl_report::{daily_pnl, premium_capture, ReportFilter, TradeMetrics};

#[derive(Parser)]
#[command(name = "flex-pnl")]
#[command(about = "Realized-PnL reporting over Flex trade statements", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the statement, reconcile it, and print the PnL report
    Report {
        /// Restrict to asset categories (e.g. OPT, STK); repeatable
        #[arg(long = "category")]
        categories: Vec<String>,
        /// Restrict to underlying symbols; repeatable
        #[arg(long = "symbol")]
        symbols: Vec<String>,
    },
    /// Fetch the statement, reconcile it, and write the table to CSV
    Export {
        /// Output CSV file path
        #[arg(short, long)]
        output: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Report {
            categories,
            symbols,
        } => run_report(&categories, &symbols).await?,
        Commands::Export { output } => run_export(&output).await?,
    }

    Ok(())
}

/// Fetch the raw statement and run it through the reconciliation pipeline.
async fn fetch_reconciled() -> anyhow::Result<Vec<TradeRecord>> {
    let config = FlexConfig::from_env()?;
    let client = flex_pnl_client::FlexClient::new(config)?;
    let raw = client.fetch_trades().await?;

    let today = chrono::Utc::now().date_naive();
    Ok(flex_pnl_engine::reconcile(raw, today))
}

async fn run_report(categories: &[String], symbols: &[String]) -> anyhow::Result<()> {
    let table = fetch_reconciled().await?;

    let mut filter = ReportFilter::default();
    if !categories.is_empty() {
        filter = filter.with_categories(
            categories
                .iter()
                .map(|c| AssetCategory::from_code(&c.to_uppercase())),
        );
    }
    if !symbols.is_empty() {
        filter = filter.with_symbols(symbols.iter().map(|s| s.to_uppercase()));
    }

    let rows = filter.apply(&table);
    if rows.is_empty() {
        println!("No reconciled trades match the selected filters.");
        return Ok(());
    }

    print_report(&rows);
    Ok(())
}

fn print_report(rows: &[TradeRecord]) {
    let metrics = TradeMetrics::compute(rows);
    let capture = premium_capture(rows);
    let series = daily_pnl(rows);

    println!("\n{}", "=".repeat(60));
    println!("Daily Realized PnL");
    println!("{}", "=".repeat(60));
    println!("{:<12} {:>15} {:>15}", "Date", "PnL", "Cumulative");
    println!("{}", "-".repeat(60));
    for day in &series {
        println!(
            "{:<12} {:>15} {:>15}",
            day.date.format("%Y-%m-%d"),
            day.pnl,
            day.cumulative
        );
    }

    println!("{}", "=".repeat(60));
    println!(
        "Positions: {}   Wins: {}   Losses: {}   Win rate: {:.1}%",
        metrics.total_positions, metrics.wins, metrics.losses, metrics.win_rate_pct
    );
    println!(
        "Avg/trade: {}   Avg winner: {}   Avg loser: {}",
        metrics.avg_per_trade.round_dp(2),
        metrics.avg_winner.round_dp(2),
        metrics.avg_loser.round_dp(2)
    );
    println!(
        "Max winner: {}   Max loser: {}",
        metrics.max_winner, metrics.max_loser
    );
    println!(
        "Premium sold: {}   Premium captured: {}   PCR: {}%",
        capture.premium_sold, capture.premium_captured, capture.capture_rate_pct
    );
    println!();
}

async fn run_export(output: &str) -> anyhow::Result<()> {
    let table = fetch_reconciled().await?;
    write_csv(output, &table)?;
    tracing::info!(rows = table.len(), path = output, "Wrote reconciled table");
    Ok(())
}

const CSV_HEADER: [&str; 19] = [
    "description",
    "assetCategory",
    "underlyingSymbol",
    "putCall",
    "buySell",
    "strike",
    "expiry",
    "tradeDate",
    "dateTime",
    "settleDateTarget",
    "openCloseIndicator",
    "notes",
    "ibCommission",
    "cost",
    "fifoPnlRealized",
    "mtmPnl",
    "opendateTime",
    "PnLRealized",
    "optionStrategy",
];

fn write_csv(path: &str, records: &[TradeRecord]) -> anyhow::Result<()> {
    use anyhow::Context;

    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create CSV file: {path}"))?;
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.write_record(csv_row(record))?;
    }
    writer.flush()?;
    Ok(())
}

fn csv_row(record: &TradeRecord) -> Vec<String> {
    let opt_str = |value: Option<String>| value.unwrap_or_default();
    vec![
        record.description.clone(),
        record.asset_category.to_string(),
        record.underlying_symbol.clone(),
        opt_str(record.put_call.map(|p| p.to_string())),
        record.buy_sell.to_string(),
        opt_str(record.strike.map(|s| s.to_string())),
        opt_str(record.expiry.map(|e| e.to_string())),
        record.trade_date.to_string(),
        record.date_time.format("%Y-%m-%d %H:%M:%S").to_string(),
        record.settle_date_target.to_string(),
        record.open_close.to_string(),
        record.notes.clone().unwrap_or_default(),
        record.ib_commission.to_string(),
        record.cost.to_string(),
        record.fifo_pnl_realized.to_string(),
        record.mtm_pnl.to_string(),
        opt_str(
            record
                .open_date_time
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        ),
        opt_str(record.pnl_realized.map(|p| p.to_string())),
        opt_str(record.option_strategy.map(|s| s.to_string())),
    ]
}

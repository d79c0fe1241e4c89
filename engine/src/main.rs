// Command line front end: load bars, run the signal service once, print the
// dashboard metrics.
use anyhow::{bail, Context, Result};
use clap::Parser;
use engine::config::EngineSettings;
use engine::data::CsvPriceProvider;
use engine::services::{Analysis, Outcome, SignalService};
use engine::EngineError;
use shared::models::{IndicatorRow, Signal, TimeFrame};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Exit code for expected data problems the user can fix by picking
/// another symbol, interval or file.
const EXIT_NO_SIGNAL: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "crypto-signal", about = "BUY/SELL/HOLD signals from RSI and MACD")]
struct Cli {
    /// CSV file with a timestamp column and a close column
    #[arg(long)]
    csv: PathBuf,

    /// Symbol to select when the file has a symbol column
    #[arg(short, long, default_value = "BTC-USD")]
    symbol: String,

    /// Bar interval: 1h, 4h or 1d
    #[arg(short, long, default_value = "1h")]
    interval: TimeFrame,

    /// JSON settings file (indicator periods, thresholds)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Field delimiter of the CSV file
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Report too few bars as an error instead of an empty result
    #[arg(long)]
    strict: bool,

    #[arg(long)]
    overbought: Option<f64>,

    #[arg(long)]
    oversold: Option<f64>,

    /// Print the last N aligned Close/RSI rows
    #[arg(long, default_value_t = 0)]
    history: usize,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(cli: &Cli) -> Result<EngineSettings> {
    let mut settings = match &cli.config {
        Some(path) => EngineSettings::load_from_file(path)
            .with_context(|| format!("loading settings from '{}'", path.display()))?,
        None => EngineSettings::default(),
    };
    if cli.strict {
        settings.indicators.strict = true;
    }
    if let Some(overbought) = cli.overbought {
        settings.thresholds.overbought = overbought;
    }
    if let Some(oversold) = cli.oversold {
        settings.thresholds.oversold = oversold;
    }
    settings.validate()?;
    Ok(settings)
}

fn run(cli: &Cli) -> Result<ExitCode> {
    info!(
        symbol = %cli.symbol,
        interval = %cli.interval,
        csv = %cli.csv.display(),
        "Starting signal run"
    );

    let settings = load_settings(cli)?;
    let service = SignalService::from_settings(&settings)?;

    if !cli.delimiter.is_ascii() {
        bail!("delimiter must be a single ASCII character, got '{}'", cli.delimiter);
    }
    let provider = CsvPriceProvider::new(&cli.csv).with_delimiter(cli.delimiter as u8);

    match service.analyze_symbol(&provider, &cli.symbol, cli.interval) {
        Ok(analysis) => Ok(print_analysis(cli, &analysis)),
        Err(EngineError::InvalidSeries(reason)) => {
            tracing::warn!(%reason, "Unusable price series");
            println!("Close prices are missing or all NaN.");
            Ok(ExitCode::from(EXIT_NO_SIGNAL))
        }
        Err(EngineError::InsufficientData { required, available }) => {
            tracing::warn!(required, available, "Not enough bars for indicators");
            println!("Not enough data after indicator calculation.");
            Ok(ExitCode::from(EXIT_NO_SIGNAL))
        }
        Err(e) => Err(e).context("computing signal"),
    }
}

fn print_analysis(cli: &Cli, analysis: &Analysis) -> ExitCode {
    let trade_signal = match &analysis.outcome {
        Outcome::Signal(signal) => signal,
        Outcome::InsufficientData { required, available } => {
            tracing::warn!(required, available, "Not enough bars for indicators");
            println!("Not enough data after indicator calculation.");
            return ExitCode::from(EXIT_NO_SIGNAL);
        }
    };

    let row = &trade_signal.row;
    println!("Current Signal for {} ({})", cli.symbol, cli.interval);
    println!("{:<12} ${:.2}", "Price", row.close);
    println!("{:<12} {:.2}", "RSI", row.rsi);
    println!("{:<12} {:.2}", "MACD", row.macd);
    println!("{:<12} {:.2}", "Signal Line", row.signal_line);
    println!("{}", signal_label(trade_signal.signal));

    if cli.history > 0 {
        print_history(&analysis.rows, cli.history);
    }
    ExitCode::SUCCESS
}

fn print_history(rows: &[IndicatorRow], count: usize) {
    println!();
    println!("{:<25} {:>14} {:>8}", "Timestamp", "Close", "RSI");
    let start = rows.len().saturating_sub(count);
    for row in &rows[start..] {
        println!(
            "{:<25} {:>14.2} {:>8.2}",
            row.timestamp.format("%Y-%m-%d %H:%M:%S"),
            row.close,
            row.rsi
        );
    }
}

fn signal_label(signal: Signal) -> &'static str {
    match signal {
        Signal::Buy => "BUY (LONG)",
        Signal::Sell => "SELL (SHORT)",
        Signal::Hold => "HOLD",
    }
}

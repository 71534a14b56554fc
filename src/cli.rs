//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig};
use crate::domain::config_validation::{
    parse_time, validate_backtest_config, validate_backtest_with_asset, validate_strategy_config,
    validate_venue_config,
};
use crate::domain::engine::{DecisionReason, SignalEngine};
use crate::domain::error::BandTraderError;
use crate::domain::execution::ExecutionConfig;
use crate::domain::frequency::Frequency;
use crate::domain::metrics::Metrics;
use crate::domain::strategy::{StrategyConfig, VenueLimits};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(name = "bandtrader", about = "Mean-reversion band backtester")]
pub struct Cli {
    /// Only log warnings and errors (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay stored bars through the strategy
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        asset: Option<String>,
    },
    /// Validate strategy and venue parameters
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List assets with stored bars at a frequency
    ListAssets {
        #[arg(long)]
        data_dir: PathBuf,
        #[arg(long, default_value = "1d")]
        frequency: String,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(cli.quiet);
    match cli.command {
        Command::Backtest {
            config,
            data_dir,
            asset,
        } => run_backtest(&config, data_dir.as_deref(), asset.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::ListAssets {
            data_dir,
            frequency,
        } => run_list_assets(&data_dir, &frequency),
    }
}

/// Install the stderr `fmt` subscriber. `RUST_LOG` takes precedence.
pub fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_strategy_config(adapter: &dyn ConfigPort) -> Result<StrategyConfig, BandTraderError> {
    let defaults = StrategyConfig::default();
    let window_size = adapter.get_int("strategy", "window_size", defaults.window_size as i64);
    let window_size = usize::try_from(window_size).map_err(|_| BandTraderError::ConfigInvalid {
        section: "strategy".into(),
        key: "window_size".into(),
        reason: "window_size must be at least 1".into(),
    })?;

    let config = StrategyConfig {
        window_size,
        buy_threshold: adapter.get_double("strategy", "buy_threshold", defaults.buy_threshold),
        sell_threshold: adapter.get_double("strategy", "sell_threshold", defaults.sell_threshold),
        stop_loss_ratio: adapter.get_double(
            "strategy",
            "stop_loss_ratio",
            defaults.stop_loss_ratio,
        ),
    };
    config.validate()?;
    Ok(config)
}

pub fn build_venue_limits(adapter: &dyn ConfigPort) -> Result<VenueLimits, BandTraderError> {
    let defaults = VenueLimits::default();
    let venue = VenueLimits {
        min_order_quantity: adapter.get_double(
            "venue",
            "min_order_quantity",
            defaults.min_order_quantity,
        ),
        min_order_cash: adapter.get_double("venue", "min_order_cash", defaults.min_order_cash),
    };
    venue.validate()?;
    Ok(venue)
}

pub fn build_backtest_config(
    adapter: &dyn ConfigPort,
    asset_override: Option<&str>,
) -> Result<BacktestConfig, BandTraderError> {
    let asset = match asset_override {
        Some(a) => a.trim().to_string(),
        None => adapter
            .get_string("backtest", "asset")
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .ok_or_else(|| BandTraderError::ConfigMissing {
                section: "backtest".into(),
                key: "asset".into(),
            })?,
    };

    let frequency = match adapter.get_string("backtest", "frequency") {
        Some(raw) => raw
            .parse::<Frequency>()
            .map_err(|reason| BandTraderError::ConfigInvalid {
                section: "backtest".into(),
                key: "frequency".into(),
                reason,
            })?,
        None => Frequency::default(),
    };

    let start_time = parse_time(
        adapter.get_string("backtest", "start_time").as_deref(),
        "start_time",
    )?;
    let end_time = parse_time(
        adapter.get_string("backtest", "end_time").as_deref(),
        "end_time",
    )?;

    let defaults = ExecutionConfig::default();
    Ok(BacktestConfig {
        asset,
        frequency,
        start_time,
        end_time,
        initial_cash: adapter.get_double("backtest", "initial_cash", 100_000.0),
        initial_position: adapter.get_double("backtest", "initial_position", 0.0),
        execution: ExecutionConfig {
            commission: adapter.get_double("backtest", "commission", defaults.commission),
            slippage: adapter.get_double("backtest", "slippage", defaults.slippage),
        },
    })
}

pub fn build_engine(adapter: &dyn ConfigPort) -> Result<SignalEngine, BandTraderError> {
    let strategy = build_strategy_config(adapter)?;
    let venue = build_venue_limits(adapter)?;
    Ok(SignalEngine::new(strategy, venue)?)
}

pub fn resolve_data_dir(
    override_dir: Option<&Path>,
    config: &dyn ConfigPort,
) -> Result<PathBuf, BandTraderError> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }
    config
        .get_string("backtest", "data_dir")
        .filter(|d| !d.trim().is_empty())
        .map(|d| PathBuf::from(d.trim()))
        .ok_or_else(|| BandTraderError::ConfigMissing {
            section: "backtest".into(),
            key: "data_dir".into(),
        })
}

fn validate_all(adapter: &dyn ConfigPort) -> Result<(), BandTraderError> {
    validate_strategy_config(adapter)?;
    validate_venue_config(adapter)?;
    Ok(())
}

fn run_backtest(config_path: &Path, data_dir: Option<&Path>, asset: Option<&str>) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Validate
    let validated =
        validate_all(&adapter).and_then(|()| validate_backtest_with_asset(&adapter, asset));
    if let Err(e) = validated {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 3: Build engine and backtest parameters
    let engine = match build_engine(&adapter) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let bt_config = match build_backtest_config(&adapter, asset) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 4: Resolve data source
    let dir = match resolve_data_dir(data_dir, &adapter) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let data_port = CsvAdapter::new(dir);

    run_backtest_pipeline(&data_port, engine, &bt_config)
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    mut engine: SignalEngine,
    bt_config: &BacktestConfig,
) -> ExitCode {
    // Stage 5: Fetch bars
    let bars = match data_port.fetch_bars(
        &bt_config.asset,
        bt_config.frequency,
        bt_config.start_time,
        bt_config.end_time,
    ) {
        Ok(bars) => bars,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if bars.is_empty() {
        let err = BandTraderError::NoData {
            asset: bt_config.asset.clone(),
            frequency: bt_config.frequency.to_string(),
        };
        eprintln!("error: {err}");
        return (&err).into();
    }

    eprintln!(
        "Running backtest: {} {} bars, {} to {}",
        bars.len(),
        bt_config.frequency,
        bt_config.start_time,
        bt_config.end_time,
    );

    // Stage 6: Replay
    let result = match backtest_engine::run_backtest(bars, &mut engine, bt_config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 7: Summary
    let metrics = Metrics::compute(&result.portfolio);

    eprintln!("\n=== Results ===");
    eprintln!("Asset:            {}", bt_config.asset);
    eprintln!("Bars:             {}", result.bars_processed);
    eprintln!("Initial Value:    {:.2}", metrics.initial_net_value);
    eprintln!("Final Value:      {:.2}", metrics.final_net_value);
    eprintln!("Total Return:     {:.2}%", metrics.total_return * 100.0);
    if let Some(benchmark) = result.benchmark_return {
        eprintln!("Buy & Hold:       {:.2}%", benchmark * 100.0);
    }
    eprintln!(
        "Max Drawdown:     -{:.1}% over {} bars",
        metrics.max_drawdown * 100.0,
        metrics.max_drawdown_duration
    );
    eprintln!("Buys / Sells:     {} / {}", metrics.buys, metrics.sells);
    eprintln!("Commission:       {:.2}", metrics.total_commission);
    if result.rejected_orders > 0 {
        eprintln!("Rejected Orders:  {}", result.rejected_orders);
    }
    match result.stop_loss_at {
        Some(ts) => eprintln!("Stop-Loss:        triggered at {ts}"),
        None => eprintln!("Stop-Loss:        not triggered"),
    }

    eprintln!("\n=== Decisions ===");
    for reason in DecisionReason::ALL {
        let count = result.decision_count(reason);
        if count > 0 {
            eprintln!("  {:<22} {}", reason.label(), count);
        }
    }

    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_all(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let engine = match build_engine(&adapter) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let strategy = engine.config();
    let venue = engine.venue();
    eprintln!("\nStrategy:");
    eprintln!("  window_size:        {}", strategy.window_size);
    eprintln!("  buy_threshold:      {}", strategy.buy_threshold);
    eprintln!("  sell_threshold:     {}", strategy.sell_threshold);
    eprintln!("  stop_loss_ratio:    {}", strategy.stop_loss_ratio);
    eprintln!("\nVenue:");
    eprintln!("  min_order_quantity: {}", venue.min_order_quantity);
    eprintln!("  min_order_cash:     {}", venue.min_order_cash);

    if adapter.get_string("backtest", "asset").is_some() {
        if let Err(e) = validate_backtest_config(&adapter) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        eprintln!("\nBacktest section is valid.");
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_list_assets(data_dir: &Path, frequency: &str) -> ExitCode {
    let frequency = match frequency.parse::<Frequency>() {
        Ok(f) => f,
        Err(reason) => {
            eprintln!("error: {reason}");
            return ExitCode::from(2);
        }
    };

    let adapter = CsvAdapter::new(data_dir.to_path_buf());
    let assets = match adapter.list_assets(frequency) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if assets.is_empty() {
        eprintln!("No {} data found in {}", frequency, data_dir.display());
    } else {
        for asset in &assets {
            println!("{}", asset);
        }
        eprintln!("{} assets found", assets.len());
    }
    ExitCode::SUCCESS
}

//! # aurum
//!
//! Command-line front end: runs the monthly gold analysis on a price file.

use aurum_forecast::benchmark::Benchmark;
use aurum_forecast::config::{ConfigOverrides, ExperimentConfig};
use aurum_forecast::core::MissingValuePolicy;
use aurum_forecast::diagnostics::{correlogram, prepare_stationary};
use aurum_forecast::io::{load_price_csv, quality_report, write_series_csv, LoadOptions};
use aurum_forecast::models::{HoltWinters, SARIMA};
use aurum_forecast::regimes::{realized_vol, rolling_stats, zscore_regimes};
use aurum_forecast::report::{
    render_decomposition_svg, render_regime_svg, render_svg, render_table, render_zscore_svg,
    ChartOptions,
};
use aurum_forecast::seasonality::STL;
use aurum_forecast::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aurum")]
#[command(about = "Gold price diagnostics and baseline forecast benchmarks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run diagnostics, regime flags and the SARIMA / Holt-Winters benchmark
    Analyze {
        /// Semicolon-separated price file
        csv: PathBuf,

        /// JSON experiment configuration; flags given on the command line win
        #[arg(long)]
        config: Option<PathBuf>,

        /// Price column to analyze [default: close]
        #[arg(long)]
        column: Option<String>,

        /// Held-out observations [default: 24]
        #[arg(long)]
        test_size: Option<usize>,

        /// Seasonal period [default: 12]
        #[arg(long)]
        period: Option<usize>,

        /// Largest ACF/PACF lag [default: 48]
        #[arg(long)]
        max_lag: Option<usize>,

        /// Rolling z-score window [default: 24]
        #[arg(long)]
        zscore_window: Option<usize>,

        /// Rolling z-score threshold [default: 1.0]
        #[arg(long)]
        zscore_threshold: Option<f64>,

        /// Directory for charts and the forecast export
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

fn resolve_config(path: Option<&Path>, overrides: ConfigOverrides) -> Result<ExperimentConfig> {
    let base = match path {
        Some(p) => ExperimentConfig::from_file(p)?,
        None => ExperimentConfig::default(),
    };
    base.apply(overrides)
}

fn analyze(csv: &Path, cfg: &ExperimentConfig, out_dir: Option<&Path>) -> Result<()> {
    let frame = load_price_csv(csv, &LoadOptions::default())?;
    println!("{}", quality_report(&frame));

    let series = frame
        .column(&cfg.column)?
        .sanitized(MissingValuePolicy::Drop)?;
    info!(column = %cfg.column, observations = series.len(), "series ready");

    if let Some(dir) = out_dir {
        std::fs::create_dir_all(dir)?;
    }

    // 1) Trend and seasonality diagnostics
    let stl = STL::new(cfg.period).robust().fit(&series)?;
    println!(
        "STL (period {}): trend strength {:.3}, seasonal strength {:.3}",
        cfg.period,
        stl.trend_strength(),
        stl.seasonal_strength()
    );
    let returns = prepare_stationary(&series, true, 1);
    let corr = correlogram(&returns, cfg.max_lag)?;
    println!(
        "log-diff correlogram (n={}, band ±{:.3}): significant ACF lags {:?}, PACF lags {:?}",
        corr.n,
        corr.band,
        corr.significant_acf_lags(),
        corr.significant_pacf_lags()
    );

    // 2) Regimes and volatility
    let stats = rolling_stats(&series, &cfg.rolling_windows)?;
    let vol = realized_vol(&series, cfg.vol_window)?;
    let regimes = zscore_regimes(&series, cfg.zscore_window, cfg.zscore_threshold)?;
    println!("Recent regime flags:");
    println!("{:<12} {:>12} {:>8} {:>5}", "date", "value", "zscore", "flag");
    for (ts, value, z, flag) in regimes.tail(5) {
        println!(
            "{:<12} {:>12.2} {:>8.3} {:>5}",
            ts.format("%Y-%m-%d"),
            value,
            z,
            flag
        );
    }

    // 3) Baselines
    let report = Benchmark::new(cfg.test_size)
        .with_producer(Box::new(SARIMA::new(cfg.sarima)))
        .with_producer(Box::new(HoltWinters::new(cfg.holt_winters)))
        .run(&series)?;
    for (label, metrics) in report.metrics() {
        println!("{}: {}", label, metrics);
    }
    print!("{}", render_table(report.comparison()));
    if let Some(best) = report.best_label() {
        println!("best by RMSE: {}", best);
    }

    if let Some(dir) = out_dir {
        let options = ChartOptions::default();
        render_decomposition_svg(
            &stl,
            dir.join("stl.svg"),
            &options.clone().with_title(format!(
                "Monthly gold {} STL ({}-period seasonality)",
                cfg.column, cfg.period
            )),
        )?;
        render_regime_svg(
            &stats,
            &vol,
            dir.join("regimes.svg"),
            &options
                .clone()
                .with_title("Regime and volatility overview")
                .with_size(1200, 1000),
        )?;
        render_zscore_svg(
            &regimes,
            dir.join("zscore.svg"),
            &options.clone().with_title("Rolling z-score regimes"),
        )?;
        let comparison = report.comparison();
        render_svg(
            comparison,
            dir.join("forecasts.svg"),
            &options.with_title("Monthly gold forecast benchmarks"),
        )?;

        let mut columns = vec![("actual", comparison.test())];
        for entry in comparison.entries() {
            columns.push((entry.label.as_str(), &entry.forecast));
        }
        write_series_csv(dir.join("forecasts.csv"), &columns)?;
        std::fs::write(dir.join("metrics.json"), comparison.metrics_json()?)?;
        info!(dir = %dir.display(), "outputs written");
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Analyze {
            csv,
            config,
            column,
            test_size,
            period,
            max_lag,
            zscore_window,
            zscore_threshold,
            out_dir,
        } => {
            let overrides = ConfigOverrides {
                column,
                test_size,
                period,
                max_lag,
                zscore_window,
                zscore_threshold,
            };
            resolve_config(config.as_deref(), overrides)
                .and_then(|cfg| analyze(&csv, &cfg, out_dir.as_deref()))
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(kind = ?e.kind(), "{}", e);
            ExitCode::FAILURE
        }
    }
}

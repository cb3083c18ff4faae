//! Monthly analysis on a price file: diagnostics, regimes and baselines.
//!
//! Run with: cargo run --example monthly_benchmark -- path/to/XAU_1Month_data.csv [out_dir]

use aurum_forecast::benchmark::Benchmark;
use aurum_forecast::diagnostics::{correlogram, prepare_stationary};
use aurum_forecast::io::{load_price_csv, LoadOptions};
use aurum_forecast::models::{HoltWinters, HoltWintersConfig, SARIMAConfig, SARIMA};
use aurum_forecast::regimes::zscore_regimes;
use aurum_forecast::report::{render_svg, render_table, ChartOptions};
use aurum_forecast::seasonality::STL;
use std::path::PathBuf;

fn main() -> aurum_forecast::Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: monthly_benchmark <prices.csv> [out_dir]");
        std::process::exit(2);
    };
    let out_dir = args.next().map(PathBuf::from);

    let close = load_price_csv(&path, &LoadOptions::default())?.close()?;
    println!("Loaded {} monthly closes", close.len());

    // 1) Trend/seasonality diagnostics
    let stl = STL::new(12).robust().fit(&close)?;
    println!(
        "STL strengths: trend {:.3}, seasonal {:.3}",
        stl.trend_strength(),
        stl.seasonal_strength()
    );
    let log_diff = prepare_stationary(&close, true, 1);
    let corr = correlogram(&log_diff, 48)?;
    println!("Significant ACF lags of log returns: {:?}", corr.significant_acf_lags());

    // 2) Regimes
    let regimes = zscore_regimes(&close, 24, 1.0)?;
    println!("Recent regime flags:");
    for (ts, value, z, flag) in regimes.tail(5) {
        println!("  {}  {:>10.2}  z={:>7.3}  flag={}", ts.date_naive(), value, z, flag);
    }

    // 3) Baselines and benchmarking
    let report = Benchmark::new(24)
        .with_producer(Box::new(SARIMA::new(SARIMAConfig::new(
            (1, 1, 1),
            (0, 1, 1, 12),
        ))))
        .with_producer(Box::new(HoltWinters::new(HoltWintersConfig::default())))
        .run(&close)?;

    print!("\n{}", render_table(report.comparison()));

    if let Some(dir) = out_dir {
        std::fs::create_dir_all(&dir)?;
        let options = ChartOptions::default().with_title("Monthly gold forecast benchmarks");
        render_svg(report.comparison(), dir.join("forecasts.svg"), &options)?;
        println!("Chart written to {}", dir.join("forecasts.svg").display());
    }

    Ok(())
}

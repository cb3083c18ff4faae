//! Quickstart example demonstrating basic usage of aurum-forecast.
//!
//! Run with: cargo run --example quickstart

use aurum_forecast::core::TimeSeries;
use aurum_forecast::models::{Forecaster, HoltWinters, HoltWintersConfig, SARIMAConfig, SARIMA};
use aurum_forecast::utils::{evaluate, time_split};
use chrono::{Months, TimeZone, Utc};

fn main() {
    println!("=== aurum-forecast Quickstart ===\n");

    // 1. Create ten years of monthly data
    let base = Utc.with_ymd_and_hms(2014, 1, 1, 0, 0, 0).unwrap();
    let timestamps: Vec<_> = (0..120u32).map(|i| base + Months::new(i)).collect();

    let values: Vec<f64> = (0..120)
        .map(|i| {
            let t = i as f64;
            1250.0                                                  // base level
            + 4.0 * t                                               // linear trend
            + 30.0 * (2.0 * std::f64::consts::PI * t / 12.0).sin()  // yearly cycle
            + 6.0 * (t * 0.7).cos()                                 // wiggle
        })
        .collect();

    let ts = TimeSeries::new(timestamps, values).unwrap().with_name("close");
    println!("Created time series with {} observations", ts.len());

    // 2. Hold out the last two years
    let split = time_split(&ts, 24).unwrap();
    println!(
        "Train: {} observations, test: {} observations",
        split.train.len(),
        split.test.len()
    );

    // 3. Fit SARIMA(1,1,1)(0,1,1)[12]
    println!("\n--- Fitting SARIMA ---");
    let mut sarima = SARIMA::new(SARIMAConfig::new((1, 1, 1), (0, 1, 1, 12)));
    sarima.fit(&split.train).unwrap();
    println!("Model: {}", sarima.config_label());
    if let Some(coef) = sarima.coefficients() {
        println!("AR: {:?}  MA: {:?}  SMA: {:?}", coef.ar, coef.ma, coef.seasonal_ma);
    }
    if let (Some(aic), Some(bic)) = (sarima.aic(), sarima.bic()) {
        println!("AIC: {:.2}  BIC: {:.2}", aic, bic);
    }

    // 4. Fit additive Holt-Winters
    println!("\n--- Fitting Holt-Winters ---");
    let mut hw = HoltWinters::new(HoltWintersConfig::default());
    hw.fit(&split.train).unwrap();
    println!("Model: {}", hw.config_label());
    if let Some(s) = hw.smoothing() {
        println!(
            "alpha={:.4} beta={:.4} gamma={:.4}",
            s.alpha, s.beta, s.gamma
        );
    }

    // 5. Forecast the held-out window and score it
    println!("\n--- Holdout accuracy ---");
    let models: [&dyn Forecaster; 2] = [&sarima, &hw];
    for model in models {
        let forecast = model.predict(split.horizon()).unwrap();
        let result = forecast.aligned_to(&split.test).unwrap();
        let metrics = evaluate(&split.test, &result).unwrap();
        println!("{:<14} {}", model.name(), metrics);
    }

    println!("\n=== Quickstart Complete ===");
}

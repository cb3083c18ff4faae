//! End-to-end scenarios of the holdout benchmark on synthetic monthly data.

use aurum_forecast::benchmark::Benchmark;
use aurum_forecast::config::{ConfigOverrides, ExperimentConfig};
use aurum_forecast::core::TimeSeries;
use aurum_forecast::error::{ErrorKind, ForecastError};
use aurum_forecast::models::{
    ForecastProducer, HoltWinters, HoltWintersConfig, SARIMAConfig, SARIMA,
};
use aurum_forecast::report::render_table;
use aurum_forecast::utils::{evaluate, time_split};
use chrono::{Months, TimeZone, Utc};

/// `100 + 0.5 t + 10 sin(2πt/12)` sampled monthly.
fn trend_plus_season(n: usize) -> TimeSeries {
    let base = Utc.with_ymd_and_hms(2000, 1, 31, 0, 0, 0).unwrap();
    let timestamps: Vec<_> = (0..n as u32).map(|i| base + Months::new(i)).collect();
    let values = (0..n)
        .map(|t| {
            let t = t as f64;
            100.0 + 0.5 * t + 10.0 * (2.0 * std::f64::consts::PI * t / 12.0).sin()
        })
        .collect();
    TimeSeries::new(timestamps, values).unwrap()
}

#[test]
fn both_producers_track_a_noiseless_seasonal_trend() {
    let series = trend_plus_season(72);
    let split = time_split(&series, 12).unwrap();
    assert_eq!(split.train.len(), 60);

    let producers: Vec<Box<dyn ForecastProducer>> = vec![
        Box::new(SARIMA::new(SARIMAConfig::new((1, 1, 1), (0, 1, 1, 12)))),
        Box::new(HoltWinters::new(HoltWintersConfig::default())),
    ];
    for producer in &producers {
        let forecast = producer.fit_forecast(&split.train, 12).unwrap();
        let result = forecast.aligned_to(&split.test).unwrap();
        let metrics = evaluate(&split.test, &result).unwrap();
        assert!(
            metrics.mae < 1.0,
            "{} MAE {} too large",
            producer.label(),
            metrics.mae
        );
        assert!(metrics.rmse >= metrics.mae - 1e-12);
    }
}

#[test]
fn benchmark_runs_the_monthly_pipeline() {
    let series = trend_plus_season(120);
    let report = Benchmark::new(24)
        .with_producer(Box::new(SARIMA::new(SARIMAConfig::default())))
        .with_producer(Box::new(HoltWinters::new(HoltWintersConfig::default())))
        .run(&series)
        .unwrap();

    let comparison = report.comparison();
    assert_eq!(comparison.train().len(), 96);
    assert_eq!(comparison.test().len(), 24);
    assert_eq!(comparison.len(), 2);
    for (label, metrics) in report.metrics() {
        assert!(metrics.mae < 1.0, "{}: {}", label, metrics);
        assert_eq!(
            comparison.get(label).unwrap().forecast.timestamps(),
            comparison.test().timestamps()
        );
    }
    assert!(report.best_label().is_some());

    let table = render_table(comparison);
    assert!(table.contains("SARIMA"));
    assert!(table.contains("Holt-Winters"));
}

#[test]
fn benchmark_compares_two_orders_of_the_same_model() {
    let series = trend_plus_season(120);
    let report = Benchmark::new(24)
        .with_producer(Box::new(SARIMA::new(SARIMAConfig::new((1, 1, 1), (0, 1, 1, 12)))))
        .with_producer(Box::new(SARIMA::new(SARIMAConfig::new((0, 1, 1), (0, 1, 1, 12)))))
        .with_producer(Box::new(HoltWinters::new(HoltWintersConfig::default())))
        .run(&series)
        .unwrap();

    let labels: Vec<&str> = report.metrics().iter().map(|(label, _)| *label).collect();
    assert_eq!(
        labels,
        vec![
            "SARIMA(1,1,1)(0,1,1)[12]",
            "SARIMA(0,1,1)(0,1,1)[12]",
            "Holt-Winters(add,add,12)",
        ]
    );
    assert!(report.metrics_for("SARIMA(0,1,1)(0,1,1)[12]").is_some());
}

#[test]
fn quarterly_period_flows_into_both_models() {
    let base = Utc.with_ymd_and_hms(2010, 3, 31, 0, 0, 0).unwrap();
    let timestamps: Vec<_> = (0..36u32).map(|i| base + Months::new(3 * i)).collect();
    let values = (0..36)
        .map(|t| {
            let t = t as f64;
            200.0 + 2.0 * t + 8.0 * (2.0 * std::f64::consts::PI * t / 4.0).sin()
        })
        .collect();
    let series = TimeSeries::new(timestamps, values).unwrap();

    let cfg = ExperimentConfig::default()
        .apply(ConfigOverrides {
            period: Some(4),
            test_size: Some(8),
            ..Default::default()
        })
        .unwrap();
    let report = Benchmark::new(cfg.test_size)
        .with_producer(Box::new(SARIMA::new(cfg.sarima)))
        .with_producer(Box::new(HoltWinters::new(cfg.holt_winters)))
        .run(&series)
        .unwrap();

    let labels: Vec<&str> = report.metrics().iter().map(|(label, _)| *label).collect();
    assert_eq!(labels, vec!["SARIMA(1,1,1)(0,1,1)[4]", "Holt-Winters(add,add,4)"]);
    assert_eq!(report.comparison().train().len(), 28);
}

#[test]
fn split_of_hundred_points() {
    let series = trend_plus_season(100);
    let split = time_split(&series, 24).unwrap();
    assert_eq!(split.train.len(), 76);
    assert_eq!(split.test.len(), 24);
    assert_eq!(split.test.values(), &series.values()[76..]);
}

#[test]
fn test_window_as_long_as_the_series_is_rejected() {
    let series = trend_plus_season(24);
    let err = time_split(&series, 24).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);

    let err = Benchmark::new(24)
        .with_producer(Box::new(HoltWinters::new(HoltWintersConfig::default())))
        .run(&series)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
}

#[test]
fn short_training_window_is_a_model_fit_error() {
    // 30 train points cannot support SARIMA(1,1,1)(0,1,1)[12].
    let series = trend_plus_season(42);
    let err = Benchmark::new(12)
        .with_producer(Box::new(SARIMA::new(SARIMAConfig::default())))
        .run(&series)
        .unwrap_err();
    assert!(matches!(err, ForecastError::InsufficientData { needed: 40, got: 30 }));
    assert_eq!(err.kind(), ErrorKind::ModelFit);
}

#[test]
fn forecast_for_a_different_window_is_misaligned() {
    let series = trend_plus_season(72);
    let split = time_split(&series, 12).unwrap();
    let forecast = HoltWinters::new(HoltWintersConfig::default())
        .fit_forecast(&split.train, 12)
        .unwrap();

    let wrong = split.test.slice(0, 6).unwrap();
    let err = forecast.aligned_to(&wrong).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Alignment);

    let result = forecast.aligned_to(&split.test).unwrap();
    let earlier = series.slice(48, 60).unwrap();
    let err = evaluate(&earlier, &result).unwrap_err();
    assert!(matches!(err, ForecastError::IndexMismatch { position: 0 }));
}

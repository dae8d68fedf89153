mod common;

use approx::assert_abs_diff_eq;
use chrono::Duration;
use common::{constant_series, daily_series, wavy_series, FixedModel, MeanModel};
use market_forecast::pipeline::MIN_TRAINING_POINTS;
use market_forecast::{
    AccuracyTier, ForecastError, ForecastPipeline, Hyperparameters, PriceSeries, SeasonalityMode,
    TrendSeasonalModel,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn hyperparams() -> Hyperparameters {
    Hyperparameters::default()
}

#[test]
fn test_forecast_length_and_ordering() {
    let series = wavy_series(120);
    let pipeline = ForecastPipeline::new(MeanModel::default());

    let forecast = pipeline.run_forecast(&series, 45, &hyperparams()).unwrap();

    assert_eq!(forecast.len(), 120 + 45);
    assert_eq!(forecast.horizon(), 45);
    assert_eq!(forecast.history().len(), 120);

    let history_dates: Vec<_> = forecast.history().iter().map(|p| p.timestamp).collect();
    assert_eq!(history_dates, series.timestamps());

    let last = series.last().unwrap().timestamp;
    for (i, point) in forecast.future().iter().enumerate() {
        assert_eq!(point.timestamp, last + Duration::days(i as i64 + 1));
    }
    assert!(forecast
        .points()
        .windows(2)
        .all(|w| w[0].timestamp < w[1].timestamp));
}

#[test]
fn test_empty_series_fails_before_fitting() {
    let model = MeanModel::default();
    let pipeline = ForecastPipeline::new(model);

    let result = pipeline.run_forecast(&PriceSeries::empty("NONE"), 30, &hyperparams());

    assert!(matches!(result, Err(ForecastError::InsufficientData(_))));
    assert_eq!(pipeline.model().fits.get(), 0);
}

#[test]
fn test_single_point_fails_before_fitting() {
    let pipeline = ForecastPipeline::new(MeanModel::default());

    let result = pipeline.run_forecast(&daily_series("ONE", &[100.0]), 30, &hyperparams());

    assert!(matches!(result, Err(ForecastError::InsufficientData(_))));
    assert_eq!(pipeline.model().fits.get(), 0);
}

#[test]
fn test_non_finite_close_fails_before_fitting() {
    let pipeline = ForecastPipeline::new(MeanModel::default());
    let series = daily_series("NAN", &[100.0, f64::NAN, 101.0]);

    let result = pipeline.run_forecast(&series, 30, &hyperparams());

    assert!(matches!(result, Err(ForecastError::InsufficientData(_))));
    assert_eq!(pipeline.model().fits.get(), 0);
}

#[test]
fn test_zero_horizon_rejected() {
    let pipeline = ForecastPipeline::new(MeanModel::default());
    let series = wavy_series(60);

    assert!(matches!(
        pipeline.run_forecast(&series, 0, &hyperparams()),
        Err(ForecastError::InvalidParameter(_))
    ));
    assert!(matches!(
        pipeline.run_backtest(&series, 0, &hyperparams()),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[rstest]
#[case(29, false)]
#[case(30, true)]
#[case(31, true)]
fn test_training_window_floor(#[case] training_len: usize, #[case] succeeds: bool) {
    let horizon = 30;
    let series = wavy_series(training_len + horizon);
    let pipeline = ForecastPipeline::new(MeanModel::default());

    let result = pipeline.run_backtest(&series, horizon, &hyperparams());

    if succeeds {
        let report = result.unwrap();
        assert_eq!(report.split_index, training_len);
        assert_eq!(report.aligned.len(), horizon);
    } else {
        match result {
            Err(ForecastError::InsufficientTrainingData {
                required,
                available,
            }) => {
                assert_eq!(required, MIN_TRAINING_POINTS);
                assert_eq!(available, training_len);
            }
            other => panic!("expected InsufficientTrainingData, got {:?}", other),
        }
        assert_eq!(pipeline.model().fits.get(), 0);
    }
}

#[test]
fn test_horizon_longer_than_series() {
    let pipeline = ForecastPipeline::new(MeanModel::default());
    let result = pipeline.run_backtest(&wavy_series(20), 90, &hyperparams());

    assert!(matches!(
        result,
        Err(ForecastError::InsufficientTrainingData { available: 0, .. })
    ));
}

#[test]
fn test_backtest_scores_withheld_actuals() {
    // Training closes are all 100, test closes are 110 and 90
    let mut closes = vec![100.0; 30];
    closes.extend([110.0, 90.0]);
    let series = daily_series("SCORE", &closes);
    let pipeline = ForecastPipeline::new(MeanModel::default());

    let report = pipeline.run_backtest(&series, 2, &hyperparams()).unwrap();

    assert_abs_diff_eq!(report.mean_absolute_error, 10.0, epsilon = 1e-12);
    // (10/110 + 10/90) / 2 * 100
    let expected_mape = (10.0 / 110.0 + 10.0 / 90.0) / 2.0 * 100.0;
    assert_abs_diff_eq!(
        report.mean_absolute_percentage_error,
        expected_mape,
        epsilon = 1e-9
    );
    assert_eq!(report.tier, AccuracyTier::Poor);
    assert_eq!(report.forecast.history().len(), 30);
    assert_eq!(report.forecast.horizon(), 2);
}

#[test]
fn test_backtest_aligns_on_timestamps_only() {
    // Weekday-only bars: the calendar-day predictions skip over weekends
    let start = common::date(2024, 1, 1); // Monday
    let bars: Vec<_> = (0..120)
        .map(|i| start + Duration::days(i))
        .filter(|d| chrono::Datelike::weekday(d).number_from_monday() <= 5)
        .map(|d| market_forecast::Bar::new(d, 50.0, 51.0, 49.0, 50.0, 10))
        .collect();
    let series = PriceSeries::new("WEEKDAYS", bars).unwrap();
    let pipeline = ForecastPipeline::new(MeanModel::default());

    let report = pipeline.run_backtest(&series, 30, &hyperparams()).unwrap();

    // 30 withheld trading days span more than 30 calendar days, so some fall outside
    assert!(!report.aligned.is_empty());
    assert!(report.aligned.len() < 30);
    let withheld: Vec<_> = series.bars()[report.split_index..]
        .iter()
        .map(|b| b.timestamp)
        .collect();
    assert!(report.aligned.iter().all(|p| withheld.contains(&p.timestamp)));
}

#[test]
fn test_no_overlap() {
    // A gap longer than the horizon between training and test bars
    let mut bars: Vec<_> = daily_series("GAP", &vec![10.0; 35]).bars().to_vec();
    let last = bars.last().unwrap().timestamp;
    for (i, bar) in bars.iter_mut().rev().take(5).enumerate() {
        bar.timestamp = last + Duration::days(100 - i as i64);
    }
    let series = PriceSeries::new("GAP", bars).unwrap();
    let pipeline = ForecastPipeline::new(MeanModel::default());

    let result = pipeline.run_backtest(&series, 5, &hyperparams());

    assert!(matches!(result, Err(ForecastError::NoOverlap)));
}

#[test]
fn test_zero_actuals_fail_percentage_error() {
    let mut closes = vec![100.0; 40];
    closes.extend(vec![0.0; 5]);
    let series = daily_series("ZERO", &closes);
    let pipeline = ForecastPipeline::new(FixedModel(100.0));

    let result = pipeline.run_backtest(&series, 5, &hyperparams());

    match result {
        Err(ForecastError::DivisionByZero(day)) => {
            assert_eq!(day, series.bars()[40].timestamp);
        }
        other => panic!("expected DivisionByZero, got {:?}", other),
    }
}

#[test]
fn test_constant_price_scenario() {
    let series = constant_series(400, 100.0);
    let pipeline = ForecastPipeline::new(TrendSeasonalModel::new());
    let params = hyperparams();

    let forecast = pipeline.run_forecast(&series, 90, &params).unwrap();
    assert_eq!(forecast.len(), 490);
    for point in forecast.points() {
        assert_abs_diff_eq!(point.predicted, 100.0, epsilon = 1e-6);
    }

    let report = pipeline.run_backtest(&series, 90, &params).unwrap();
    assert_eq!(report.aligned.len(), 90);
    assert_abs_diff_eq!(report.mean_absolute_error, 0.0, epsilon = 1e-6);
    assert_eq!(report.tier, AccuracyTier::Excellent);
}

#[rstest]
#[case(SeasonalityMode::Additive)]
#[case(SeasonalityMode::Multiplicative)]
fn test_backtest_is_idempotent(#[case] mode: SeasonalityMode) {
    let series = wavy_series(300);
    let pipeline = ForecastPipeline::new(TrendSeasonalModel::new());
    let params = Hyperparameters::new(0.1, mode).unwrap();

    let first = pipeline.run_backtest(&series, 60, &params).unwrap();
    let second = pipeline.run_backtest(&series, 60, &params).unwrap();

    assert_eq!(first.mean_absolute_error, second.mean_absolute_error);
    assert_eq!(
        first.mean_absolute_percentage_error,
        second.mean_absolute_percentage_error
    );
    assert_eq!(first, second);
}

#[test]
fn test_trend_model_follows_drift() {
    let series = wavy_series(300);
    let pipeline = ForecastPipeline::new(TrendSeasonalModel::new());

    let report = pipeline.run_backtest(&series, 60, &hyperparams()).unwrap();

    // The series drifts 0.1/day with a +-2 wiggle around ~125; a fitted trend stays close
    assert!(report.mean_absolute_percentage_error < 5.0);
    assert_eq!(report.tier, AccuracyTier::Excellent);
}

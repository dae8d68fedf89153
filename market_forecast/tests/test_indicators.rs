mod common;

use approx::assert_abs_diff_eq;
use common::{daily_series, wavy_series};
use market_forecast::indicators::{SMA_FAST_WINDOW, SMA_SLOW_WINDOW};
use market_forecast::{compute_sma, ForecastError, PriceSeries};
use rstest::rstest;

#[rstest]
#[case(1)]
#[case(5)]
#[case(50)]
fn test_sma_matches_trailing_mean(#[case] window: usize) {
    let series = wavy_series(120);
    let closes = series.close_prices();

    let sma = compute_sma(&series, window).unwrap();

    assert_eq!(sma.len(), series.len());
    assert_eq!(sma.window(), window);
    for (i, point) in sma.points().iter().enumerate() {
        assert_eq!(point.timestamp, series.bars()[i].timestamp);
        if i + 1 < window {
            assert!(point.value.is_none());
        } else {
            let expected = closes[i + 1 - window..=i].iter().sum::<f64>() / window as f64;
            assert_abs_diff_eq!(point.value.unwrap(), expected, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_window_longer_than_series_is_all_undefined() {
    let series = daily_series("SHORT", &[1.0, 2.0, 3.0]);

    let sma = compute_sma(&series, SMA_SLOW_WINDOW).unwrap();

    assert_eq!(sma.values(), vec![None, None, None]);
    assert_eq!(sma.latest(), None);
}

#[test]
fn test_zero_window_rejected() {
    let series = daily_series("ANY", &[1.0, 2.0]);
    assert!(matches!(
        compute_sma(&series, 0),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn test_latest_fast_sma() {
    let closes: Vec<f64> = (1..=60).map(f64::from).collect();
    let series = daily_series("RAMP", &closes);

    let sma = compute_sma(&series, SMA_FAST_WINDOW).unwrap();

    // Mean of 11..=60
    assert_abs_diff_eq!(sma.latest().unwrap(), 35.5, epsilon = 1e-9);
}

#[test]
fn test_empty_series() {
    let sma = compute_sma(&PriceSeries::empty("NONE"), 3).unwrap();
    assert!(sma.is_empty());
}

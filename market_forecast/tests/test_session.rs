mod common;

use chrono::Duration;
use common::{date, wavy_series, ManualClock, MeanModel, StubProvider};
use market_forecast::cache::{SeriesCache, DEFAULT_TTL_SECS};
use market_forecast::dashboard::DashboardOutcome;
use market_forecast::session::{Command, Reply, Session};
use market_forecast::{DashboardConfig, ForecastError};
use rstest::rstest;

fn session(provider: &StubProvider) -> Session<&StubProvider, MeanModel, ManualClock> {
    let config = DashboardConfig {
        ticker_symbol: "WAVY".to_string(),
        forecast_horizon_days: 30,
        ..DashboardConfig::default()
    };
    let cache = SeriesCache::with_clock(Duration::seconds(DEFAULT_TTL_SECS), ManualClock::new());
    Session::new(config, provider, MeanModel::default(), cache)
}

#[test]
fn test_reruns_hit_the_cache() {
    let provider = StubProvider::new(wavy_series(100));
    let mut session = session(&provider);
    let today = date(2023, 6, 1);

    assert!(matches!(session.run(today).unwrap(), DashboardOutcome::Ready(_)));
    assert!(matches!(
        session.apply(Command::Run, today).unwrap(),
        Reply::Outcome(DashboardOutcome::Ready(_))
    ));
    assert_eq!(provider.calls.get(), 1);

    assert!(matches!(
        session.apply(Command::ClearCache, today).unwrap(),
        Reply::CacheCleared
    ));
    assert!(session.cache().is_empty());

    session.run(today).unwrap();
    assert_eq!(provider.calls.get(), 2);
}

#[test]
fn test_settings_change_reruns_pipeline() {
    let provider = StubProvider::new(wavy_series(100));
    let mut session = session(&provider);
    let today = date(2023, 6, 1);
    session.run(today).unwrap();

    // A new lookback window is a new cache key
    let command = Command::Set {
        field: "years".to_string(),
        value: "3".to_string(),
    };
    match session.apply(command, today).unwrap() {
        Reply::Outcome(DashboardOutcome::Ready(dashboard)) => {
            assert_eq!(dashboard.training_years, 3);
        }
        other => panic!("unexpected reply {:?}", other),
    }
    assert_eq!(provider.calls.get(), 2);
    assert_eq!(session.cache().len(), 2);
}

#[test]
fn test_unknown_ticker_reports_no_data() {
    let provider = StubProvider::new(wavy_series(100));
    let mut session = session(&provider);
    let today = date(2023, 6, 1);

    let reply = session
        .apply("set ticker nope".parse().unwrap(), today)
        .unwrap();

    match reply {
        Reply::Outcome(DashboardOutcome::NoData { warning }) => {
            assert!(warning.contains("'NOPE'"));
        }
        other => panic!("unexpected reply {:?}", other),
    }
    assert_eq!(session.config().ticker_symbol, "NOPE");
    assert!(session.cache().is_empty());
}

#[test]
fn test_rejected_setting_keeps_config() {
    let provider = StubProvider::new(wavy_series(100));
    let mut session = session(&provider);
    let before = session.config().clone();

    let result = session.apply("set horizon 10".parse().unwrap(), date(2023, 6, 1));

    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
    assert_eq!(session.config(), &before);
    assert_eq!(provider.calls.get(), 0);
}

#[test]
fn test_show_and_quit() {
    let provider = StubProvider::new(wavy_series(100));
    let mut session = session(&provider);
    let today = date(2023, 6, 1);

    match session.apply(Command::Show, today).unwrap() {
        Reply::Config(config) => assert_eq!(config.ticker_symbol, "WAVY"),
        other => panic!("unexpected reply {:?}", other),
    }
    assert!(matches!(session.apply(Command::Quit, today).unwrap(), Reply::Exit));
    assert_eq!(provider.calls.get(), 0);
}

#[rstest]
#[case("run", Command::Run)]
#[case("  SHOW ", Command::Show)]
#[case("clear", Command::ClearCache)]
#[case("clear-cache", Command::ClearCache)]
#[case("exit", Command::Quit)]
#[case("set Ticker eth-usd", Command::Set { field: "ticker".to_string(), value: "eth-usd".to_string() })]
fn test_command_parsing(#[case] line: &str, #[case] expected: Command) {
    assert_eq!(line.parse::<Command>().unwrap(), expected);
}

#[rstest]
#[case("")]
#[case("jump")]
#[case("set")]
#[case("set years")]
fn test_bad_commands_rejected(#[case] line: &str) {
    assert!(matches!(line.parse::<Command>(), Err(ForecastError::Config(_))));
}

use anyhow::{Context, Result};
use clap::Parser;
use market_forecast::cache::SeriesCache;
use market_forecast::cli::Cli;
use market_forecast::dashboard::DashboardOutcome;
use market_forecast::provider::CsvPriceProvider;
use market_forecast::session::{Command, Reply, Session};
use market_forecast::TrendSeasonalModel;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.resolve_config().context("Invalid settings")?;
    log::info!(
        "{}: {} years of history, {} day horizon, flexibility {}, {} seasonality",
        config.ticker_symbol,
        config.training_years,
        config.forecast_horizon_days,
        config.trend_flexibility,
        config.seasonality_mode
    );

    let provider = CsvPriceProvider::new(&cli.data_dir);
    let mut session = Session::new(
        config,
        provider,
        TrendSeasonalModel::new(),
        SeriesCache::default(),
    );

    let today = chrono::Local::now().date_naive();
    let outcome = session.run(today)?;
    report(&outcome, cli.json_out.as_deref())?;

    if cli.interactive {
        repl(&mut session, today, cli.json_out.as_deref())?;
    }

    Ok(())
}

fn repl(
    session: &mut Session<CsvPriceProvider, TrendSeasonalModel>,
    today: chrono::NaiveDate,
    json_out: Option<&Path>,
) -> Result<()> {
    let stdin = io::stdin();
    prompt()?;

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            prompt()?;
            continue;
        }

        let reply = line
            .parse::<Command>()
            .and_then(|command| session.apply(command, today));

        match reply {
            Ok(Reply::Outcome(outcome)) => report(&outcome, json_out)?,
            Ok(Reply::Config(config)) => print!("{}", config),
            Ok(Reply::CacheCleared) => println!("Cache cleared"),
            Ok(Reply::Exit) => break,
            Err(err) => eprintln!("error: {}", err),
        }
        prompt()?;
    }

    Ok(())
}

fn prompt() -> io::Result<()> {
    print!("> ");
    io::stdout().flush()
}

fn report(outcome: &DashboardOutcome, json_out: Option<&Path>) -> Result<()> {
    print!("{}", outcome);

    if let Some(path) = json_out {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, outcome)?;
        writer.flush()?;
        log::info!("Dashboard datasets written to {}", path.display());
    }

    Ok(())
}

use clap::Parser;
use sectorpick::cli::commands::{Cli, Commands};
use sectorpick::config::{Config, Thresholds};
use sectorpick::domain::values::day::Day;
use sectorpick::domain::values::stage::Stage;
use sectorpick::SectorPick;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let sp = match SectorPick::new(&config) {
        Ok(sp) => sp,
        Err(e) => {
            eprintln!("Error initializing sectorpick: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_command(sp, &config, cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(
    sp: SectorPick,
    config: &Config,
    cmd: Commands,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Fetch { account } => {
            let outcome = sp.fetch_account(&account).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::CatchUp { delay_ms } => {
            let delay = delay_ms
                .map(Duration::from_millis)
                .unwrap_or(config.catch_up_delay);
            let outcome = sp.catch_up(Day::today(), delay).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Run {
            stage,
            date,
            force,
            max_articles,
            min_mention,
            min_change,
            min_turnover,
            max_sectors,
        } => {
            let day = parse_day(&date)?;
            let base = &config.thresholds;
            let t = Thresholds {
                max_articles: max_articles.unwrap_or(base.max_articles),
                max_chars: base.max_chars,
                min_mention: min_mention.unwrap_or(base.min_mention),
                min_change: min_change.unwrap_or(base.min_change),
                min_turnover: min_turnover.unwrap_or(base.min_turnover),
                max_sectors: max_sectors.unwrap_or(base.max_sectors),
            };
            if stage.eq_ignore_ascii_case("all") {
                let results = sp.run_all(day, force, &t).await?;
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                let stage: Stage = stage.parse().map_err(|e: String| e)?;
                let result = sp.run_stage(day, stage, force, &t).await?;
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
        }
        Commands::Status { date } => {
            let run = sp.status(parse_day(&date)?)?;
            println!("{}", serde_json::to_string_pretty(&run)?);
        }
        Commands::Articles { date, limit } => {
            let articles = sp.list_articles(parse_day(&date)?, limit)?;
            println!("{}", serde_json::to_string_pretty(&articles)?);
        }
        Commands::Topics { date } => {
            let topics = sp.list_topics(parse_day(&date)?)?;
            println!("{}", serde_json::to_string_pretty(&topics)?);
        }
        Commands::Pool1 { date } => {
            let stocks = sp.list_pool1(parse_day(&date)?)?;
            println!("{}", serde_json::to_string_pretty(&stocks)?);
        }
        Commands::Pool2 { date } => {
            let stocks = sp.list_pool2(parse_day(&date)?)?;
            println!("{}", serde_json::to_string_pretty(&stocks)?);
        }
        Commands::Purge { date, only } => {
            let target = only
                .as_deref()
                .map(str::parse)
                .transpose()
                .map_err(|e: String| e)?
                .unwrap_or(sectorpick::application::purge::PurgeTarget::All);
            let outcome = sp.purge(parse_day(&date)?, target)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Rules => {
            let rules = sp.list_rules()?;
            println!("{}", serde_json::to_string_pretty(&rules)?);
        }
        Commands::RulesSet {
            key,
            enabled,
            gating,
            sort_order,
            json,
        } => {
            sp.update_rule(&key, enabled, gating, sort_order, json.as_deref())?;
            println!("Rule {key} updated");
        }
        Commands::AccountAdd { name } => {
            let account = sp.add_account(&name)?;
            println!("{}", serde_json::to_string_pretty(&account)?);
        }
        Commands::Accounts { all } => {
            let accounts = sp.list_accounts(!all)?;
            println!("{}", serde_json::to_string_pretty(&accounts)?);
        }
        Commands::AccountDisable { name } => {
            sp.set_account_enabled(&name, false)?;
            println!("Account {name} disabled");
        }
        Commands::AccountEnable { name } => {
            sp.set_account_enabled(&name, true)?;
            println!("Account {name} enabled");
        }
    }
    Ok(())
}

fn parse_day(date: &Option<String>) -> Result<Day, String> {
    match date {
        Some(s) => s.parse(),
        None => Ok(Day::today()),
    }
}

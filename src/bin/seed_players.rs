// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Seed the player tables from nflverse rosters and FantasyCalc values.
//!
//! Identities are synced first so that value rows can be matched through
//! the FantasyPros mappings the roster sync creates.

use clap::{Parser, ValueEnum};
use std::process::ExitCode;

use fantasy_sports_api::config::{DEFAULT_FANTASYCALC_BASE_URL, DEFAULT_NFLVERSE_ROSTERS_URL};
use fantasy_sports_api::db::Database;
use fantasy_sports_api::models::ValueFormat;
use fantasy_sports_api::services::PlayerDataService;

#[derive(Parser)]
#[command(name = "seed-players")]
#[command(about = "Load player identities and trade values into the database")]
#[command(version)]
struct Cli {
    /// SQLite database to seed
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Skip the nflverse roster sync
    #[arg(long)]
    skip_players: bool,

    /// Skip the FantasyCalc value sync
    #[arg(long)]
    skip_values: bool,

    /// Which value format(s) to fetch
    #[arg(short, long, value_enum, default_value_t = FormatArg::All)]
    format: FormatArg,

    #[arg(long, env = "NFLVERSE_ROSTERS_URL", default_value = DEFAULT_NFLVERSE_ROSTERS_URL)]
    rosters_url: String,

    #[arg(long, env = "FANTASYCALC_BASE_URL", default_value = DEFAULT_FANTASYCALC_BASE_URL)]
    fantasycalc_url: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    #[value(name = "1qb")]
    OneQb,
    Superflex,
    All,
}

impl FormatArg {
    fn formats(self) -> Vec<ValueFormat> {
        match self {
            FormatArg::OneQb => vec![ValueFormat::OneQb],
            FormatArg::Superflex => vec![ValueFormat::Superflex],
            FormatArg::All => ValueFormat::ALL.to_vec(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Seeding failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let db = Database::connect(&cli.database_url).await?;
    db.migrate().await?;

    let service = PlayerDataService::new(&cli.rosters_url, &cli.fantasycalc_url)?;

    if cli.skip_players {
        tracing::info!("Skipping nflverse player sync");
    } else {
        let report = service.sync_nflverse_players(&db).await?;
        println!(
            "Players: {} rows, {} skipped, {} new players, {} new mappings, {} Yahoo ids linked",
            report.rows,
            report.skipped,
            report.new_players,
            report.new_mappings,
            report.yahoo_ids_linked
        );
    }

    if cli.skip_values {
        tracing::info!("Skipping FantasyCalc value sync");
        return Ok(());
    }

    for format in cli.format.formats() {
        let report = service.sync_fantasycalc_values(&db, format).await?;
        println!(
            "Values ({}): {} entries, {} matched, {} unmatched",
            format, report.entries, report.matched, report.unmatched
        );
    }

    Ok(())
}

use crate::infra::build_player_service;
use ballpark::config::AppConfig;
use ballpark::error::AppError;
use ballpark::players::{RepairSummary, SeedSummary};
use ballpark::telemetry;
use clap::Args;

#[derive(Args, Debug, Default)]
pub(crate) struct RepairArgs {
    /// Print every changed name, not only the totals
    #[arg(long)]
    pub(crate) verbose: bool,
}

pub(crate) async fn run_seed() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, config.environment)?;

    let service = build_player_service(&config)?;
    let summary = service.seed().await?;
    println!("{}", seed_report(&summary));
    Ok(())
}

pub(crate) fn run_repair_names(args: RepairArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, config.environment)?;

    let service = build_player_service(&config)?;
    let summary = service.repair_names()?;
    println!("{}", repair_report(&summary, args.verbose));
    Ok(())
}

fn seed_report(summary: &SeedSummary) -> String {
    let mut report = format!("Successfully seeded {} players", summary.seeded);
    if summary.skipped > 0 {
        report.push_str(&format!(
            "\nSkipped {} record(s) without a usable player name",
            summary.skipped
        ));
    }
    if summary.guessed_fields > 0 {
        report.push_str(&format!(
            "\n{} field(s) contained unrecognized characters and were stored with a guess; see the warning log",
            summary.guessed_fields
        ));
    }
    report
}

fn repair_report(summary: &RepairSummary, verbose: bool) -> String {
    let mut lines = Vec::new();
    if verbose {
        for repair in &summary.repairs {
            let mut line = format!("  #{}: '{}' -> '{}'", repair.id, repair.before, repair.after);
            if repair.position_before != repair.position_after {
                line.push_str(&format!(
                    " (position '{}' -> '{}')",
                    repair.position_before.as_deref().unwrap_or(""),
                    repair.position_after.as_deref().unwrap_or("")
                ));
            }
            lines.push(line);
        }
    }
    lines.push(format!(
        "Examined {} players, updated {}",
        summary.examined,
        summary.updated()
    ));
    lines.join("\n")
}

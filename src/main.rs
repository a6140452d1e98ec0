// ==========================================
// Logistics Sync - CLI entry point
// ==========================================
// Usage:
//   logistics-sync <db-path> <kind|all> <extract-file> [--windowed]
//
// `all` runs every record kind sequentially against the same
// extract file; a named kind runs that kind only.
// ==========================================

use anyhow::{bail, Context, Error};
use logistics_sync::db::{init_schema, open_sqlite_connection};
use logistics_sync::domain::{RecordKind, RunMode};
use logistics_sync::importer::run_coordinator::{RunCoordinator, RunOutcome};
use logistics_sync::importer::sync_engine::{EngineOptions, SyncEngineImpl};
use logistics_sync::repository::{
    CounterpartyRepositoryImpl, ImportMetaRepositoryImpl, SyncRecordRepositoryImpl,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{error, info};

fn print_usage() {
    eprintln!("usage: logistics-sync <db-path> <kind|all> <extract-file> [--windowed]");
    eprintln!(
        "  kinds: {}",
        RecordKind::ALL
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
}

#[derive(Debug)]
struct CliArgs {
    db_path: String,
    kinds: Vec<RecordKind>,
    extract_file: PathBuf,
    mode: RunMode,
}

fn parse_args(args: &[String]) -> anyhow::Result<CliArgs> {
    if args.len() < 3 {
        bail!("expected <db-path> <kind|all> <extract-file>");
    }

    let kinds = if args[1] == "all" {
        RecordKind::ALL.to_vec()
    } else {
        // RecordKind's FromStr error is a plain String
        vec![args[1].parse::<RecordKind>().map_err(Error::msg)?]
    };

    let mode = if args.iter().skip(3).any(|a| a == "--windowed") {
        RunMode::Windowed
    } else {
        RunMode::FullSync
    };

    Ok(CliArgs {
        db_path: args[0].clone(),
        kinds,
        extract_file: PathBuf::from(&args[2]),
        mode,
    })
}

#[tokio::main]
async fn main() {
    logistics_sync::logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {e:#}");
            print_usage();
            std::process::exit(2);
        }
    };

    info!("==================================================");
    info!("{} v{}", logistics_sync::APP_NAME, logistics_sync::VERSION);
    info!("==================================================");
    info!("database: {}", cli.db_path);
    info!("extract: {}", cli.extract_file.display());

    if let Err(e) = run(cli).await {
        error!("import failed: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: CliArgs) -> anyhow::Result<()> {
    let conn = open_sqlite_connection(&cli.db_path)
        .with_context(|| format!("cannot open database at {}", cli.db_path))?;
    init_schema(&conn).context("schema initialisation failed")?;
    let conn = Arc::new(Mutex::new(conn));

    let record_repo = SyncRecordRepositoryImpl::from_connection(conn.clone());
    let counterparty_repo = CounterpartyRepositoryImpl::from_connection(conn.clone());
    let meta_repo = ImportMetaRepositoryImpl::from_connection(conn);

    let engine = SyncEngineImpl::new(record_repo, counterparty_repo, EngineOptions::default());
    let coordinator = RunCoordinator::new(Box::new(engine), meta_repo);

    let sources: Vec<(RecordKind, PathBuf)> = cli
        .kinds
        .iter()
        .map(|&kind| (kind, cli.extract_file.clone()))
        .collect();

    let mut failed = false;
    for (kind, result) in coordinator.run_all(&sources, cli.mode).await {
        match result {
            Ok(RunOutcome::Completed(report)) => {
                info!(
                    kind = %kind,
                    created = report.created,
                    updated = report.updated,
                    deleted = report.deleted,
                    skipped = report.skipped,
                    errors = report.errors,
                    elapsed_ms = report.elapsed.as_millis() as u64,
                    "run completed"
                );
            }
            Ok(RunOutcome::Dropped) => {
                info!(kind = %kind, "run dropped, another was active");
            }
            Err(e) => {
                error!(kind = %kind, error = %e, "run failed");
                failed = true;
            }
        }
    }

    if failed {
        bail!("one or more kinds failed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_single_kind() {
        let cli = parse_args(&args(&["db.sqlite", "orders", "extract.csv"])).unwrap();
        assert_eq!(cli.db_path, "db.sqlite");
        assert_eq!(cli.kinds, vec![RecordKind::Orders]);
        assert_eq!(cli.mode, RunMode::FullSync);
    }

    #[test]
    fn test_parse_args_all_kinds_windowed() {
        let cli = parse_args(&args(&["db.sqlite", "all", "extract.csv", "--windowed"])).unwrap();
        assert_eq!(cli.kinds, RecordKind::ALL.to_vec());
        assert_eq!(cli.mode, RunMode::Windowed);
    }

    #[test]
    fn test_parse_args_unknown_kind_is_an_error() {
        let err = parse_args(&args(&["db.sqlite", "payroll", "extract.csv"])).unwrap_err();
        assert!(err.to_string().contains("payroll"));
    }

    #[test]
    fn test_parse_args_too_few_arguments() {
        assert!(parse_args(&args(&["db.sqlite", "orders"])).is_err());
    }
}

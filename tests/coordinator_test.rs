// ==========================================
// RunCoordinator integration tests
// ==========================================
// Coordinator over the real engine and a real SQLite file:
// run reports must land in import_meta on success and on
// failure.
// ==========================================


use logistics_sync::domain::{RecordKind, RunMode};
use logistics_sync::importer::run_coordinator::{RunCoordinator, RunOutcome};
use logistics_sync::logging;
use logistics_sync::repository::{ImportMetaRepository, ImportMetaRepositoryImpl};
use std::path::PathBuf;
use test_helpers::{create_test_db, create_test_engine, seed_counterparties, write_extract};

const TIN: &str = "1234567890";

fn create_coordinator(db_path: &str) -> RunCoordinator<ImportMetaRepositoryImpl> {
    let engine = create_test_engine(db_path);
    let meta_repo = ImportMetaRepositoryImpl::new(db_path).expect("Failed to create repo");
    RunCoordinator::new(Box::new(engine), meta_repo)
}

#[tokio::test]
async fn test_successful_run_writes_import_meta() {
    logging::init_test();
    let (_db, db_path) = create_test_db();
    seed_counterparties(&db_path, &[TIN]).await;
    let coordinator = create_coordinator(&db_path);
    let meta_repo = ImportMetaRepositoryImpl::new(&db_path).expect("Failed to create repo");

    let extract = write_extract(&format!(
        "Branch;TIN;Date;Qty\nA;{TIN};2024-01-05;10\nB;{TIN};2024-01-06;7\n"
    ));
    let outcome = coordinator
        .run(RecordKind::StockItems, extract.path(), RunMode::FullSync)
        .await
        .expect("run failed");
    assert!(matches!(outcome, RunOutcome::Completed(_)));

    let meta = meta_repo
        .get(RecordKind::StockItems)
        .await
        .expect("get failed")
        .expect("no import_meta row");
    assert_eq!(meta.created, 2);
    assert_eq!(meta.updated, 0);
    assert_eq!(meta.deleted, 0);
}

#[tokio::test]
async fn test_failed_run_still_writes_import_meta() {
    logging::init_test();
    let (_db, db_path) = create_test_db();
    let coordinator = create_coordinator(&db_path);
    let meta_repo = ImportMetaRepositoryImpl::new(&db_path).expect("Failed to create repo");

    let missing = PathBuf::from("/nonexistent/extract.csv");
    let err = coordinator
        .run(RecordKind::Orders, &missing, RunMode::FullSync)
        .await
        .expect_err("run should fail");
    assert!(!err.to_string().is_empty());

    // the failed run's (empty) counters are still recorded
    let meta = meta_repo
        .get(RecordKind::Orders)
        .await
        .expect("get failed")
        .expect("no import_meta row");
    assert_eq!(meta.created, 0);
    assert_eq!(meta.skipped, 0);
}

#[tokio::test]
async fn test_run_all_processes_each_kind_against_its_extract() {
    logging::init_test();
    let (_db, db_path) = create_test_db();
    seed_counterparties(&db_path, &[TIN]).await;
    let coordinator = create_coordinator(&db_path);

    let stock = write_extract(&format!("Branch;TIN;Date;Qty\nA;{TIN};2024-01-05;10\n"));
    let vehicles = write_extract(&format!(
        "Филиал;Гос номер;ИНН владельца\nЦентральный;А123ВС77;{TIN}\n"
    ));

    let sources = vec![
        (RecordKind::StockItems, stock.path().to_path_buf()),
        (RecordKind::Vehicles, vehicles.path().to_path_buf()),
    ];
    let results = coordinator.run_all(&sources, RunMode::FullSync).await;

    assert_eq!(results.len(), 2);
    for (kind, result) in results {
        let outcome = result.unwrap_or_else(|e| panic!("{kind} failed: {e}"));
        match outcome {
            RunOutcome::Completed(report) => assert_eq!(report.created, 1),
            RunOutcome::Dropped => panic!("{kind} run was dropped"),
        }
    }
}

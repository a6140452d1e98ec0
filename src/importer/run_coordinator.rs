// ==========================================
// Logistics Sync - run coordinator
// ==========================================
// Sequences pipeline invocations: per-kind Idle/Running state
// owned here and transitioned atomically (no ambient boolean
// flags), run-report persistence on every completion, and
// strictly sequential multi-kind execution so only one
// identity index is alive at a time.
// ==========================================

use crate::domain::{ImportMeta, RecordKind, RunMode, RunReport, RunState};
use crate::importer::error::ImportResult;
use crate::importer::sync_engine::SyncEngine;
use crate::repository::ImportMetaRepository;
use chrono::Utc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::{info, warn};

// ==========================================
// RunOutcome - what happened to one trigger
// ==========================================
#[derive(Debug)]
pub enum RunOutcome {
    Completed(RunReport),
    /// A run of this kind was already active; the trigger was
    /// dropped, not queued.
    Dropped,
}

// ==========================================
// RunCoordinator
// ==========================================
// Manual and timer-driven triggers both go through the same
// guard. This is the engine's only concurrency control and it
// is intentionally coarse.
pub struct RunCoordinator<M>
where
    M: ImportMetaRepository,
{
    engine: Box<dyn SyncEngine>,
    meta_repo: M,
    states: Mutex<HashMap<RecordKind, RunState>>,
    /// End-of-kind pause letting the previous kind's index be
    /// reclaimed before the next one is built.
    inter_kind_pause: Duration,
}

impl<M> RunCoordinator<M>
where
    M: ImportMetaRepository,
{
    pub fn new(engine: Box<dyn SyncEngine>, meta_repo: M) -> Self {
        Self {
            engine,
            meta_repo,
            states: Mutex::new(HashMap::new()),
            inter_kind_pause: Duration::from_millis(200),
        }
    }

    pub fn with_inter_kind_pause(mut self, pause: Duration) -> Self {
        self.inter_kind_pause = pause;
        self
    }

    pub fn state(&self, kind: RecordKind) -> RunState {
        let states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        states.get(&kind).copied().unwrap_or(RunState::Idle)
    }

    /// Atomic Idle -> Running transition; false when already
    /// Running.
    fn try_begin(&self, kind: RecordKind) -> bool {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        match states.get(&kind).copied().unwrap_or(RunState::Idle) {
            RunState::Running => false,
            RunState::Idle => {
                states.insert(kind, RunState::Running);
                true
            }
        }
    }

    fn finish(&self, kind: RecordKind) {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        states.insert(kind, RunState::Idle);
    }

    /// Run one kind's pipeline behind the guard.
    ///
    /// The run report is upserted on completion, success or
    /// failure, before the kind returns to Idle.
    pub async fn run(
        &self,
        kind: RecordKind,
        source: &Path,
        mode: RunMode,
    ) -> ImportResult<RunOutcome> {
        if !self.try_begin(kind) {
            info!(kind = %kind, "run already active, trigger dropped");
            return Ok(RunOutcome::Dropped);
        }

        let result = self.engine.run(kind, source, mode).await;

        match result {
            Ok(report) => {
                let persist = self
                    .meta_repo
                    .upsert(ImportMeta::from_report(&report, Utc::now()))
                    .await;
                self.finish(kind);
                persist?;
                Ok(RunOutcome::Completed(report))
            }
            Err(failure) => {
                // best effort: the partial report is still worth
                // persisting before the error propagates
                if let Err(persist_err) = self
                    .meta_repo
                    .upsert(ImportMeta::from_report(&failure.partial, Utc::now()))
                    .await
                {
                    warn!(kind = %kind, error = %persist_err, "partial report not persisted");
                }
                self.finish(kind);
                Err(failure.error)
            }
        }
    }

    /// Run several kinds strictly one after another.
    ///
    /// Never concurrent: each kind's identity index must be
    /// released before the next kind's is built.
    pub async fn run_all(
        &self,
        sources: &[(RecordKind, PathBuf)],
        mode: RunMode,
    ) -> Vec<(RecordKind, ImportResult<RunOutcome>)> {
        let mut results = Vec::with_capacity(sources.len());

        for (i, (kind, source)) in sources.iter().enumerate() {
            let result = self.run(*kind, source, mode).await;
            results.push((*kind, result));

            if i + 1 < sources.len() {
                tokio::time::sleep(self.inter_kind_pause).await;
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::error::ImportError;
    use crate::importer::sync_engine::RunFailure;
    use crate::repository::{RepositoryResult, RepositoryError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    // Engine stub: configurable delay and failure.
    struct StubEngine {
        delay: Duration,
        fail: bool,
        runs: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SyncEngine for StubEngine {
        async fn run(
            &self,
            kind: RecordKind,
            _source: &Path,
            _mode: RunMode,
        ) -> Result<RunReport, RunFailure> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;

            if self.fail {
                let mut partial = RunReport::new(kind);
                partial.record_skip(1, "bad date");
                Err(RunFailure {
                    error: ImportError::SourceUnreadable("stub".to_string()),
                    partial,
                })
            } else {
                let mut report = RunReport::new(kind);
                report.created = 2;
                Ok(report)
            }
        }
    }

    #[derive(Default)]
    struct MemMetaRepo {
        rows: Mutex<HashMap<RecordKind, ImportMeta>>,
    }

    #[async_trait]
    impl ImportMetaRepository for MemMetaRepo {
        async fn upsert(&self, meta: ImportMeta) -> RepositoryResult<()> {
            self.rows
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?
                .insert(meta.kind, meta);
            Ok(())
        }

        async fn get(&self, kind: RecordKind) -> RepositoryResult<Option<ImportMeta>> {
            Ok(self
                .rows
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?
                .get(&kind)
                .cloned())
        }
    }

    fn coordinator(
        delay: Duration,
        fail: bool,
        runs: Arc<AtomicUsize>,
    ) -> RunCoordinator<MemMetaRepo> {
        RunCoordinator::new(
            Box::new(StubEngine { delay, fail, runs }),
            MemMetaRepo::default(),
        )
        .with_inter_kind_pause(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_completed_run_persists_metadata() {
        let runs = Arc::new(AtomicUsize::new(0));
        let coordinator = coordinator(Duration::ZERO, false, runs.clone());

        let outcome = coordinator
            .run(RecordKind::Orders, Path::new("x.csv"), RunMode::FullSync)
            .await
            .unwrap();
        assert!(matches!(outcome, RunOutcome::Completed(_)));

        let meta = coordinator
            .meta_repo
            .get(RecordKind::Orders)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(meta.created, 2);
        assert_eq!(coordinator.state(RecordKind::Orders), RunState::Idle);
    }

    #[tokio::test]
    async fn test_overlapping_trigger_is_dropped() {
        let runs = Arc::new(AtomicUsize::new(0));
        let coordinator = Arc::new(coordinator(
            Duration::from_millis(100),
            false,
            runs.clone(),
        ));

        let first = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move {
                coordinator
                    .run(RecordKind::Orders, Path::new("x.csv"), RunMode::FullSync)
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(coordinator.state(RecordKind::Orders), RunState::Running);

        let second = coordinator
            .run(RecordKind::Orders, Path::new("x.csv"), RunMode::FullSync)
            .await
            .unwrap();
        assert!(matches!(second, RunOutcome::Dropped));

        let first = first.await.unwrap().unwrap();
        assert!(matches!(first, RunOutcome::Completed(_)));

        // only the first trigger reached the engine
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.state(RecordKind::Orders), RunState::Idle);
    }

    #[tokio::test]
    async fn test_failed_run_persists_partial_report_and_releases_guard() {
        let runs = Arc::new(AtomicUsize::new(0));
        let coordinator = coordinator(Duration::ZERO, true, runs.clone());

        let err = coordinator
            .run(RecordKind::Orders, Path::new("x.csv"), RunMode::FullSync)
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::SourceUnreadable(_)));

        let meta = coordinator
            .meta_repo
            .get(RecordKind::Orders)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(meta.created, 0);
        assert_eq!(meta.skipped, 1);
        assert_eq!(coordinator.state(RecordKind::Orders), RunState::Idle);
    }

    #[tokio::test]
    async fn test_run_all_is_sequential() {
        let runs = Arc::new(AtomicUsize::new(0));
        let coordinator = coordinator(Duration::from_millis(5), false, runs.clone());

        let sources = vec![
            (RecordKind::Orders, PathBuf::from("a.csv")),
            (RecordKind::StockItems, PathBuf::from("b.csv")),
        ];
        let results = coordinator.run_all(&sources, RunMode::FullSync).await;

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_different_kinds_do_not_share_the_guard() {
        let runs = Arc::new(AtomicUsize::new(0));
        let coordinator = Arc::new(coordinator(
            Duration::from_millis(100),
            false,
            runs.clone(),
        ));

        let first = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move {
                coordinator
                    .run(RecordKind::Orders, Path::new("x.csv"), RunMode::FullSync)
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        let other = coordinator
            .run(RecordKind::Vehicles, Path::new("y.csv"), RunMode::FullSync)
            .await
            .unwrap();
        assert!(matches!(other, RunOutcome::Completed(_)));

        first.await.unwrap().unwrap();
    }
}

// ==========================================
// Logistics Sync - identity index
// ==========================================
// Business key -> store id map for the current run scope.
// Loaded in fixed-size pages to bound peak memory, built
// once per run and dropped at run end.
// ==========================================

use crate::domain::{BusinessKey, KeyProjection, RecordKind};
use crate::importer::error::ImportResult;
use crate::repository::SyncRecordRepository;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

pub struct IdentityIndex {
    map: HashMap<BusinessKey, KeyProjection>,
}

impl IdentityIndex {
    /// Load the index for a kind, page by page.
    ///
    /// `min_doc_date` is set on windowed runs for kinds with a
    /// document date, bounding the load to a trailing window.
    pub async fn load(
        repo: &dyn SyncRecordRepository,
        kind: RecordKind,
        min_doc_date: Option<NaiveDate>,
        page_size: usize,
    ) -> ImportResult<Self> {
        let mut map = HashMap::new();
        let mut offset = 0;

        loop {
            let page = repo
                .list_keys_page(kind, min_doc_date, page_size, offset)
                .await?;
            let page_len = page.len();

            for projection in page {
                map.insert(projection.key.clone(), projection);
            }

            if page_len < page_size {
                break;
            }
            offset += page_size;
        }

        debug!(kind = %kind, entries = map.len(), "identity index loaded");
        Ok(Self { map })
    }

    #[cfg(test)]
    pub fn from_projections(projections: Vec<KeyProjection>) -> Self {
        Self {
            map: projections.into_iter().map(|p| (p.key.clone(), p)).collect(),
        }
    }

    pub fn get(&self, key: &BusinessKey) -> Option<&KeyProjection> {
        self.map.get(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&BusinessKey, &KeyProjection)> {
        self.map.iter()
    }
}

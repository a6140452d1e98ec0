// ==========================================
// Logistics Sync - reconciliation engine
// ==========================================
// Classifies every accepted record as create/update/unchanged
// against the identity index, tracks observed keys, and
// computes the removal set once the stream is exhausted.
// Removal only happens in full-sync mode: a windowed extract
// cannot truthfully claim an absent entity no longer exists.
// ==========================================

use crate::domain::{BusinessKey, ComparePolicy, LogicalRecord, RunMode};
use crate::importer::identity_index::IdentityIndex;
use std::collections::HashSet;

// ==========================================
// Classification - outcome for one record
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Create,
    Update { id: i64 },
    /// Matched and compared equal under the kind's policy;
    /// no write is issued.
    Unchanged { id: i64 },
}

// ==========================================
// Reconciler
// ==========================================
// Exclusively owned by a single run; never shared across
// runs or kinds.
pub struct Reconciler {
    index: IdentityIndex,
    observed: HashSet<BusinessKey>,
    policy: ComparePolicy,
}

impl Reconciler {
    pub fn new(index: IdentityIndex, policy: ComparePolicy) -> Self {
        Self {
            index,
            observed: HashSet::new(),
            policy,
        }
    }

    /// Classify one accepted record and mark its key observed.
    ///
    /// A matched key classifies as update even when nothing
    /// changed, unless the kind's policy names a compare field
    /// and its canonical value is identical to the stored one.
    pub fn classify(&mut self, record: &LogicalRecord) -> Classification {
        self.observed.insert(record.key.clone());

        let projection = match self.index.get(&record.key) {
            Some(projection) => projection,
            None => return Classification::Create,
        };

        if let ComparePolicy::SkipIfUnchanged { field } = self.policy {
            let incoming = record.field(field).map(|v| v.canonical());
            if incoming == projection.compare_value {
                return Classification::Unchanged { id: projection.id };
            }
        }

        Classification::Update { id: projection.id }
    }

    pub fn observed_count(&self) -> usize {
        self.observed.len()
    }

    /// Removal set: index keys minus observed keys.
    ///
    /// Empty in windowed mode regardless of content; deletion
    /// suppression is the central correctness policy of the
    /// engine and must stay explicit here.
    pub fn removal_ids(&self, mode: RunMode) -> Vec<i64> {
        if mode.is_windowed() {
            return Vec::new();
        }

        self.index
            .entries()
            .filter(|(key, _)| !self.observed.contains(*key))
            .map(|(_, projection)| projection.id)
            .collect()
    }
}

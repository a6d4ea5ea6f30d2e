use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use super::domain::{ProductId, ProductKey, ProductRecord, ProductStatus, ProductSubmission};
use super::repository::{ProductStore, StoreError};

/// Process-local store backing the service and the demo command.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    state: Mutex<StoreState>,
}

#[derive(Debug, Default)]
struct StoreState {
    last_id: u64,
    records: BTreeMap<ProductId, ProductRecord>,
}

impl StoreState {
    fn claims(&self, key: ProductKey<'_>) -> bool {
        self.records.values().any(|record| record.matches(key))
    }
}

impl InMemoryProductStore {
    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }

    /// Snapshot of every record, ordered by id.
    pub fn records(&self) -> Result<Vec<ProductRecord>, StoreError> {
        Ok(self.lock()?.records.values().cloned().collect())
    }
}

impl ProductStore for InMemoryProductStore {
    fn exists(&self, key: ProductKey<'_>) -> Result<bool, StoreError> {
        Ok(self.lock()?.claims(key))
    }

    fn insert_pending(&self, submission: &ProductSubmission) -> Result<ProductId, StoreError> {
        let mut state = self.lock()?;

        for key in [
            ProductKey::Barcode(&submission.barcode),
            ProductKey::Name(&submission.name),
        ] {
            if state.claims(key) {
                return Err(StoreError::Conflict { field: key.field() });
            }
        }

        state.last_id += 1;
        let id = ProductId(state.last_id);
        state.records.insert(
            id,
            ProductRecord {
                id,
                submission: submission.clone(),
                status: ProductStatus::Pending,
                submitted_at: Utc::now(),
                published_at: None,
            },
        );
        Ok(id)
    }

    fn move_to_live(&self, id: ProductId) -> Result<bool, StoreError> {
        let mut state = self.lock()?;
        match state.records.get_mut(&id) {
            Some(record) if record.is_pending() => {
                record.status = ProductStatus::Live;
                record.published_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn discard(&self, id: ProductId) -> Result<bool, StoreError> {
        let mut state = self.lock()?;
        let pending = state
            .records
            .get(&id)
            .map_or(false, ProductRecord::is_pending);
        if pending {
            state.records.remove(&id);
        }
        Ok(pending)
    }

    fn fetch(&self, id: ProductId) -> Result<Option<ProductRecord>, StoreError> {
        Ok(self.lock()?.records.get(&id).cloned())
    }
}

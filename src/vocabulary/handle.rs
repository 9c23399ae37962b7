use std::sync::{Arc, RwLock};

use super::{VocabularyError, VocabularySnapshot};

/// Shared, swappable reference to the current vocabulary snapshot.
///
/// Readers clone the inner `Arc` and work on that snapshot for the whole
/// request; `replace` swaps the reference in one step, so a request never
/// sees a half-refreshed graph.
pub struct SnapshotHandle {
    current: RwLock<Arc<VocabularySnapshot>>,
}

impl SnapshotHandle {
    pub fn new(snapshot: VocabularySnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The snapshot in effect right now.
    pub fn current(&self) -> Result<Arc<VocabularySnapshot>, VocabularyError> {
        let guard = self.current.read().map_err(|_| VocabularyError::LockFailed)?;
        Ok(Arc::clone(&guard))
    }

    /// Install a new snapshot, returning the one it replaced.
    pub fn replace(
        &self,
        snapshot: VocabularySnapshot,
    ) -> Result<Arc<VocabularySnapshot>, VocabularyError> {
        let next = Arc::new(snapshot);
        let mut guard = self.current.write().map_err(|_| VocabularyError::LockFailed)?;
        let previous = std::mem::replace(&mut *guard, next);

        tracing::info!(
            symptoms = guard.symptoms().len(),
            diseases = guard.diseases().len(),
            associations = guard.associations().len(),
            "Vocabulary snapshot replaced"
        );

        Ok(previous)
    }
}

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::StoreError;
use crate::models::ProgressState;

/// Durable home of `ProgressState`, one record per track.
///
/// `save` is an idempotent overwrite of the whole record.
pub trait ProgressStore {
    /// Returns an empty state when nothing has been stored for the track yet.
    fn load(&self, track: &str) -> Result<ProgressState, StoreError>;

    fn save(&self, track: &str, state: &ProgressState) -> Result<(), StoreError>;

    /// Forget everything stored for the track.
    fn reset(&self, track: &str) -> Result<(), StoreError>;
}

/// Shared in-memory store. Clones see the same data.
#[derive(Clone, Default)]
pub struct MemoryProgressStore {
    records: Arc<Mutex<HashMap<String, ProgressState>>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `save` calls fail, as an unreachable backend would.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".to_string()));
        }
        Ok(())
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&self, track: &str) -> Result<ProgressState, StoreError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(guard.get(track).cloned().unwrap_or_default())
    }

    fn save(&self, track: &str, state: &ProgressState) -> Result<(), StoreError> {
        self.check_available()?;
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        guard.insert(track.to_string(), state.clone());
        Ok(())
    }

    fn reset(&self, track: &str) -> Result<(), StoreError> {
        self.check_available()?;
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        guard.remove(track);
        Ok(())
    }
}

use eyre::Result;
use model::snapshot::StateSnapshot;
use storage::{debounce::DebouncedSaver, JsonStore};

pub mod attendance;
pub mod backup;
pub mod blocks;
pub mod participants;
pub mod payments;
pub mod reports;
pub mod standing;
pub mod statistics;

/// Application facade. Owns the in-memory state and schedules a
/// debounced full-document save after every mutation; only the newest
/// snapshot ever reaches disk. Queries recompute from the current state
/// on demand, nothing is cached.
pub struct Ledger {
    state: StateSnapshot,
    saver: DebouncedSaver,
}

impl Ledger {
    pub fn open(store: JsonStore) -> Result<Ledger> {
        let state = store.load()?;
        let saver = DebouncedSaver::new(store);
        Ok(Ledger { state, saver })
    }

    pub fn with_saver(state: StateSnapshot, saver: DebouncedSaver) -> Ledger {
        Ledger { state, saver }
    }

    pub fn state(&self) -> &StateSnapshot {
        &self.state
    }

    /// Writes any pending snapshot right now.
    pub fn flush(&self) {
        self.saver.flush();
    }

    /// Last persistence failure, if any, for user notification. The
    /// core never retries a failed save.
    pub fn take_save_error(&self) -> Option<String> {
        self.saver.take_error()
    }

    pub(crate) fn dirty(&mut self) {
        self.saver.schedule(self.state.clone());
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use std::time::Duration;

    use storage::{debounce::DebouncedSaver, JsonStore};
    use tempfile::TempDir;

    use super::Ledger;

    pub fn ledger() -> (TempDir, Ledger) {
        let dir = TempDir::new().expect("tempdir");
        let store = JsonStore::new(dir.path().join("visitflow.json"));
        let state = store.load().expect("load");
        let saver = DebouncedSaver::with_quiet_period(store, Duration::from_millis(10));
        (dir, Ledger::with_saver(state, saver))
    }
}

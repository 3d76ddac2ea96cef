use std::{
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
    sync::Arc,
    thread::JoinHandle,
    time::Duration,
};

use model::snapshot::StateSnapshot;
use parking_lot::Mutex;

use crate::JsonStore;

/// Quiet period after the last mutation before the document is written.
pub const QUIET_PERIOD: Duration = Duration::from_secs(1);

enum Command {
    Save(StateSnapshot),
    Flush(Sender<()>),
}

/// Writes the latest scheduled snapshot after a quiet period. Another
/// `schedule` inside the window supersedes the pending one, so only the
/// newest snapshot ever reaches disk. Failures are recorded for the
/// notification layer and never retried.
pub struct DebouncedSaver {
    tx: Sender<Command>,
    last_error: Arc<Mutex<Option<String>>>,
    worker: Option<JoinHandle<()>>,
}

impl DebouncedSaver {
    pub fn new(store: JsonStore) -> DebouncedSaver {
        DebouncedSaver::with_quiet_period(store, QUIET_PERIOD)
    }

    pub fn with_quiet_period(store: JsonStore, quiet: Duration) -> DebouncedSaver {
        let (tx, rx) = mpsc::channel();
        let last_error = Arc::new(Mutex::new(None));
        let errors = last_error.clone();
        let worker = std::thread::spawn(move || run(store, rx, quiet, errors));
        DebouncedSaver {
            tx,
            last_error,
            worker: Some(worker),
        }
    }

    /// Supersedes any pending snapshot and restarts the quiet period.
    pub fn schedule(&self, snapshot: StateSnapshot) {
        // The worker only stops when the saver is dropped.
        let _ = self.tx.send(Command::Save(snapshot));
    }

    /// Writes any pending snapshot right now and waits for it.
    pub fn flush(&self) {
        let (done_tx, done_rx) = mpsc::channel();
        if self.tx.send(Command::Flush(done_tx)).is_ok() {
            let _ = done_rx.recv();
        }
    }

    /// Last persistence failure, if any, for user notification.
    pub fn take_error(&self) -> Option<String> {
        self.last_error.lock().take()
    }
}

impl Drop for DebouncedSaver {
    fn drop(&mut self) {
        // Closing the channel stops the worker; it writes whatever is
        // still pending on the way out.
        let (tx, _) = mpsc::channel();
        drop(std::mem::replace(&mut self.tx, tx));
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run(
    store: JsonStore,
    rx: Receiver<Command>,
    quiet: Duration,
    errors: Arc<Mutex<Option<String>>>,
) {
    let mut pending: Option<StateSnapshot> = None;
    loop {
        let command = if pending.is_some() {
            match rx.recv_timeout(quiet) {
                Ok(command) => Some(command),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match rx.recv() {
                Ok(command) => Some(command),
                Err(_) => break,
            }
        };
        match command {
            Some(Command::Save(snapshot)) => pending = Some(snapshot),
            Some(Command::Flush(done)) => {
                persist(&store, pending.take(), &errors);
                let _ = done.send(());
            }
            // Quiet period elapsed.
            None => persist(&store, pending.take(), &errors),
        }
    }
    persist(&store, pending.take(), &errors);
}

fn persist(store: &JsonStore, pending: Option<StateSnapshot>, errors: &Mutex<Option<String>>) {
    if let Some(snapshot) = pending {
        if let Err(err) = store.save(&snapshot) {
            log::error!("Failed to persist state document: {err:?}");
            *errors.lock() = Some(format!("{err:#}"));
        }
    }
}

//! Intake path: filter, skip-token check, enqueue, arm the batch timer.

use log::{debug, error};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;

use crate::HandlerOpts;
use crate::engine::state::{SharedIntake, lock_intake, new_shared_intake};
use crate::engine::timer::BatchTimer;
use crate::engine::tools::is_video_path;
use crate::pipeline::{BatchDispatcher, Collaborators, DispatchContext};

/// What intake did with one creation event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intake {
    /// Queued for the next batch.
    Accepted,
    /// Consumed a skip token (a file the pipeline wrote itself).
    Suppressed,
    /// Directory or unsupported extension.
    Ignored,
}

/// Receives creation events and hands settled bursts to the dispatcher.
///
/// Safe to call from any number of producer threads.
pub struct VideoHandler {
    opts: HandlerOpts,
    state: SharedIntake,
    dispatcher: Arc<BatchDispatcher>,
    /// Timer threads (each runs its batch when it fires). Joined by [`VideoHandler::wait_idle`].
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl VideoHandler {
    pub fn new(opts: HandlerOpts, collab: Collaborators) -> Arc<Self> {
        let state = new_shared_intake();
        let ctx = DispatchContext::new(opts.clone(), collab);
        let dispatcher = Arc::new(BatchDispatcher::new(Arc::clone(&state), ctx));
        Arc::new(Self {
            opts,
            state,
            dispatcher,
            workers: Mutex::new(Vec::new()),
        })
    }

    pub fn dispatcher(&self) -> &Arc<BatchDispatcher> {
        &self.dispatcher
    }

    /// Handle one creation event.
    pub fn on_created(&self, path: &Path, is_dir: bool) -> Intake {
        if is_dir || !is_video_path(path) {
            return Intake::Ignored;
        }

        let mut st = lock_intake(&self.state);
        if st.skip.consume(path) {
            debug!("Suppressed self-produced {}", path.display());
            return Intake::Suppressed;
        }
        st.queue.push(path.to_path_buf());

        if st.timer.is_none() {
            st.generation += 1;
            let generation = st.generation;
            let dispatcher = Arc::clone(&self.dispatcher);
            let interval = self.opts.batch_interval;
            match BatchTimer::start(generation, interval, move || {
                dispatcher.run_fired(generation);
            }) {
                Ok((timer, handle)) => {
                    debug!("Batch timer #{generation} armed for {interval:?}");
                    st.timer = Some(timer);
                    self.track_worker(handle);
                }
                // The path stays queued; the next accepted event tries to arm again.
                Err(e) => error!("Could not arm batch timer: {:#}", e),
            }
        }
        Intake::Accepted
    }

    /// Cancel the armed timer (if any) and return what was queued. Nothing is dispatched.
    pub fn cancel_pending(&self) -> Vec<PathBuf> {
        let mut st = lock_intake(&self.state);
        if let Some(timer) = st.timer.take() {
            timer.cancel();
        }
        st.queue.drain()
    }

    /// Events queued for the next batch (duplicates included).
    pub fn queued(&self) -> usize {
        lock_intake(&self.state).queue.len()
    }

    pub fn timer_armed(&self) -> bool {
        lock_intake(&self.state).timer.is_some()
    }

    /// Generation of the armed timer, if any.
    pub fn timer_generation(&self) -> Option<u64> {
        lock_intake(&self.state).timer.as_ref().map(BatchTimer::generation)
    }

    pub fn skip_contains(&self, path: &Path) -> bool {
        lock_intake(&self.state).skip.contains(path)
    }

    /// Register a skip token by hand, as the dispatcher does before converting.
    pub fn expect_self_produced(&self, path: PathBuf) {
        lock_intake(&self.state).skip.insert(path);
    }

    /// Block until every armed timer has fired (or been cancelled) and its batch finished.
    pub fn wait_idle(&self) {
        loop {
            let handles = std::mem::take(&mut *self.lock_workers());
            if handles.is_empty() {
                return;
            }
            for h in handles {
                if h.join().is_err() {
                    error!("Batch thread panicked");
                }
            }
        }
    }

    fn track_worker(&self, handle: JoinHandle<()>) {
        let mut workers = self.lock_workers();
        workers.retain(|h| !h.is_finished());
        workers.push(handle);
    }

    fn lock_workers(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.workers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

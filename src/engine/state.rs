//! State shared by intake and dispatch, behind one mutex.

use std::sync::{Arc, Mutex, MutexGuard};

use super::queue::EventQueue;
use super::skip::SkipSet;
use super::timer::BatchTimer;

/// Queue, armed timer and skip tokens. Skip-check, enqueue and timer-arm must happen under the
/// same lock or two concurrent events could both see "no timer" and arm two.
#[derive(Debug, Default)]
pub struct IntakeState {
    pub queue: EventQueue,
    pub skip: SkipSet,
    /// At most one armed timer per handler.
    pub timer: Option<BatchTimer>,
    /// Bumped every time a timer is armed. A fired timer only dispatches while it is still the
    /// armed one.
    pub generation: u64,
}

pub type SharedIntake = Arc<Mutex<IntakeState>>;

pub fn new_shared_intake() -> SharedIntake {
    Arc::new(Mutex::new(IntakeState::default()))
}

/// Lock the intake state. A panic while holding the lock leaves plain collections behind, so
/// the state is still usable.
pub fn lock_intake(state: &SharedIntake) -> MutexGuard<'_, IntakeState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

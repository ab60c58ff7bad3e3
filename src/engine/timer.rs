//! Single-shot batch timer on its own thread.

use anyhow::{Context, Result};
use crossbeam_channel::{RecvTimeoutError, Sender, bounded};
use log::debug;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Handle to an armed countdown. Fires its callback exactly once after `interval`, unless
/// cancelled first. Dropping the handle before it fires cancels it.
#[derive(Debug)]
pub struct BatchTimer {
    generation: u64,
    cancel_tx: Sender<()>,
    armed_at: Instant,
    interval: Duration,
}

impl BatchTimer {
    /// Arm a timer tagged with `generation`. Returns the handle and the thread running the
    /// countdown (and the callback).
    pub fn start<F>(
        generation: u64,
        interval: Duration,
        on_fire: F,
    ) -> Result<(Self, JoinHandle<()>)>
    where
        F: FnOnce() + Send + 'static,
    {
        let (cancel_tx, cancel_rx) = bounded::<()>(1);
        let handle = thread::Builder::new()
            .name("batch-timer".to_string())
            .spawn(move || match cancel_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => on_fire(),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    debug!("batch timer #{generation} cancelled before firing");
                }
            })
            .context("spawn batch timer thread")?;
        Ok((
            Self {
                generation,
                cancel_tx,
                armed_at: Instant::now(),
                interval,
            },
            handle,
        ))
    }

    /// Arm counter value this timer was started with.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cancel the countdown. No effect if it already fired.
    pub fn cancel(self) {
        let _ = self.cancel_tx.try_send(());
    }

    /// Time left until the timer fires (zero once due).
    pub fn remaining(&self) -> Duration {
        self.interval.saturating_sub(self.armed_at.elapsed())
    }
}

//! Local countdown task for a single slot

use std::{sync::Weak, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant},
};
use tracing::debug;

use crate::{
    protocol::SlotId,
    state::{Session, Tick, TICK_MS},
};

const TICK: Duration = Duration::from_millis(TICK_MS as u64);

/// Ownership of a running countdown task; cancelling consumes it
#[derive(Debug)]
pub struct CountdownHandle {
    task: JoinHandle<()>,
}

impl CountdownHandle {
    pub(crate) fn from_task(task: JoinHandle<()>) -> Self {
        Self { task }
    }

    pub fn cancel(self) {
        self.task.abort();
    }
}

/// Spawn the cosmetic countdown for `slot`.
///
/// The first tick fires one interval after the call, then every interval
/// until the slot stops it. The task holds only a weak reference so a torn
/// down session ends it.
pub fn spawn_countdown(session: Weak<Session>, slot: SlotId, generation: u64) -> CountdownHandle {
    let start = Instant::now() + TICK;

    let task = tokio::spawn(async move {
        let mut ticker = interval_at(start, TICK);
        loop {
            ticker.tick().await;

            let Some(live) = session.upgrade() else {
                break;
            };
            if live.tick(slot, generation) == Tick::Stop {
                break;
            }
        }
        debug!("Countdown for slot {} (generation {}) stopped", slot, generation);
    });

    CountdownHandle::from_task(task)
}

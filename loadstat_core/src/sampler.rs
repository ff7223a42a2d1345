//! Background sampling loop.
//!
//! Spawns a thread that owns the single outstanding tick deadline. Ticks run
//! on that thread only, so two ticks can never overlap. The thread waits on
//! a bounded command channel: `Arm` sets a deadline when none is pending,
//! `Shutdown` exits. Each tick's report is offered to a bounded report
//! channel and dropped if nobody is keeping up.
//!
//! Safety: each `SamplingLoop` spawns exactly one thread that is joined on
//! `cancel()` or drop, so no tick runs after either returns.
use crossbeam_channel as xch;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::engine::{Continuation, LoadStat, TickReport};
use crate::error::{Result, StatError};

/// Scheduling state of the sampling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LoopState {
    /// No tick pending.
    Dormant = 0,
    /// A tick is pending.
    Scheduled = 1,
    /// A tick is executing.
    Sampling = 2,
}

impl LoopState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => LoopState::Scheduled,
            2 => LoopState::Sampling,
            _ => LoopState::Dormant,
        }
    }
}

#[derive(Debug)]
enum Command {
    Arm(Duration),
    Shutdown,
}

/// Commands are tiny and `Arm` is only sent from a dormant loop.
const COMMAND_CAPACITY: usize = 16;

pub struct SamplingLoop {
    tx: xch::Sender<Command>,
    state: Arc<AtomicU8>,
    /// Join handle for synchronous cancellation
    join_handle: Mutex<Option<JoinHandle<()>>>,
}

impl SamplingLoop {
    pub fn spawn(engine: Arc<LoadStat>, reports: xch::Sender<TickReport>) -> Result<Self> {
        let (tx, rx) = xch::bounded(COMMAND_CAPACITY);
        let state = Arc::new(AtomicU8::new(LoopState::Dormant as u8));
        let state_clone = state.clone();

        let join_handle = std::thread::Builder::new()
            .name("loadstat-sampler".into())
            .spawn(move || run(&engine, &rx, &reports, &state_clone))
            .map_err(|e| StatError::Worker(e.to_string()))?;

        Ok(Self {
            tx,
            state,
            join_handle: Mutex::new(Some(join_handle)),
        })
    }

    /// Ask for a tick after `delay` unless one is already pending.
    pub fn arm(&self, delay: Duration) {
        if self.tx.try_send(Command::Arm(delay)).is_err() {
            tracing::trace!("sampling loop not accepting commands; arm dropped");
        }
    }

    pub fn state(&self) -> LoopState {
        LoopState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Stop the loop and wait for any in-flight tick to finish.
    /// Idempotent; later calls return immediately.
    pub fn cancel(&self) {
        let handle = self
            .join_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(handle) = handle else {
            return;
        };
        // Blocking send: the worker drains commands between ticks.
        let _ = self.tx.send(Command::Shutdown);
        if handle.thread().id() == std::thread::current().id() {
            tracing::warn!("sampling loop cancelled from its own thread; not joining");
            return;
        }
        match handle.join() {
            Ok(()) => {
                tracing::trace!("sampling thread joined successfully");
            }
            Err(e) => {
                // Thread panicked; log but don't propagate (may be in Drop)
                tracing::warn!(?e, "sampling thread panicked during shutdown");
            }
        }
    }
}

impl Drop for SamplingLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn run(
    engine: &LoadStat,
    rx: &xch::Receiver<Command>,
    reports: &xch::Sender<TickReport>,
    state: &AtomicU8,
) {
    let mut deadline: Option<Instant> = None;
    loop {
        let cmd = match deadline {
            None => match rx.recv() {
                Ok(c) => Some(c),
                Err(_) => break,
            },
            Some(due) => {
                let wait = due.saturating_duration_since(Instant::now());
                match rx.recv_timeout(wait) {
                    Ok(c) => Some(c),
                    Err(xch::RecvTimeoutError::Timeout) => None,
                    Err(xch::RecvTimeoutError::Disconnected) => break,
                }
            }
        };

        match cmd {
            Some(Command::Shutdown) => {
                tracing::debug!("sampling thread received shutdown signal");
                break;
            }
            Some(Command::Arm(delay)) => {
                if deadline.is_none() {
                    deadline = Some(Instant::now() + delay);
                    state.store(LoopState::Scheduled as u8, Ordering::Release);
                }
            }
            None => {
                state.store(LoopState::Sampling as u8, Ordering::Release);
                let report = engine.tick();
                let next = report.next;
                // Best effort; a slow or absent reader loses records.
                let _ = reports.try_send(report);
                match next {
                    Continuation::Reschedule(delay) => {
                        deadline = Some(Instant::now() + delay);
                        state.store(LoopState::Scheduled as u8, Ordering::Release);
                    }
                    Continuation::Dormant(_) => {
                        deadline = None;
                        state.store(LoopState::Dormant as u8, Ordering::Release);
                    }
                }
            }
        }
    }
    state.store(LoopState::Dormant as u8, Ordering::Release);
    tracing::trace!("sampling thread exiting cleanly");
}

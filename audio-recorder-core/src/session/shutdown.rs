use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::Sender;
use parking_lot::{Condvar, Mutex};

use crate::models::recording_result::ShutdownReason;
use crate::models::state::{PipelineState, StateChangeOutcome};
use crate::traits::engine::MediaEngine;

use super::lifecycle::Lifecycle;

/// Single teardown path for every shutdown trigger.
///
/// Safe to call any number of times from any thread. Each step runs at
/// most once, guarded by its own flag:
/// 1. record the first reason,
/// 2. stop the event loop if it is running,
/// 3. request `Stopped` and block until the engine confirms it.
///
/// The confirmation wait has no timeout. Engines confirm a stop within
/// milliseconds once it has been requested; a wedged engine hangs here.
pub struct ShutdownCoordinator {
    triggered: AtomicBool,
    reason: Mutex<Option<ShutdownReason>>,
    loop_active: AtomicBool,
    quit: Sender<()>,
    stop_requested: AtomicBool,
    finished: Mutex<bool>,
    finished_cv: Condvar,
}

impl ShutdownCoordinator {
    /// `quit` wakes the event loop; it should have room for one message.
    pub fn new(quit: Sender<()>) -> Self {
        Self {
            triggered: AtomicBool::new(false),
            reason: Mutex::new(None),
            loop_active: AtomicBool::new(false),
            quit,
            stop_requested: AtomicBool::new(false),
            finished: Mutex::new(false),
            finished_cv: Condvar::new(),
        }
    }

    /// Returns `true` for the call that performed the teardown.
    pub fn shutdown<E: MediaEngine + ?Sized>(
        &self,
        engine: &E,
        lifecycle: &Lifecycle,
        reason: ShutdownReason,
    ) -> bool {
        self.trigger(reason);
        self.teardown(engine, lifecycle)
    }

    /// Mark shutdown as triggered and record `reason` unless one is
    /// already recorded. Returns `true` for the first trigger only.
    pub fn trigger(&self, reason: ShutdownReason) -> bool {
        let mut recorded = self.reason.lock();
        let first = !self.triggered.swap(true, Ordering::AcqRel);
        if first {
            log::info!("Finishing: {}", reason);
        }
        match *recorded {
            None => *recorded = Some(reason),
            Some(_) => log::debug!("Shutdown already in progress, ignoring {}", reason),
        }
        first
    }

    /// Stop the event loop and the pipeline. Only the first call does the
    /// work; it returns once the engine has confirmed the stop.
    pub fn teardown<E: MediaEngine + ?Sized>(&self, engine: &E, lifecycle: &Lifecycle) -> bool {
        self.stop_loop();

        if self.stop_requested.swap(true, Ordering::AcqRel) {
            return false;
        }

        match lifecycle.request(engine, PipelineState::Stopped) {
            Ok(StateChangeOutcome::Async) => log::debug!("Stop in progress"),
            Ok(_) => {}
            Err(e) => log::error!("Stop request failed: {}", e),
        }
        let state = engine.wait_for_state();
        log::info!("Pipeline {}", state);

        *self.finished.lock() = true;
        self.finished_cv.notify_all();
        true
    }

    /// Record `reason` as the cause of a shutdown that another trigger will
    /// perform. Has no effect if a reason is already recorded.
    pub fn note_reason(&self, reason: ShutdownReason) {
        let mut recorded = self.reason.lock();
        if recorded.is_none() {
            *recorded = Some(reason);
        }
    }

    /// Mark the event loop as running.
    ///
    /// Returns `false` if shutdown was already triggered, in which case the
    /// loop must not start.
    pub fn enter_loop(&self) -> bool {
        self.loop_active.store(true, Ordering::Release);
        if self.is_triggered() {
            self.loop_active.store(false, Ordering::Release);
            return false;
        }
        true
    }

    pub fn is_loop_active(&self) -> bool {
        self.loop_active.load(Ordering::Acquire)
    }

    fn stop_loop(&self) {
        if self.loop_active.swap(false, Ordering::AcqRel) {
            log::debug!("Quit loop");
            let _ = self.quit.try_send(());
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::Acquire)
    }

    pub fn reason(&self) -> Option<ShutdownReason> {
        self.reason.lock().clone()
    }

    pub fn is_finished(&self) -> bool {
        *self.finished.lock()
    }

    /// Block until the teardown started by some caller has completed.
    pub fn wait_finished(&self) {
        let mut finished = self.finished.lock();
        while !*finished {
            self.finished_cv.wait(&mut finished);
        }
    }
}

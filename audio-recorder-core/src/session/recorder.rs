use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Local;
use crossbeam_channel::{bounded, unbounded, Sender};
use parking_lot::Mutex;

use crate::graph::assembler::{GraphAssembler, GraphPlan};
use crate::graph::linker::{PadLinkOutcome, PadLinker};
use crate::models::config::RecorderConfiguration;
use crate::models::error::RecorderError;
use crate::models::event::{BusMessage, EngineEvent};
use crate::models::node::PadRef;
use crate::models::output::OutputTarget;
use crate::models::recording_result::{RecordingMetadata, RecordingResult, ShutdownReason};
use crate::models::state::{PipelineState, StateChangeOutcome};
use crate::storage::{checksum, metadata};
use crate::traits::engine::{EventCallback, MediaEngine};
use crate::traits::recorder_delegate::RecorderDelegate;

use super::dispatcher::{Dispatch, EventDispatcher};
use super::event_loop::{Continuation, EventLoop};
use super::lifecycle::Lifecycle;
use super::shutdown::ShutdownCoordinator;
use super::watchdog::{DurationWatchdog, TickDecision};

/// One recording session on top of a media engine.
///
/// ```text
/// Recorder::new ─→ assemble graph ─→ Prepared
/// start()       ─→ Running
/// run()         ─→ event loop: bus messages + duration ticks
///                    └─ EOS / error / duration / interrupt ─→ shutdown() ─→ Stopped
/// finish()      ─→ RecordingResult
/// ```
///
/// Shared as `Arc<Recorder>` between the caller, the event loop worker and
/// the engine's streaming threads. After construction the only mutable
/// state is the pad linker's claim, the shutdown coordinator's flags and
/// the lifecycle state.
pub struct Recorder<E: MediaEngine + 'static> {
    engine: Arc<E>,
    config: RecorderConfiguration,
    target: OutputTarget,
    plan: GraphPlan,
    lifecycle: Lifecycle,
    linker: PadLinker,
    watchdog: Option<DurationWatchdog>,
    coordinator: ShutdownCoordinator,
    event_loop: EventLoop,
    events: Sender<EngineEvent>,
    delegate: Option<Arc<dyn RecorderDelegate>>,
    last_position: Mutex<Option<Duration>>,
}

impl<E: MediaEngine + 'static> Recorder<E> {
    pub fn new(engine: Arc<E>, config: RecorderConfiguration) -> Result<Arc<Self>, RecorderError> {
        Self::with_delegate(engine, config, None)
    }

    /// Validate the output location, assemble the graph for the configured
    /// format and move the pipeline to `Prepared`.
    ///
    /// Nothing is created if the output location is unusable. Any later
    /// failure tears the partial pipeline down before returning.
    pub fn with_delegate(
        engine: Arc<E>,
        config: RecorderConfiguration,
        delegate: Option<Arc<dyn RecorderDelegate>>,
    ) -> Result<Arc<Self>, RecorderError> {
        config.validate().map_err(RecorderError::Configuration)?;
        let target = OutputTarget::prepare(&config.output_directory, config.format, Local::now())?;
        let plan = GraphPlan::for_format(config.format, &target);
        log::info!("Recording {} to {}", config.format, target.path().display());

        let (events_tx, events_rx) = unbounded();
        let (quit_tx, quit_rx) = bounded(1);
        let watchdog = config.max_duration.and_then(DurationWatchdog::new);
        let tick_interval = watchdog.as_ref().map(|_| config.tick_interval);

        let recorder = Arc::new(Self {
            linker: PadLinker::new(plan.dynamic.clone()),
            lifecycle: Lifecycle::new(delegate.clone()),
            coordinator: ShutdownCoordinator::new(quit_tx),
            event_loop: EventLoop::new(events_rx, quit_rx, tick_interval),
            events: events_tx,
            watchdog,
            engine,
            config,
            target,
            plan,
            delegate,
            last_position: Mutex::new(None),
        });

        if let Err(err) = recorder.prepare() {
            recorder.fail(err.clone());
            return Err(err);
        }
        Ok(recorder)
    }

    fn prepare(self: &Arc<Self>) -> Result<(), RecorderError> {
        GraphAssembler::assemble(&*self.engine, &self.plan)?;
        self.engine.connect_events(self.event_callback());
        self.lifecycle.request(&*self.engine, PipelineState::Prepared)?;
        Ok(())
    }

    /// Engine-facing callback. Pad notifications are handled on the calling
    /// (streaming) thread; bus messages are queued for the event loop.
    fn event_callback(self: &Arc<Self>) -> EventCallback {
        let recorder: Weak<Self> = Arc::downgrade(self);
        Arc::new(move |event| {
            let Some(recorder) = recorder.upgrade() else {
                return;
            };
            match event {
                EngineEvent::PadAdded(pad) => {
                    if let Err(err) = recorder.link_pad(&pad) {
                        recorder.defer_failure(&pad, err);
                    }
                }
                other => {
                    if recorder.events.send(other).is_err() {
                        log::debug!("Event loop gone, dropping event");
                    }
                }
            }
        })
    }

    /// Move the pipeline to `Running`. An `Async` outcome is not waited on.
    pub fn start(&self) -> Result<StateChangeOutcome, RecorderError> {
        self.lifecycle
            .request(&*self.engine, PipelineState::Running)
            .inspect_err(|err| self.fail(err.clone()))
    }

    /// Run the event loop on the current thread until shutdown.
    pub fn run(&self) {
        if !self.coordinator.enter_loop() {
            log::debug!("Shutdown before the event loop started");
            return;
        }
        self.event_loop
            .run(|| self.coordinator.is_loop_active(), |event| self.handle_event(event));
    }

    /// Dispatch one event: one handler per variant.
    pub fn handle_event(&self, event: EngineEvent) -> Continuation {
        match event {
            EngineEvent::PadAdded(pad) => {
                self.on_pad_added(&pad);
                Continuation::Continue
            }
            EngineEvent::Message(message) => {
                self.on_message(&message);
                Continuation::Continue
            }
            EngineEvent::Tick => self.on_tick(),
        }
    }

    fn on_pad_added(&self, pad: &PadRef) {
        if let Err(err) = self.link_pad(pad) {
            self.fail(err);
        }
    }

    fn link_pad(&self, pad: &PadRef) -> Result<(), RecorderError> {
        if self.linker.on_pad_added(&*self.engine, pad)? == PadLinkOutcome::Ignored {
            log::debug!("Ignoring new pad {}", pad);
        }
        Ok(())
    }

    /// A link failure on an engine streaming thread. Stopping the pipeline
    /// from its own streaming thread would deadlock, so the failure is
    /// recorded and an error is posted to the event loop, which tears down.
    fn defer_failure(&self, pad: &PadRef, err: RecorderError) {
        log::error!("{}", err);
        if let Some(ref delegate) = self.delegate {
            delegate.on_error(&err);
        }
        let message = BusMessage::error(pad.node.clone(), err.to_string(), None);
        self.coordinator.note_reason(ShutdownReason::Fatal(err));
        if self.events.send(EngineEvent::Message(message)).is_err() {
            log::debug!("Event loop gone, dropping link failure");
        }
    }

    fn on_message(&self, message: &BusMessage) {
        if let Dispatch::Shutdown(reason) = EventDispatcher::dispatch(message) {
            self.shutdown(reason);
        }
    }

    fn on_tick(&self) -> Continuation {
        let Some(ref watchdog) = self.watchdog else {
            return Continuation::RemoveTimer;
        };
        let decision = watchdog.on_tick(|| {
            let position = self.engine.query_position();
            if position.is_some() {
                *self.last_position.lock() = position;
            }
            if let Some(ref delegate) = self.delegate {
                delegate.on_position(position);
            }
            position
        });
        match decision {
            TickDecision::Continue => Continuation::Continue,
            TickDecision::Stop => {
                self.shutdown(ShutdownReason::DurationElapsed(watchdog.limit()));
                Continuation::RemoveTimer
            }
        }
    }

    /// Report a fatal error and tear down.
    fn fail(&self, err: RecorderError) {
        log::error!("{}", err);
        if let Some(ref delegate) = self.delegate {
            delegate.on_error(&err);
        }
        self.shutdown(ShutdownReason::Fatal(err));
    }

    /// Idempotent teardown, callable from any thread and any trigger.
    ///
    /// Returns `true` for the call that performed it.
    pub fn shutdown(&self, reason: ShutdownReason) -> bool {
        if self.coordinator.trigger(reason) {
            if self.lifecycle.current() == PipelineState::Running {
                if let Some(position) = self.engine.query_position() {
                    *self.last_position.lock() = Some(position);
                }
            }
            if let (Some(delegate), Some(reason)) = (&self.delegate, self.coordinator.reason()) {
                delegate.on_shutdown(&reason);
            }
        }
        self.coordinator.teardown(&*self.engine, &self.lifecycle)
    }

    /// Complete the session: make sure teardown ran and finished, then
    /// describe the recording.
    pub fn finish(&self) -> RecordingResult {
        if !self.coordinator.is_triggered() {
            self.shutdown(ShutdownReason::Interrupted);
        }
        self.coordinator.wait_finished();

        let reason = self
            .coordinator
            .reason()
            .unwrap_or(ShutdownReason::Interrupted);
        let file_path = self.target.path();
        let position = *self.last_position.lock();
        let checksum = if file_path.exists() {
            checksum::sha256_file(&file_path)
                .inspect_err(|e| log::warn!("{}", e))
                .ok()
        } else {
            None
        };

        let metadata = RecordingMetadata::new(
            &file_path.to_string_lossy(),
            self.config.format,
            position,
            &reason,
            checksum,
        );
        if self.config.write_metadata {
            match metadata::write_metadata(&metadata, &file_path) {
                Ok(path) => log::info!("Wrote {}", path.display()),
                Err(e) => log::error!("{}", e),
            }
        }

        let result = RecordingResult {
            file_path,
            position,
            reason,
            metadata,
        };
        if let Some(ref delegate) = self.delegate {
            delegate.on_recording_finished(&result);
        }
        result
    }

    pub fn state(&self) -> PipelineState {
        self.lifecycle.current()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn target(&self) -> &OutputTarget {
        &self.target
    }

    pub fn plan(&self) -> &GraphPlan {
        &self.plan
    }

    pub fn config(&self) -> &RecorderConfiguration {
        &self.config
    }

    pub fn watchdog(&self) -> Option<&DurationWatchdog> {
        self.watchdog.as_ref()
    }

    pub fn shutdown_reason(&self) -> Option<ShutdownReason> {
        self.coordinator.reason()
    }

    pub fn is_finished(&self) -> bool {
        self.coordinator.is_finished()
    }
}

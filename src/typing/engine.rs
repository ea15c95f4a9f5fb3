//! Typing engine.
//!
//! A [`TypingEngine`] owns one [`TypingState`] and one display target. Once
//! started it runs as a single tokio task that ticks, renders, then sleeps
//! for the delay the tick returned. Only that task touches the state, and
//! it never has more than one tick pending. The returned [`EngineHandle`]
//! cancels the loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::phrases::PhraseList;
use super::state::{Milestone, Tick, TypingState};
use super::timing::Timing;
use crate::display::DisplayTarget;
use crate::error::RenderError;
use crate::observability::metrics;
use crate::observability::{Event, EventEmitter};

/// Why an engine stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum StopReason {
    /// Its handle (or the owning run) cancelled it.
    Cancelled,
    /// The display target failed; the engine stopped rendering.
    RenderFailed(String),
    /// The engine task panicked or was aborted.
    Aborted(String),
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cancelled => f.write_str("cancelled"),
            Self::RenderFailed(msg) => write!(f, "render failed: {msg}"),
            Self::Aborted(msg) => write!(f, "aborted: {msg}"),
        }
    }
}

/// Summary returned when an engine stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineReport {
    /// Display target name.
    pub display: String,
    /// Ticks performed.
    pub ticks: u64,
    /// Phrases fully typed and deleted.
    pub cycles: u64,
    /// Why the engine stopped.
    pub stop_reason: StopReason,
}

/// Typing effect bound to one display target.
pub struct TypingEngine<D> {
    display: D,
    phrases: PhraseList,
    timing: Timing,
    state: TypingState,
    cycles: u64,
    events: Option<Arc<EventEmitter>>,
}

impl<D: DisplayTarget> std::fmt::Debug for TypingEngine<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypingEngine")
            .field("display", &self.display.name())
            .field("phrases", &self.phrases.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<D: DisplayTarget + 'static> TypingEngine<D> {
    /// Binds an engine to a display target.
    ///
    /// Returns `None` without raising an error when either the display
    /// target or the phrase list is missing; such an engine never starts.
    #[must_use]
    pub fn attach(display: Option<D>, phrases: Option<PhraseList>, timing: Timing) -> Option<Self> {
        let Some(display) = display else {
            debug!("no display target; typing engine not started");
            return None;
        };
        let Some(phrases) = phrases else {
            let display_name = display.name();
            debug!(display = display_name, "no phrases; typing engine not started");
            return None;
        };
        Some(Self::new(display, phrases, timing))
    }

    /// Creates an engine in the initial typing state.
    #[must_use]
    pub fn new(display: D, phrases: PhraseList, timing: Timing) -> Self {
        Self {
            display,
            phrases,
            timing,
            state: TypingState::new(),
            cycles: 0,
            events: None,
        }
    }

    /// Emits lifecycle and milestone events to `emitter`.
    #[must_use]
    pub fn with_events(mut self, emitter: Arc<EventEmitter>) -> Self {
        self.events = Some(emitter);
        self
    }

    /// Current state machine.
    #[must_use]
    pub const fn state(&self) -> &TypingState {
        &self.state
    }

    /// Display target name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display.name()
    }

    /// Performs one tick: advances the state machine and renders its text.
    ///
    /// Returns the tick so the caller can wait `tick.delay` before the next
    /// one.
    ///
    /// # Errors
    ///
    /// Returns the display target's error if rendering fails. The state has
    /// already advanced when that happens.
    pub async fn tick(&mut self) -> Result<Tick, RenderError> {
        let tick = self.state.tick(&self.phrases, &self.timing);
        trace!(
            display = self.display.name(),
            text = %tick.text,
            stage = %tick.stage,
            delay_ms = tick.delay.as_millis(),
            "tick"
        );

        if let Err(e) = self.display.render(&tick.text).await {
            metrics::record_render_error(self.display.name());
            return Err(e);
        }
        metrics::record_tick(self.display.name());

        if let Some(milestone) = tick.milestone {
            self.on_milestone(milestone);
        }
        Ok(tick)
    }

    fn on_milestone(&mut self, milestone: Milestone) {
        match milestone {
            Milestone::PhraseCompleted { phrase_index } => {
                debug!(display = self.display.name(), phrase_index, "phrase typed");
                self.emit(Event::PhraseCompleted {
                    timestamp: Utc::now(),
                    display: self.display.name().to_owned(),
                    phrase_index,
                    phrase: self.phrases.get(phrase_index).to_owned(),
                });
            }
            Milestone::PhraseAdvanced { from, to } => {
                self.cycles += 1;
                metrics::record_cycle(self.display.name());
                debug!(display = self.display.name(), from, to, "phrase advanced");
                self.emit(Event::PhraseAdvanced {
                    timestamp: Utc::now(),
                    display: self.display.name().to_owned(),
                    from,
                    to,
                });
            }
        }
    }

    fn emit(&self, event: Event) {
        if let Some(events) = &self.events {
            events.emit(event);
        }
    }

    /// Runs the tick loop in the current task until `cancel` fires or the
    /// display fails.
    pub async fn run(mut self, cancel: CancellationToken) -> EngineReport {
        info!(
            display = self.display.name(),
            phrases = self.phrases.len(),
            "typing engine started"
        );
        self.emit(Event::EngineStarted {
            timestamp: Utc::now(),
            display: self.display.name().to_owned(),
            phrase_count: self.phrases.len(),
        });
        metrics::engine_started();

        let stop_reason = loop {
            if cancel.is_cancelled() {
                break StopReason::Cancelled;
            }

            let delay = match self.tick().await {
                Ok(tick) => tick.delay,
                Err(e) => {
                    warn!(display = self.display.name(), error = %e, "display failed; stopping engine");
                    break StopReason::RenderFailed(e.to_string());
                }
            };

            tokio::select! {
                () = cancel.cancelled() => break StopReason::Cancelled,
                () = sleep_or_yield(delay) => {}
            }
        };

        if stop_reason == StopReason::Cancelled {
            if let Err(e) = self.display.finish().await {
                debug!(display = self.display.name(), error = %e, "display finish failed");
            }
        }
        metrics::engine_stopped();

        let report = EngineReport {
            display: self.display.name().to_owned(),
            ticks: self.state.ticks(),
            cycles: self.cycles,
            stop_reason,
        };
        info!(
            display = %report.display,
            ticks = report.ticks,
            cycles = report.cycles,
            reason = %report.stop_reason,
            "typing engine stopped"
        );
        self.emit(Event::EngineStopped {
            timestamp: Utc::now(),
            display: report.display.clone(),
            ticks: report.ticks,
            cycles: report.cycles,
            reason: report.stop_reason.to_string(),
        });
        report
    }

    /// Spawns the tick loop and returns a handle to stop it.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn start(self) -> EngineHandle {
        let cancel = CancellationToken::new();
        let display = self.display.name().to_owned();
        let join = tokio::spawn(self.run(cancel.clone()));
        EngineHandle {
            display,
            cancel,
            join,
        }
    }
}

/// Zero delays still yield so a misconfigured engine cannot starve the
/// runtime.
async fn sleep_or_yield(delay: Duration) {
    if delay.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(delay).await;
    }
}

/// Handle to a running engine.
///
/// Dropping the handle does not stop the engine; call [`stop`](Self::stop).
#[derive(Debug)]
pub struct EngineHandle {
    display: String,
    cancel: CancellationToken,
    join: JoinHandle<EngineReport>,
}

impl EngineHandle {
    /// Display target name of the engine.
    #[must_use]
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Requests the engine to stop. No further text is rendered once the
    /// engine observes the request.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Token that stops the engine when cancelled.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether the engine task has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Waits for the engine to end and returns its report.
    pub async fn join(self) -> EngineReport {
        match self.join.await {
            Ok(report) => report,
            Err(e) => {
                warn!(display = %self.display, error = %e, "typing engine task ended abnormally");
                EngineReport {
                    display: self.display,
                    ticks: 0,
                    cycles: 0,
                    stop_reason: StopReason::Aborted(e.to_string()),
                }
            }
        }
    }

    /// Stops the engine and waits for its report.
    pub async fn shutdown(self) -> EngineReport {
        self.stop();
        self.join().await
    }
}

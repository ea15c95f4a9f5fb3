//! `run` command: animate every configured display until stopped.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::cli::args::RunArgs;
use crate::cli::commands::{SingleDisplay, load_source};
use crate::config::schema::TypewriterConfig;
use crate::display;
use crate::error::{RenderError, TypewriterError};
use crate::observability::{Event, EventEmitter};
use crate::typing::{EngineReport, StopReason, TypingEngine};

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    /// The process was asked to stop.
    Cancelled,
    /// `--duration` elapsed.
    DurationElapsed,
    /// Every engine stopped on its own.
    EnginesFinished,
}

impl RunEnd {
    /// Stable label used in logs and events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::DurationElapsed => "duration_elapsed",
            Self::EnginesFinished => "engines_finished",
        }
    }
}

/// Outcome of [`execute`].
#[derive(Debug)]
pub struct RunSummary {
    /// Run identifier carried by `RunStarted`/`RunStopped` events.
    pub run_id: Uuid,
    /// Why the run ended.
    pub end: RunEnd,
    /// One report per started engine, in completion order.
    pub reports: Vec<EngineReport>,
    /// Displays whose engine never started.
    pub skipped: Vec<String>,
}

/// Start every configured display.
///
/// # Errors
///
/// Returns a config error if the source fails to load, an I/O error if the
/// events file or metrics listener cannot be opened, and a render error if
/// any engine stopped because its display failed.
pub async fn run(args: &RunArgs, cancel: CancellationToken) -> Result<(), TypewriterError> {
    if let Some(port) = args.metrics_port {
        crate::observability::init_metrics(Some(port))?;
        tracing::info!(port, "Prometheus metrics endpoint started");
    }

    let config = load_source(
        &args.source,
        SingleDisplay {
            prefix: args.prefix.clone(),
            cursor: args.cursor.clone(),
            output: args.output.clone(),
        },
    )?;

    let events = match args.events {
        Some(ref path) => EventEmitter::from_file(path)?,
        None => EventEmitter::noop(),
    };

    let summary = execute(&config, Arc::new(events), args.duration, cancel).await;

    for report in &summary.reports {
        tracing::info!(
            display = %report.display,
            ticks = report.ticks,
            cycles = report.cycles,
            reason = %report.stop_reason,
            "engine report"
        );
    }

    summary
        .reports
        .iter()
        .find_map(|r| match &r.stop_reason {
            StopReason::RenderFailed(msg) => Some(Err(RenderError::Failed {
                display: r.display.clone(),
                message: msg.clone(),
            }
            .into())),
            _ => None,
        })
        .unwrap_or(Ok(()))
}

/// Starts one engine per display and waits for cancellation, the optional
/// duration, or every engine to stop. All engines are stopped before
/// returning.
pub async fn execute(
    config: &TypewriterConfig,
    events: Arc<EventEmitter>,
    duration: Option<Duration>,
    cancel: CancellationToken,
) -> RunSummary {
    let run_id = Uuid::new_v4();
    events.emit(Event::RunStarted {
        timestamp: Utc::now(),
        run_id,
        displays: config.displays.len(),
    });

    let engines_cancel = cancel.child_token();
    let mut set = JoinSet::new();
    let mut skipped = Vec::new();

    for display_config in &config.displays {
        let target = display::open(
            &display_config.name,
            &display_config.output,
            display_config.decoration(),
        );
        let engine = TypingEngine::attach(
            Some(target),
            config.phrases_for(display_config),
            config.timing_for(display_config),
        );
        match engine {
            Some(engine) => {
                set.spawn(engine.with_events(Arc::clone(&events)).run(engines_cancel.clone()));
            }
            None => {
                tracing::warn!(display = %display_config.name, "no phrases, display not started");
                events.emit(Event::EngineSkipped {
                    timestamp: Utc::now(),
                    display: display_config.name.clone(),
                    reason: "no phrases".to_string(),
                });
                skipped.push(display_config.name.clone());
            }
        }
    }

    tracing::info!(%run_id, engines = set.len(), skipped = skipped.len(), "run started");

    let mut reports = Vec::new();
    let end = if set.is_empty() {
        RunEnd::EnginesFinished
    } else {
        tokio::select! {
            () = cancel.cancelled() => RunEnd::Cancelled,
            () = sleep_for(duration) => RunEnd::DurationElapsed,
            () = drain(&mut set, &mut reports) => RunEnd::EnginesFinished,
        }
    };

    engines_cancel.cancel();
    drain(&mut set, &mut reports).await;

    tracing::info!(%run_id, reason = end.as_str(), "run stopped");
    events.emit(Event::RunStopped {
        timestamp: Utc::now(),
        run_id,
        reason: end.as_str().to_string(),
    });

    RunSummary {
        run_id,
        end,
        reports,
        skipped,
    }
}

async fn sleep_for(duration: Option<Duration>) {
    match duration {
        Some(d) => tokio::time::sleep(d).await,
        None => std::future::pending().await,
    }
}

/// Collects reports until the set is empty. Cancel-safe.
async fn drain(set: &mut JoinSet<EngineReport>, reports: &mut Vec<EngineReport>) {
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(report) => reports.push(report),
            Err(e) => tracing::warn!(error = %e, "typing engine task ended abnormally"),
        }
    }
}

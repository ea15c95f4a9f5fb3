//! `preview` command: print the frames a run would render.
//!
//! Uses the virtual clock, so output is deterministic and nothing waits.

use std::fmt::Write as _;
use std::time::Duration;

use serde::Serialize;

use crate::cli::args::{OutputFormat, PreviewArgs};
use crate::cli::commands::{SingleDisplay, load_source};
use crate::config::schema::TypewriterConfig;
use crate::error::TypewriterError;
use crate::typing::{Frame, Timeline};

/// Simulated frames for one display.
#[derive(Debug, Serialize)]
pub struct DisplayPreview {
    /// Display name.
    pub display: String,
    /// Text rendered before the phrase.
    pub prefix: String,
    /// Cursor glyph after the phrase.
    pub cursor: String,
    /// Whether the display's engine would not start.
    pub skipped: bool,
    /// Time to cycle through every phrase once.
    pub loop_ms: u64,
    /// Frames inside the window.
    pub frames: Vec<Frame>,
}

/// Print the simulated frames of every display.
///
/// # Errors
///
/// Returns a usage error for an empty window, a config error if the source
/// fails to load, or a JSON error if serialization fails.
pub fn run(args: &PreviewArgs) -> Result<(), TypewriterError> {
    if args.duration.is_zero() {
        return Err(TypewriterError::Usage(
            "--duration must be greater than zero".to_string(),
        ));
    }

    let config = load_source(&args.source, SingleDisplay::default())?;
    let previews = simulate(&config, args.duration);

    match args.format {
        OutputFormat::Human => print!("{}", render_human(&previews)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&previews)?),
    }
    Ok(())
}

/// Runs a [`Timeline`] for each display over `window`.
#[must_use]
pub fn simulate(config: &TypewriterConfig, window: Duration) -> Vec<DisplayPreview> {
    config
        .displays
        .iter()
        .map(|display| {
            let mut preview = DisplayPreview {
                display: display.name.clone(),
                prefix: display.prefix.clone(),
                cursor: display.cursor.clone(),
                skipped: true,
                loop_ms: 0,
                frames: Vec::new(),
            };
            if let Some(phrases) = config.phrases_for(display) {
                let mut timeline = Timeline::new(phrases, config.timing_for(display));
                preview.skipped = false;
                preview.loop_ms = millis(timeline.loop_duration());
                preview.frames = timeline.run_for(window);
            }
            preview
        })
        .collect()
}

fn render_human(previews: &[DisplayPreview]) -> String {
    let mut out = String::new();
    for preview in previews {
        if preview.skipped {
            let _ = writeln!(out, "{}: skipped (no phrases)", preview.display);
            continue;
        }
        let _ = writeln!(
            out,
            "{} (loop {})",
            preview.display,
            humantime::format_duration(Duration::from_millis(preview.loop_ms))
        );
        for frame in &preview.frames {
            let _ = writeln!(
                out,
                "{:>8}ms  {:<14} {}{}{}",
                millis(frame.at),
                frame.stage.as_str(),
                preview.prefix,
                frame.text,
                preview.cursor
            );
        }
    }
    out
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

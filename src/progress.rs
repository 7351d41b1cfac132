//! Progress reporting
//!
//! Progress is an append-only, best-effort log of JSON objects, one per line:
//!
//! ```text
//! {"stage":"Analyzing music","progress":0.1}
//! {"stage":"Error","progress":0.0,"error":"Invalid input: File not found: song.mp3"}
//! ```

use serde::{Deserialize, Serialize};
use std::io::Write;

/// Pipeline milestone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Audio analysis started
    AnalyzingMusic,
    /// Audio analysis failed, estimating from metadata
    AnalyzingMusicFallback,
    /// Generation started
    GeneratingMoves,
    /// Pose model loading
    LoadingModel,
    /// Pose model inference
    RunningInference,
    /// Projecting model output to 2D
    Projecting,
    /// Template sequencer in use
    GeneratingTemplateMoves,
    /// Writing the choreography artifact
    SavingChoreography,
    /// Run finished
    Done,
}

impl Stage {
    /// Label written to the progress stream
    pub fn label(&self) -> &'static str {
        match self {
            Stage::AnalyzingMusic => "Analyzing music",
            Stage::AnalyzingMusicFallback => "Analyzing music (fallback)",
            Stage::GeneratingMoves => "Generating moves",
            Stage::LoadingModel => "Loading EDGE model",
            Stage::RunningInference => "Running EDGE inference",
            Stage::Projecting => "Projecting to 2D",
            Stage::GeneratingTemplateMoves => "Generating moves (template mode)",
            Stage::SavingChoreography => "Saving choreography",
            Stage::Done => "Done",
        }
    }

    /// Approximate completion fraction
    pub fn progress(&self) -> f64 {
        match self {
            Stage::AnalyzingMusic => 0.1,
            Stage::AnalyzingMusicFallback => 0.15,
            Stage::GeneratingMoves => 0.3,
            Stage::LoadingModel => 0.35,
            Stage::RunningInference => 0.5,
            Stage::Projecting => 0.75,
            Stage::GeneratingTemplateMoves => 0.4,
            Stage::SavingChoreography => 0.9,
            Stage::Done => 1.0,
        }
    }
}

/// Label of the terminal error event
pub const ERROR_STAGE: &str = "Error";

/// One line of the progress stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Stage label
    pub stage: String,

    /// Completion fraction in [0, 1]
    pub progress: f64,

    /// Error description, only on the terminal error event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProgressEvent {
    /// Milestone event
    pub fn stage(stage: Stage) -> Self {
        Self {
            stage: stage.label().to_string(),
            progress: stage.progress(),
            error: None,
        }
    }

    /// Terminal error event
    pub fn error(description: impl Into<String>) -> Self {
        Self {
            stage: ERROR_STAGE.to_string(),
            progress: 0.0,
            error: Some(description.into()),
        }
    }

    /// True for the terminal error event
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Destination for progress events
pub trait ProgressSink {
    /// Record one event
    fn emit(&mut self, event: ProgressEvent);

    /// Record a milestone
    fn stage(&mut self, stage: Stage) {
        self.emit(ProgressEvent::stage(stage));
    }
}

/// Collects events in memory
impl ProgressSink for Vec<ProgressEvent> {
    fn emit(&mut self, event: ProgressEvent) {
        self.push(event);
    }
}

/// Writes events as JSON lines, flushing after each one
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the wrapped writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_event(&mut self, event: &ProgressEvent) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

impl JsonLinesSink<std::io::Stdout> {
    /// Sink on the process's standard output
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ProgressSink for JsonLinesSink<W> {
    fn emit(&mut self, event: ProgressEvent) {
        log::debug!("Progress: {} ({:.2})", event.stage, event.progress);
        // Best effort: a closed stdout must not abort generation
        if let Err(e) = self.write_event(&event) {
            log::warn!("Failed to write progress event '{}': {}", event.stage, e);
        }
    }
}

/// Events held back until their producer commits to them
///
/// The pose model tier reports its milestones here. They are forwarded only
/// if the tier succeeds, so a failed attempt leaves no trace in the stream and
/// the reported progress never goes backwards.
#[derive(Debug, Default)]
pub struct StagedProgress {
    events: Vec<ProgressEvent>,
}

impl StagedProgress {
    /// Empty staging area
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward all staged events to `sink`
    pub fn commit(self, sink: &mut dyn ProgressSink) {
        for event in self.events {
            sink.emit(event);
        }
    }

    /// Drop all staged events
    pub fn discard(self) {
        if !self.events.is_empty() {
            log::debug!("Discarding {} staged progress events", self.events.len());
        }
    }

    /// Number of staged events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if nothing is staged
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl ProgressSink for StagedProgress {
    fn emit(&mut self, event: ProgressEvent) {
        self.events.push(event);
    }
}

//! Event and message types for the orchestrator
//!
//! Workers report through one typed channel and never touch session
//! state; the front-end observes through a broadcast of notifications.

use crate::asr::RecognitionResult;
use crate::config::Config;
use crate::intent::Intent;
use std::time::Instant;

/// A loudness sample for the visualizer feed
#[derive(Debug, Clone, Copy)]
pub struct AudioLevel {
    /// Bounded 0.0..=1.0 loudness
    pub value: f32,
    pub at: Instant,
}

impl AudioLevel {
    pub fn now(value: f32) -> Self {
        Self {
            value,
            at: Instant::now(),
        }
    }
}

/// Events delivered from workers and control surfaces
#[derive(Debug, Clone)]
pub enum AssistantEvent {
    // Wake word worker
    WakeDetected,
    WakeFault(String),

    // Command worker
    CaptureStarted,
    CommandOutcome(RecognitionResult),

    // Visualizer feed
    Level(AudioLevel),

    // Speech synthesizer
    SpeechStarted,
    SpeechError(String),
    SpeechFinished,

    // Timer handler
    TimerElapsed(String),

    // Control surface
    Activate,
    SettingsApplied(Config),
    ClearHistory,
    ShutdownRequested,
}

/// A response queued for the speech synthesizer
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub text: String,
    /// Playback volume in 0.0..=1.0
    pub volume: f32,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>, volume: f32) -> Self {
        Self {
            text: text.into(),
            volume: volume.clamp(0.0, 1.0),
        }
    }
}

/// What the session reducer asks the driver to do after an event
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    PauseWake,
    ResumeWake,
    /// Reconcile the wake word worker with the current settings,
    /// restarting it after a fault or a settings change
    RestartWake,
    StartCommandCapture,
    Dispatch(Intent),
    Speak(SpeechRequest),
    Notify(Notification),
    Quit,
}

/// Observable assistant activity for the UI and log sink
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Human-readable state label ("Listening…", "Processing…", "Ready")
    Status(&'static str),
    /// Recognized command text
    Transcript(String),
    /// Response text about to be spoken
    Response(String),
    /// Loudness sample in 0.0..=1.0
    Level(f32),
}

//! Speech Recognition
//!
//! Recognition is one opaque blocking call per phrase: capture from the
//! microphone, transcribe, report the outcome. Everything the service
//! can say about the audio lands in `RecognitionResult`; an `Err` from
//! `listen` means the microphone itself failed.

use crate::audio::PhraseWindow;
use crate::config::Config;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

pub mod whisper;

/// Outcome of one recognition attempt
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionResult {
    /// Transcribed speech
    Recognized(String),
    /// Audio captured but not intelligible (or nothing was said)
    Unrecognized,
    /// Recognition backend unreachable or failing
    ServiceError(String),
}

/// One captured utterance: recognition outcome plus clip loudness
#[derive(Debug, Clone)]
pub struct Utterance {
    pub outcome: RecognitionResult,
    /// Bounded 0.0..=1.0 loudness of the raw clip, for the visualizer
    pub level: f32,
}

impl Utterance {
    pub fn silent(outcome: RecognitionResult) -> Self {
        Self {
            outcome,
            level: 0.0,
        }
    }
}

/// One blocking listen-and-transcribe cycle
pub trait Recognizer {
    /// Capture a single phrase and transcribe it. Blocks the calling
    /// thread for at most the window's speech timeout plus phrase limit.
    fn listen(&mut self, window: &PhraseWindow) -> Result<Utterance>;
}

/// Creates recognizers on the worker thread that will use them; the
/// microphone stream must live where it is polled.
pub trait RecognizerFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn Recognizer>>;
}

/// Factory for the configured recognition backend
pub fn create_factory(config: &Config, device_index: Option<usize>) -> Arc<dyn RecognizerFactory> {
    info!("🛠️ Recognition backend: {}", config.recognizer_url);
    Arc::new(whisper::WhisperFactory::new(config, device_index))
}

//! One-shot command capture worker
//!
//! Spawned after a wake detection (or manual activation), captures a
//! single phrase and reports exactly one terminal outcome. Capture
//! problems are folded into that outcome rather than raised separately,
//! so the orchestrator always gets its answer.

use crate::asr::{RecognitionResult, RecognizerFactory};
use crate::audio::PhraseWindow;
use crate::orchestrator::events::{AssistantEvent, AudioLevel};
use crate::workers::Worker;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

pub struct CommandWorker {
    handle: Option<JoinHandle<()>>,
}

impl CommandWorker {
    /// Capture one phrase within `window` and report the outcome.
    pub fn spawn(
        factory: Arc<dyn RecognizerFactory>,
        window: PhraseWindow,
        events: UnboundedSender<AssistantEvent>,
    ) -> Self {
        let handle = thread::spawn(move || {
            let _ = events.send(AssistantEvent::CaptureStarted);
            let outcome = capture(factory, &window, &events);
            let _ = events.send(AssistantEvent::CommandOutcome(outcome));
        });

        Self {
            handle: Some(handle),
        }
    }
}

impl Worker for CommandWorker {
    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn is_alive(&self) -> bool {
        self.handle.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }
}

impl Drop for CommandWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn capture(
    factory: Arc<dyn RecognizerFactory>,
    window: &PhraseWindow,
    events: &UnboundedSender<AssistantEvent>,
) -> RecognitionResult {
    let mut recognizer = match factory.create() {
        Ok(r) => r,
        Err(e) => {
            return RecognitionResult::ServiceError(format!("microphone unavailable: {e}"));
        }
    };

    info!("🎤 Listening for a command...");
    match recognizer.listen(window) {
        Ok(utterance) => {
            if utterance.level > 0.0 {
                let _ = events.send(AssistantEvent::Level(AudioLevel::now(utterance.level)));
            }
            debug!("🎤 Command capture finished");
            utterance.outcome
        }
        Err(e) => RecognitionResult::ServiceError(e.to_string()),
    }
}

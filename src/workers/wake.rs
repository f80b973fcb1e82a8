//! Wake phrase detection worker
//!
//! Long-running loop: capture a bounded phrase, transcribe it, compare
//! against the configured wake phrases. While paused the loop idles on
//! a short sleep instead of holding the microphone. Recognition
//! hiccups are logged and the loop keeps going; only a dead microphone
//! is reported as a fault.

use crate::asr::{RecognitionResult, RecognizerFactory};
use crate::audio::PhraseWindow;
use crate::orchestrator::events::{AssistantEvent, AudioLevel};
use crate::workers::Worker;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

/// Poll interval while paused
const IDLE_POLL: Duration = Duration::from_millis(100);
/// Cool-off after a capture fault before retrying the microphone
const FAULT_BACKOFF: Duration = Duration::from_millis(500);
/// How long to wait for speech to start in one listen attempt
const WAKE_SPEECH_TIMEOUT: Duration = Duration::from_secs(2);
/// Upper bound on one captured phrase
const WAKE_PHRASE_LIMIT: Duration = Duration::from_secs(5);

pub struct WakeWordWorker {
    running: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl WakeWordWorker {
    /// Spawn the listening loop. The recognizer itself is created on
    /// the worker thread, so audio streams never cross threads.
    pub fn spawn(
        factory: Arc<dyn RecognizerFactory>,
        wake_phrases: &[String],
        events: UnboundedSender<AssistantEvent>,
    ) -> Self {
        Self::spawn_inner(factory, wake_phrases, events, false)
    }

    /// Spawn with listening suspended, for when the microphone is
    /// already held elsewhere. The flag is set before the thread
    /// starts, so not even one listen attempt can slip through.
    pub fn spawn_paused(
        factory: Arc<dyn RecognizerFactory>,
        wake_phrases: &[String],
        events: UnboundedSender<AssistantEvent>,
    ) -> Self {
        Self::spawn_inner(factory, wake_phrases, events, true)
    }

    fn spawn_inner(
        factory: Arc<dyn RecognizerFactory>,
        wake_phrases: &[String],
        events: UnboundedSender<AssistantEvent>,
        start_paused: bool,
    ) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let paused = Arc::new(AtomicBool::new(start_paused));

        let thread_running = Arc::clone(&running);
        let thread_paused = Arc::clone(&paused);
        let phrases: Vec<String> = wake_phrases.iter().map(|p| p.to_lowercase()).collect();

        let handle = thread::spawn(move || {
            listen_loop(factory, phrases, events, thread_running, thread_paused);
        });

        Self {
            running,
            paused,
            handle: Some(handle),
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}

impl Worker for WakeWordWorker {
    fn pause(&self) {
        if !self.paused.swap(true, Ordering::SeqCst) {
            debug!("🔇 Wake word listening paused");
        }
    }

    fn resume(&self) {
        if self.paused.swap(false, Ordering::SeqCst) {
            debug!("🔊 Wake word listening resumed");
        }
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn is_alive(&self) -> bool {
        self.handle.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }
}

impl Drop for WakeWordWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn listen_loop(
    factory: Arc<dyn RecognizerFactory>,
    phrases: Vec<String>,
    events: UnboundedSender<AssistantEvent>,
    running: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
) {
    let mut recognizer = match factory.create() {
        Ok(r) => r,
        Err(e) => {
            error!("❌ Wake word worker could not start: {}", e);
            let _ = events.send(AssistantEvent::WakeFault(format!(
                "microphone unavailable: {e}"
            )));
            return;
        }
    };

    let window = PhraseWindow::new(WAKE_SPEECH_TIMEOUT, WAKE_PHRASE_LIMIT);
    info!("👂 Wake word worker started");

    while running.load(Ordering::SeqCst) {
        if paused.load(Ordering::SeqCst) {
            thread::sleep(IDLE_POLL);
            continue;
        }

        match recognizer.listen(&window) {
            Ok(utterance) => {
                if utterance.level > 0.0 {
                    let _ = events.send(AssistantEvent::Level(AudioLevel::now(utterance.level)));
                }
                match utterance.outcome {
                    RecognitionResult::Recognized(text) => {
                        let heard = text.to_lowercase();
                        if phrases.iter().any(|p| heard.contains(p.as_str())) {
                            info!("🎯 Wake phrase heard: '{}'", text);
                            // Pause before reporting so the command
                            // capture cannot race us for the mic.
                            paused.store(true, Ordering::SeqCst);
                            let _ = events.send(AssistantEvent::WakeDetected);
                        } else {
                            debug!("👂 Heard: '{}'", text);
                        }
                    }
                    // Silence is the steady state here
                    RecognitionResult::Unrecognized => {}
                    RecognitionResult::ServiceError(msg) => {
                        debug!("👂 Wake recognition unavailable: {}", msg);
                    }
                }
            }
            Err(e) => {
                warn!("⚠️ Wake word capture fault: {}", e);
                let _ = events.send(AssistantEvent::WakeFault(e.to_string()));
                thread::sleep(FAULT_BACKOFF);
            }
        }
    }

    info!("👂 Wake word worker stopped");
}

//! Speech synthesis worker
//!
//! A dedicated thread owns the voice backend and the audio output, the
//! same shape as a sound engine thread: requests come in over a
//! channel, playback happens here. One request at a time; `speak`
//! rejects while one is in flight. SpeechFinished is emitted after
//! every request, also after failures, so the orchestrator is never
//! left waiting on a phrase that died.

use crate::audio::playback;
use crate::error::{AuraError, AuraResult};
use crate::orchestrator::events::{AssistantEvent, SpeechRequest};
use crate::tts::Voice;
use crate::workers::Worker;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info};

pub struct SpeechSynthesizer {
    sender: Option<mpsc::Sender<SpeechRequest>>,
    busy: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SpeechSynthesizer {
    pub fn new(voice: Box<dyn Voice>, events: UnboundedSender<AssistantEvent>) -> Self {
        let (sender, receiver) = mpsc::channel::<SpeechRequest>();
        let busy = Arc::new(AtomicBool::new(false));
        let thread_busy = Arc::clone(&busy);

        let handle = thread::spawn(move || {
            speech_thread(voice, receiver, events, thread_busy);
        });

        Self {
            sender: Some(sender),
            busy,
            handle: Some(handle),
        }
    }

    /// Queue one phrase. Returns `SynthesizerBusy` while a request is
    /// still being rendered or played.
    pub fn speak(&self, request: SpeechRequest) -> AuraResult<()> {
        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(AuraError::SynthesizerBusy);
        }

        let Some(sender) = self.sender.as_ref() else {
            self.busy.store(false, Ordering::SeqCst);
            return Err(AuraError::Synthesizer("speech thread stopped".to_string()));
        };

        if sender.send(request).is_err() {
            self.busy.store(false, Ordering::SeqCst);
            return Err(AuraError::Synthesizer(
                "speech thread disconnected".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }
}

impl Worker for SpeechSynthesizer {
    fn stop(&mut self) {
        // Dropping the sender ends the receive loop
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn is_alive(&self) -> bool {
        self.handle.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }
}

impl Drop for SpeechSynthesizer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn scratch_wav_path() -> PathBuf {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    std::env::temp_dir().join(format!("aura_speech_{millis}.wav"))
}

fn speech_thread(
    voice: Box<dyn Voice>,
    receiver: mpsc::Receiver<SpeechRequest>,
    events: UnboundedSender<AssistantEvent>,
    busy: Arc<AtomicBool>,
) {
    info!("🔊 Speech thread started ({})", voice.name());

    while let Ok(request) = receiver.recv() {
        debug!("🗣️ Speaking: '{}'", request.text);
        let wav_path = scratch_wav_path();

        match voice.synthesize(&request.text, &wav_path) {
            Ok(()) => {
                let _ = events.send(AssistantEvent::SpeechStarted);
                if let Err(e) = playback::play_file(&wav_path, request.volume) {
                    error!("❌ Speech playback failed: {}", e);
                    let _ = events.send(AssistantEvent::SpeechError(e.to_string()));
                }
            }
            Err(e) => {
                error!("❌ Speech synthesis failed: {}", e);
                let _ = events.send(AssistantEvent::SpeechError(e.to_string()));
            }
        }

        let _ = std::fs::remove_file(&wav_path);

        // Clear busy before reporting so a queued follow-up phrase is
        // not rejected by the next speak() call.
        busy.store(false, Ordering::SeqCst);
        let _ = events.send(AssistantEvent::SpeechFinished);
    }

    info!("🔇 Speech thread stopped");
}

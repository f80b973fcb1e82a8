//! Mock speech recognition for testing
//!
//! A scripted factory hands out recognizers that replay a shared list
//! of listen outcomes, so worker and orchestrator tests run without a
//! microphone or a transcription service.

use anyhow::{anyhow, Result};
use aura::asr::{RecognitionResult, Recognizer, RecognizerFactory, Utterance};
use aura::audio::PhraseWindow;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Simulated capture time per listen call
const LISTEN_DELAY: Duration = Duration::from_millis(20);

enum ScriptedListen {
    Utterance(Utterance),
    Slow(Utterance, Duration),
    Failure(String),
}

/// Factory whose recognizers replay a scripted sequence of outcomes.
/// Steps are shared: whichever worker listens next consumes the next
/// step, exactly like workers taking turns on one microphone.
pub struct ScriptedFactory {
    script: Arc<Mutex<VecDeque<ScriptedListen>>>,
    listens: Arc<AtomicUsize>,
    created: Arc<AtomicUsize>,
    fail_create: AtomicBool,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            listens: Arc::new(AtomicUsize::new(0)),
            created: Arc::new(AtomicUsize::new(0)),
            fail_create: AtomicBool::new(false),
        }
    }

    pub fn push_recognized(&self, text: &str) {
        self.push(ScriptedListen::Utterance(Utterance {
            outcome: RecognitionResult::Recognized(text.to_string()),
            level: 0.4,
        }));
    }

    /// The next listen call holds the microphone for `delay` before
    /// the phrase comes back
    pub fn push_recognized_slow(&self, text: &str, delay: Duration) {
        self.push(ScriptedListen::Slow(
            Utterance {
                outcome: RecognitionResult::Recognized(text.to_string()),
                level: 0.4,
            },
            delay,
        ));
    }

    pub fn push_unrecognized(&self) {
        self.push(ScriptedListen::Utterance(Utterance {
            outcome: RecognitionResult::Unrecognized,
            level: 0.1,
        }));
    }

    pub fn push_service_error(&self, message: &str) {
        self.push(ScriptedListen::Utterance(Utterance {
            outcome: RecognitionResult::ServiceError(message.to_string()),
            level: 0.2,
        }));
    }

    /// The next listen call fails at the capture layer
    pub fn push_capture_failure(&self, message: &str) {
        self.push(ScriptedListen::Failure(message.to_string()));
    }

    /// Make `create` fail, as if no microphone exists
    pub fn fail_creation(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }

    /// Total listen calls across all recognizers
    pub fn listen_count(&self) -> usize {
        self.listens.load(Ordering::SeqCst)
    }

    /// How many recognizers have been created
    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    fn push(&self, step: ScriptedListen) {
        self.script.lock().unwrap().push_back(step);
    }
}

impl Default for ScriptedFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl RecognizerFactory for ScriptedFactory {
    fn create(&self) -> Result<Box<dyn Recognizer>> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(anyhow!("no microphone available"));
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedRecognizer {
            script: Arc::clone(&self.script),
            listens: Arc::clone(&self.listens),
        }))
    }
}

struct ScriptedRecognizer {
    script: Arc<Mutex<VecDeque<ScriptedListen>>>,
    listens: Arc<AtomicUsize>,
}

impl Recognizer for ScriptedRecognizer {
    fn listen(&mut self, _window: &PhraseWindow) -> Result<Utterance> {
        self.listens.fetch_add(1, Ordering::SeqCst);
        thread::sleep(LISTEN_DELAY);

        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(ScriptedListen::Utterance(utterance)) => Ok(utterance),
            Some(ScriptedListen::Slow(utterance, delay)) => {
                thread::sleep(delay);
                Ok(utterance)
            }
            Some(ScriptedListen::Failure(message)) => Err(anyhow!(message)),
            // An exhausted script behaves like a quiet room
            None => Ok(Utterance::silent(RecognitionResult::Unrecognized)),
        }
    }
}

//! Mock voice for testing
//!
//! Records all synthesized text for verification and renders a short
//! silent WAV so the playback stage has a real file to open. Playback
//! itself may still fail on machines without an audio device; the
//! speech worker reports that as a speech error and finishes anyway,
//! so tests assert on the log and on finish events, not on audibility.

use anyhow::Result;
use aura::tts::Voice;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const SAMPLE_RATE: u32 = 22050;
/// 10ms of silence keeps any real playback near-instant
const SILENT_SAMPLES: u32 = SAMPLE_RATE / 100;

/// Voice that records text instead of calling a synthesis backend
#[derive(Debug, Clone)]
pub struct MockVoice {
    spoken: Arc<Mutex<Vec<String>>>,
    should_fail: Arc<AtomicBool>,
    delay: Duration,
}

impl MockVoice {
    pub fn new() -> Self {
        Self {
            spoken: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(AtomicBool::new(false)),
            delay: Duration::ZERO,
        }
    }

    /// Slow synthesis down so overlap handling can be observed
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Handle that stays usable after the voice moves into a worker
    pub fn log(&self) -> SpokenLog {
        SpokenLog {
            spoken: Arc::clone(&self.spoken),
            should_fail: Arc::clone(&self.should_fail),
        }
    }
}

impl Default for MockVoice {
    fn default() -> Self {
        Self::new()
    }
}

impl Voice for MockVoice {
    fn synthesize(&self, text: &str, out: &Path) -> Result<()> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("mock synthesis failure"));
        }
        self.spoken.lock().unwrap().push(text.to_string());
        write_silent_wav(out)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Shared view of everything a `MockVoice` has spoken
#[derive(Debug, Clone)]
pub struct SpokenLog {
    spoken: Arc<Mutex<Vec<String>>>,
    should_fail: Arc<AtomicBool>,
}

impl SpokenLog {
    /// Get all spoken phrases
    pub fn get_spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }

    /// Check if a phrase was spoken
    pub fn was_spoken(&self, text: &str) -> bool {
        self.spoken.lock().unwrap().iter().any(|s| s.contains(text))
    }

    pub fn spoken_count(&self) -> usize {
        self.spoken.lock().unwrap().len()
    }

    /// Make every synthesis attempt fail until turned off again
    pub fn set_failing(&self, failing: bool) {
        self.should_fail.store(failing, Ordering::SeqCst);
    }
}

fn write_silent_wav(out: &Path) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(out, spec)?;
    for _ in 0..SILENT_SAMPLES {
        writer.write_sample(0i16)?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_voice_records_speech() {
        let voice = MockVoice::new();
        let log = voice.log();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("phrase.wav");

        voice.synthesize("hello", &out).unwrap();
        voice.synthesize("world", &out).unwrap();

        assert!(log.was_spoken("hello"));
        assert!(log.was_spoken("world"));
        assert_eq!(log.spoken_count(), 2);
        assert!(out.exists());
    }

    #[test]
    fn test_mock_voice_failure_records_nothing() {
        let voice = MockVoice::new();
        let log = voice.log();
        log.set_failing(true);
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("phrase.wav");

        assert!(voice.synthesize("hello", &out).is_err());
        assert_eq!(log.spoken_count(), 0);
        assert!(!out.exists());
    }
}

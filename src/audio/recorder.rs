//! Microphone phrase capture using cpal
//!
//! `PhraseRecorder` opens the input stream for the duration of one
//! capture attempt and returns an energy-gated phrase: it waits for
//! speech to begin, accumulates samples, and stops on trailing silence
//! or the phrase limit. Every attempt is bounded so workers stay
//! responsive to stop requests.

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::audio::level;

pub const SAMPLE_RATE: u32 = 16000;
pub const CHUNK_SIZE: usize = 1024;

/// Buffer poll cadence while a stream is open.
const POLL_INTERVAL: Duration = Duration::from_millis(30);
/// Silence that ends a phrase once speech has started.
const TRAILING_SILENCE: Duration = Duration::from_millis(800);
/// Captures shorter than this are noise, not speech (0.3 s at 16 kHz).
const MIN_PHRASE_SAMPLES: usize = 4800;
/// Gate applied when no ambient calibration has run.
const DEFAULT_ENERGY_THRESHOLD: f32 = 900.0;
/// Calibrated gate sits this far above measured ambient noise.
const AMBIENT_RATIO: f32 = 1.5;

/// Per-attempt capture bounds
#[derive(Debug, Clone, Copy)]
pub struct PhraseWindow {
    /// How long to wait for speech to begin before giving up
    pub speech_timeout: Duration,
    /// Maximum phrase duration once speech has begun
    pub phrase_limit: Duration,
}

impl PhraseWindow {
    pub fn new(speech_timeout: Duration, phrase_limit: Duration) -> Self {
        Self {
            speech_timeout,
            phrase_limit,
        }
    }
}

/// One-phrase-at-a-time microphone capture
pub struct PhraseRecorder {
    device_index: Option<usize>,
    threshold: f32,
}

impl PhraseRecorder {
    pub fn new(device_index: Option<usize>) -> Self {
        Self {
            device_index,
            threshold: DEFAULT_ENERGY_THRESHOLD,
        }
    }

    /// Measure ambient noise and raise the energy gate above it
    pub fn calibrate(&mut self, duration: Duration) -> Result<()> {
        let (buffer, stream) = self.open_stream()?;
        std::thread::sleep(duration);
        drop(stream);

        let samples = take_buffer(&buffer);
        let ambient = level::rms(&samples);
        self.threshold = (ambient * AMBIENT_RATIO).max(DEFAULT_ENERGY_THRESHOLD);
        debug!(
            "🎙️ Ambient level {:.0}, energy gate set to {:.0}",
            ambient, self.threshold
        );
        Ok(())
    }

    /// Capture one phrase. Returns `None` when no speech begins within
    /// the window's speech timeout or the capture is too short to be
    /// speech.
    pub fn record_phrase(&self, window: &PhraseWindow) -> Result<Option<Vec<i16>>> {
        let (buffer, stream) = self.open_stream()?;

        let started = Instant::now();
        let mut phrase: Vec<i16> = Vec::new();
        let mut in_speech = false;
        let mut speech_started_at = started;
        let mut silent_for = Duration::ZERO;

        loop {
            std::thread::sleep(POLL_INTERVAL);
            let chunk = take_buffer(&buffer);
            let energy = level::rms(&chunk);

            if !in_speech {
                if energy >= self.threshold {
                    in_speech = true;
                    speech_started_at = Instant::now();
                    phrase.extend_from_slice(&chunk);
                } else if started.elapsed() >= window.speech_timeout {
                    drop(stream);
                    return Ok(None);
                }
                continue;
            }

            phrase.extend_from_slice(&chunk);
            if energy < self.threshold {
                silent_for += POLL_INTERVAL;
            } else {
                silent_for = Duration::ZERO;
            }

            if silent_for >= TRAILING_SILENCE
                || speech_started_at.elapsed() >= window.phrase_limit
            {
                break;
            }
        }
        drop(stream);

        if phrase.len() < MIN_PHRASE_SAMPLES {
            return Ok(None);
        }
        Ok(Some(phrase))
    }

    fn open_stream(&self) -> Result<(Arc<Mutex<Vec<i16>>>, cpal::Stream)> {
        let host = cpal::default_host();

        let device = if let Some(idx) = self.device_index {
            host.input_devices()?
                .nth(idx)
                .context("Device index out of range")?
        } else {
            host.default_input_device()
                .context("No default input device")?
        };

        let config = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(SAMPLE_RATE),
            buffer_size: cpal::BufferSize::Fixed(CHUNK_SIZE as u32),
        };

        let buffer: Arc<Mutex<Vec<i16>>> = Arc::new(Mutex::new(Vec::new()));
        let capture_buffer = Arc::clone(&buffer);

        let stream = device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let mut buf = capture_buffer.lock().unwrap_or_else(|e| e.into_inner());
                buf.extend_from_slice(data);
            },
            |err| {
                warn!("Audio stream error: {}", err);
            },
            None,
        )?;

        stream.play()?;
        Ok((buffer, stream))
    }
}

fn take_buffer(buffer: &Arc<Mutex<Vec<i16>>>) -> Vec<i16> {
    let mut buf = buffer.lock().unwrap_or_else(|e| e.into_inner());
    std::mem::take(&mut *buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrase_window_fields() {
        let window = PhraseWindow::new(Duration::from_secs(2), Duration::from_secs(5));
        assert_eq!(window.speech_timeout, Duration::from_secs(2));
        assert_eq!(window.phrase_limit, Duration::from_secs(5));
    }

    #[test]
    fn test_take_buffer_drains() {
        let buffer = Arc::new(Mutex::new(vec![1i16, 2, 3]));
        assert_eq!(take_buffer(&buffer), vec![1, 2, 3]);
        assert!(take_buffer(&buffer).is_empty());
    }
}

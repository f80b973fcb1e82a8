//! HTTP recognition backend
//!
//! Records a phrase from the microphone, encodes it as WAV, and posts it
//! to a whisper-server compatible endpoint. Transport and service
//! failures fold into `RecognitionResult::ServiceError`; only microphone
//! faults surface as errors.

use anyhow::Result;
use reqwest::blocking::multipart::{Form, Part};
use serde::Deserialize;
use std::io::Cursor;
use std::time::Duration;
use tracing::{debug, warn};

use crate::asr::{RecognitionResult, Recognizer, RecognizerFactory, Utterance};
use crate::audio::level;
use crate::audio::recorder::{PhraseRecorder, PhraseWindow, SAMPLE_RATE};
use crate::config::Config;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const AMBIENT_CALIBRATION: Duration = Duration::from_millis(500);

/// Recognizer backed by a whisper-server HTTP endpoint
pub struct WhisperRecognizer {
    recorder: PhraseRecorder,
    client: reqwest::blocking::Client,
    url: String,
    language: String,
}

impl Recognizer for WhisperRecognizer {
    fn listen(&mut self, window: &PhraseWindow) -> Result<Utterance> {
        let samples = match self.recorder.record_phrase(window)? {
            Some(samples) => samples,
            None => return Ok(Utterance::silent(RecognitionResult::Unrecognized)),
        };

        let level = level::normalized_level(&samples);
        let outcome = self.transcribe(&samples);
        Ok(Utterance { outcome, level })
    }
}

impl WhisperRecognizer {
    fn transcribe(&self, samples: &[i16]) -> RecognitionResult {
        let wav = match encode_wav(samples) {
            Ok(wav) => wav,
            Err(e) => return RecognitionResult::ServiceError(format!("WAV encoding failed: {e}")),
        };

        let part = match Part::bytes(wav).file_name("phrase.wav").mime_str("audio/wav") {
            Ok(part) => part,
            Err(e) => return RecognitionResult::ServiceError(format!("Invalid MIME type: {e}")),
        };
        let form = Form::new()
            .text("language", self.language.clone())
            .text("response_format", "json")
            .part("file", part);

        let response = match self.client.post(&self.url).multipart(form).send() {
            Ok(response) => response,
            Err(e) => {
                return RecognitionResult::ServiceError(format!(
                    "Recognition service unreachable: {e}"
                ))
            }
        };

        if !response.status().is_success() {
            return RecognitionResult::ServiceError(format!(
                "Recognition service returned {}",
                response.status()
            ));
        }

        match response.json::<TranscriptionResponse>() {
            Ok(body) => {
                let text = body.text.trim();
                if text.is_empty() {
                    RecognitionResult::Unrecognized
                } else {
                    debug!("📝 Transcribed: '{}'", text);
                    RecognitionResult::Recognized(text.to_string())
                }
            }
            Err(e) => RecognitionResult::ServiceError(format!("Malformed transcription: {e}")),
        }
    }
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Factory for `WhisperRecognizer`
pub struct WhisperFactory {
    url: String,
    language: String,
    device_index: Option<usize>,
}

impl WhisperFactory {
    pub fn new(config: &Config, device_index: Option<usize>) -> Self {
        Self {
            url: config.recognizer_url.clone(),
            language: config.recognizer_language.clone(),
            device_index,
        }
    }
}

impl RecognizerFactory for WhisperFactory {
    fn create(&self) -> Result<Box<dyn Recognizer>> {
        let mut recorder = PhraseRecorder::new(self.device_index);
        // Best effort; a failed calibration keeps the default gate
        if let Err(e) = recorder.calibrate(AMBIENT_CALIBRATION) {
            warn!("⚠️ Ambient calibration failed, keeping default gate: {}", e);
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Box::new(WhisperRecognizer {
            recorder,
            client,
            url: self.url.clone(),
            language: self.language.clone(),
        }))
    }
}

fn encode_wav(samples: &[i16]) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

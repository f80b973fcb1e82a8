//! Timer handler
//!
//! "Set a timer for 5 minutes" starts a background countdown. When it
//! fires, a short chime plays and the completion announcement is sent
//! back to the orchestrator, which speaks it as soon as the assistant
//! is free.

use crate::audio::playback;
use crate::error::AuraResult;
use crate::handlers::Handler;
use crate::orchestrator::events::AssistantEvent;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

const CHIME_SAMPLE_RATE: u32 = 44_100;
const CHIME_FREQUENCY: f32 = 440.0;
const CHIME_SECONDS: f32 = 0.5;

lazy_static! {
    static ref TIMER_RE: Regex =
        Regex::new(r"timer\s+for\s+(\d+)\s+(second|minute|hour)s?").unwrap();
}

pub struct TimerHandler {
    events: UnboundedSender<AssistantEvent>,
    /// Chime playback volume in 0.0..=1.0
    volume: f32,
}

impl TimerHandler {
    pub fn new(events: UnboundedSender<AssistantEvent>, volume: u8) -> Self {
        Self {
            events,
            volume: volume as f32 / 100.0,
        }
    }
}

#[async_trait]
impl Handler for TimerHandler {
    async fn handle(&self, argument: Option<&str>) -> String {
        let text = argument.unwrap_or_default().to_lowercase();

        let parsed = TIMER_RE
            .captures(&text)
            .and_then(|caps| Some((caps[1].parse::<u64>().ok()?, caps[2].to_string())));
        let Some((amount, unit)) = parsed else {
            return "Please specify how long you want the timer for. \
                    For example, 'set a timer for 5 minutes'."
                .to_string();
        };

        // Spoken numbers can be anything; the conversion must not wrap
        let seconds = match unit.as_str() {
            "minute" => amount.checked_mul(60),
            "hour" => amount.checked_mul(3600),
            _ => Some(amount),
        };
        let Some(seconds) = seconds else {
            return "That timer is too long for me to keep track of.".to_string();
        };
        let plural = if amount > 1 { "s" } else { "" };
        let label = format!("{amount} {unit}{plural}");

        let message = format!("Your {label} timer is complete!");
        let events = self.events.clone();
        let volume = self.volume;
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(seconds));
            info!("⏰ Timer finished: {}", message);
            play_chime(volume);
            let _ = events.send(AssistantEvent::TimerElapsed(message));
        });

        format!("Timer set for {label}.")
    }
}

fn chime_path() -> PathBuf {
    std::env::temp_dir().join("aura_notification.wav")
}

fn play_chime(volume: f32) {
    let path = chime_path();
    if !path.exists() {
        if let Err(e) = write_chime(&path) {
            warn!("⚠️ Could not create the notification chime: {}", e);
            return;
        }
    }
    if let Err(e) = playback::play_file(&path, volume) {
        debug!("🔔 Chime playback unavailable: {}", e);
    }
}

/// Write a half-second 440 Hz sine chime
fn write_chime(path: &Path) -> AuraResult<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: CHIME_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;

    let total = (CHIME_SAMPLE_RATE as f32 * CHIME_SECONDS) as u32;
    for n in 0..total {
        let t = n as f32 / CHIME_SAMPLE_RATE as f32;
        let sample = (2.0 * std::f32::consts::PI * CHIME_FREQUENCY * t).sin();
        writer.write_sample((sample * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

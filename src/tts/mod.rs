//! TTS (Text-to-Speech) Module
//!
//! Voices render text to an audio file; playback belongs to the speech
//! synthesis worker so start/finish events wrap only the audible part.

use crate::config::Config;
use anyhow::Result;
use std::path::Path;
use tracing::{info, warn};

pub mod espeak;
pub mod piper;

/// Trait for synthesis backends
pub trait Voice: Send + Sync + std::fmt::Debug {
    /// Render `text` to a playable audio file at `out`
    fn synthesize(&self, text: &str, out: &Path) -> Result<()>;

    /// Get the voice name
    fn name(&self) -> &str;
}

/// Factory to create the configured voice
pub fn create_voice(config: &Config) -> Result<Box<dyn Voice>> {
    info!("🛠️ Creating voice: {}", config.tts_engine);
    let voice: Box<dyn Voice> = match config.tts_engine.as_str() {
        "piper" => {
            info!("  - Using Piper (voice: {})", config.piper_voice);
            Box::new(piper::PiperVoice::new(config))
        }
        "espeak" | "system" => {
            info!("  - Using espeak-ng");
            Box::new(espeak::EspeakVoice::new())
        }
        other => {
            warn!("  - Unknown voice '{}', falling back to espeak-ng", other);
            Box::new(espeak::EspeakVoice::new())
        }
    };
    info!("✅ Voice '{}' initialized", voice.name());
    Ok(voice)
}

//! Piper voice calling a local binary

use super::Voice;
use crate::config::Config;
use anyhow::Result;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{error, warn};

#[derive(Debug)]
pub struct PiperVoice {
    model_path: String,
}

impl PiperVoice {
    pub fn new(config: &Config) -> Self {
        let data_dir = dirs::data_dir().unwrap_or_default().join("aura/voices");
        let model_filename = format!("{}.onnx", config.piper_voice);
        let model_path = data_dir.join(model_filename);

        if !model_path.exists() {
            warn!("⚠️ Piper model not found at {}", model_path.display());
        }

        Self {
            model_path: model_path.to_string_lossy().to_string(),
        }
    }
}

impl Voice for PiperVoice {
    fn synthesize(&self, text: &str, out: &Path) -> Result<()> {
        if self.model_path.is_empty() || !Path::new(&self.model_path).exists() {
            return Err(anyhow::anyhow!(
                "Piper model file missing: {}",
                self.model_path
            ));
        }

        let mut child = Command::new("piper-tts")
            .arg("-m")
            .arg(&self.model_path)
            .arg("-f")
            .arg(out)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| {
                error!("❌ Failed to spawn piper-tts: {}", e);
                anyhow::anyhow!("Failed to spawn piper-tts: {}", e)
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
            stdin.flush()?;
        }

        let status = child.wait()?;
        if !status.success() {
            return Err(anyhow::anyhow!("Piper failed with status {}", status));
        }

        if !out.exists() {
            return Err(anyhow::anyhow!("Piper output file not created"));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "piper"
    }
}

//! espeak-ng fallback voice

use super::Voice;
use anyhow::Result;
use std::path::Path;
use std::process::Command;
use tracing::debug;

#[derive(Debug)]
pub struct EspeakVoice;

impl Default for EspeakVoice {
    fn default() -> Self {
        Self::new()
    }
}

impl EspeakVoice {
    pub fn new() -> Self {
        Self
    }
}

impl Voice for EspeakVoice {
    fn synthesize(&self, text: &str, out: &Path) -> Result<()> {
        debug!("espeak-ng rendering: {}", text);

        let status = Command::new("espeak-ng")
            .arg("-w")
            .arg(out)
            .arg(text)
            .status()
            .map_err(|e| anyhow::anyhow!("Failed to run espeak-ng: {}", e))?;

        if !status.success() {
            return Err(anyhow::anyhow!("espeak-ng failed with status {}", status));
        }

        if !out.exists() {
            return Err(anyhow::anyhow!("espeak-ng output file not created"));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "espeak"
    }
}

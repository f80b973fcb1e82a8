//! Speech playback
//!
//! Plays a rendered audio file to completion. The output stream is
//! created per call so the helper can run on whichever thread owns the
//! playback stage; rodio streams are not Send.

use anyhow::Result;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Play an audio file to completion at the given volume (0.0..=1.0)
pub fn play_file(path: &Path, volume: f32) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("Audio file not found: {:?}", path);
    }

    let (_stream, stream_handle) = rodio::OutputStream::try_default()?;
    let sink = rodio::Sink::try_new(&stream_handle)?;
    sink.set_volume(volume.clamp(0.0, 1.0));

    let file = File::open(path)?;
    let source = rodio::Decoder::new(BufReader::new(file))?;
    sink.append(source);
    sink.sleep_until_end();
    Ok(())
}

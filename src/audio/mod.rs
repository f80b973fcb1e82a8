//! Audio capture, level monitoring, and playback

pub mod level;
pub mod playback;
pub mod recorder;

pub use recorder::{PhraseRecorder, PhraseWindow};

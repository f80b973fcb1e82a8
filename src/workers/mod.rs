//! Background workers
//!
//! Each worker owns a plain thread and reports through the shared event
//! channel. Spawning constructors start the thread immediately; `stop`
//! is idempotent and joins it.

pub mod command;
pub mod synthesizer;
pub mod wake;

pub use command::CommandWorker;
pub use synthesizer::SpeechSynthesizer;
pub use wake::WakeWordWorker;

/// Common worker lifecycle. Pause and resume only mean something for
/// long-running workers; one-shot workers keep the default no-ops.
pub trait Worker {
    fn pause(&self) {}
    fn resume(&self) {}

    /// Ask the thread to finish and join it. Safe to call twice.
    fn stop(&mut self);

    /// False once the thread has exited for any reason.
    fn is_alive(&self) -> bool;
}

//! AURA Library
//!
//! Core modules for the AURA voice assistant.

pub mod asr;
pub mod audio;
pub mod config;
pub mod error;
pub mod handlers;
pub mod intent;
pub mod orchestrator;
pub mod tts;
pub mod workers;

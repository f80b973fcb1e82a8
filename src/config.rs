use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Maximum session volume (percent).
pub const MAX_VOLUME: u8 = 100;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Wake word
    pub wake_phrases: Vec<String>,
    pub enable_wake_word: bool,
    pub always_listen: bool,

    // Speech
    pub volume: u8,
    pub startup_greeting: bool,
    pub command_timeout: u64,
    pub tts_engine: String,
    pub piper_voice: String,

    // Recognition
    pub recognizer_url: String,
    pub recognizer_language: String,

    // Handler credentials
    pub openweather_api_key: String,
    pub wolfram_alpha_key: String,

    // Mode label surfaced in settings; no behavior is tied to it
    pub gaming_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wake_phrases: vec![
                "hey aura".to_string(),
                "hi aura".to_string(),
                "hello aura".to_string(),
                "ok aura".to_string(),
            ],
            enable_wake_word: true,
            always_listen: false,
            volume: 70,
            startup_greeting: true,
            command_timeout: 10,
            tts_engine: "piper".to_string(),
            piper_voice: "en_GB-cori-high".to_string(),
            recognizer_url: "http://localhost:8080/inference".to_string(),
            recognizer_language: "en".to_string(),
            openweather_api_key: "".to_string(),
            wolfram_alpha_key: "".to_string(),
            gaming_mode: false,
        }
    }
}

impl Config {
    /// Load config from the default path, migrate a legacy file, or create default
    pub fn load() -> Result<Self> {
        let config_path = config_path();

        if config_path.exists() {
            return Self::load_from(&config_path);
        }

        // Attempt migration from the legacy single-file layout
        if let Some(migrated) = Self::migrate_legacy() {
            let _ = migrated.save();
            return Ok(migrated);
        }
        Ok(Self::default())
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str::<Config>(&content) {
            Ok(mut config) => {
                config.normalize();
                Ok(config)
            }
            Err(e) => {
                // Graceful degradation: log warning and use defaults
                tracing::warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                // Backup corrupt file for debugging
                let backup_path = path.with_extension("json.corrupt");
                let _ = std::fs::rename(path, &backup_path);
                Ok(Self::default())
            }
        }
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path())
    }

    /// Save config to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Clamp out-of-range values from hand-edited files
    pub fn normalize(&mut self) {
        if self.volume > MAX_VOLUME {
            self.volume = MAX_VOLUME;
        }
        if self.command_timeout == 0 {
            self.command_timeout = Self::default().command_timeout;
        }
        if self.wake_phrases.is_empty() {
            self.wake_phrases = Self::default().wake_phrases;
        }
    }

    fn migrate_legacy() -> Option<Self> {
        let legacy = dirs::home_dir()?.join(".aura_config.json");
        if !legacy.exists() {
            return None;
        }
        let content = std::fs::read_to_string(legacy).ok()?;
        let val = serde_json::from_str::<serde_json::Value>(&content).ok()?;
        let mut cfg = Self::default();

        if let Some(v) = val.get("volume").and_then(|v| v.as_u64()) {
            cfg.volume = v.min(MAX_VOLUME as u64) as u8;
        }
        if let Some(v) = val.get("enable_wake_word").and_then(|v| v.as_bool()) {
            cfg.enable_wake_word = v;
        }
        if let Some(v) = val.get("always_listen").and_then(|v| v.as_bool()) {
            cfg.always_listen = v;
        }
        if let Some(v) = val.get("startup_greeting").and_then(|v| v.as_bool()) {
            cfg.startup_greeting = v;
        }
        if let Some(v) = val.get("wolfram_alpha_key").and_then(|v| v.as_str()) {
            cfg.wolfram_alpha_key = v.to_string();
        }
        if let Some(v) = val.get("gaming_mode").and_then(|v| v.as_bool()) {
            cfg.gaming_mode = v;
        }

        Some(cfg)
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("aura")
        .join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.volume, 70);
        assert_eq!(config.command_timeout, 10);
        assert!(config.enable_wake_word);
        assert!(!config.always_listen);
        assert!(config.startup_greeting);
        assert!(!config.gaming_mode);
        assert!(config.wake_phrases.contains(&"hey aura".to_string()));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).expect("Failed to serialize");
        let restored: Config = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(config.volume, restored.volume);
        assert_eq!(config.wake_phrases, restored.wake_phrases);
    }

    #[test]
    fn test_config_corrupt_json_handling() {
        // Config::load_from uses graceful degradation - this tests the parsing path
        let corrupt_json = "{ not valid json";
        let result: Result<Config, _> = serde_json::from_str(corrupt_json);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_corrupt_file_falls_back_to_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not valid json").expect("write");

        let config = Config::load_from(&path).expect("load");
        assert_eq!(config.volume, Config::default().volume);
        // Corrupt file is moved aside, not deleted
        assert!(path.with_extension("json.corrupt").exists());
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.volume = 55;
        config.always_listen = true;
        config.save_to(&path).expect("save");

        let restored = Config::load_from(&path).expect("load");
        assert_eq!(restored.volume, 55);
        assert!(restored.always_listen);
    }

    #[test]
    fn test_normalize_clamps_volume() {
        let mut config = Config::default();
        config.volume = 150;
        config.normalize();
        assert_eq!(config.volume, 100);
    }
}

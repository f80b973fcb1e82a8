//! Application launching
//!
//! Installed applications are probed once at startup by resolving a
//! list of common desktop programs on PATH. Spoken names rarely match
//! binary names exactly ("chrome" vs "google-chrome"), so matching
//! runs containment first, then per-word containment, then a fuzzy
//! pass for misrecognized names.

use crate::handlers::Handler;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Command;
use tracing::{info, warn};

const CANDIDATE_APPS: &[&str] = &[
    "google-chrome",
    "firefox",
    "chromium",
    "libreoffice",
    "gedit",
    "gnome-terminal",
    "gnome-calculator",
    "nautilus",
    "gnome-control-center",
];

/// Minimum similarity for a fuzzy name match
const FUZZY_THRESHOLD: f64 = 0.6;

pub struct OpenAppHandler {
    apps: Vec<(String, PathBuf)>,
}

impl OpenAppHandler {
    /// Probe PATH for known applications
    pub fn discover() -> Self {
        let apps: Vec<(String, PathBuf)> = CANDIDATE_APPS
            .iter()
            .filter_map(|name| resolve_on_path(name).map(|path| (name.to_string(), path)))
            .collect();

        info!("🖥️ Detected {} applications", apps.len());
        Self { apps }
    }

    #[cfg(test)]
    fn with_apps(apps: Vec<(String, PathBuf)>) -> Self {
        Self { apps }
    }

    fn match_app(&self, request: &str) -> Option<&(String, PathBuf)> {
        if let Some(found) = self
            .apps
            .iter()
            .find(|(name, _)| request.contains(name.as_str()) || name.contains(request))
        {
            return Some(found);
        }

        // "open the calculator please" should still reach gnome-calculator
        for token in request.split_whitespace() {
            if token.len() < 3 {
                continue;
            }
            if let Some(found) = self
                .apps
                .iter()
                .find(|(name, _)| name.contains(token) || token.contains(name.as_str()))
            {
                return Some(found);
            }
        }

        self.apps
            .iter()
            .map(|entry| (entry, strsim::normalized_levenshtein(request, &entry.0)))
            .filter(|(_, score)| *score >= FUZZY_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(entry, _)| entry)
    }
}

#[async_trait]
impl Handler for OpenAppHandler {
    async fn handle(&self, argument: Option<&str>) -> String {
        let Some(request) = argument else {
            return "I'm not sure which application you want me to open.".to_string();
        };
        let request = request.to_lowercase();

        let Some((name, path)) = self.match_app(&request) else {
            return format!("I couldn't find {request} on your system.");
        };

        match Command::new(path).spawn() {
            Ok(_) => format!("Opening {name}."),
            Err(e) => {
                warn!("⚠️ Error opening application: {}", e);
                format!("I had trouble opening {name}.")
            }
        }
    }
}

fn resolve_on_path(name: &str) -> Option<PathBuf> {
    let output = Command::new("which").arg(name).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if path.is_empty() {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

//! System-facing handlers: resource status, brightness, power, and the
//! desktop settings panel. Linux desktop targets only, same as the
//! rest of the crate.

use crate::handlers::Handler;
use async_trait::async_trait;
use std::process::Command;
use sysinfo::System;
use tracing::warn;

pub struct SystemStatusHandler;

#[async_trait]
impl Handler for SystemStatusHandler {
    async fn handle(&self, _argument: Option<&str>) -> String {
        let mut system = System::new();

        // CPU usage needs two samples a short interval apart
        system.refresh_cpu_usage();
        tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;
        system.refresh_cpu_usage();
        let cpu_percent = system.global_cpu_usage();

        system.refresh_memory();
        let memory_percent = if system.total_memory() > 0 {
            system.used_memory() as f64 * 100.0 / system.total_memory() as f64
        } else {
            0.0
        };

        format!(
            "System status: CPU usage is {cpu_percent:.1}%. Memory usage is {memory_percent:.1}%."
        )
    }
}

pub struct BrightnessHandler;

#[async_trait]
impl Handler for BrightnessHandler {
    async fn handle(&self, argument: Option<&str>) -> String {
        let request = argument.unwrap_or_default().to_lowercase();

        let step = if request.contains("increase") || request.contains("up") {
            "+10%"
        } else if request.contains("decrease") || request.contains("down") {
            "10%-"
        } else {
            return "I'm not sure how to adjust the brightness. You can say \
                    'increase brightness' or 'decrease brightness'."
                .to_string();
        };

        match Command::new("brightnessctl").args(["set", step]).status() {
            Ok(status) if status.success() => {
                if step == "+10%" {
                    "Brightness increased.".to_string()
                } else {
                    "Brightness decreased.".to_string()
                }
            }
            Ok(_) | Err(_) => "I couldn't adjust the brightness on this system.".to_string(),
        }
    }
}

pub struct ShutdownHandler;

#[async_trait]
impl Handler for ShutdownHandler {
    async fn handle(&self, _argument: Option<&str>) -> String {
        match Command::new("shutdown").args(["-h", "now"]).status() {
            Ok(status) if status.success() => "Shutting down the computer.".to_string(),
            Ok(_) | Err(_) => {
                "I couldn't shut down the computer. You may need elevated permissions."
                    .to_string()
            }
        }
    }
}

pub struct RestartHandler;

#[async_trait]
impl Handler for RestartHandler {
    async fn handle(&self, _argument: Option<&str>) -> String {
        match Command::new("shutdown").args(["-r", "now"]).status() {
            Ok(status) if status.success() => "Restarting the computer.".to_string(),
            Ok(_) | Err(_) => {
                "I couldn't restart the computer. You may need elevated permissions.".to_string()
            }
        }
    }
}

pub struct SettingsHandler;

#[async_trait]
impl Handler for SettingsHandler {
    async fn handle(&self, _argument: Option<&str>) -> String {
        match Command::new("gnome-control-center").spawn() {
            Ok(_) => "Opening settings.".to_string(),
            Err(e) => {
                warn!("⚠️ Could not open the settings panel: {}", e);
                "I couldn't open the settings on this system.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_system_status_reports_both_figures() {
        let response = SystemStatusHandler.handle(None).await;
        assert!(response.starts_with("System status: CPU usage is"));
        assert!(response.contains("Memory usage is"));
        assert!(response.ends_with("%."));
    }

    #[tokio::test]
    async fn test_brightness_needs_a_direction() {
        let response = BrightnessHandler.handle(Some("brightness")).await;
        assert!(response.contains("increase brightness"));
    }
}

pub mod mock_asr;
pub mod mock_tts;

use aura::config::Config;
use std::time::{Duration, Instant};

/// Configuration used by the worker and orchestrator tests: wake word
/// on, no greeting, and a short capture window so nothing stalls.
pub fn test_config() -> Config {
    Config {
        enable_wake_word: true,
        always_listen: false,
        startup_greeting: false,
        command_timeout: 2,
        ..Config::default()
    }
}

/// Poll `predicate` until it holds or the deadline passes.
pub async fn wait_until<F>(mut predicate: F, timeout: Duration, what: &str)
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    while start.elapsed() < timeout {
        if predicate() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("timed out waiting for {what}");
}

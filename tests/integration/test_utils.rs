//! Shared test utilities for integration tests
//!
//! Environment isolation for config loading and a controller harness driven by
//! a manual clock.

use draftline::config::DraftlineConfig;
use draftline::delivery::ManualClock;
use draftline::engine::EngineBuilder;
use draftline::export::{MemoryClipboard, MemoryDownloads};
use draftline::session::{GenerationSession, SessionController};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const ISOLATED_VARS: [&str; 5] = [
    "HOME",
    "XDG_CONFIG_HOME",
    "DRAFTLINE_ENV",
    "DRAFTLINE__DELIVERY__INTERVAL_MS",
    "DRAFTLINE__DELIVERY__CHARS_PER_TICK",
];

/// Run `f` with HOME and XDG_CONFIG_HOME pointing into `test_dir` and no
/// DRAFTLINE overrides set. The original environment is restored afterwards.
pub fn with_isolated_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let saved: Vec<(&str, Option<String>)> = ISOLATED_VARS
        .iter()
        .map(|name| (*name, std::env::var(name).ok()))
        .collect();

    for name in ISOLATED_VARS {
        std::env::remove_var(name);
    }
    let home = test_dir.path().join("home");
    let config_home = test_dir.path().join("xdg");
    std::fs::create_dir_all(&home).unwrap();
    std::fs::create_dir_all(&config_home).unwrap();
    std::env::set_var("HOME", &home);
    std::env::set_var("XDG_CONFIG_HOME", &config_home);

    let result = f();

    for (name, value) in saved {
        match value {
            Some(value) => std::env::set_var(name, value),
            None => std::env::remove_var(name),
        }
    }
    result
}

/// A controller with a manual clock and in-memory export sinks.
pub struct Harness {
    pub controller: SessionController,
    pub clock: Arc<ManualClock>,
    pub clipboard: Arc<MemoryClipboard>,
    pub downloads: Arc<MemoryDownloads>,
}

impl Harness {
    /// Must be called inside a tokio runtime.
    pub fn new(chars_per_tick: usize) -> Self {
        Self::with_builder(chars_per_tick, |builder| builder)
    }

    pub fn with_builder(
        chars_per_tick: usize,
        customize: impl FnOnce(EngineBuilder) -> EngineBuilder,
    ) -> Self {
        let mut config = DraftlineConfig::default();
        config.delivery.chars_per_tick = chars_per_tick;

        let clock = Arc::new(ManualClock::new());
        let clipboard = Arc::new(MemoryClipboard::new());
        let downloads = Arc::new(MemoryDownloads::new());
        let builder = EngineBuilder::new(config)
            .with_clock(clock.clone())
            .with_clipboard(clipboard.clone())
            .with_downloads(downloads.clone());
        let controller = customize(builder).build().unwrap();

        Self {
            controller,
            clock,
            clipboard,
            downloads,
        }
    }

    /// Wait until the controller has published at least `len` delivered bytes.
    pub async fn wait_for_delivered(&self, len: usize) -> GenerationSession {
        let mut rx = self.controller.subscribe();
        let session = rx
            .wait_for(|s| s.as_ref().is_some_and(|s| s.delivered_len() >= len))
            .await
            .unwrap();
        session.clone().unwrap()
    }

    /// Release enough ticks to finish any document and wait for it to settle.
    pub async fn run_to_completion(&self) -> GenerationSession {
        self.clock.advance(1_000_000);
        self.controller.wait_until_settled().await.unwrap()
    }
}

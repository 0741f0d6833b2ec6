//! Diagnostic output setup.
//!
//! All connection tasks log through one subscriber whose writer is a
//! `Mutex<Stderr>`, so each event is written whole under a single lock.

use crate::config::LoggingConfig;
use std::io;
use std::sync::Mutex;
use tracing::Level;

/// Installs the global subscriber at the configured level.
pub fn init(cfg: &LoggingConfig) -> anyhow::Result<()> {
    let level = parse_level(&cfg.level)?;

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(level)
        .with_writer(Mutex::new(io::stderr()))
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}

pub fn parse_level(level: &str) -> anyhow::Result<Level> {
    level
        .trim()
        .parse::<Level>()
        .map_err(|_| anyhow::anyhow!("unknown log level: {level:?}"))
}

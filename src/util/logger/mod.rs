//! Logger module for Muban
//!
//! Go-style simple logging: `[LEVEL] message`
//!
//! # Usage
//!
//! ```rust
//! use muban::util::logger;
//!
//! logger::init();
//! tracing::info!("Hello, {}", "world");
//! ```

use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Initialize logger with default configuration (INFO level)
pub fn init() {
    init_with_level(LogLevel::Info);
}

/// Initialize logger with custom level (Go style: `[LEVEL] message`)
///
/// Only the first call installs a subscriber; later calls are no-ops so
/// tests and embedding binders can call this freely.
pub fn init_with_level(level: LogLevel) {
    let filter = tracing_subscriber::filter::LevelFilter::from_level(level.into());

    // Go 风格：显示 [LEVEL] 前缀，不显示时间、不显示模块路径、无颜色
    let layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_target(false)
        .with_level(true)
        .with_ansi(false)
        .compact()
        .with_filter(filter);

    let _ = Registry::default().with(layer).try_init();
}

/// Initialize logger for debug use (DEBUG level)
pub fn init_debug() {
    init_with_level(LogLevel::Debug);
}

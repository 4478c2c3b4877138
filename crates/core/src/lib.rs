//! Core utilities for the triangle sample.
//!
//! This crate provides foundational types and utilities used across the workspace:
//! - Error types and result aliases
//! - Logging initialization
//! - Wall-clock and fixed-step timers
//! - Application configuration

mod config;
mod error;
mod logging;
mod timer;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use timer::{StepTimer, TICKS_PER_SECOND, Timer};

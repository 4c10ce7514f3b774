//! Process-wide infrastructure: configuration loading and logger setup.

pub mod config;
pub mod logging;

//! Shared utilities for equity-research
//!
//! This crate provides common functionality used across the workspace,
//! including logging setup and human-readable number formatting.

pub mod format;
pub mod logging;

pub use format::{format_money, format_optional, format_percent, format_ratio};
pub use logging::{LogFormat, init_tracing, init_tracing_with};

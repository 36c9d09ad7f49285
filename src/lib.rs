// src/lib.rs

pub mod config;
pub mod exporter;
pub mod fetch;
pub mod metrics;
pub mod process;
pub mod tokens;

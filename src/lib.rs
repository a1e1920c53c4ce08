// ambient-alert library crate
// Exposes modules for integration testing

pub mod alerts;
pub mod ambient;
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod monitor;
pub mod utils;

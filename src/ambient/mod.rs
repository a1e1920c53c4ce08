// Ambient sensor service access
pub mod client;

pub use client::{AmbientClient, DataPoint, FetchError, SensorSource};

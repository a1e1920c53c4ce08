// Sensor readings and the threshold conditions that gate alerts
pub mod reading;
pub mod thresholds;

pub use reading::{MonitorKind, Reading};
pub use thresholds::Monitor;

use crate::ambient::{DataPoint, FetchError};
use crate::config::Config;
use crate::config::settings::{Co2Config, HeatstrokeConfig};
use crate::monitor::reading::{MonitorKind, Reading, spoken_value};

/// Threshold condition and message template for one alert kind
#[derive(Debug, Clone, PartialEq)]
pub enum Monitor {
    Co2 {
        threshold: f64,
        field: String,
        message: String,
    },
    Heatstroke {
        temperature_threshold: f64,
        humidity_threshold: f64,
        temperature_field: String,
        humidity_field: String,
        message: String,
    },
}

impl Monitor {
    pub fn from_config(kind: MonitorKind, config: &Config) -> Self {
        match kind {
            MonitorKind::Co2 => Self::co2(&config.co2),
            MonitorKind::Heatstroke => Self::heatstroke(&config.heatstroke),
        }
    }

    pub fn co2(config: &Co2Config) -> Self {
        Monitor::Co2 {
            threshold: config.threshold,
            field: config.field.clone(),
            message: config.message.clone(),
        }
    }

    pub fn heatstroke(config: &HeatstrokeConfig) -> Self {
        Monitor::Heatstroke {
            temperature_threshold: config.temperature_threshold,
            humidity_threshold: config.humidity_threshold,
            temperature_field: config.temperature_field.clone(),
            humidity_field: config.humidity_field.clone(),
            message: config.message.clone(),
        }
    }

    pub fn kind(&self) -> MonitorKind {
        match self {
            Monitor::Co2 { .. } => MonitorKind::Co2,
            Monitor::Heatstroke { .. } => MonitorKind::Heatstroke,
        }
    }

    /// Pull the fields this monitor needs out of a data point
    pub fn extract(&self, point: &DataPoint) -> Result<Reading, FetchError> {
        match self {
            Monitor::Co2 { field, .. } => Ok(Reading::Co2 {
                ppm: point.require(field)?,
            }),
            Monitor::Heatstroke {
                temperature_field,
                humidity_field,
                ..
            } => Ok(Reading::Climate {
                temperature: point.require(temperature_field)?,
                humidity: point.require(humidity_field)?,
            }),
        }
    }

    /// Thresholds are inclusive. The heatstroke condition needs both values at or above.
    pub fn is_exceeded(&self, reading: &Reading) -> bool {
        match (self, reading) {
            (Monitor::Co2 { threshold, .. }, Reading::Co2 { ppm }) => *ppm >= *threshold,
            (
                Monitor::Heatstroke {
                    temperature_threshold,
                    humidity_threshold,
                    ..
                },
                Reading::Climate {
                    temperature,
                    humidity,
                },
            ) => *temperature >= *temperature_threshold && *humidity >= *humidity_threshold,
            _ => false,
        }
    }

    pub fn describe_thresholds(&self) -> String {
        match self {
            Monitor::Co2 { threshold, .. } => format!("CO2 {}ppm", threshold),
            Monitor::Heatstroke {
                temperature_threshold,
                humidity_threshold,
                ..
            } => format!(
                "temperature {}℃, humidity {}%",
                temperature_threshold, humidity_threshold
            ),
        }
    }

    /// Spoken text with the reading substituted as integers
    pub fn render_message(&self, reading: &Reading) -> String {
        match (self, reading) {
            (Monitor::Co2 { message, .. }, Reading::Co2 { ppm }) => {
                message.replace("{ppm}", &spoken_value(*ppm).to_string())
            }
            (
                Monitor::Heatstroke { message, .. },
                Reading::Climate {
                    temperature,
                    humidity,
                },
            ) => message
                .replace("{temperature}", &spoken_value(*temperature).to_string())
                .replace("{humidity}", &spoken_value(*humidity).to_string()),
            (Monitor::Co2 { message, .. }, _) | (Monitor::Heatstroke { message, .. }, _) => {
                message.clone()
            }
        }
    }
}

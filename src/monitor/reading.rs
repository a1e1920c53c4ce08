use serde::Serialize;
use std::fmt;

/// Which alert a run performs. Each kind has its own thresholds and cooldown file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorKind {
    Co2,
    Heatstroke,
}

impl MonitorKind {
    pub const ALL: [MonitorKind; 2] = [MonitorKind::Co2, MonitorKind::Heatstroke];

    pub fn name(&self) -> &'static str {
        match self {
            MonitorKind::Co2 => "co2",
            MonitorKind::Heatstroke => "heatstroke",
        }
    }

    /// Identifier used as the syslog tag
    pub fn ident(&self) -> &'static str {
        match self {
            MonitorKind::Co2 => "co2_alert",
            MonitorKind::Heatstroke => "heatstroke_alert",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            MonitorKind::Co2 => "CO2 alert",
            MonitorKind::Heatstroke => "Heatstroke alert",
        }
    }
}

impl fmt::Display for MonitorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Values taken from the latest Ambient data point; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Reading {
    Co2 { ppm: f64 },
    Climate { temperature: f64, humidity: f64 },
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Co2 { ppm } => write!(f, "CO2 {}ppm", ppm),
            Reading::Climate {
                temperature,
                humidity,
            } => write!(f, "temperature {}℃, humidity {}%", temperature, humidity),
        }
    }
}

/// Integer form used in spoken messages. Truncates toward zero.
pub fn spoken_value(value: f64) -> i64 {
    value as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spoken_value_truncates() {
        assert_eq!(spoken_value(1234.9), 1234);
        assert_eq!(spoken_value(27.99), 27);
        assert_eq!(spoken_value(-0.5), 0);
    }

    #[test]
    fn test_reading_display() {
        assert_eq!(Reading::Co2 { ppm: 1043.0 }.to_string(), "CO2 1043ppm");
        assert_eq!(
            Reading::Climate {
                temperature: 28.5,
                humidity: 61.0
            }
            .to_string(),
            "temperature 28.5℃, humidity 61%"
        );
    }

    #[test]
    fn test_kind_identifiers() {
        assert_eq!(MonitorKind::Co2.ident(), "co2_alert");
        assert_eq!(MonitorKind::Heatstroke.ident(), "heatstroke_alert");
        assert_eq!(MonitorKind::Heatstroke.to_string(), "heatstroke");
    }
}

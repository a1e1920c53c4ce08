use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CHANNEL_ID: &str = "AMBIENT_CHANNEL_ID";
pub const ENV_READ_KEY: &str = "AMBIENT_READ_KEY";
pub const ENV_WRITE_KEY: &str = "AMBIENT_WRITE_KEY";

/// Ambient data points carry up to eight numeric fields, `d1` through `d8`.
pub const AMBIENT_FIELDS: [&str; 8] = ["d1", "d2", "d3", "d4", "d5", "d6", "d7", "d8"];

pub const DEFAULT_CO2_MESSAGE: &str = "二酸化炭素濃度が{ppm}ppmに達しています。換気してください。";
pub const DEFAULT_HEATSTROKE_MESSAGE: &str =
    "室温が{temperature}度、湿度が{humidity}パーセントです。熱中症に気を付けてください。";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ambient: AmbientConfig,
    pub speaker: SpeakerConfig,
    pub alert: AlertConfig,
    pub co2: Co2Config,
    pub heatstroke: HeatstrokeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    pub channel_id: String,
    pub read_key: String,
    pub write_key: String, // not needed for reads, kept so one file holds the whole channel
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeakerConfig {
    pub device_name: String,
    pub control_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub cooldown_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Co2Config {
    pub threshold: f64, // ppm
    pub field: String,
    pub state_file: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatstrokeConfig {
    pub temperature_threshold: f64, // °C
    pub humidity_threshold: f64,    // %
    pub temperature_field: String,
    pub humidity_field: String,
    pub state_file: String,
    pub message: String,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            channel_id: String::new(),
            read_key: String::new(),
            write_key: String::new(),
            base_url: "https://ambidata.io".to_string(),
        }
    }
}

impl Default for SpeakerConfig {
    fn default() -> Self {
        Self {
            device_name: "リビングルーム".to_string(),
            control_path: "/usr/local/bin/alexa-remote-control.sh".to_string(),
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown_seconds: 1800,
        }
    }
}

impl Default for Co2Config {
    fn default() -> Self {
        Self {
            threshold: 1000.0,
            field: "d3".to_string(),
            state_file: "/tmp/co2_alert_last_time.txt".to_string(),
            message: DEFAULT_CO2_MESSAGE.to_string(),
        }
    }
}

impl Default for HeatstrokeConfig {
    fn default() -> Self {
        Self {
            temperature_threshold: 28.0,
            humidity_threshold: 60.0,
            temperature_field: "d1".to_string(),
            humidity_field: "d3".to_string(),
            state_file: "/tmp/heatstroke_alert_last_time.txt".to_string(),
            message: DEFAULT_HEATSTROKE_MESSAGE.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ambient: AmbientConfig::default(),
            speaker: SpeakerConfig::default(),
            alert: AlertConfig::default(),
            co2: Co2Config::default(),
            heatstroke: HeatstrokeConfig::default(),
        }
    }
}

impl Config {
    /// Load the configuration from the default location, writing a commented
    /// default file on first use. Environment overrides are not applied here so
    /// that `config set` never persists credentials taken from the environment.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save_to(&config_path)?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    /// Load an explicit config file. Unlike [`Config::load`], a missing file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let contents = self.to_commented_toml();

        fs::write(config_path, contents)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(home.join(".config").join("ambient-alert").join("config.toml"))
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Replace credentials with non-empty values returned by `lookup`.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(value) = non_empty(ENV_CHANNEL_ID) {
            self.ambient.channel_id = value;
        }
        if let Some(value) = non_empty(ENV_READ_KEY) {
            self.ambient.read_key = value;
        }
        if let Some(value) = non_empty(ENV_WRITE_KEY) {
            self.ambient.write_key = value;
        }
    }

    /// Channel id and read key are the minimum needed to query Ambient.
    pub fn has_credentials(&self) -> bool {
        !self.ambient.channel_id.trim().is_empty() && !self.ambient.read_key.trim().is_empty()
    }

    /// Generate TOML with comments describing every option
    pub fn to_commented_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# ambient-alert configuration\n");
        output.push_str("#\n");
        output.push_str("# Credentials may also be supplied through the environment:\n");
        output.push_str(&format!("#   {ENV_CHANNEL_ID}, {ENV_READ_KEY}, {ENV_WRITE_KEY}\n"));
        output.push_str("# Non-empty environment values take precedence over this file.\n");
        output.push('\n');

        output.push_str("[ambient]\n");
        output.push_str("# Channel to read the latest data point from\n");
        output.push_str(&format!("channel_id = {}\n", toml_string(&self.ambient.channel_id)));
        output.push_str("# Read key for the channel (required)\n");
        output.push_str(&format!("read_key = {}\n", toml_string(&self.ambient.read_key)));
        output.push_str("# Write key (optional, unused when reading)\n");
        output.push_str(&format!("write_key = {}\n", toml_string(&self.ambient.write_key)));
        output.push_str(&format!("base_url = {}\n", toml_string(&self.ambient.base_url)));
        output.push('\n');

        output.push_str("[speaker]\n");
        output.push_str("# Echo device name as shown by `alexa-remote-control.sh -a`\n");
        output.push_str(&format!("device_name = {}\n", toml_string(&self.speaker.device_name)));
        output.push_str("# Full path of alexa-remote-control.sh\n");
        output.push_str(&format!("control_path = {}\n", toml_string(&self.speaker.control_path)));
        output.push('\n');

        output.push_str("[alert]\n");
        output.push_str("# Minimum number of seconds between two spoken alerts\n");
        output.push_str(&format!("cooldown_seconds = {}\n", self.alert.cooldown_seconds));
        output.push('\n');

        output.push_str("[co2]\n");
        output.push_str("# Alert when CO2 concentration is at or above this value (ppm)\n");
        output.push_str(&format!("threshold = {}\n", toml_float(self.co2.threshold)));
        output.push_str("# Ambient field holding the CO2 value (d1-d8)\n");
        output.push_str(&format!("field = {}\n", toml_string(&self.co2.field)));
        output.push_str(&format!("state_file = {}\n", toml_string(&self.co2.state_file)));
        output.push_str("# Spoken text; {ppm} is replaced with the integer reading\n");
        output.push_str(&format!("message = {}\n", toml_string(&self.co2.message)));
        output.push('\n');

        output.push_str("[heatstroke]\n");
        output.push_str("# Alert only when BOTH temperature and humidity reach their thresholds\n");
        output.push_str(&format!(
            "temperature_threshold = {}\n",
            toml_float(self.heatstroke.temperature_threshold)
        ));
        output.push_str(&format!(
            "humidity_threshold = {}\n",
            toml_float(self.heatstroke.humidity_threshold)
        ));
        output.push_str(&format!(
            "temperature_field = {}\n",
            toml_string(&self.heatstroke.temperature_field)
        ));
        output.push_str(&format!(
            "humidity_field = {}\n",
            toml_string(&self.heatstroke.humidity_field)
        ));
        output.push_str(&format!("state_file = {}\n", toml_string(&self.heatstroke.state_file)));
        output.push_str("# Spoken text; {temperature} and {humidity} are replaced with integer readings\n");
        output.push_str(&format!("message = {}\n", toml_string(&self.heatstroke.message)));

        output
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "ambient.channel_id" => self.ambient.channel_id = value.to_string(),
            "ambient.read_key" => self.ambient.read_key = value.to_string(),
            "ambient.write_key" => self.ambient.write_key = value.to_string(),
            "ambient.base_url" => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    anyhow::bail!("Invalid base_url: {}. Must start with http:// or https://", value);
                }
                self.ambient.base_url = value.trim_end_matches('/').to_string();
            }
            "speaker.device_name" => self.speaker.device_name = value.to_string(),
            "speaker.control_path" => self.speaker.control_path = value.to_string(),
            "alert.cooldown_seconds" => {
                self.alert.cooldown_seconds = value
                    .parse()
                    .with_context(|| format!("Invalid cooldown value: {}", value))?;
            }
            "co2.threshold" => self.co2.threshold = parse_threshold(value)?,
            "co2.field" => self.co2.field = parse_field(value)?,
            "co2.state_file" => self.co2.state_file = value.to_string(),
            "co2.message" => self.co2.message = value.to_string(),
            "heatstroke.temperature_threshold" => {
                self.heatstroke.temperature_threshold = parse_threshold(value)?
            }
            "heatstroke.humidity_threshold" => {
                self.heatstroke.humidity_threshold = parse_threshold(value)?
            }
            "heatstroke.temperature_field" => self.heatstroke.temperature_field = parse_field(value)?,
            "heatstroke.humidity_field" => self.heatstroke.humidity_field = parse_field(value)?,
            "heatstroke.state_file" => self.heatstroke.state_file = value.to_string(),
            "heatstroke.message" => self.heatstroke.message = value.to_string(),
            _ => anyhow::bail!("Unknown configuration key: {}", key),
        }
        Ok(())
    }
}

fn parse_threshold(value: &str) -> Result<f64> {
    let threshold: f64 = value
        .parse()
        .with_context(|| format!("Invalid threshold value: {}", value))?;
    if !threshold.is_finite() {
        anyhow::bail!("Threshold must be a finite number");
    }
    Ok(threshold)
}

fn parse_field(value: &str) -> Result<String> {
    if !AMBIENT_FIELDS.contains(&value) {
        anyhow::bail!("Invalid Ambient field: {}. Must be one of d1-d8", value);
    }
    Ok(value.to_string())
}

fn toml_string(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

// Always print a decimal point so thresholds read as floats in the file
fn toml_float(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

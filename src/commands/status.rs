use serde::Serialize;
use std::path::Path;

use crate::alerts::{CooldownStore, CooldownWindow};
use crate::commands::check::state_file;
use crate::commands::load_config;
use crate::config::Config;
use crate::monitor::MonitorKind;
use crate::utils::{Clock, SystemClock, format_duration, format_timestamp};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorStatus {
    pub monitor: MonitorKind,
    pub state_file: String,
    pub last_alert_timestamp: Option<f64>,
    pub last_alert: Option<String>,
    pub alert_allowed: bool,
    pub remaining_seconds: Option<f64>,
}

pub fn collect_status(config: &Config, now: f64) -> Vec<MonitorStatus> {
    let window = CooldownWindow::new(config.alert.cooldown_seconds);

    MonitorKind::ALL
        .iter()
        .map(|&kind| {
            let path = state_file(kind, config);
            let last = CooldownStore::new(path).last_alert_time();
            let remaining = window.remaining(last, now);
            let last_alert_timestamp = (last > 0.0).then_some(last);

            MonitorStatus {
                monitor: kind,
                state_file: path.to_string(),
                last_alert_timestamp,
                last_alert: last_alert_timestamp.map(format_timestamp),
                alert_allowed: remaining.is_none(),
                remaining_seconds: remaining,
            }
        })
        .collect()
}

pub fn handle_status_command(config_path: Option<&Path>, json_output: bool) {
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config: {:#}", e);
            std::process::exit(1);
        }
    };

    let statuses = collect_status(&config, SystemClock.now());

    if json_output {
        match serde_json::to_string_pretty(&statuses) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: Failed to serialize status to JSON: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    for status in &statuses {
        println!("{} ({})", status.monitor.title(), status.state_file);
        println!(
            "  Last alert: {}",
            status.last_alert.as_deref().unwrap_or("never")
        );
        match status.remaining_seconds {
            None => println!("  Next alert: allowed now"),
            Some(remaining) => println!("  Next alert: in {}", format_duration(remaining)),
        }
    }
}

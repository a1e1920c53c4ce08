use anyhow::{Context, Result};
use std::path::Path;
use tracing::{error, info};

use crate::alerts::{AlertRunner, AlexaRemoteControl, CheckOutcome, CooldownStore, CooldownWindow};
use crate::ambient::AmbientClient;
use crate::commands::load_config;
use crate::config::Config;
use crate::logging::{ConsoleStream, init_logging};
use crate::monitor::{Monitor, MonitorKind};
use crate::utils::format_timestamp;

/// Run one check for `kind`. Failures are logged, never returned: the process
/// exits 0 so the scheduler simply tries again next cycle.
pub async fn handle_check_command(
    kind: MonitorKind,
    config_path: Option<&Path>,
    dry_run: bool,
    json_output: bool,
    verbose: bool,
) {
    init_logging(kind.ident(), verbose, ConsoleStream::for_output(json_output));
    info!("Starting {}", kind.title());

    let mut config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            return;
        }
    };
    config.apply_env_overrides();

    match run_check(kind, &config, dry_run).await {
        Ok(Some(outcome)) => {
            if json_output {
                match serde_json::to_string(&outcome) {
                    Ok(json) => println!("{}", json),
                    Err(e) => error!("Failed to serialize outcome: {}", e),
                }
            }
            info!("{} finished normally", kind.title());
        }
        Ok(None) => {}
        Err(e) => error!("Unexpected error: {:#}", e),
    }
}

/// `Ok(None)` when the configuration is incomplete and nothing was attempted
pub async fn run_check(
    kind: MonitorKind,
    config: &Config,
    dry_run: bool,
) -> Result<Option<CheckOutcome>> {
    if !config.has_credentials() {
        error!(
            "Ambient settings are incomplete. Set ambient.channel_id and ambient.read_key \
             (or AMBIENT_CHANNEL_ID and AMBIENT_READ_KEY)"
        );
        return Ok(None);
    }

    let store = CooldownStore::new(state_file(kind, config));
    let last_alert_time = store.last_alert_time();
    if last_alert_time > 0.0 {
        info!("Last alert time: {}", format_timestamp(last_alert_time));
    }

    let client = AmbientClient::new(&config.ambient).context("Failed to create Ambient client")?;
    let speaker = AlexaRemoteControl::new(&config.speaker);

    let runner = AlertRunner::new(
        Monitor::from_config(kind, config),
        client,
        speaker,
        store,
        CooldownWindow::new(config.alert.cooldown_seconds),
    )
    .dry_run(dry_run);

    Ok(Some(runner.check_and_alert().await))
}

pub fn state_file(kind: MonitorKind, config: &Config) -> &str {
    match kind {
        MonitorKind::Co2 => &config.co2.state_file,
        MonitorKind::Heatstroke => &config.heatstroke.state_file,
    }
}

// ambient-alert: speak Ambient sensor alerts on an Alexa device
//
// One invocation performs one check; schedule it with cron or a systemd timer.
use clap::Parser;
use std::path::Path;

use ambient_alert::cli::{Cli, Commands};
use ambient_alert::commands::{handle_check_command, handle_config_action, handle_status_command};
use ambient_alert::monitor::MonitorKind;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref().map(Path::new);

    match cli.command {
        Commands::Co2 { dry_run } => {
            handle_check_command(MonitorKind::Co2, config_path, dry_run, cli.json, cli.verbose)
                .await;
        }
        Commands::Heatstroke { dry_run } => {
            handle_check_command(
                MonitorKind::Heatstroke,
                config_path,
                dry_run,
                cli.json,
                cli.verbose,
            )
            .await;
        }
        Commands::Status => handle_status_command(config_path, cli.json),
        Commands::Config { action } => handle_config_action(action, config_path, cli.json),
    }
}

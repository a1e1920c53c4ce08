use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ambient-alert")]
#[command(about = "Speak Ambient sensor alerts on an Alexa device")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON output format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Initialize fresh configuration
    Init,
    /// Set configuration value
    Set {
        /// Configuration key (e.g., co2.threshold)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check CO2 concentration and speak an alert when it is too high
    Co2 {
        /// Evaluate and log, but do not speak or record the alert
        #[arg(long)]
        dry_run: bool,
    },

    /// Check temperature and humidity and speak a heatstroke warning
    Heatstroke {
        /// Evaluate and log, but do not speak or record the alert
        #[arg(long)]
        dry_run: bool,
    },

    /// Show last alert times and remaining cooldowns
    Status,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

use std::path::{Path, PathBuf};

use crate::cli::ConfigAction;
use crate::commands::load_config;
use crate::config::Config;

pub fn handle_config_action(action: ConfigAction, config_path: Option<&Path>, json_output: bool) {
    let target_path = match resolve_path(config_path) {
        Ok(path) => path,
        Err(e) => fail(json_output, &format!("Failed to locate config file: {e}")),
    };

    match action {
        ConfigAction::Init => match Config::default().save_to(&target_path) {
            Ok(()) => {
                if json_output {
                    print_status_json("success", "Configuration initialized successfully");
                } else {
                    println!("Configuration initialized at: {}", target_path.display());
                }
            }
            Err(e) => fail(json_output, &format!("Failed to initialize config: {e}")),
        },
        ConfigAction::Show => match load_config(config_path) {
            Ok(config) => {
                if json_output {
                    match serde_json::to_string_pretty(&config) {
                        Ok(json) => println!("{}", json),
                        Err(e) => fail(false, &format!("Failed to serialize config to JSON: {e}")),
                    }
                } else {
                    match toml::to_string_pretty(&config) {
                        Ok(toml_str) => {
                            println!("Configuration ({})", target_path.display());
                            println!("{}", toml_str);
                        }
                        Err(e) => fail(false, &format!("Failed to serialize config: {e}")),
                    }
                }
            }
            Err(e) => fail(json_output, &format!("Failed to load config: {e:#}")),
        },
        ConfigAction::Set { key, value } => match load_config(config_path) {
            Ok(mut config) => match config.set_value(&key, &value) {
                Ok(()) => match config.save_to(&target_path) {
                    Ok(()) => {
                        if json_output {
                            print_status_json(
                                "success",
                                &format!("Configuration updated: {key} = {value}"),
                            );
                        } else {
                            println!("Configuration updated: {} = {}", key, value);
                        }
                    }
                    Err(e) => fail(json_output, &format!("Failed to save config: {e:#}")),
                },
                Err(e) => fail(json_output, &format!("Invalid configuration: {e}")),
            },
            Err(e) => fail(json_output, &format!("Failed to load config: {e:#}")),
        },
    }
}

fn resolve_path(config_path: Option<&Path>) -> anyhow::Result<PathBuf> {
    match config_path {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::default_path(),
    }
}

fn print_status_json(status: &str, message: &str) {
    println!(
        "{}",
        serde_json::json!({ "status": status, "message": message })
    );
}

fn fail(json_output: bool, message: &str) -> ! {
    if json_output {
        print_status_json("error", message);
    } else {
        eprintln!("Error: {}", message);
    }
    std::process::exit(1);
}

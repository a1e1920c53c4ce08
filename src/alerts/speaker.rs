use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

use crate::config::settings::SpeakerConfig;

#[derive(Debug, Error)]
pub enum SpeakError {
    #[error("failed to run {path}: {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("speech tool exited with code {exit_code}: {stderr}")]
    Failed { exit_code: i32, stderr: String },
}

/// Something that can say a message out loud
#[allow(async_fn_in_trait)]
pub trait Speaker {
    async fn speak(&self, message: &str) -> Result<(), SpeakError>;

    /// Human-readable target, used in logs
    fn target(&self) -> String;
}

/// Drives an Echo device through `alexa-remote-control.sh`.
///
/// The script is executed directly with an argument vector, so device names and
/// messages never pass through a shell.
#[derive(Debug, Clone)]
pub struct AlexaRemoteControl {
    control_path: String,
    device_name: String,
}

impl AlexaRemoteControl {
    pub fn new(config: &SpeakerConfig) -> Self {
        Self {
            control_path: config.control_path.clone(),
            device_name: config.device_name.clone(),
        }
    }

    pub fn args(&self, message: &str) -> Vec<String> {
        vec![
            "-d".to_string(),
            self.device_name.clone(),
            "-e".to_string(),
            format!("speak:{message}"),
        ]
    }
}

impl Speaker for AlexaRemoteControl {
    async fn speak(&self, message: &str) -> Result<(), SpeakError> {
        let output = Command::new(&self.control_path)
            .args(self.args(message))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| SpeakError::Spawn {
                path: self.control_path.clone(),
                source,
            })?;

        if output.status.success() {
            tracing::debug!(
                "{} stdout: {}",
                self.control_path,
                String::from_utf8_lossy(&output.stdout).trim()
            );
            return Ok(());
        }

        Err(SpeakError::Failed {
            exit_code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }

    fn target(&self) -> String {
        format!("{} via {}", self.device_name, self.control_path)
    }
}

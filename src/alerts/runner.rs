use serde::Serialize;
use tracing::{error, info, warn};

use crate::alerts::cooldown::{CooldownStore, CooldownWindow};
use crate::alerts::speaker::Speaker;
use crate::ambient::{FetchError, SensorSource};
use crate::monitor::{Monitor, Reading};
use crate::utils::{Clock, SystemClock, format_duration, format_timestamp};

/// What a single check cycle ended up doing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckOutcome {
    DataUnavailable { reason: String },
    BelowThreshold { reading: Reading },
    CoolingDown { reading: Reading, remaining_seconds: f64 },
    Alerted { reading: Reading, message: String },
    AlertFailed { reading: Reading, reason: String },
    DryRun { reading: Reading, message: String },
}

/// One fetch → compare → debounce → speak → persist cycle
pub struct AlertRunner<S, P, C = SystemClock> {
    monitor: Monitor,
    source: S,
    speaker: P,
    store: CooldownStore,
    cooldown: CooldownWindow,
    clock: C,
    dry_run: bool,
}

impl<S, P> AlertRunner<S, P, SystemClock>
where
    S: SensorSource,
    P: Speaker,
{
    pub fn new(
        monitor: Monitor,
        source: S,
        speaker: P,
        store: CooldownStore,
        cooldown: CooldownWindow,
    ) -> Self {
        Self::with_clock(monitor, source, speaker, store, cooldown, SystemClock)
    }
}

impl<S, P, C> AlertRunner<S, P, C>
where
    S: SensorSource,
    P: Speaker,
    C: Clock,
{
    pub fn with_clock(
        monitor: Monitor,
        source: S,
        speaker: P,
        store: CooldownStore,
        cooldown: CooldownWindow,
        clock: C,
    ) -> Self {
        Self {
            monitor,
            source,
            speaker,
            store,
            cooldown,
            clock,
            dry_run: false,
        }
    }

    /// Evaluate everything but neither speak nor touch the cooldown file
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn store(&self) -> &CooldownStore {
        &self.store
    }

    pub async fn check_and_alert(&self) -> CheckOutcome {
        let reading = match self.fetch_reading().await {
            Ok(reading) => reading,
            Err(e) => {
                error!("Failed to fetch sensor data: {}", e);
                warn!("No {} data available, skipping this cycle", self.monitor.kind());
                return CheckOutcome::DataUnavailable {
                    reason: e.to_string(),
                };
            }
        };

        info!("Latest reading: {}", reading);

        if !self.monitor.is_exceeded(&reading) {
            info!("Below threshold, no alert will be sent");
            return CheckOutcome::BelowThreshold { reading };
        }

        info!(
            "Threshold reached: {} (threshold: {})",
            reading,
            self.monitor.describe_thresholds()
        );
        self.maybe_send_alert(&reading).await
    }

    async fn fetch_reading(&self) -> Result<Reading, FetchError> {
        let point = self.source.latest().await?;
        self.monitor.extract(&point)
    }

    /// Speak unless an alert was delivered within the cooldown window.
    /// The cooldown file is only rewritten after a successful delivery.
    pub async fn maybe_send_alert(&self, reading: &Reading) -> CheckOutcome {
        let now = self.clock.now();
        let last_alert_time = self.store.last_alert_time();

        if let Some(remaining) = self.cooldown.remaining(last_alert_time, now) {
            info!(
                "Last alert was less than {} ago, skipping (wait {} more)",
                format_duration(self.cooldown.seconds() as f64),
                format_duration(remaining)
            );
            info!(
                "Last alert: {}, next alert allowed: {}",
                format_timestamp(last_alert_time),
                format_timestamp(self.cooldown.next_allowed(last_alert_time))
            );
            return CheckOutcome::CoolingDown {
                reading: *reading,
                remaining_seconds: remaining,
            };
        }

        let message = self.monitor.render_message(reading);

        if self.dry_run {
            info!("Dry run, would say on {}: {}", self.speaker.target(), message);
            return CheckOutcome::DryRun {
                reading: *reading,
                message,
            };
        }

        info!("Speaking on {}: {}", self.speaker.target(), message);

        match self.speaker.speak(&message).await {
            Ok(()) => {
                info!("Alert delivered");
                match self.store.record(now) {
                    Ok(()) => info!("Saved alert time: {}", format_timestamp(now)),
                    Err(e) => error!("Failed to save alert time: {:#}", e),
                }
                CheckOutcome::Alerted {
                    reading: *reading,
                    message,
                }
            }
            Err(e) => {
                error!("Failed to deliver alert: {}", e);
                CheckOutcome::AlertFailed {
                    reading: *reading,
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::speaker::SpeakError;
    use crate::ambient::DataPoint;
    use crate::ambient::client::parse_data_points;
    use crate::config::settings::{Co2Config, HeatstrokeConfig};
    use crate::utils::FixedClock;
    use std::cell::RefCell;
    use tempfile::TempDir;

    const NOW: f64 = 1_760_000_000.0;

    struct StaticSource(Result<String, ()>);

    impl SensorSource for StaticSource {
        async fn latest(&self) -> Result<DataPoint, FetchError> {
            match &self.0 {
                Ok(body) => parse_data_points(body)?
                    .into_iter()
                    .next()
                    .ok_or(FetchError::EmptyResponse),
                Err(()) => Err(FetchError::EmptyResponse),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSpeaker {
        fail: bool,
        spoken: RefCell<Vec<String>>,
    }

    impl Speaker for &RecordingSpeaker {
        async fn speak(&self, message: &str) -> Result<(), SpeakError> {
            self.spoken.borrow_mut().push(message.to_string());
            if self.fail {
                Err(SpeakError::Failed {
                    exit_code: 1,
                    stderr: "device not found".to_string(),
                })
            } else {
                Ok(())
            }
        }

        fn target(&self) -> String {
            "test device".to_string()
        }
    }

    fn co2_runner<'a>(
        body: &str,
        speaker: &'a RecordingSpeaker,
        dir: &TempDir,
    ) -> AlertRunner<StaticSource, &'a RecordingSpeaker, FixedClock> {
        AlertRunner::with_clock(
            Monitor::co2(&Co2Config::default()),
            StaticSource(Ok(body.to_string())),
            speaker,
            CooldownStore::new(dir.path().join("co2_last.txt")),
            CooldownWindow::new(1800),
            FixedClock(NOW),
        )
    }

    #[tokio::test]
    async fn test_below_threshold_does_nothing() {
        let dir = TempDir::new().unwrap();
        let speaker = RecordingSpeaker::default();
        let runner = co2_runner(r#"[{"d3": 999.99}]"#, &speaker, &dir);

        let outcome = runner.check_and_alert().await;

        assert!(matches!(outcome, CheckOutcome::BelowThreshold { .. }));
        assert!(speaker.spoken.borrow().is_empty());
        assert!(!runner.store().path().exists());
    }

    #[tokio::test]
    async fn test_threshold_reached_speaks_and_records() {
        let dir = TempDir::new().unwrap();
        let speaker = RecordingSpeaker::default();
        let runner = co2_runner(r#"[{"d3": 1000}]"#, &speaker, &dir);

        let outcome = runner.check_and_alert().await;

        assert!(matches!(outcome, CheckOutcome::Alerted { .. }));
        assert_eq!(
            *speaker.spoken.borrow(),
            vec!["二酸化炭素濃度が1000ppmに達しています。換気してください。"]
        );
        assert_eq!(runner.store().last_alert_time(), NOW);
    }

    #[tokio::test]
    async fn test_cooldown_blocks_second_alert() {
        let dir = TempDir::new().unwrap();
        let speaker = RecordingSpeaker::default();
        let runner = co2_runner(r#"[{"d3": 1500}]"#, &speaker, &dir);
        runner.store().record(NOW - 600.0).unwrap();

        match runner.check_and_alert().await {
            CheckOutcome::CoolingDown {
                remaining_seconds, ..
            } => assert_eq!(remaining_seconds, 1200.0),
            other => panic!("expected CoolingDown, got {:?}", other),
        }
        assert!(speaker.spoken.borrow().is_empty());
        assert_eq!(runner.store().last_alert_time(), NOW - 600.0);
    }

    #[tokio::test]
    async fn test_failed_delivery_keeps_previous_timestamp() {
        let dir = TempDir::new().unwrap();
        let speaker = RecordingSpeaker {
            fail: true,
            ..RecordingSpeaker::default()
        };
        let runner = co2_runner(r#"[{"d3": 1500}]"#, &speaker, &dir);
        runner.store().record(NOW - 7200.0).unwrap();

        let outcome = runner.check_and_alert().await;

        assert!(matches!(outcome, CheckOutcome::AlertFailed { .. }));
        assert_eq!(speaker.spoken.borrow().len(), 1);
        assert_eq!(runner.store().last_alert_time(), NOW - 7200.0);
    }

    #[tokio::test]
    async fn test_unwritable_state_file_still_alerts() {
        let dir = TempDir::new().unwrap();
        let speaker = RecordingSpeaker::default();
        let state_file = dir.path().join("no").join("dir").join("co2_last.txt");
        let runner = AlertRunner::with_clock(
            Monitor::co2(&Co2Config::default()),
            StaticSource(Ok(r#"[{"d3": 1500}]"#.to_string())),
            &speaker,
            CooldownStore::new(&state_file),
            CooldownWindow::new(1800),
            FixedClock(NOW),
        );

        let outcome = runner.check_and_alert().await;

        match outcome {
            CheckOutcome::Alerted { reading, .. } => {
                assert_eq!(reading, Reading::Co2 { ppm: 1500.0 })
            }
            other => panic!("expected Alerted, got {:?}", other),
        }
        assert_eq!(speaker.spoken.borrow().len(), 1);
        assert!(!state_file.exists());
    }

    #[tokio::test]
    async fn test_missing_field_is_data_unavailable() {
        let dir = TempDir::new().unwrap();
        let speaker = RecordingSpeaker::default();
        let runner = co2_runner(r#"[{"d1": 25.0, "d3": null}]"#, &speaker, &dir);

        let outcome = runner.check_and_alert().await;

        assert!(matches!(outcome, CheckOutcome::DataUnavailable { .. }));
        assert!(speaker.spoken.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_error_is_data_unavailable() {
        let dir = TempDir::new().unwrap();
        let speaker = RecordingSpeaker::default();
        let runner = AlertRunner::with_clock(
            Monitor::heatstroke(&HeatstrokeConfig::default()),
            StaticSource(Err(())),
            &speaker,
            CooldownStore::new(dir.path().join("heat_last.txt")),
            CooldownWindow::new(1800),
            FixedClock(NOW),
        );

        let outcome = runner.check_and_alert().await;

        assert!(matches!(outcome, CheckOutcome::DataUnavailable { .. }));
        assert!(!runner.store().path().exists());
    }

    #[tokio::test]
    async fn test_dry_run_leaves_no_trace() {
        let dir = TempDir::new().unwrap();
        let speaker = RecordingSpeaker::default();
        let runner = co2_runner(r#"[{"d3": 2000}]"#, &speaker, &dir).dry_run(true);

        let outcome = runner.check_and_alert().await;

        assert!(matches!(outcome, CheckOutcome::DryRun { .. }));
        assert!(speaker.spoken.borrow().is_empty());
        assert!(!runner.store().path().exists());
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let outcome = CheckOutcome::CoolingDown {
            reading: Reading::Co2 { ppm: 1200.0 },
            remaining_seconds: 60.0,
        };
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["outcome"], "cooling_down");
        assert_eq!(json["reading"]["kind"], "co2");
        assert_eq!(json["reading"]["ppm"], 1200.0);
        assert_eq!(json["remaining_seconds"], 60.0);
    }
}

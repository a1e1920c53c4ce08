use ambient_alert::alerts::{
    AlertRunner, CheckOutcome, CooldownStore, CooldownWindow, SpeakError, Speaker,
};
use ambient_alert::ambient::{DataPoint, FetchError, SensorSource};
use ambient_alert::config::Config;
use ambient_alert::monitor::{Monitor, MonitorKind};
use ambient_alert::utils::Clock;
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::fs;
use tempfile::TempDir;

// Scheduled-run simulation: every cycle reads whatever the fake channel
// currently holds, at whatever time the fake clock says.

struct FakeChannel {
    latest: RefCell<Option<DataPoint>>,
}

impl FakeChannel {
    fn new() -> Self {
        Self {
            latest: RefCell::new(None),
        }
    }

    fn publish(&self, record: serde_json::Value) {
        *self.latest.borrow_mut() = Some(serde_json::from_value(record).unwrap());
    }
}

impl SensorSource for &FakeChannel {
    async fn latest(&self) -> Result<DataPoint, FetchError> {
        self.latest.borrow().clone().ok_or(FetchError::EmptyResponse)
    }
}

struct FakeEcho {
    healthy: Cell<bool>,
    spoken: RefCell<Vec<String>>,
}

impl FakeEcho {
    fn new() -> Self {
        Self {
            healthy: Cell::new(true),
            spoken: RefCell::new(Vec::new()),
        }
    }

    fn count(&self) -> usize {
        self.spoken.borrow().len()
    }
}

impl Speaker for &FakeEcho {
    async fn speak(&self, message: &str) -> Result<(), SpeakError> {
        self.spoken.borrow_mut().push(message.to_string());
        if self.healthy.get() {
            Ok(())
        } else {
            Err(SpeakError::Failed {
                exit_code: 2,
                stderr: "cookie expired".to_string(),
            })
        }
    }

    fn target(&self) -> String {
        "fake echo".to_string()
    }
}

struct ManualClock(Cell<f64>);

impl ManualClock {
    fn advance(&self, seconds: f64) {
        self.0.set(self.0.get() + seconds);
    }
}

impl Clock for &ManualClock {
    fn now(&self) -> f64 {
        self.0.get()
    }
}

const START: f64 = 1_751_328_000.0;

#[tokio::test]
async fn test_co2_alert_cycle_over_an_afternoon() {
    let temp_dir = TempDir::new().unwrap();
    let state_path = temp_dir.path().join("co2_alert_last_time.txt");
    let channel = FakeChannel::new();
    let echo = FakeEcho::new();
    let clock = ManualClock(Cell::new(START));

    let config = Config::default();
    let runner = AlertRunner::with_clock(
        Monitor::from_config(MonitorKind::Co2, &config),
        &channel,
        &echo,
        CooldownStore::new(&state_path),
        CooldownWindow::new(config.alert.cooldown_seconds),
        &clock,
    );

    // fresh air: nothing happens, no state file
    channel.publish(json!({"d3": 640.0, "created": "2025-07-01T00:00:00Z"}));
    assert!(matches!(
        runner.check_and_alert().await,
        CheckOutcome::BelowThreshold { .. }
    ));
    assert!(!state_path.exists());

    // stuffy room: first alert goes out and is recorded
    clock.advance(300.0);
    channel.publish(json!({"d3": 1012.6}));
    assert!(matches!(
        runner.check_and_alert().await,
        CheckOutcome::Alerted { .. }
    ));
    assert_eq!(echo.count(), 1);
    assert_eq!(
        echo.spoken.borrow()[0],
        "二酸化炭素濃度が1012ppmに達しています。換気してください。"
    );
    assert_eq!(
        fs::read_to_string(&state_path).unwrap().parse::<f64>().unwrap(),
        START + 300.0
    );

    // still high every 5 minutes: silent for the whole window
    for _ in 0..5 {
        clock.advance(300.0);
        assert!(matches!(
            runner.check_and_alert().await,
            CheckOutcome::CoolingDown { .. }
        ));
    }
    assert_eq!(echo.count(), 1);

    // exactly one window after the first alert another one is allowed
    clock.advance(300.0);
    assert!(matches!(
        runner.check_and_alert().await,
        CheckOutcome::Alerted { .. }
    ));
    assert_eq!(echo.count(), 2);
    assert_eq!(runner.store().last_alert_time(), START + 300.0 + 1800.0);
}

#[tokio::test]
async fn test_failed_delivery_retries_next_cycle() {
    let temp_dir = TempDir::new().unwrap();
    let state_path = temp_dir.path().join("heatstroke_alert_last_time.txt");
    let channel = FakeChannel::new();
    let echo = FakeEcho::new();
    let clock = ManualClock(Cell::new(START));

    let config = Config::default();
    let runner = AlertRunner::with_clock(
        Monitor::from_config(MonitorKind::Heatstroke, &config),
        &channel,
        &echo,
        CooldownStore::new(&state_path),
        CooldownWindow::new(config.alert.cooldown_seconds),
        &clock,
    );

    channel.publish(json!({"d1": 31.2, "d3": 68.9}));
    echo.healthy.set(false);

    assert!(matches!(
        runner.check_and_alert().await,
        CheckOutcome::AlertFailed { .. }
    ));
    assert!(!state_path.exists());

    // next scheduled run, speaker fixed: no cooldown wait
    clock.advance(60.0);
    echo.healthy.set(true);
    assert!(matches!(
        runner.check_and_alert().await,
        CheckOutcome::Alerted { .. }
    ));
    assert_eq!(echo.count(), 2);
    assert_eq!(
        echo.spoken.borrow()[1],
        "室温が31度、湿度が68パーセントです。熱中症に気を付けてください。"
    );
    assert_eq!(runner.store().last_alert_time(), START + 60.0);
}

#[tokio::test]
async fn test_heatstroke_needs_both_thresholds() {
    let temp_dir = TempDir::new().unwrap();
    let channel = FakeChannel::new();
    let echo = FakeEcho::new();
    let clock = ManualClock(Cell::new(START));

    let config = Config::default();
    let runner = AlertRunner::with_clock(
        Monitor::from_config(MonitorKind::Heatstroke, &config),
        &channel,
        &echo,
        CooldownStore::new(temp_dir.path().join("state.txt")),
        CooldownWindow::new(config.alert.cooldown_seconds),
        &clock,
    );

    channel.publish(json!({"d1": 28.0, "d3": 59.9}));
    assert!(matches!(
        runner.check_and_alert().await,
        CheckOutcome::BelowThreshold { .. }
    ));

    channel.publish(json!({"d1": 28.0, "d3": null}));
    assert!(matches!(
        runner.check_and_alert().await,
        CheckOutcome::DataUnavailable { .. }
    ));

    assert_eq!(echo.count(), 0);
}

#[tokio::test]
async fn test_corrupt_state_file_does_not_block_alerts() {
    let temp_dir = TempDir::new().unwrap();
    let state_path = temp_dir.path().join("co2_alert_last_time.txt");
    fs::write(&state_path, "not a timestamp").unwrap();

    let channel = FakeChannel::new();
    let echo = FakeEcho::new();
    let clock = ManualClock(Cell::new(START));

    let runner = AlertRunner::with_clock(
        Monitor::from_config(MonitorKind::Co2, &Config::default()),
        &channel,
        &echo,
        CooldownStore::new(&state_path),
        CooldownWindow::new(1800),
        &clock,
    );

    channel.publish(json!({"d3": "1450"}));
    assert!(matches!(
        runner.check_and_alert().await,
        CheckOutcome::Alerted { .. }
    ));
    assert_eq!(runner.store().last_alert_time(), START);
}

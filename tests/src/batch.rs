#![cfg(test)]
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use fleetcheck_common::config::Config;
use fleetcheck_common::device::{Credentials, DeviceAddress, parse_address_list};
use fleetcheck_common::error::{ConnectionError, SessionError};
use fleetcheck_common::ports::{Session, SessionProvider};
use fleetcheck_core::archive::FileArchive;
use fleetcheck_core::audit::DeviceAuditor;
use fleetcheck_core::batch::BatchRunner;

/// Calls seen by one device, shared with the test after the session is boxed.
#[derive(Debug, Default)]
struct DeviceLog {
    executed: Vec<String>,
    configured: Vec<Vec<String>>,
    closed: bool,
}

struct FakeDevice {
    outputs: HashMap<&'static str, &'static str>,
    log: Arc<Mutex<DeviceLog>>,
}

#[async_trait]
impl Session for FakeDevice {
    async fn execute(&mut self, command: &str) -> Result<String, SessionError> {
        self.log.lock().unwrap().executed.push(command.to_string());
        Ok(self.outputs.get(command).copied().unwrap_or_default().to_string())
    }

    async fn configure(&mut self, lines: &[String]) -> Result<(), SessionError> {
        self.log.lock().unwrap().configured.push(lines.to_vec());
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        self.log.lock().unwrap().closed = true;
        Ok(())
    }
}

/// Every address fails with a timeout unless a device was registered for it.
#[derive(Default)]
struct FakeFleet {
    devices: Mutex<HashMap<String, FakeDevice>>,
}

impl FakeFleet {
    fn with_device(self, address: &str, outputs: &[(&'static str, &'static str)]) -> (Self, Arc<Mutex<DeviceLog>>) {
        let log = Arc::new(Mutex::new(DeviceLog::default()));
        let device = FakeDevice {
            outputs: outputs.iter().copied().collect(),
            log: log.clone(),
        };
        self.devices.lock().unwrap().insert(address.to_string(), device);
        (self, log)
    }
}

#[async_trait]
impl SessionProvider for FakeFleet {
    async fn open(
        &self,
        address: &DeviceAddress,
        _credentials: &Credentials,
    ) -> Result<Box<dyn Session>, ConnectionError> {
        match self.devices.lock().unwrap().remove(address.as_str()) {
            Some(device) => Ok(Box::new(device)),
            None => Err(ConnectionError::Timeout {
                address: address.to_string(),
            }),
        }
    }
}

const R1: &[(&str, &str)] = &[
    ("sh run | in hostname", "hostname R1"),
    ("sh run", "Building configuration...\n!\nhostname R1\n!\nend"),
    ("sh cdp entry * | in Device.ID", "Device ID: SW1\nDevice ID: SW2"),
    ("sh version | in bytes of memory", "cisco 4096K/4096K bytes of memory."),
    ("sh version | in System image", "System image file is \"flash:c2900-universalk9-mz.npe.bin\""),
    ("ping 10.177.0.1", "Success rate is 100 percent (5/5), round-trip min/avg/max = 1/1/4 ms"),
    ("sh ntp status | in Clock is", "Clock is synchronized, stratum 4, reference is 10.177.0.1"),
];

fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("fleetcheck-it-{}", rand::random::<u64>()))
}

fn test_config(output_dir: PathBuf) -> Config {
    let mut cfg = Config::default();
    cfg.output_dir = output_dir;
    cfg.ntp.settle_delay = Duration::ZERO;
    cfg.command_timeout = Duration::from_secs(1);
    cfg
}

fn runner(cfg: &Config, fleet: FakeFleet) -> BatchRunner {
    let auditor = DeviceAuditor::from_config(cfg, Box::new(FileArchive::new(&cfg.output_dir)));
    BatchRunner::new(Box::new(fleet), auditor).with_date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
}

#[tokio::test]
async fn one_unreachable_device_and_one_healthy_router() {
    let dir = scratch_dir();
    let cfg = test_config(dir.clone());
    let (fleet, log) = FakeFleet::default().with_device("10.0.0.2", R1);

    let addresses = parse_address_list("10.0.0.1,10.0.0.2").unwrap();
    let mut reported = Vec::new();
    let batch = runner(&cfg, fleet)
        .run(&addresses, &Credentials::new("admin", "pw", "secret"), |idx, outcome| {
            reported.push((idx, outcome.to_string()))
        })
        .await;

    let expected = vec![
        "Failed to connect to 10.0.0.1".to_string(),
        "R1 | 4096K/4096K | c2900-universalk9-mz.npe.bin | NPE | CDP is ON, 2 peers | Clock in SYNCED"
            .to_string(),
    ];
    assert_eq!(batch.report_lines(), expected);
    assert_eq!(
        reported,
        vec![(0, expected[0].clone()), (1, expected[1].clone())]
    );
    assert!(batch.has_failures());

    let log = log.lock().unwrap();
    assert!(log.closed);
    assert_eq!(
        log.configured,
        vec![vec!["clock timezone GMT 0".to_string(), "ntp server 10.177.0.1".to_string()]]
    );

    let backup = std::fs::read_to_string(dir.join("2024-03-01_R1")).unwrap();
    assert_eq!(backup, "Building configuration...\n!\nhostname R1\n!\nend");

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn unreachable_ntp_server_leaves_devices_unconfigured() {
    let dir = scratch_dir();
    let cfg = test_config(dir.clone());

    let outputs: Vec<(&'static str, &'static str)> = R1
        .iter()
        .map(|&(cmd, out)| match cmd {
            "ping 10.177.0.1" => (cmd, "Success rate is 0 percent (0/5)"),
            _ => (cmd, out),
        })
        .collect();
    let (fleet, log) = FakeFleet::default().with_device("10.0.0.2", &outputs);

    let addresses = parse_address_list("10.0.0.2").unwrap();
    let batch = runner(&cfg, fleet)
        .run(&addresses, &Credentials::new("admin", "pw", "secret"), |_, _| {})
        .await;

    assert_eq!(
        batch.report_lines(),
        vec!["R1 | 4096K/4096K | c2900-universalk9-mz.npe.bin | NPE | CDP is ON, 2 peers | Clock in NOT SYNCED"]
    );
    assert!(!batch.has_failures());

    let log = log.lock().unwrap();
    assert!(log.configured.is_empty());
    assert!(!log.executed.iter().any(|c| c == "sh ntp status | in Clock is"));

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn malformed_image_line_fails_only_that_device() {
    let dir = scratch_dir();
    let cfg = test_config(dir.clone());

    let broken: Vec<(&'static str, &'static str)> = R1
        .iter()
        .map(|&(cmd, out)| match cmd {
            "sh version | in System image" => (cmd, "System image file is \"flash:\""),
            "sh run | in hostname" => (cmd, "hostname R2"),
            _ => (cmd, out),
        })
        .collect();
    let (fleet, broken_log) = FakeFleet::default().with_device("10.0.0.2", &broken);
    let (fleet, _) = fleet.with_device("10.0.0.3", R1);

    let addresses = parse_address_list("10.0.0.2,10.0.0.3").unwrap();
    let batch = runner(&cfg, fleet)
        .run(&addresses, &Credentials::new("admin", "pw", "secret"), |_, _| {})
        .await;

    let lines = batch.report_lines();
    assert_eq!(lines[0], "Failed to connect to 10.0.0.2");
    assert!(lines[1].starts_with("R1 | "));
    assert_eq!(batch.failure_count(), 1);
    assert!(broken_log.lock().unwrap().closed);

    let _ = std::fs::remove_dir_all(dir);
}

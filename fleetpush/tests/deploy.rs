//! End-to-end deployment tests against scripted in-memory sessions.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fleetpush::config::est;
use fleetpush::error::{Error, Result, TransportError};
use fleetpush::{
    ConnectionParameters, DeviceTask, DeviceTemplate, Inventory, Orchestrator, OutputWriter,
    RemoteSession, SessionConnector,
};

/// How a scripted device behaves.
#[derive(Clone)]
enum Device {
    /// Answers `show version` with the given text and accepts any config.
    Healthy { version: String, reply: String },
    /// Refuses the login.
    Unreachable,
    /// Never answers the connect.
    Hung,
    /// Logs in but never answers the config push.
    StallsOnPush { version: String },
    /// Brings the connecting task down.
    Panics,
}

#[derive(Default)]
struct Counters {
    opened: AtomicUsize,
    closed: AtomicUsize,
    active: AtomicUsize,
    peak: AtomicUsize,
    pushed: Mutex<Vec<Vec<String>>>,
}

struct FakeConnector {
    devices: HashMap<String, Device>,
    counters: Arc<Counters>,
    latency: Duration,
}

impl FakeConnector {
    fn new(devices: impl IntoIterator<Item = (&'static str, Device)>) -> Self {
        Self {
            devices: devices
                .into_iter()
                .map(|(host, device)| (host.to_string(), device))
                .collect(),
            counters: Arc::new(Counters::default()),
            latency: Duration::ZERO,
        }
    }

    fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

struct FakeSession {
    device: Device,
    counters: Arc<Counters>,
    latency: Duration,
}

impl SessionConnector for FakeConnector {
    type Session = FakeSession;

    async fn connect(&self, params: ConnectionParameters) -> Result<FakeSession> {
        let device = self
            .devices
            .get(&params.host)
            .cloned()
            .unwrap_or(Device::Unreachable);

        match device {
            Device::Unreachable => Err(TransportError::AuthenticationFailed {
                user: params.username,
            }
            .into()),
            Device::Hung => std::future::pending().await,
            Device::Panics => panic!("scripted connector panic"),
            device => {
                self.counters.opened.fetch_add(1, Ordering::SeqCst);
                let active = self.counters.active.fetch_add(1, Ordering::SeqCst) + 1;
                self.counters.peak.fetch_max(active, Ordering::SeqCst);
                Ok(FakeSession {
                    device,
                    counters: Arc::clone(&self.counters),
                    latency: self.latency,
                })
            }
        }
    }
}

impl RemoteSession for FakeSession {
    async fn send_command(&mut self, command: &str) -> Result<String> {
        assert_eq!(command, "show version");
        tokio::time::sleep(self.latency).await;
        match &self.device {
            Device::Healthy { version, .. } | Device::StallsOnPush { version } => {
                Ok(version.clone())
            }
            _ => unreachable!("no session for this device"),
        }
    }

    async fn send_config_set(&mut self, commands: &[&str]) -> Result<String> {
        match &self.device {
            Device::Healthy { reply, .. } => {
                let lines = commands.iter().map(|c| c.to_string()).collect();
                self.counters.pushed.lock().unwrap().push(lines);
                Ok(reply.clone())
            }
            Device::StallsOnPush { .. } => std::future::pending().await,
            _ => unreachable!("no session for this device"),
        }
    }

    async fn close(self) -> Result<()> {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        self.counters.active.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

fn ios_banner(hostname: &str) -> String {
    format!(
        "Cisco IOS Software, IOSv Software (VIOS-ADVENTERPRISEK9-M), Version 15.6(2)T\n\
         \n\
         {hostname} uptime is 2 hours, 4 minutes\n\
         System image file is \"flash0:/vios-adventerprisek9-m\"\n"
    )
}

/// Banner of a platform without a specific marker, as the session returns it.
fn isr_banner(hostname: &str) -> String {
    format!(
        "Cisco IOS Software, C2900 Software (C2900-UNIVERSALK9-M), Version 15.7(3)M3\n\
         ROM: System Bootstrap, Version 15.0(1r)M16\n\
         \n\
         {hostname} uptime is 5 weeks, 2 days, 3 hours\n"
    )
}

fn healthy(hostname: &str) -> Device {
    Device::Healthy {
        version: ios_banner(hostname),
        reply: "OK".to_string(),
    }
}

fn write_conf(dir: &Path, hostname: &str, body: &str) {
    std::fs::write(dir.join(format!("{}.conf", hostname.to_lowercase())), body).unwrap();
}

fn task(connector: FakeConnector, config_dir: &Path) -> DeviceTask<FakeConnector> {
    DeviceTask::new(connector, DeviceTemplate::new("netops", "s3cret")).with_config_dir(config_dir)
}

fn labels(results: &[fleetpush::TaskResult]) -> HashSet<String> {
    results.iter().map(|r| r.label.clone()).collect()
}

#[tokio::test]
async fn deploys_config_to_identified_device() {
    let dir = tempfile::tempdir().unwrap();
    write_conf(
        dir.path(),
        "R1",
        "hostname R1\n\ninterface Loopback0\n ip address 1.1.1.1 255.255.255.255\n",
    );

    let inventory = Inventory::from_yaml("devices:\n  - 10.0.0.1\n").unwrap();
    let connector = FakeConnector::new([("10.0.0.1", healthy("R1"))]);
    let counters = Arc::clone(&connector.counters);
    let orchestrator = Orchestrator::new(task(connector, dir.path()));

    let results = orchestrator.run_all(&inventory.devices).await;

    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.label, "R1");
    assert_eq!(result.address, "10.0.0.1");
    assert!(result.deployed);
    assert!(result.transcript.starts_with("Configs deployed to R1\n"));
    assert!(result.transcript.contains("OK"));
    assert!(result.transcript.contains(&"=".repeat(80)));

    let pushed = counters.pushed.lock().unwrap();
    assert_eq!(
        pushed[0],
        vec![
            "hostname R1",
            "interface Loopback0",
            " ip address 1.1.1.1 255.255.255.255"
        ]
    );
    assert_eq!(counters.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn generic_ios_device_is_deployed() {
    let dir = tempfile::tempdir().unwrap();
    write_conf(dir.path(), "branch-rtr7", "hostname branch-rtr7\n");

    let connector = FakeConnector::new([(
        "10.2.0.7",
        Device::Healthy {
            version: isr_banner("branch-rtr7"),
            reply: "OK".to_string(),
        },
    )]);
    let counters = Arc::clone(&connector.counters);

    let result = task(connector, dir.path()).run("10.2.0.7").await;

    assert!(result.deployed);
    assert_eq!(result.label, "branch-rtr7");
    assert_eq!(
        counters.pushed.lock().unwrap().as_slice(),
        [vec!["hostname branch-rtr7".to_string()]]
    );
}

#[tokio::test]
async fn unwritable_log_dir_is_an_output_error() {
    let config_dir = tempfile::tempdir().unwrap();
    let log_dir = tempfile::tempdir().unwrap();
    write_conf(config_dir.path(), "R1", "hostname R1\n");

    let connector = FakeConnector::new([("10.0.0.1", healthy("R1"))]);
    let orchestrator = Orchestrator::new(task(connector, config_dir.path()));
    let writer = OutputWriter::new(log_dir.path().join("missing"), est());

    let err = orchestrator
        .deploy(&["10.0.0.1".to_string()], &writer)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Output(_)));
}

#[tokio::test]
async fn login_failure_is_labelled_with_address() {
    let dir = tempfile::tempdir().unwrap();
    let connector = FakeConnector::new([("10.0.0.1", Device::Unreachable)]);
    let counters = Arc::clone(&connector.counters);
    let orchestrator = Orchestrator::new(task(connector, dir.path()));

    let results = orchestrator.run_all(&["10.0.0.1".to_string()]).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].label, "10.0.0.1");
    assert!(!results[0].deployed);
    assert!(results[0]
        .transcript
        .contains("Unable to login to device 10.0.0.1"));
    assert_eq!(counters.opened.load(Ordering::SeqCst), 0);
    assert_eq!(counters.closed.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn one_failure_does_not_affect_the_other_device() {
    let dir = tempfile::tempdir().unwrap();
    write_conf(dir.path(), "R1", "hostname R1\n");

    let connector = FakeConnector::new([
        ("10.0.0.1", healthy("R1")),
        ("10.0.0.2", Device::Unreachable),
    ]);
    let orchestrator = Orchestrator::new(task(connector, dir.path()));

    let devices = vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()];
    let results = orchestrator.run_all(&devices).await;

    assert_eq!(results.len(), 2);
    assert_eq!(
        labels(&results),
        HashSet::from(["R1".to_string(), "10.0.0.2".to_string()])
    );
}

#[tokio::test]
async fn missing_config_file_still_closes_session() {
    let dir = tempfile::tempdir().unwrap();
    let connector = FakeConnector::new([("10.0.0.1", healthy("R1"))]);
    let counters = Arc::clone(&connector.counters);
    let task = task(connector, dir.path());

    let result = task.run("10.0.0.1").await;

    assert!(!result.deployed);
    assert_eq!(result.label, "10.0.0.1");
    assert_eq!(counters.opened.load(Ordering::SeqCst), 1);
    assert_eq!(counters.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unrecognized_device_is_not_configured() {
    let dir = tempfile::tempdir().unwrap();
    write_conf(dir.path(), "sw1", "hostname sw1\n");

    let connector = FakeConnector::new([(
        "10.0.0.9",
        Device::Healthy {
            version: "Arista DCS-7050TX\nsw1 uptime is 3 weeks\n".to_string(),
            reply: "OK".to_string(),
        },
    )]);
    let counters = Arc::clone(&connector.counters);

    let result = task(connector, dir.path()).run("10.0.0.9").await;

    assert_eq!(result.label, "10.0.0.9");
    assert!(counters.pushed.lock().unwrap().is_empty());
    assert_eq!(counters.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn config_file_name_is_lowercased_hostname() {
    let dir = tempfile::tempdir().unwrap();
    write_conf(dir.path(), "core-rtr1", "hostname Core-RTR1\n");

    let connector = FakeConnector::new([("10.1.1.1", healthy("Core-RTR1"))]);
    let result = task(connector, dir.path()).run("10.1.1.1").await;

    assert!(result.deployed);
    assert_eq!(result.label, "Core-RTR1");
}

#[tokio::test]
async fn hung_device_times_out_without_blocking_others() {
    let dir = tempfile::tempdir().unwrap();
    write_conf(dir.path(), "R2", "hostname R2\n");

    let connector = FakeConnector::new([
        ("10.0.0.1", Device::Hung),
        ("10.0.0.2", healthy("R2")),
    ]);
    let task = task(connector, dir.path()).with_timeout(Duration::from_millis(200));
    let orchestrator = Orchestrator::new(task);

    let devices = vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()];
    let results = orchestrator.run_all(&devices).await;

    assert_eq!(
        labels(&results),
        HashSet::from(["10.0.0.1".to_string(), "R2".to_string()])
    );
}

#[tokio::test]
async fn stalled_push_times_out_and_releases_session() {
    let dir = tempfile::tempdir().unwrap();
    write_conf(dir.path(), "R3", "hostname R3\n");

    let connector = FakeConnector::new([(
        "10.0.0.3",
        Device::StallsOnPush {
            version: ios_banner("R3"),
        },
    )]);
    let counters = Arc::clone(&connector.counters);
    let task = task(connector, dir.path()).with_timeout(Duration::from_millis(200));

    let result = task.run("10.0.0.3").await;

    assert_eq!(result.label, "10.0.0.3");
    assert_eq!(counters.opened.load(Ordering::SeqCst), 1);
    assert_eq!(counters.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn concurrency_ceiling_is_respected() {
    let dir = tempfile::tempdir().unwrap();
    let hosts = ["10.0.1.1", "10.0.1.2", "10.0.1.3", "10.0.1.4", "10.0.1.5", "10.0.1.6"];
    let mut devices = Vec::new();
    for (i, host) in hosts.iter().enumerate() {
        let name = format!("R{i}");
        write_conf(dir.path(), &name, "hostname x\n");
        devices.push((*host, healthy(&name)));
    }

    let connector = FakeConnector::new(devices).with_latency(Duration::from_millis(20));
    let counters = Arc::clone(&connector.counters);
    let orchestrator = Orchestrator::new(task(connector, dir.path())).with_max_concurrency(2);

    let addresses: Vec<String> = hosts.iter().map(|h| h.to_string()).collect();
    let results = orchestrator.run_all(&addresses).await;

    assert_eq!(results.len(), 6);
    assert!(results.iter().all(|r| r.deployed));
    assert!(counters.peak.load(Ordering::SeqCst) <= 2);
    assert_eq!(counters.closed.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn every_device_gets_one_log_file() {
    let config_dir = tempfile::tempdir().unwrap();
    let log_dir = tempfile::tempdir().unwrap();
    write_conf(config_dir.path(), "R1", "hostname R1\n");
    write_conf(config_dir.path(), "R3", "hostname R3\n");

    let connector = FakeConnector::new([
        ("10.0.0.1", healthy("R1")),
        ("10.0.0.2", Device::Unreachable),
        ("10.0.0.3", healthy("R3")),
        ("10.0.0.4", healthy("R4")),
    ]);
    let orchestrator = Orchestrator::new(task(connector, config_dir.path()));
    let writer = OutputWriter::new(log_dir.path(), est());

    let devices: Vec<String> = (1..=4).map(|i| format!("10.0.0.{i}")).collect();
    let results = orchestrator.deploy(&devices, &writer).await.unwrap();

    assert_eq!(results.len(), 4);
    assert_eq!(results.iter().filter(|r| r.deployed).count(), 2);

    let mut files: Vec<String> = std::fs::read_dir(log_dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();

    assert_eq!(files.len(), 4);
    for (file, prefix) in files.iter().zip(["10.0.0.2_", "10.0.0.4_", "R1_", "R3_"]) {
        assert!(file.starts_with(prefix), "{file} should start with {prefix}");
        assert!(file.ends_with(".log"));
    }

    let r1 = files.iter().find(|f| f.starts_with("R1_")).unwrap();
    let body = std::fs::read_to_string(log_dir.path().join(r1)).unwrap();
    assert!(body.starts_with("Configs deployed to R1"));
}

#[tokio::test]
async fn panicking_task_still_yields_a_result() {
    let dir = tempfile::tempdir().unwrap();
    write_conf(dir.path(), "R1", "hostname R1\n");

    let connector = FakeConnector::new([
        ("10.0.0.1", healthy("R1")),
        ("10.0.0.66", Device::Panics),
    ]);
    let orchestrator = Orchestrator::new(task(connector, dir.path()));

    let devices = vec!["10.0.0.1".to_string(), "10.0.0.66".to_string()];
    let results = orchestrator.run_all(&devices).await;

    assert_eq!(
        labels(&results),
        HashSet::from(["R1".to_string(), "10.0.0.66".to_string()])
    );
    let failed = results.iter().find(|r| !r.deployed).unwrap();
    assert!(failed.transcript.contains("Unable to login to device 10.0.0.66"));
}

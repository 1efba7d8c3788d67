#![allow(dead_code)]

use std::collections::HashSet;
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

use medlyf_crew::bus::LocalBus;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Every variable the crew configuration reads.
pub const CREW_ENV_KEYS: [&str; 11] = [
    "BUS_URL",
    "CHANNEL_NAME",
    "JOB_SERVER_URL",
    "ALERT_THRESHOLD",
    "JOB_TIMEOUT_SECS",
    "HTTP_ADDR",
    "HTTP_ENABLED",
    "SEVERITY_CSV",
    "SEVERITY_INTERVAL_SECS",
    "RECORDS_PATH",
    "CREW_CONFIG_PATH",
];

/// Runs `f` with environment variables temporarily modified.
///
/// Every crew variable not named in `changes` is cleared for the duration,
/// so the developer's shell cannot leak into the test. Access is serialised
/// and the previous values are restored on unwind.
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let mut all: Vec<(&str, Option<&str>)> = CREW_ENV_KEYS
        .iter()
        .filter(|key| !changes.iter().any(|(k, _)| k == *key))
        .map(|key| (*key, None))
        .collect();
    all.extend_from_slice(changes);
    let _guard = ScopedEnv::new(&all);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Write `content` to a fresh temporary file with the given suffix.
pub fn temp_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    file.write_all(content.as_bytes()).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

/// Daily `ds,y` series starting 2024-01-01.
pub fn daily_series_csv(values: &[f64]) -> tempfile::NamedTempFile {
    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
    let mut csv = String::from("ds,y\n");
    for (i, y) in values.iter().enumerate() {
        let ds = start + chrono::Days::new(i as u64);
        csv.push_str(&format!("{},{}\n", ds.format("%Y-%m-%d"), y));
    }
    temp_file(".csv", &csv)
}

/// Poll the bus history until it holds at least `count` messages.
pub async fn wait_for_history(bus: &LocalBus, count: usize) -> Vec<String> {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let history = bus.history();
        if history.len() >= count || tokio::time::Instant::now() >= deadline {
            return history;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// `event_type` of every message, in order.
pub fn event_types(history: &[String]) -> Vec<String> {
    history
        .iter()
        .map(|raw| {
            serde_json::from_str::<serde_json::Value>(raw)
                .ok()
                .and_then(|v| v["event_type"].as_str().map(str::to_string))
                .unwrap_or_default()
        })
        .collect()
}

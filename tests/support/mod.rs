/*!
Test support helpers shared across integration tests.

- FakeRuntime: scripted in-memory `ContainerRuntime` that records every lifecycle call
- Script: per-image behavior (output, failing stage, delay)
- RendezvousGate: proves tasks run concurrently without risking a deadlock
- fake_docker: stand-in docker executable that logs its argv (unix only)
*/
#![allow(dead_code)]

use std::collections::HashMap;
#[cfg(unix)]
use std::path::PathBuf;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use image_probe::{ContainerId, ContainerRuntime, ProbeError, WaitOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Pull,
    Create,
    Start,
    Wait,
    Logs,
    Remove,
}

#[derive(Debug, Clone, Default)]
pub struct Script {
    pub output: String,
    pub exit_code: i64,
    pub progress: Vec<String>,
    pub fail_at: Vec<(Stage, String)>,
    pub delay: Duration,
    pub panic_on_pull: bool,
}

impl Script {
    pub fn output(s: &str) -> Self {
        Self {
            output: s.to_string(),
            ..Self::default()
        }
    }

    pub fn fail(mut self, stage: Stage, msg: &str) -> Self {
        self.fail_at.push((stage, msg.to_string()));
        self
    }

    pub fn delay(mut self, d: Duration) -> Self {
        self.delay = d;
        self
    }

    pub fn progress(mut self, lines: &[&str]) -> Self {
        self.progress = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn exit_code(mut self, code: i64) -> Self {
        self.exit_code = code;
        self
    }

    pub fn panic_on_pull(mut self) -> Self {
        self.panic_on_pull = true;
        self
    }

    fn failure(&self, stage: Stage) -> Option<String> {
        self.fail_at
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, m)| m.clone())
    }
}

/// Counts arrivals and lets each waiter through once `expected` tasks are inside at the
/// same time, or after a timeout. `all_met()` tells whether the rendezvous happened.
pub struct RendezvousGate {
    expected: usize,
    arrived: Mutex<usize>,
    cv: Condvar,
}

impl RendezvousGate {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            arrived: Mutex::new(0),
            cv: Condvar::new(),
        }
    }

    pub fn arrive(&self) {
        let mut n = self.arrived.lock().unwrap();
        *n += 1;
        self.cv.notify_all();
        let _ = self
            .cv
            .wait_timeout_while(n, Duration::from_secs(5), |n| *n < self.expected)
            .unwrap();
    }

    pub fn all_met(&self) -> bool {
        *self.arrived.lock().unwrap() >= self.expected
    }
}

#[derive(Default)]
pub struct FakeRuntime {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<(String, Stage)>>,
    containers: Mutex<HashMap<String, String>>,
    next_id: AtomicUsize,
    gate: Option<Arc<RendezvousGate>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(mut self, image: &str, script: Script) -> Self {
        self.scripts.insert(image.to_string(), script);
        self
    }

    pub fn gate(mut self, gate: Arc<RendezvousGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Lifecycle stages invoked for `image`, in call order.
    pub fn calls_for(&self, image: &str) -> Vec<Stage> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(i, _)| i == image)
            .map(|(_, s)| *s)
            .collect()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn script_for(&self, image: &str) -> Script {
        self.scripts.get(image).cloned().unwrap_or_default()
    }

    fn image_of(&self, id: &ContainerId) -> String {
        self.containers
            .lock()
            .unwrap()
            .get(id.as_str())
            .cloned()
            .unwrap_or_else(|| panic!("unknown container {id}"))
    }

    fn record(&self, image: &str, stage: Stage) -> Script {
        self.calls.lock().unwrap().push((image.to_string(), stage));
        self.script_for(image)
    }
}

impl ContainerRuntime for FakeRuntime {
    fn pull(&self, image: &str, progress: &mut dyn FnMut(&str)) -> Result<(), ProbeError> {
        let script = self.record(image, Stage::Pull);
        if let Some(gate) = &self.gate {
            gate.arrive();
        }
        if script.panic_on_pull {
            panic!("scripted panic while pulling {image}");
        }
        if !script.delay.is_zero() {
            std::thread::sleep(script.delay);
        }
        for line in &script.progress {
            progress(line);
        }
        match script.failure(Stage::Pull) {
            Some(msg) => Err(ProbeError::Pull(msg)),
            None => Ok(()),
        }
    }

    fn create(&self, image: &str, _command: &[String]) -> Result<ContainerId, ProbeError> {
        let script = self.record(image, Stage::Create);
        if let Some(msg) = script.failure(Stage::Create) {
            return Err(ProbeError::Create(msg));
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let id = format!("{n:012x}{n:04}");
        self.containers
            .lock()
            .unwrap()
            .insert(id.clone(), image.to_string());
        Ok(ContainerId::new(id))
    }

    fn start(&self, id: &ContainerId) -> Result<(), ProbeError> {
        let image = self.image_of(id);
        let script = self.record(&image, Stage::Start);
        match script.failure(Stage::Start) {
            Some(msg) => Err(ProbeError::Start(msg)),
            None => Ok(()),
        }
    }

    fn wait(&self, id: &ContainerId) -> Result<WaitOutcome, ProbeError> {
        let image = self.image_of(id);
        let script = self.record(&image, Stage::Wait);
        match script.failure(Stage::Wait) {
            Some(msg) => Err(ProbeError::Wait(msg)),
            None => Ok(WaitOutcome {
                status_code: script.exit_code,
            }),
        }
    }

    fn logs(&self, id: &ContainerId) -> Result<String, ProbeError> {
        let image = self.image_of(id);
        let script = self.record(&image, Stage::Logs);
        match script.failure(Stage::Logs) {
            Some(msg) => Err(ProbeError::Logs(msg)),
            None => Ok(script.output),
        }
    }

    fn remove(&self, id: &ContainerId) -> Result<(), ProbeError> {
        let image = self.image_of(id);
        let script = self.record(&image, Stage::Remove);
        match script.failure(Stage::Remove) {
            Some(msg) => Err(ProbeError::Remove(msg)),
            None => Ok(()),
        }
    }
}

/// Connector handing every task a clone of the same shared fake.
pub fn connector(
    fake: &Arc<FakeRuntime>,
) -> impl Fn() -> Result<Arc<FakeRuntime>, ProbeError> + Sync {
    let fake = Arc::clone(fake);
    move || Ok(Arc::clone(&fake))
}

pub fn images(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Write `body` to `dir/name` and mark it executable.
#[cfg(unix)]
pub fn write_executable(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    std::fs::write(&path, body).expect("write script");
    let mut perms = std::fs::metadata(&path).expect("stat").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod");
    path
}

/// Stand-in `docker` recording each invocation (argv joined by spaces) into `calls.log`.
///
/// Images named `missing:*` fail to pull; images named `noxz:*` print the shell's
/// "not found" diagnostic on stderr instead of a version.
#[cfg(unix)]
pub fn fake_docker(dir: &Path) -> (PathBuf, PathBuf) {
    let log = dir.join("calls.log");
    let body = format!(
        r#"#!/bin/sh
echo "$*" >> '{log}'
case "$1" in
  version)
    echo "24.0.7"
    ;;
  pull)
    case "$2" in
      missing:*)
        echo "Error response from daemon: manifest for $2 not found" >&2
        exit 1
        ;;
    esac
    echo "tag: Pulling from library/fake"
    echo "Status: Downloaded newer image for $2"
    ;;
  create)
    case "$4" in
      noxz:*) echo "feedfacefeedfacefeed" ;;
      *) echo "0123456789abcdef0123" ;;
    esac
    ;;
  start)
    echo "$2"
    ;;
  wait)
    echo 0
    ;;
  logs)
    case "$2" in
      feedface*)
        echo "sh: xz: not found" >&2
        ;;
      *)
        echo "xz (XZ Utils) 5.4.3"
        echo "liblzma 5.4.3"
        echo "warning: from stderr" >&2
        ;;
    esac
    ;;
  rm)
    echo "$3"
    ;;
  *)
    echo "unknown command $1" >&2
    exit 2
    ;;
esac
"#,
        log = log.display()
    );
    let bin = write_executable(dir, "docker", &body);
    (bin, log)
}

pub fn read_calls(log: &Path) -> Vec<String> {
    std::fs::read_to_string(log)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

//! Single-image inspection: one ephemeral container, one result.
//!
//! Invariants:
//! - `inspect_image` returns exactly one `InspectionResult` for every call; runtime
//!   failures become data, never panics or early exits past this boundary.
//! - A container is removed (forced) on every exit path once `create` has returned an id,
//!   and never otherwise. Removal failures are reported to the operator sink only.

use serde::Serialize;

#[cfg(feature = "otel")]
use tracing::instrument;

use crate::docker::{ContainerId, ContainerRuntime};
use crate::{OperatorSink, ProbeError};

/// Binary whose version is audited when nothing else is configured.
pub const DEFAULT_TARGET: &str = "xz";

/// What to run inside each container and what to look for in its output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Probe {
    /// Substring identifying the version line (usually the binary name).
    pub target: String,
    /// argv executed in the container.
    pub command: Vec<String>,
}

impl Probe {
    pub fn new(target: impl Into<String>, command: Vec<String>) -> Self {
        Self {
            target: target.into(),
            command,
        }
    }

    /// Run `script` through `sh -c`.
    pub fn shell(target: impl Into<String>, script: impl Into<String>) -> Self {
        Self::new(
            target,
            vec!["sh".to_string(), "-c".to_string(), script.into()],
        )
    }

    /// `<target> --version` via the image's shell.
    pub fn version_of(target: &str) -> Self {
        Self::shell(target, format!("{target} --version"))
    }
}

impl Default for Probe {
    fn default() -> Self {
        Self::version_of(DEFAULT_TARGET)
    }
}

/// Outcome for one image. Built once by the inspection task and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectionResult {
    pub image: String,
    pub output: String,
    pub error: Option<ProbeError>,
}

impl InspectionResult {
    pub fn ok(image: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            output: output.into(),
            error: None,
        }
    }

    pub fn failed(image: impl Into<String>, error: ProbeError) -> Self {
        Self {
            image: image.into(),
            output: String::new(),
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Pairs a created container with its forced removal; dropping the guard removes it.
struct ContainerGuard<'a, R: ContainerRuntime + ?Sized> {
    runtime: &'a R,
    id: ContainerId,
    image: &'a str,
    sink: &'a OperatorSink,
}

impl<R: ContainerRuntime + ?Sized> ContainerGuard<'_, R> {
    fn id(&self) -> &ContainerId {
        &self.id
    }
}

impl<R: ContainerRuntime + ?Sized> Drop for ContainerGuard<'_, R> {
    fn drop(&mut self) {
        match self.runtime.remove(&self.id) {
            Ok(()) => self
                .sink
                .info(self.image, &format!("removed container {}", short_id(&self.id))),
            Err(e) => {
                #[cfg(feature = "otel")]
                tracing::warn!(container = %self.id, error = %e, "container removal failed");
                self.sink.warn(
                    self.image,
                    &format!("failed to remove container {}: {}", self.id, e),
                );
            }
        }
    }
}

fn short_id(id: &ContainerId) -> &str {
    let s = id.as_str();
    s.get(..12).unwrap_or(s)
}

/// Obtain a client from `connect` and run the full lifecycle for `image`.
pub fn inspect_image<R, F>(
    image: &str,
    connect: &F,
    probe: &Probe,
    sink: &OperatorSink,
) -> InspectionResult
where
    R: ContainerRuntime,
    F: Fn() -> Result<R, ProbeError> + ?Sized,
{
    match connect() {
        Ok(runtime) => run_lifecycle(&runtime, image, probe, sink),
        Err(e) => InspectionResult::failed(image, e),
    }
}

/// pull → create → start → wait → logs, with removal guaranteed once a container exists.
#[cfg_attr(
    feature = "otel",
    instrument(level = "info", skip(runtime, probe, sink), fields(target = %probe.target))
)]
pub fn run_lifecycle<R: ContainerRuntime + ?Sized>(
    runtime: &R,
    image: &str,
    probe: &Probe,
    sink: &OperatorSink,
) -> InspectionResult {
    sink.info(image, "pulling image");
    let mut on_progress = |line: &str| sink.progress(image, line);
    if let Err(e) = runtime.pull(image, &mut on_progress) {
        // No container exists yet: nothing to clean up.
        return InspectionResult::failed(image, e);
    }

    let id = match runtime.create(image, &probe.command) {
        Ok(id) => id,
        Err(e) => return InspectionResult::failed(image, e),
    };
    let container = ContainerGuard {
        runtime,
        id,
        image,
        sink,
    };
    sink.info(image, &format!("created container {}", short_id(container.id())));

    if let Err(e) = runtime.start(container.id()) {
        return InspectionResult::failed(image, e);
    }

    let wait_error = match runtime.wait(container.id()) {
        Ok(outcome) => {
            if outcome.status_code != 0 {
                sink.info(
                    image,
                    &format!("probe exited with status {}", outcome.status_code),
                );
            }
            None
        }
        Err(e) => Some(e),
    };

    // Logs are read whatever the wait outcome; a read failure only replaces a success.
    match (runtime.logs(container.id()), wait_error) {
        (Ok(output), None) => InspectionResult::ok(image, output),
        (Ok(output), Some(e)) => InspectionResult {
            image: image.to_string(),
            output,
            error: Some(e),
        },
        (Err(_), Some(e)) | (Err(e), None) => InspectionResult::failed(image, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_probe_queries_xz_version() {
        let p = Probe::default();
        assert_eq!(p.target, "xz");
        assert_eq!(p.command, vec!["sh", "-c", "xz --version"]);
    }

    #[test]
    fn version_of_uses_target_name() {
        let p = Probe::version_of("openssl");
        assert_eq!(p.command[2], "openssl --version");
    }

    #[test]
    fn short_id_truncates_long_ids_only() {
        assert_eq!(short_id(&ContainerId::new("0123456789abcdef")), "0123456789ab");
        assert_eq!(short_id(&ContainerId::new("c1")), "c1");
    }

    #[test]
    fn failed_result_has_empty_output() {
        let r = InspectionResult::failed("a:1", ProbeError::Create("x".into()));
        assert!(r.is_error());
        assert!(r.output.is_empty());
    }
}

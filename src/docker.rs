#![allow(clippy::module_name_repetitions)]
//! Container runtime boundary.
//!
//! `ContainerRuntime` is the lifecycle contract one inspection task drives
//! (pull → create → start → wait → logs → remove). `DockerCli` implements it by
//! shelling out to the docker binary; tests substitute scripted fakes.

pub mod cli;
pub mod runtime;

use std::fmt;
use std::sync::Arc;

use crate::ProbeError;

pub use cli::{lifecycle_preview, DockerCli, DockerOptions, SESSION_LABEL};
pub use runtime::container_runtime_path;

/// Runtime-assigned container id, valid for the lifetime of one inspection task.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the probe process finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOutcome {
    pub status_code: i64,
}

/// Lifecycle operations against a container runtime. Every call may block until the
/// remote operation completes; implementations must tolerate concurrent use from many
/// tasks, each on its own containers.
pub trait ContainerRuntime {
    /// Pull `image`, feeding human-readable progress lines to `progress`.
    fn pull(&self, image: &str, progress: &mut dyn FnMut(&str)) -> Result<(), ProbeError>;

    fn create(&self, image: &str, command: &[String]) -> Result<ContainerId, ProbeError>;

    fn start(&self, id: &ContainerId) -> Result<(), ProbeError>;

    /// Block until the container is no longer running.
    fn wait(&self, id: &ContainerId) -> Result<WaitOutcome, ProbeError>;

    /// Captured probe output as a single string.
    fn logs(&self, id: &ContainerId) -> Result<String, ProbeError>;

    /// Forced removal; callers treat failures as best-effort.
    fn remove(&self, id: &ContainerId) -> Result<(), ProbeError>;
}

impl<T: ContainerRuntime + ?Sized> ContainerRuntime for Arc<T> {
    fn pull(&self, image: &str, progress: &mut dyn FnMut(&str)) -> Result<(), ProbeError> {
        (**self).pull(image, progress)
    }

    fn create(&self, image: &str, command: &[String]) -> Result<ContainerId, ProbeError> {
        (**self).create(image, command)
    }

    fn start(&self, id: &ContainerId) -> Result<(), ProbeError> {
        (**self).start(id)
    }

    fn wait(&self, id: &ContainerId) -> Result<WaitOutcome, ProbeError> {
        (**self).wait(id)
    }

    fn logs(&self, id: &ContainerId) -> Result<String, ProbeError> {
        (**self).logs(id)
    }

    fn remove(&self, id: &ContainerId) -> Result<(), ProbeError> {
        (**self).remove(id)
    }
}

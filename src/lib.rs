//! image-probe: audit which version of a binary ships in each of many container images.
//!
//! Architecture
//! - `orchestrator::run_batch` fans out one thread per image and joins them all.
//! - `inspect::run_lifecycle` drives one ephemeral container through
//!   pull → create → start → wait → logs → remove and turns every failure into data.
//! - `docker::ContainerRuntime` is the runtime boundary; `docker::DockerCli` shells out
//!   to the docker binary.
//! - `report` sanitizes and renders one line per image into the report file.
//! - `sink::OperatorSink` carries progress and cleanup warnings from concurrent tasks.
//!
//! Environment
//! - IMAGE_PROBE_CONFIG: config path when `--config` is not given.
//! - IMAGE_PROBE_DOCKER: docker-compatible binary to use instead of `docker` on PATH.
//! - IMAGE_PROBE_COLOR / NO_COLOR: stderr color control.
//! - IMAGE_PROBE_OTEL / IMAGE_PROBE_TRACING_FMT (feature `otel`): tracing output.

mod color;
pub mod config;
pub mod docker;
mod errors;
pub mod inspect;
pub mod orchestrator;
pub mod report;
pub mod sink;
#[cfg(feature = "otel")]
pub mod telemetry;
pub mod util;

pub use color::*;
pub use config::{config_path, load_config, parse_config, Config};
pub use docker::{
    container_runtime_path, ContainerId, ContainerRuntime, DockerCli, DockerOptions,
    WaitOutcome,
};
pub use errors::*;
pub use inspect::{inspect_image, run_lifecycle, InspectionResult, Probe, DEFAULT_TARGET};
pub use orchestrator::run_batch;
pub use report::{render_line, render_report, sanitize_output, write_report};
pub use sink::{MemoryLog, OperatorSink};
#[cfg(feature = "otel")]
pub use telemetry::{telemetry_init, TelemetryGuard};
pub use util::{create_session_id, shell_escape, shell_join};

//! Fan-out/fan-in over the image list.
//!
//! One thread per image, all sending into a channel with capacity N so no send ever
//! blocks. The caller waits on a counted barrier (every thread joined) before the channel
//! is closed and drained; results come back in completion order.

use std::sync::mpsc;
use std::thread;

#[cfg(feature = "otel")]
use tracing::instrument;

use crate::docker::ContainerRuntime;
use crate::inspect::{inspect_image, InspectionResult, Probe};
use crate::{OperatorSink, ProbeError};

/// Inspect every image concurrently and return exactly one result per input image.
///
/// `connect` is called once inside each task to obtain that task's runtime client.
/// A task that fails, or even panics, only affects its own result.
#[cfg_attr(
    feature = "otel",
    instrument(level = "info", skip_all, fields(images = images.len()))
)]
pub fn run_batch<R, F>(
    images: &[String],
    connect: &F,
    probe: &Probe,
    sink: &OperatorSink,
) -> Vec<InspectionResult>
where
    R: ContainerRuntime,
    F: Fn() -> Result<R, ProbeError> + Sync,
{
    if images.is_empty() {
        return Vec::new();
    }

    let (tx, rx) = mpsc::sync_channel::<InspectionResult>(images.len());

    thread::scope(|scope| {
        let mut pending = Vec::with_capacity(images.len());
        for (i, image) in images.iter().enumerate() {
            let task_tx = tx.clone();
            let spawned = thread::Builder::new()
                .name(format!("image-probe-{i}"))
                .spawn_scoped(scope, move || {
                    let result = inspect_image(image, connect, probe, sink);
                    // Capacity is N and each task sends once: never blocks.
                    let _ = task_tx.send(result);
                });
            match spawned {
                Ok(handle) => pending.push((image, handle)),
                Err(e) => {
                    let _ = tx.send(InspectionResult::failed(
                        image.as_str(),
                        ProbeError::Panicked(format!("failed to spawn inspection thread: {e}")),
                    ));
                }
            }
        }

        // Barrier: every task has finished before anything is collected.
        for (image, handle) in pending {
            if handle.join().is_err() {
                sink.warn(image, "inspection task panicked");
                let _ = tx.send(InspectionResult::failed(
                    image.as_str(),
                    ProbeError::Panicked("inspection task panicked".to_string()),
                ));
            }
        }
    });

    drop(tx);
    rx.into_iter().collect()
}

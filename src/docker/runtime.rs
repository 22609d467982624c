#![allow(clippy::module_name_repetitions)]
//! Docker runtime discovery.

use std::env;
use std::io;
use std::path::PathBuf;

use which::which;

/// Locate the docker binary: `IMAGE_PROBE_DOCKER` when set, else `docker` on PATH.
pub fn container_runtime_path() -> io::Result<PathBuf> {
    if let Ok(v) = env::var("IMAGE_PROBE_DOCKER") {
        let t = v.trim();
        if !t.is_empty() {
            let p = PathBuf::from(t);
            if p.is_file() {
                return Ok(p);
            }
            // Allow a bare program name (e.g. "podman") resolved via PATH
            if let Ok(found) = which(t) {
                return Ok(found);
            }
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("IMAGE_PROBE_DOCKER points to {t}, which was not found."),
            ));
        }
    }

    if let Ok(p) = which("docker") {
        return Ok(p);
    }
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        "Docker is required but was not found in PATH.",
    ))
}

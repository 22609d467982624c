//! Error mapping guide:
//! - Per-image failures are data: they travel inside an `InspectionResult` as a `ProbeError`
//!   and never terminate the run.
//! - Only config loading and report writing are fatal; those paths carry anyhow/io errors.
//! - Map io::ErrorKind::NotFound to exit code 127; all others to 1.
use std::fmt;
use std::io;

/// Map an io::Error to a process exit code:
/// - 127 for NotFound (command not found)
/// - 1 for all other errors
pub fn exit_code_for_io_error(e: &io::Error) -> u8 {
    if e.kind() == io::ErrorKind::NotFound {
        127
    } else {
        1
    }
}

/// Failure of one lifecycle stage for one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// Runtime client could not be obtained (binary missing, bad environment).
    Client(String),
    Pull(String),
    Create(String),
    Start(String),
    Wait(String),
    Logs(String),
    /// Forced removal failed; only ever reported to the operator sink.
    Remove(String),
    /// The inspection thread died before producing a result.
    Panicked(String),
}

impl ProbeError {
    /// Lifecycle stage label used in rendered messages.
    pub fn stage(&self) -> &'static str {
        match self {
            ProbeError::Client(_) => "runtime client error",
            ProbeError::Pull(_) => "pull error",
            ProbeError::Create(_) => "create error",
            ProbeError::Start(_) => "start error",
            ProbeError::Wait(_) => "wait error",
            ProbeError::Logs(_) => "log read error",
            ProbeError::Remove(_) => "remove error",
            ProbeError::Panicked(_) => "internal error",
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            ProbeError::Client(s)
            | ProbeError::Pull(s)
            | ProbeError::Create(s)
            | ProbeError::Start(s)
            | ProbeError::Wait(s)
            | ProbeError::Logs(s)
            | ProbeError::Remove(s)
            | ProbeError::Panicked(s) => s,
        }
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let detail = self.detail().trim();
        if detail.is_empty() {
            f.write_str(self.stage())
        } else {
            write!(f, "{}: {}", self.stage(), detail)
        }
    }
}

impl std::error::Error for ProbeError {}

impl serde::Serialize for ProbeError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

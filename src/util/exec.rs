use std::ffi::OsString;
use std::io::{BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use wait_timeout::ChildExt;

/// Structured command execution with optional timeouts and captured output.
///
/// A zero timeout means "wait forever". Both pipes are drained on helper threads so a
/// chatty child can never block on a full pipe while we wait for it.
#[derive(Debug, Clone)]
pub struct ExecService {
    default_timeout: Duration,
}

impl ExecService {
    pub fn new(default_timeout: Duration) -> Self {
        Self { default_timeout }
    }

    pub fn run(&self, request: ExecRequest) -> Result<ExecOutput> {
        self.run_streaming(request, &mut |_| {})
    }

    /// Run and hand every stdout line (without its line terminator) to `on_line` as it arrives.
    pub fn run_streaming(
        &self,
        request: ExecRequest,
        on_line: &mut dyn FnMut(&str),
    ) -> Result<ExecOutput> {
        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args);
        if !request.inherit_env {
            cmd.env_clear();
        }
        for (key, value) in &request.env {
            cmd.env(key, value);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let started = Instant::now();
        let mut child = cmd.spawn().with_context(|| {
            format!(
                "failed to spawn {:?} with args {:?}",
                request.program, request.args
            )
        })?;

        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();

        let stderr_reader = thread::spawn(move || -> std::io::Result<String> {
            let mut buf = String::new();
            if let Some(mut pipe) = stderr_pipe {
                let mut raw = Vec::new();
                pipe.read_to_end(&mut raw)?;
                buf = String::from_utf8_lossy(&raw).into_owned();
            }
            Ok(buf)
        });

        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        let stdout_reader = thread::spawn(move || -> std::io::Result<()> {
            if let Some(pipe) = stdout_pipe {
                let mut reader = BufReader::new(pipe);
                loop {
                    let mut chunk = Vec::new();
                    if reader.read_until(b'\n', &mut chunk)? == 0 {
                        break;
                    }
                    if tx.send(chunk).is_err() {
                        break;
                    }
                }
            }
            Ok(())
        });

        let timeout = request.timeout.unwrap_or(self.default_timeout);
        let deadline = if timeout.is_zero() {
            None
        } else {
            Some(started + timeout)
        };

        let mut stdout = String::new();
        loop {
            let next = match deadline {
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
                Some(d) => rx.recv_timeout(d.saturating_duration_since(Instant::now())),
            };
            match next {
                Ok(chunk) => {
                    let text = String::from_utf8_lossy(&chunk);
                    on_line(text.trim_end_matches(['\n', '\r']));
                    stdout.push_str(&text);
                }
                Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(anyhow!(
                        "command {:?} timed out after {}",
                        request.program,
                        humantime::format_duration(timeout)
                    ));
                }
            }
        }

        let status = match deadline {
            None => child.wait().context("failed to wait for process")?,
            Some(d) => {
                let remaining = d.saturating_duration_since(Instant::now());
                match child
                    .wait_timeout(remaining)
                    .context("failed to wait with timeout")?
                {
                    Some(status) => status,
                    None => {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(anyhow!(
                            "command {:?} timed out after {}",
                            request.program,
                            humantime::format_duration(timeout)
                        ));
                    }
                }
            }
        };

        stdout_reader
            .join()
            .map_err(|_| anyhow!("stdout reader thread panicked"))?
            .context("failed to read process output")?;
        let stderr = stderr_reader
            .join()
            .map_err(|_| anyhow!("stderr reader thread panicked"))?
            .context("failed to read process error output")?;

        Ok(ExecOutput {
            status,
            duration: started.elapsed(),
            stdout,
            stderr,
        })
    }
}

impl Default for ExecService {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[derive(Debug, Default)]
pub struct ExecRequest {
    program: OsString,
    args: Vec<OsString>,
    env: Vec<(OsString, OsString)>,
    inherit_env: bool,
    timeout: Option<Duration>,
}

impl ExecRequest {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            inherit_env: false,
            ..Self::default()
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn inherit_env(mut self, inherit: bool) -> Self {
        self.inherit_env = inherit;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug)]
pub struct ExecOutput {
    pub status: std::process::ExitStatus,
    pub duration: Duration,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

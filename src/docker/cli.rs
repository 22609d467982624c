#![allow(clippy::module_name_repetitions)]
//! `ContainerRuntime` over the docker command line.
//!
//! Every lifecycle call is one `docker` invocation run through `ExecService`; connection
//! details (DOCKER_HOST, contexts, API negotiation) are left to the docker binary itself.

use std::path::PathBuf;
use std::time::Duration;

#[cfg(feature = "otel")]
use tracing::instrument;

use super::{container_runtime_path, ContainerId, ContainerRuntime, WaitOutcome};
use crate::util::{shell_join, ExecOutput, ExecRequest, ExecService};
use crate::ProbeError;

/// Label attached to every container created by a run, valued with the run's session id.
pub const SESSION_LABEL: &str = "image-probe.session";

#[derive(Debug, Clone, Default)]
pub struct DockerOptions {
    /// Upper bound for each docker invocation; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Append the probe's stderr to the captured output. Off by default: a shell's
    /// "xz: not found" would otherwise match the probe target.
    pub include_stderr: bool,
    /// Echo each docker command line to stderr.
    pub verbose: bool,
}

#[derive(Debug, Clone)]
pub struct DockerCli {
    runtime: PathBuf,
    session: String,
    exec: ExecService,
    options: DockerOptions,
}

impl DockerCli {
    pub fn new(
        runtime: impl Into<PathBuf>,
        session: impl Into<String>,
        options: DockerOptions,
    ) -> Self {
        let exec = ExecService::new(options.timeout.unwrap_or(Duration::ZERO));
        Self {
            runtime: runtime.into(),
            session: session.into(),
            exec,
            options,
        }
    }

    /// Locate docker and build a client; a missing binary is this image's client error.
    pub fn discover(session: &str, options: &DockerOptions) -> Result<Self, ProbeError> {
        let runtime =
            container_runtime_path().map_err(|e| ProbeError::Client(e.to_string()))?;
        Ok(Self::new(runtime, session, options.clone()))
    }

    fn request(&self, args: &[String]) -> ExecRequest {
        if self.options.verbose {
            let mut preview = vec!["docker".to_string()];
            preview.extend(args.iter().cloned());
            let use_err = crate::color_enabled_stderr();
            crate::log_info_stderr(
                use_err,
                &format!("image-probe: docker: {}", shell_join(&preview)),
            );
        }
        ExecRequest::new(self.runtime.as_os_str())
            .args(args)
            .inherit_env(true)
    }

    fn run(
        &self,
        stage: fn(String) -> ProbeError,
        args: Vec<String>,
    ) -> Result<ExecOutput, ProbeError> {
        let out = self
            .exec
            .run(self.request(&args))
            .map_err(|e| stage(format!("{e:#}")))?;
        if !out.success() {
            return Err(stage(failure_detail(&args[0], &out)));
        }
        Ok(out)
    }
}

/// Condense docker's stderr into one line; fall back to the exit status.
fn failure_detail(subcommand: &str, out: &ExecOutput) -> String {
    let msg = out
        .stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("; ");
    if !msg.is_empty() {
        return msg;
    }
    match out.status.code() {
        Some(code) => format!("docker {subcommand} exited with status {code}"),
        None => format!("docker {subcommand} terminated by signal"),
    }
}

fn parse_wait_status(stdout: &str) -> Option<i64> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .and_then(|l| l.parse::<i64>().ok())
}

fn create_args(session: &str, image: &str, command: &[String]) -> Vec<String> {
    let mut args = vec![
        "create".to_string(),
        "--label".to_string(),
        format!("{SESSION_LABEL}={session}"),
        image.to_string(),
    ];
    args.extend(command.iter().cloned());
    args
}

/// Shell-escaped docker command lines one inspection would run (dry-run output).
pub fn lifecycle_preview(session: &str, image: &str, command: &[String]) -> Vec<String> {
    let mut create = vec!["docker".to_string()];
    create.extend(create_args(session, image, command));
    vec![
        shell_join(&["docker".to_string(), "pull".to_string(), image.to_string()]),
        shell_join(&create),
        "docker start <container>".to_string(),
        "docker wait <container>".to_string(),
        "docker logs <container>".to_string(),
        "docker rm -f <container>".to_string(),
    ]
}

impl ContainerRuntime for DockerCli {
    #[cfg_attr(feature = "otel", instrument(level = "info", skip(self, progress), err))]
    fn pull(&self, image: &str, progress: &mut dyn FnMut(&str)) -> Result<(), ProbeError> {
        let args = vec!["pull".to_string(), image.to_string()];
        let out = self
            .exec
            .run_streaming(self.request(&args), progress)
            .map_err(|e| ProbeError::Pull(format!("{e:#}")))?;
        if !out.success() {
            return Err(ProbeError::Pull(failure_detail("pull", &out)));
        }
        Ok(())
    }

    #[cfg_attr(feature = "otel", instrument(level = "debug", skip(self), err))]
    fn create(&self, image: &str, command: &[String]) -> Result<ContainerId, ProbeError> {
        let out = self.run(
            ProbeError::Create,
            create_args(&self.session, image, command),
        )?;
        let id = out.stdout.trim();
        if id.is_empty() {
            return Err(ProbeError::Create(
                "docker create returned no container id".to_string(),
            ));
        }
        Ok(ContainerId::new(id))
    }

    fn start(&self, id: &ContainerId) -> Result<(), ProbeError> {
        self.run(
            ProbeError::Start,
            vec!["start".to_string(), id.to_string()],
        )?;
        Ok(())
    }

    fn wait(&self, id: &ContainerId) -> Result<WaitOutcome, ProbeError> {
        let out = self.run(ProbeError::Wait, vec!["wait".to_string(), id.to_string()])?;
        match parse_wait_status(&out.stdout) {
            Some(status_code) => Ok(WaitOutcome { status_code }),
            None => Err(ProbeError::Wait(format!(
                "unexpected docker wait output: {:?}",
                out.stdout.trim()
            ))),
        }
    }

    fn logs(&self, id: &ContainerId) -> Result<String, ProbeError> {
        let out = self.run(ProbeError::Logs, vec!["logs".to_string(), id.to_string()])?;
        if self.options.include_stderr {
            Ok(format!("{}{}", out.stdout, out.stderr))
        } else {
            Ok(out.stdout)
        }
    }

    fn remove(&self, id: &ContainerId) -> Result<(), ProbeError> {
        self.run(
            ProbeError::Remove,
            vec!["rm".to_string(), "-f".to_string(), id.to_string()],
        )?;
        Ok(())
    }
}

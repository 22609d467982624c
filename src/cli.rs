use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

fn parse_timeout(s: &str) -> Result<Duration, String> {
    let d = humantime::parse_duration(s.trim()).map_err(|e| e.to_string())?;
    if d.is_zero() {
        return Err("must be greater than zero".to_string());
    }
    Ok(d)
}

#[derive(Parser, Debug)]
#[command(
    name = "image-probe",
    version,
    about = "Check which version of a binary ships in each container image listed in a config file."
)]
pub(crate) struct Cli {
    /// Config file with an `images:` list (default: $IMAGE_PROBE_CONFIG or images.yaml)
    #[arg(long, short = 'c')]
    pub(crate) config: Option<PathBuf>,

    /// Report file; truncated and rewritten on every run
    #[arg(long, default_value = "report.txt")]
    pub(crate) report: PathBuf,

    /// Substring that identifies the version line (default: config `target` or "xz")
    #[arg(long)]
    pub(crate) target: Option<String>,

    /// Shell snippet run in each container via `sh -c` (default: "<target> --version")
    #[arg(long)]
    pub(crate) probe: Option<String>,

    /// Bound every docker invocation, e.g. "90s" or "5m" (default: no limit)
    #[arg(long, value_parser = parse_timeout)]
    pub(crate) timeout: Option<Duration>,

    /// Also capture the probe's stderr in the searched output
    #[arg(long)]
    pub(crate) include_stderr: bool,

    /// Stream pull progress and echo docker commands
    #[arg(long, short = 'v')]
    pub(crate) verbose: bool,

    /// Print the docker commands that would run for each image, then exit
    #[arg(long)]
    pub(crate) dry_run: bool,

    /// Print the collected results as JSON on stdout
    #[arg(long)]
    pub(crate) json: bool,

    /// Colorize stderr: auto|always|never
    #[arg(long, value_enum)]
    pub(crate) color: Option<image_probe::ColorMode>,

    #[command(subcommand)]
    pub(crate) command: Option<Cmd>,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Cmd {
    /// Check that a docker runtime is reachable and print build information
    Doctor,
}

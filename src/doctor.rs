use std::process::ExitCode;
use std::time::Duration;

use image_probe::util::{ExecRequest, ExecService};

fn value(use_color: bool, s: &str) -> String {
    image_probe::paint(use_color, "\x1b[34;1m", s)
}

pub(crate) fn run_doctor(verbose: bool) -> ExitCode {
    let use_err = image_probe::color_enabled_stderr();
    eprintln!("image-probe doctor");
    eprintln!();
    eprintln!("  version: v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "  host:    {} / {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    if verbose {
        eprintln!("  built:   {}", env!("IMAGE_PROBE_BUILD_DATE"));
        eprintln!("  target:  {}", env!("IMAGE_PROBE_BUILD_TARGET"));
        eprintln!("  rustc:   {}", env!("IMAGE_PROBE_BUILD_RUSTC"));
    }
    eprintln!();

    let runtime = match image_probe::container_runtime_path() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("  docker:  {}", value(use_err, "not found"));
            image_probe::log_error_stderr(use_err, &format!("image-probe: {e}"));
            return ExitCode::from(image_probe::exit_code_for_io_error(&e));
        }
    };
    eprintln!("  docker:  {}", value(use_err, &runtime.display().to_string()));

    // Server version proves the daemon is reachable with the ambient configuration.
    let probe = ExecService::default().run(
        ExecRequest::new(runtime.as_os_str())
            .args(["version", "--format", "{{.Server.Version}}"])
            .inherit_env(true)
            .timeout(Duration::from_secs(10)),
    );
    match probe {
        Ok(out) if out.success() => {
            let server = out.stdout.trim();
            eprintln!("  daemon:  {}", value(use_err, server));
            eprintln!();
            eprintln!("doctor: completed diagnostics.");
            ExitCode::from(0)
        }
        Ok(out) => {
            eprintln!("  daemon:  {}", value(use_err, "unreachable"));
            let detail = out.stderr.trim();
            if !detail.is_empty() {
                image_probe::log_warn_stderr(use_err, &format!("image-probe: {detail}"));
            }
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("  daemon:  {}", value(use_err, "unreachable"));
            image_probe::log_warn_stderr(use_err, &format!("image-probe: {e:#}"));
            ExitCode::from(1)
        }
    }
}

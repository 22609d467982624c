use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use image_probe::docker::lifecycle_preview;
use image_probe::{Config, DockerCli, DockerOptions, OperatorSink, Probe};

mod cli;
mod doctor;

use cli::{Cli, Cmd};

/// Probe precedence: --probe, then config `command`, then "<target> --version".
/// Target precedence: --target, then config `target`, then "xz".
fn resolve_probe(cli: &Cli, config: &Config) -> Probe {
    let target = cli
        .target
        .clone()
        .or_else(|| config.target.clone())
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| image_probe::DEFAULT_TARGET.to_string());
    if let Some(script) = &cli.probe {
        return Probe::shell(target, script.clone());
    }
    match &config.command {
        Some(cmd) if !cmd.is_empty() => Probe::new(target, cmd.clone()),
        _ => Probe::version_of(&target),
    }
}

fn run(cli: &Cli) -> Result<()> {
    let use_err = image_probe::color_enabled_stderr();

    let config_path = image_probe::config_path(cli.config.as_deref());
    let config = image_probe::load_config(&config_path)?;
    let probe = resolve_probe(cli, &config);
    let images = &config.images;

    if cli.verbose {
        image_probe::log_info_stderr(
            use_err,
            &format!(
                "image-probe: {} image(s) from {}; probe: {}",
                images.len(),
                config_path.display(),
                image_probe::shell_join(&probe.command)
            ),
        );
    }

    let session = image_probe::create_session_id();

    if cli.dry_run {
        for image in images {
            eprintln!("image-probe: {image}");
            for line in lifecycle_preview(&session, image, &probe.command) {
                eprintln!("  {line}");
            }
        }
        eprintln!("image-probe: dry-run requested; not executing Docker.");
        return Ok(());
    }

    let options = DockerOptions {
        timeout: cli.timeout,
        include_stderr: cli.include_stderr,
        verbose: cli.verbose,
    };
    let connect = || DockerCli::discover(&session, &options);
    let sink = OperatorSink::stderr(use_err, cli.verbose);

    let started = Instant::now();
    let results = image_probe::run_batch(images, &connect, &probe, &sink);

    image_probe::write_report(&cli.report, &results, &probe.target)
        .with_context(|| format!("failed to write report {}", cli.report.display()))?;

    let failed = results.iter().filter(|r| r.is_error()).count();
    let summary = format!(
        "image-probe: wrote {} line(s) to {} ({} error(s), session {}) in {}",
        results.len(),
        cli.report.display(),
        failed,
        session,
        humantime::format_duration(std::time::Duration::from_millis(
            started.elapsed().as_millis() as u64
        ))
    );
    if failed > 0 {
        image_probe::log_warn_stderr(use_err, &summary);
    } else {
        image_probe::log_info_stderr(use_err, &summary);
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&results).context("failed to encode results")?;
        println!("{json}");
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Some(mode) = cli.color {
        image_probe::set_color_mode(mode);
    }

    #[cfg(feature = "otel")]
    let _telemetry = image_probe::telemetry_init();

    if let Some(Cmd::Doctor) = &cli.command {
        return doctor::run_doctor(cli.verbose);
    }

    match run(&cli) {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            let use_err = image_probe::color_enabled_stderr();
            image_probe::log_error_stderr(use_err, &format!("image-probe: {e:#}"));
            ExitCode::from(1)
        }
    }
}

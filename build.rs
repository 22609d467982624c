use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

/// Trimmed stdout of a successful command, if any.
fn command_stdout(program: &str, args: &[&str]) -> Option<String> {
    let out = Command::new(program).args(args).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&out.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // UTC ISO-8601 via date(1); unix seconds where it is unavailable.
    let build_date = command_stdout("date", &["-u", "+%Y-%m-%dT%H:%M:%SZ"]).unwrap_or_else(|| {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        format!("unix:{secs}")
    });
    let target = std::env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    let rustc = std::env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let rustc_version =
        command_stdout(&rustc, &["--version"]).unwrap_or_else(|| "unknown".to_string());

    for (key, value) in [
        ("IMAGE_PROBE_BUILD_DATE", build_date),
        ("IMAGE_PROBE_BUILD_TARGET", target),
        ("IMAGE_PROBE_BUILD_RUSTC", rustc_version),
    ] {
        println!("cargo:rustc-env={key}={value}");
    }
}

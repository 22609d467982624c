//! Report rendering: one sanitized line per inspected image.
//!
//! Line formats:
//! - `Image: <id> - Error: <message>` when the inspection failed
//! - `Image: <id> - <first output line containing the target>` when found
//! - `Image: <id> - <target> not found` otherwise
//!
//! The report file is rendered fully in memory, then truncated and written once.

use std::fs;
use std::io;
use std::path::Path;

#[cfg(feature = "otel")]
use tracing::instrument;

use crate::inspect::InspectionResult;
use crate::util::TextLines;

/// Marker used when the target matched but no single line carried it.
pub const VERSION_INFO_NOT_FOUND: &str = "version info not found";

fn is_control(c: char) -> bool {
    matches!(c as u32, 0x00..=0x1F | 0x7F..=0x9F)
}

/// Remove C0 and C1 control characters (U+0000–U+001F, U+007F–U+009F).
pub fn sanitize_output(s: &str) -> String {
    s.chars().filter(|c| !is_control(*c)).collect()
}

/// First output line whose sanitized form mentions `target`, trimmed.
///
/// Lines are split on the raw output; sanitizing first would also strip the line
/// terminators and glue every line together.
fn version_line(output: &str, target: &str) -> Option<String> {
    output
        .lines()
        .map(sanitize_output)
        .find(|l| l.contains(target))
        .map(|l| l.trim().to_string())
}

pub fn render_line(result: &InspectionResult, target: &str) -> String {
    let image = sanitize_output(&result.image);
    if let Some(err) = &result.error {
        return format!(
            "Image: {image} - Error: {}",
            sanitize_output(&err.to_string())
        );
    }
    let clean = sanitize_output(&result.output);
    if !target.is_empty() && clean.contains(target) {
        let info = version_line(&result.output, target)
            .unwrap_or_else(|| VERSION_INFO_NOT_FOUND.to_string());
        format!("Image: {image} - {info}")
    } else {
        format!("Image: {image} - {} not found", sanitize_output(target))
    }
}

/// Render all results in the order given, one LF-terminated line each.
pub fn render_report(results: &[InspectionResult], target: &str) -> io::Result<String> {
    results
        .iter()
        .map(|r| render_line(r, target))
        .collect::<TextLines>()
        .into_lf()
}

/// Truncate/create `path` and write the rendered report in a single write.
#[cfg_attr(
    feature = "otel",
    instrument(level = "info", skip(results), fields(lines = results.len()), err)
)]
pub fn write_report(path: &Path, results: &[InspectionResult], target: &str) -> io::Result<()> {
    let body = render_report(results, target)?;
    fs::write(path, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProbeError;

    #[test]
    fn sanitize_strips_c0_c1_and_del() {
        let raw = "a\u{0}b\u{1b}[31mc\u{7f}d\u{85}e\u{9f}f\u{a0}g\tz\n";
        assert_eq!(sanitize_output(raw), "ab[31mcdef\u{a0}gz");
    }

    #[test]
    fn sanitize_keeps_printable_unicode() {
        assert_eq!(sanitize_output("xz (XZ Utils) 5.4.3 – ü"), "xz (XZ Utils) 5.4.3 – ü");
    }

    #[test]
    fn found_target_picks_first_matching_line() {
        let r = InspectionResult::ok(
            "alpine:3.18",
            "xz (XZ Utils) 5.4.3\nliblzma 5.4.3\n",
        );
        assert_eq!(render_line(&r, "xz"), "Image: alpine:3.18 - xz (XZ Utils) 5.4.3");
    }

    #[test]
    fn matching_line_is_trimmed_and_sanitized() {
        let r = InspectionResult::ok("img:1", "banner\n  \u{1b}xz 5.2.5 \r\n");
        assert_eq!(render_line(&r, "xz"), "Image: img:1 - xz 5.2.5");
    }

    #[test]
    fn target_split_by_control_chars_falls_back_to_marker() {
        // "x\nz" only matches once the newline is stripped; no single line carries it.
        let r = InspectionResult::ok("img:2", "x\nz\n");
        assert_eq!(render_line(&r, "xz"), "Image: img:2 - version info not found");
    }

    #[test]
    fn missing_target_reports_not_found() {
        let r = InspectionResult::ok("busybox:1.36", "");
        assert_eq!(render_line(&r, "xz"), "Image: busybox:1.36 - xz not found");
    }

    #[test]
    fn error_wins_over_output() {
        let mut r = InspectionResult::failed("a:1", ProbeError::Wait("daemon gone".into()));
        r.output = "xz 5.4.3".to_string();
        assert_eq!(render_line(&r, "xz"), "Image: a:1 - Error: wait error: daemon gone");
    }

    #[test]
    fn report_has_one_line_per_result() {
        let results = vec![
            InspectionResult::ok("a:1", "xz 5.4.1\n"),
            InspectionResult::failed("b:2", ProbeError::Pull("not found\nmanifest unknown".into())),
            InspectionResult::ok("c:3", "nothing here"),
        ];
        let body = render_report(&results, "xz").unwrap();
        assert_eq!(
            body,
            "Image: a:1 - xz 5.4.1\n\
             Image: b:2 - Error: pull error: not foundmanifest unknown\n\
             Image: c:3 - xz not found\n"
        );
    }

    #[test]
    fn empty_result_set_renders_empty_report() {
        assert_eq!(render_report(&[], "xz").unwrap(), "");
    }
}

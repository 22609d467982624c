//! Stderr coloring.
//!
//! Precedence: `NO_COLOR` (any value) disables color outright; otherwise `--color`, then
//! `IMAGE_PROBE_COLOR`, then whether stderr is a terminal. Only operator messages on stderr
//! are painted; the report file and `--json` output never are.
//!
//! Compute the decision once per scope and pass it down:
//!     let use_err = image_probe::color_enabled_stderr();

use clap::ValueEnum;
use once_cell::sync::OnceCell;

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn from_env_value(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "always" | "on" | "true" | "yes" | "1" => Some(Self::Always),
            "never" | "off" | "false" | "no" | "0" => Some(Self::Never),
            _ => None,
        }
    }

    fn enabled(self, is_tty: bool) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => is_tty,
        }
    }
}

pub(crate) const CYAN_BOLD: &str = "\x1b[36;1m";
pub(crate) const YELLOW: &str = "\x1b[33m";
const RED_BOLD: &str = "\x1b[31;1m";

static CLI_COLOR_MODE: OnceCell<ColorMode> = OnceCell::new();

/// Record the `--color` choice; the first call wins.
pub fn set_color_mode(mode: ColorMode) {
    let _ = CLI_COLOR_MODE.set(mode);
}

fn effective_mode() -> Option<ColorMode> {
    if std::env::var_os("NO_COLOR").is_some() {
        return Some(ColorMode::Never);
    }
    CLI_COLOR_MODE.get().copied().or_else(|| {
        std::env::var("IMAGE_PROBE_COLOR")
            .ok()
            .and_then(|v| ColorMode::from_env_value(&v))
    })
}

pub fn color_enabled_stderr() -> bool {
    let is_tty = atty::is(atty::Stream::Stderr);
    effective_mode().map_or(is_tty, |m| m.enabled(is_tty))
}

/// Wrap `s` in `code` ... reset when `enabled`.
pub fn paint(enabled: bool, code: &str, s: &str) -> String {
    if enabled {
        format!("{code}{s}\x1b[0m")
    } else {
        s.to_string()
    }
}

pub fn log_info_stderr(use_color: bool, msg: &str) {
    eprintln!("{}", paint(use_color, CYAN_BOLD, msg));
}

pub fn log_warn_stderr(use_color: bool, msg: &str) {
    eprintln!("{}", paint(use_color, YELLOW, msg));
}

pub fn log_error_stderr(use_color: bool, msg: &str) {
    eprintln!("{}", paint(use_color, RED_BOLD, msg));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_values_accept_aliases() {
        assert_eq!(ColorMode::from_env_value(" Always "), Some(ColorMode::Always));
        assert_eq!(ColorMode::from_env_value("off"), Some(ColorMode::Never));
        assert_eq!(ColorMode::from_env_value("1"), Some(ColorMode::Always));
        assert_eq!(ColorMode::from_env_value("auto"), Some(ColorMode::Auto));
        assert_eq!(ColorMode::from_env_value("rainbow"), None);
    }

    #[test]
    fn auto_follows_terminal() {
        assert!(ColorMode::Auto.enabled(true));
        assert!(!ColorMode::Auto.enabled(false));
        assert!(ColorMode::Always.enabled(false));
        assert!(!ColorMode::Never.enabled(true));
    }

    #[test]
    fn paint_is_identity_when_disabled() {
        assert_eq!(paint(false, RED_BOLD, "plain"), "plain");
        assert_eq!(paint(true, YELLOW, "x"), "\x1b[33mx\x1b[0m");
    }
}

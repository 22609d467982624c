#![allow(clippy::module_name_repetitions)]
//! Small utilities: command execution, shell escaping for previews, line builders, ids.

pub mod exec;
pub mod id;
pub mod text_lines;

pub use exec::{ExecOutput, ExecRequest, ExecService};
pub use id::create_session_id;
pub use text_lines::TextLines;

/// Space-joined, shell-escaped argv for previews and verbose logs.
pub fn shell_join(args: &[String]) -> String {
    let escaped: Vec<String> = args.iter().map(|a| shell_escape(a)).collect();
    escaped.join(" ")
}

/// Single-quote `s` unless it only holds characters safe in a POSIX shell word.
pub fn shell_escape(s: &str) -> String {
    let is_safe = |c: char| {
        c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '=' | '.' | '/' | ':' | '@' | ',' | '+')
    };
    if !s.is_empty() && s.chars().all(is_safe) {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', r#"'\''"#))
}

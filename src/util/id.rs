use std::time::{SystemTime, UNIX_EPOCH};

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Lowercase base36 rendering of `v` (no padding).
fn base36(mut v: u64) -> String {
    let mut digits = Vec::new();
    loop {
        digits.push(BASE36[(v % 36) as usize]);
        v /= 36;
        if v == 0 {
            break;
        }
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Short run identifier (at most 8 chars) labelling every container a run creates.
pub fn create_session_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let mixed = nanos ^ (u128::from(std::process::id()) << 20);
    base36((mixed & 0xff_ffff_ffff) as u64)
}

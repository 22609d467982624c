use std::io;

/// LF-terminated text assembled from single-line entries.
///
/// An entry holding `\n`, `\r` or `\0` would spill into (or truncate) its neighbours, so
/// `into_lf` refuses to build rather than emit a malformed document.
#[derive(Debug, Default)]
pub struct TextLines {
    lines: Vec<String>,
}

fn line_break_at(line: &str) -> Option<usize> {
    line.find(['\n', '\r', '\0'])
}

impl TextLines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    /// Every entry followed by `\n`; empty input yields an empty string.
    pub fn into_lf(self) -> io::Result<String> {
        let mut out = String::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
        for (i, line) in self.lines.into_iter().enumerate() {
            if let Some(pos) = line_break_at(&line) {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("line {i} has a line break or NUL at byte {pos}"),
                ));
            }
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }
}

impl<S: Into<String>> FromIterator<S> for TextLines {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().map(Into::into).collect(),
        }
    }
}

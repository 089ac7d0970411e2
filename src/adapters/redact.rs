//! Log redaction for clinical measurements.
//!
//! Formatted log lines pass through [`RedactingMakeWriter`] before reaching
//! the sink. Structured fields named after patient measurements (`age=62`,
//! `bmi: 31.0`, ...) have their values replaced, and identifiers such as
//! assessment and session UUIDs are masked. Scores and categories are left
//! intact.
//!
//! Input per line is capped (see `FOSSI_REDACT_MAX_BYTES`).

use regex::Regex;
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

const DEFAULT_REDACT_MAX_BYTES: usize = 8 * 1024;

struct Patterns {
    measurement: Regex,
    uuid: Regex,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| Patterns {
        measurement: Regex::new(
            r"(?i)\b(age|bmi|cmi|vai|wc|waist(?:_cm)?|height(?:_cm)?|tg(?:_mmol)?|triglycerides|hdl(?:_mmol)?|hypertension)(\s*[=:]\s*)(-?[0-9]+(?:\.[0-9]+)?(?:[eE][-+]?[0-9]+)?|true|false)",
        )
        .expect("Valid regex"),
        uuid: Regex::new(
            r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
        )
        .expect("Valid regex"),
    })
}

fn max_redact_bytes() -> usize {
    std::env::var("FOSSI_REDACT_MAX_BYTES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_REDACT_MAX_BYTES)
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }
    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

/// Redact measurement values and identifiers from `input`.
#[must_use]
pub fn redact(input: &str) -> String {
    redact_with_limit(input, max_redact_bytes())
}

fn redact_with_limit(input: &str, max_bytes: usize) -> String {
    let p = patterns();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let out = p.measurement.replace_all(prefix, "${1}${2}[REDACTED]");
    let mut out = p.uuid.replace_all(&out, "[REDACTED-ID]").into_owned();

    if truncated {
        out.push_str(" [TRUNCATED]");
        if input.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

/// Whether `input` would be altered by [`redact`].
#[must_use]
pub fn contains_measurements(input: &str) -> bool {
    let p = patterns();
    p.measurement.is_match(input) || p.uuid.is_match(input)
}

/// A `tracing_subscriber` writer that redacts each formatted line.
#[derive(Debug, Clone)]
pub struct RedactingMakeWriter<M> {
    inner: M,
}

impl<M> RedactingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

pub struct RedactingWriter<W> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W: std::io::Write> RedactingWriter<W> {
    fn write_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let redacted = redact(&String::from_utf8_lossy(&line));
            self.inner.write_all(redacted.as_bytes())?;
        }
        Ok(())
    }
}

impl<W: std::io::Write> std::io::Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        self.write_lines()?;

        // A formatter that never emits a newline must not grow the buffer without bound.
        if self.buffer.len() > max_redact_bytes().saturating_mul(2) {
            let redacted = redact(&String::from_utf8_lossy(&self.buffer));
            self.inner.write_all(redacted.as_bytes())?;
            self.inner.write_all(b"\n")?;
            self.buffer.clear();
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.write_lines()?;
        if !self.buffer.is_empty() {
            let redacted = redact(&String::from_utf8_lossy(&self.buffer));
            self.inner.write_all(redacted.as_bytes())?;
            self.buffer.clear();
        }
        self.inner.flush()
    }
}

impl<'a, M> MakeWriter<'a> for RedactingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = RedactingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter {
            inner: self.inner.make_writer(),
            buffer: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_redacts_structured_fields() {
        let line = "INFO fossi: evaluated sex=Female age=62 bmi=31.0 cmi: 1.164 score=8.12";
        let out = redact(line);
        assert!(out.contains("age=[REDACTED]"));
        assert!(out.contains("bmi=[REDACTED]"));
        assert!(out.contains("cmi: [REDACTED]"));
        assert!(out.contains("score=8.12"));
        assert!(!out.contains("62"));
    }

    #[test]
    fn test_redacts_uuid() {
        let out = redact("assessment 550e8400-e29b-41d4-a716-446655440000 done");
        assert!(out.contains("[REDACTED-ID]"));
        assert!(!out.contains("550e8400"));
    }

    #[test]
    fn test_does_not_touch_plain_text() {
        let line = "Loaded threshold table from published cut points";
        assert_eq!(redact(line), line);
        assert!(!contains_measurements(line));
        assert!(contains_measurements("hypertension=true"));
    }

    #[test]
    fn test_truncates_long_lines() {
        let out = redact_with_limit("waist=98 and a long tail of text", 8);
        assert!(out.ends_with("[TRUNCATED]"));
        assert!(!out.contains("98"));
    }

    #[test]
    fn test_truncation_keeps_line_break() {
        let out = redact_with_limit("bmi=31.0 and more text\n", 8);
        assert!(out.ends_with(" [TRUNCATED]\n"));

        let mut sink = Vec::new();
        {
            let mut writer = RedactingWriter {
                inner: &mut sink,
                buffer: Vec::new(),
            };
            let long = format!("{}\n", "x".repeat(DEFAULT_REDACT_MAX_BYTES + 808));
            writer.write_all(long.as_bytes()).unwrap();
            writer.write_all(b"second line\n").unwrap();
            writer.flush().unwrap();
        }
        let text = String::from_utf8(sink).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[TRUNCATED]"));
        assert_eq!(lines[1], "second line");
    }

    #[test]
    fn test_writer_redacts_per_line() {
        let mut sink = Vec::new();
        {
            let mut writer = RedactingWriter {
                inner: &mut sink,
                buffer: Vec::new(),
            };
            writer.write_all(b"hdl=1.0 ok\nwc=").unwrap();
            writer.write_all(b"102 tail").unwrap();
            writer.flush().unwrap();
        }
        let text = String::from_utf8(sink).unwrap();
        assert_eq!(text, "hdl=[REDACTED] ok\nwc=[REDACTED] tail");
    }
}

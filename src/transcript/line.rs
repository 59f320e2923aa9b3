//! The transcript line format.
//!
//! Recognition emits one line per segment, formatted
//! `[<start> --> <end>] <text>` with timestamps as `MM:SS.mmm` (hours are
//! prepended only when nonzero). Downstream only the text payload matters;
//! the timestamp range is parsed off and discarded.

/// Separator between the timestamp prefix and the text payload.
const PREFIX_SEPARATOR: &str = "] ";

/// One parsed transcript line, borrowing from the raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine<'a> {
    /// The raw timestamp range, e.g. `00:01.000 --> 00:03.000`.
    /// `None` when the line carried no prefix.
    pub timestamp_range: Option<&'a str>,
    /// The text payload with leading whitespace stripped.
    pub text: &'a str,
}

impl<'a> TranscriptLine<'a> {
    /// Parse one line of recognition output.
    ///
    /// Splits on the first `"] "` occurrence only, so a payload containing
    /// `"] "` itself stays intact. A line without the separator is treated
    /// as pure text.
    pub fn parse(line: &'a str) -> Self {
        match line.split_once(PREFIX_SEPARATOR) {
            Some((prefix, payload)) => TranscriptLine {
                timestamp_range: Some(prefix.trim_start_matches('[')),
                text: payload.trim_start(),
            },
            None => TranscriptLine {
                timestamp_range: None,
                text: line.trim_start(),
            },
        }
    }
}

/// Format a timestamp in centiseconds as `MM:SS.mmm`, with an `HH:` part
/// only when the value reaches a full hour.
pub fn format_timestamp(centiseconds: i64) -> String {
    let total_ms = centiseconds.max(0) * 10;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let seconds = (total_ms / 1_000) % 60;
    let millis = total_ms % 1_000;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
    } else {
        format!("{minutes:02}:{seconds:02}.{millis:03}")
    }
}

/// Format one segment as a transcript line, timestamps in centiseconds.
///
/// The segment text is taken as-is; recognition output usually carries its
/// own leading space, which the parser strips again on the way back out.
pub fn format_line(start_cs: i64, end_cs: i64, text: &str) -> String {
    format!(
        "[{} --> {}] {}",
        format_timestamp(start_cs),
        format_timestamp(end_cs),
        text
    )
}

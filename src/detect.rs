//! Delimiter and header-row detection for delimited text of unknown layout.
//!
//! The header row is never declared by the file. It is the first line that
//! contains the delimiter and is directly followed by a line whose fields all
//! parse as floating point numbers. Anything above it (comments, instrument
//! metadata, units) is ignored.

use tracing::{debug, warn};

use crate::error::{LoadError, LoadResult};

/// Delimiters tried, in priority order, when probing.
pub const PROBE_DELIMITERS: [char; 2] = [',', ';'];

/// Delimiters considered by the sniffer, in tie-break order.
pub const SNIFF_CANDIDATES: [char; 4] = [',', ';', '\t', '|'];

/// Number of leading lines the sniffer looks at.
pub const SNIFF_SAMPLE_LINES: usize = 10;

/// Delimiter used when sniffing cannot decide.
pub const FALLBACK_DELIMITER: char = ',';

/// How the delimiter of a document is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DelimiterStrategy {
    /// Try each of [`PROBE_DELIMITERS`] in turn; the first one that yields a header wins.
    #[default]
    Probe,
    /// Guess the delimiter from the first [`SNIFF_SAMPLE_LINES`] lines.
    Sniff,
    /// Use exactly this delimiter.
    Fixed(char),
}

/// Where the table starts and how it is delimited.
///
/// `header_row_index` indexes into [`clean_lines`], not into the raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub delimiter: char,
    pub header_row_index: usize,
}

fn is_trailing_junk(c: char) -> bool {
    matches!(c, ',' | ';' | '|') || c.is_whitespace()
}

/// Non-blank lines of `text` with any trailing run of delimiter-like characters removed.
pub fn clean_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(|line| line.trim_end_matches(is_trailing_junk))
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// True when every field of `line` parses as `f64`.
pub fn is_numeric_row(line: &str, delimiter: char) -> bool {
    !line.trim().is_empty()
        && line
            .split(delimiter)
            .all(|token| token.trim().parse::<f64>().is_ok())
}

/// Index of the first line that contains `delimiter` and is followed by a numeric row.
///
/// The last line is never a candidate since there is nothing after it to validate.
pub fn find_header_row(lines: &[&str], delimiter: char) -> Option<usize> {
    lines.windows(2).position(|pair| {
        pair[0].contains(delimiter) && is_numeric_row(pair[1], delimiter)
    })
}

/// Guess the delimiter from the leading lines.
///
/// For each candidate the most common per-line occurrence count is found; the
/// candidate whose count is shared by the most lines wins. Returns `None` when
/// no candidate is consistent over at least two lines (or the single line of a
/// one-line sample).
pub fn sniff_delimiter(lines: &[&str]) -> Option<char> {
    let sample = &lines[..lines.len().min(SNIFF_SAMPLE_LINES)];
    let needed = sample.len().min(2);
    if needed == 0 {
        return None;
    }

    let mut best: Option<(char, usize)> = None;
    for &candidate in &SNIFF_CANDIDATES {
        let counts: Vec<usize> = sample
            .iter()
            .map(|line| line.matches(candidate).count())
            .collect();
        let mut frequency_of_mode = 0;
        for &count in counts.iter().filter(|&&c| c > 0) {
            let frequency = counts.iter().filter(|&&c| c == count).count();
            frequency_of_mode = frequency_of_mode.max(frequency);
        }
        if frequency_of_mode < needed {
            continue;
        }
        // Strictly greater so earlier candidates win ties.
        if best.map_or(true, |(_, score)| frequency_of_mode > score) {
            best = Some((candidate, frequency_of_mode));
        }
    }
    best.map(|(delimiter, _)| delimiter)
}

/// Locate the delimiter and header row of `text`.
pub fn detect(text: &str, strategy: DelimiterStrategy) -> LoadResult<Detection> {
    let lines = clean_lines(text);

    let candidates: Vec<char> = match strategy {
        DelimiterStrategy::Probe => PROBE_DELIMITERS.to_vec(),
        DelimiterStrategy::Fixed(delimiter) => vec![delimiter],
        DelimiterStrategy::Sniff => match sniff_delimiter(&lines) {
            Some(delimiter) => {
                debug!(?delimiter, "sniffed delimiter");
                vec![delimiter]
            }
            None => {
                warn!(
                    fallback = ?FALLBACK_DELIMITER,
                    "delimiter sniffing inconclusive, using fallback"
                );
                vec![FALLBACK_DELIMITER]
            }
        },
    };

    for delimiter in candidates {
        if let Some(header_row_index) = find_header_row(&lines, delimiter) {
            debug!(?delimiter, header_row_index, "header row detected");
            return Ok(Detection {
                delimiter,
                header_row_index,
            });
        }
    }
    Err(LoadError::HeaderNotFound)
}

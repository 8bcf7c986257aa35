//! HTTP Range request parsing.
//!
//! Parses the single-range `bytes=` form against a known file length:
//! `bytes=start-end` or `bytes=start-` (open ended). Suffix ranges
//! (`bytes=-500`) and multi-range lists are rejected as malformed.

use std::fmt;

/// Inclusive byte window into a file of known length.
///
/// Invariant: `start <= end < file_len` for every value produced by
/// [`parse_range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte offset of the window.
    pub start: u64,
    /// Last byte offset of the window, inclusive.
    pub end: u64,
}

impl ByteRange {
    /// Number of body bytes the window covers.
    #[inline]
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Why a Range header could not be turned into a [`ByteRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    /// Not a well-formed single `bytes=` range.
    Malformed,
    /// Syntactically valid but outside the file bounds.
    Unsatisfiable,
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed Range header"),
            Self::Unsatisfiable => write!(f, "requested range not satisfiable"),
        }
    }
}

impl std::error::Error for RangeError {}

/// Parse a Range header value against a known file length.
///
/// Accepted forms (and only these):
///
/// ```text
/// Range: bytes=0-499     -> ByteRange { start: 0, end: 499 }
/// Range: bytes=1000-     -> ByteRange { start: 1000, end: file_len - 1 }
/// ```
///
/// The start offset is mandatory. A missing end defaults to the last
/// byte of the file; an explicit end past the last byte is clamped to
/// it. `start >= file_len` or `end < start` is unsatisfiable, which
/// also covers every range against a zero-length file.
pub fn parse_range(header: &str, file_len: u64) -> Result<ByteRange, RangeError> {
    let Some(spec) = header.trim().strip_prefix("bytes=") else {
        return Err(RangeError::Malformed);
    };

    let parts: Vec<&str> = spec.split('-').collect();
    if parts.len() != 2 {
        return Err(RangeError::Malformed);
    }

    let (start_str, end_str) = (parts[0].trim(), parts[1].trim());

    // Suffix ranges ("bytes=-500") are not supported: the start
    // offset is required.
    let Ok(start) = start_str.parse::<u64>() else {
        return Err(RangeError::Malformed);
    };

    if start >= file_len {
        return Err(RangeError::Unsatisfiable);
    }

    let end = if end_str.is_empty() {
        file_len - 1
    } else {
        let Ok(end) = end_str.parse::<u64>() else {
            return Err(RangeError::Malformed);
        };
        end.min(file_len - 1)
    };

    if end < start {
        return Err(RangeError::Unsatisfiable);
    }

    Ok(ByteRange { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_range() {
        let range = parse_range("bytes=0-499", 1234).unwrap();
        assert_eq!(range, ByteRange { start: 0, end: 499 });
        assert_eq!(range.len(), 500);
    }

    #[test]
    fn open_ended_range_runs_to_last_byte() {
        let range = parse_range("bytes=1000-", 1234).unwrap();
        assert_eq!(range, ByteRange { start: 1000, end: 1233 });
        assert_eq!(range.len(), 234);
    }

    #[test]
    fn first_byte_only() {
        let range = parse_range("bytes=0-0", 10).unwrap();
        assert_eq!(range, ByteRange { start: 0, end: 0 });
        assert_eq!(range.len(), 1);
    }

    #[test]
    fn whole_file_as_open_range() {
        let range = parse_range("bytes=0-", 1234).unwrap();
        assert_eq!(range, ByteRange { start: 0, end: 1233 });
        assert_eq!(range.len(), 1234);
    }

    #[test]
    fn end_past_eof_is_clamped() {
        let range = parse_range("bytes=100-9999", 1234).unwrap();
        assert_eq!(range, ByteRange { start: 100, end: 1233 });
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        let range = parse_range(" bytes=2-5 ", 16).unwrap();
        assert_eq!(range, ByteRange { start: 2, end: 5 });
    }

    #[test]
    fn missing_bytes_prefix_is_malformed() {
        assert_eq!(parse_range("0-499", 1234), Err(RangeError::Malformed));
        assert_eq!(parse_range("items=0-499", 1234), Err(RangeError::Malformed));
    }

    #[test]
    fn suffix_range_is_malformed() {
        assert_eq!(parse_range("bytes=-500", 1234), Err(RangeError::Malformed));
    }

    #[test]
    fn non_numeric_parts_are_malformed() {
        assert_eq!(parse_range("bytes=a-b", 1234), Err(RangeError::Malformed));
        assert_eq!(parse_range("bytes=0-x", 1234), Err(RangeError::Malformed));
        assert_eq!(parse_range("bytes=", 1234), Err(RangeError::Malformed));
    }

    #[test]
    fn wrong_part_count_is_malformed() {
        assert_eq!(parse_range("bytes=0", 1234), Err(RangeError::Malformed));
        assert_eq!(parse_range("bytes=0-5-9", 1234), Err(RangeError::Malformed));
        assert_eq!(parse_range("bytes=0-9,20-29", 1234), Err(RangeError::Malformed));
    }

    #[test]
    fn start_at_or_past_eof_is_unsatisfiable() {
        assert_eq!(parse_range("bytes=1234-", 1234), Err(RangeError::Unsatisfiable));
        assert_eq!(
            parse_range("bytes=2000-2100", 1234),
            Err(RangeError::Unsatisfiable)
        );
    }

    #[test]
    fn inverted_range_is_unsatisfiable() {
        assert_eq!(parse_range("bytes=9-3", 1234), Err(RangeError::Unsatisfiable));
    }

    #[test]
    fn any_range_on_empty_file_is_unsatisfiable() {
        assert_eq!(parse_range("bytes=0-", 0), Err(RangeError::Unsatisfiable));
        assert_eq!(parse_range("bytes=0-0", 0), Err(RangeError::Unsatisfiable));
    }

    #[test]
    fn parsed_ranges_stay_inside_the_file() {
        let len = 1234;
        for header in ["bytes=0-0", "bytes=0-", "bytes=500-", "bytes=17-90", "bytes=5-99999"] {
            let range = parse_range(header, len).unwrap();
            assert!(range.start <= range.end);
            assert!(range.end < len);
            assert!(range.start + range.len() <= len);
        }
    }
}

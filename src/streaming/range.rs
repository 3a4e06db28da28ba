//! `Range` header parsing.
//!
//! Only a single open-ended byte range (`bytes=<start>-`) is served. Every
//! other form is rejected with a specific [`RangeError`] rather than being
//! coerced into something servable.

/// A validated single open-ended byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRequest {
    pub start: u64,
}

/// Why a `Range` header cannot be satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// The unit before `=` is not `bytes`.
    #[error("non-bytes ranges are not supported")]
    NonBytesUnit,
    /// More than one range was requested.
    #[error("multi-range not supported")]
    MultiRange,
    /// The range is not a single `<start>-<end>` pair.
    #[error("malformed range")]
    Malformed,
    /// A bound is not a non-negative integer.
    #[error("invalid int in range")]
    InvalidInt,
    /// No start offset was given (suffix ranges are not supported).
    #[error("range start required")]
    StartRequired,
    /// An end offset was given (bounded ranges are not supported).
    #[error("range end not supported")]
    EndNotSupported,
    /// The start offset is at or past the end of the content.
    #[error("range start beyond end of content")]
    StartBeyondEnd,
}

impl RangeError {
    /// Human readable reason, sent to the client.
    pub fn reason(&self) -> &'static str {
        match self {
            RangeError::NonBytesUnit => "non-bytes ranges are not supported",
            RangeError::MultiRange => "multi-range not supported",
            RangeError::Malformed => "malformed range",
            RangeError::InvalidInt => "invalid int in range",
            RangeError::StartRequired => "range start required",
            RangeError::EndNotSupported => "range end not supported",
            RangeError::StartBeyondEnd => "range start beyond end of content",
        }
    }

    /// Machine readable code.
    pub fn code(&self) -> &'static str {
        match self {
            RangeError::NonBytesUnit => "range_unit_unsupported",
            RangeError::MultiRange => "range_multi_unsupported",
            RangeError::Malformed => "range_malformed",
            RangeError::InvalidInt => "range_invalid_int",
            RangeError::StartRequired => "range_start_required",
            RangeError::EndNotSupported => "range_end_unsupported",
            RangeError::StartBeyondEnd => "range_not_satisfiable",
        }
    }
}

impl RangeRequest {
    /// Parse a `Range` header value.
    ///
    /// A value without `=` is taken to be in bytes. Checks run in a fixed
    /// order (unit, multi-range, shape, integers, start, end) so a header
    /// with several problems always reports the first.
    pub fn parse(header: &str) -> Result<Self, RangeError> {
        let (unit, ranges) = header.split_once('=').unwrap_or(("bytes", header));

        if unit != "bytes" {
            return Err(RangeError::NonBytesUnit);
        }

        if ranges.contains(',') {
            return Err(RangeError::MultiRange);
        }

        let mut bounds = ranges.trim().split('-');
        let (start, end) = match (bounds.next(), bounds.next(), bounds.next()) {
            (Some(start), Some(end), None) => (start.trim(), end.trim()),
            _ => return Err(RangeError::Malformed),
        };

        let start = parse_bound(start)?;
        let end = parse_bound(end)?;

        let Some(start) = start else {
            return Err(RangeError::StartRequired);
        };
        if end.is_some() {
            return Err(RangeError::EndNotSupported);
        }

        Ok(Self { start })
    }

    /// Check the range against the content size.
    pub fn validate(self, total: u64) -> Result<Self, RangeError> {
        if self.start >= total {
            Err(RangeError::StartBeyondEnd)
        } else {
            Ok(self)
        }
    }

    /// `Content-Range` value for content of `total` bytes.
    pub fn content_range(&self, total: u64) -> String {
        format!("bytes {}-{}/{}", self.start, total.saturating_sub(1), total)
    }

    /// Number of bytes the range covers.
    pub fn len(&self, total: u64) -> u64 {
        total.saturating_sub(self.start)
    }
}

fn parse_bound(s: &str) -> Result<Option<u64>, RangeError> {
    if s.is_empty() {
        return Ok(None);
    }
    s.parse::<u64>()
        .map(Some)
        .map_err(|_| RangeError::InvalidInt)
}

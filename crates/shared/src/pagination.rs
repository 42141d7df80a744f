//! Keyset pagination cursors.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Error type for cursor operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CursorError {
    #[error("Invalid cursor format")]
    InvalidFormat,
    #[error("Invalid cursor encoding")]
    InvalidEncoding,
    #[error("Invalid timestamp in cursor")]
    InvalidTimestamp,
    #[error("Invalid ID in cursor")]
    InvalidId,
}

/// Position in a `(timestamp, id)` descending listing.
///
/// The id breaks ties between rows sharing a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeysetCursor {
    pub at: DateTime<Utc>,
    pub id: i64,
}

impl KeysetCursor {
    pub fn new(at: DateTime<Utc>, id: i64) -> Self {
        Self { at, id }
    }

    /// Encodes as base64(RFC3339_timestamp|id).
    pub fn encode(&self) -> String {
        let raw = format!(
            "{}|{}",
            self.at.to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
            self.id
        );
        URL_SAFE_NO_PAD.encode(raw.as_bytes())
    }

    pub fn decode(cursor: &str) -> Result<Self, CursorError> {
        let decoded = URL_SAFE_NO_PAD
            .decode(cursor)
            .map_err(|_| CursorError::InvalidEncoding)?;
        let s = String::from_utf8(decoded).map_err(|_| CursorError::InvalidFormat)?;

        let (ts, id) = s.rsplit_once('|').ok_or(CursorError::InvalidFormat)?;
        let id: i64 = id.parse().map_err(|_| CursorError::InvalidId)?;
        let at = DateTime::parse_from_rfc3339(ts)
            .map_err(|_| CursorError::InvalidTimestamp)?
            .with_timezone(&Utc);

        Ok(Self { at, id })
    }
}

/// Applies a default and clamps a requested page size into `1..=max`.
pub fn clamp_limit(requested: Option<i64>, default: i64, max: i64) -> i64 {
    requested.unwrap_or(default).clamp(1, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cursor_roundtrip_keeps_micros() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 8, 15, 0).unwrap()
            + chrono::Duration::microseconds(123_456);
        let cursor = KeysetCursor::new(at, 42);
        assert_eq!(KeysetCursor::decode(&cursor.encode()).unwrap(), cursor);
    }

    #[test]
    fn test_decode_invalid_base64() {
        assert_eq!(
            KeysetCursor::decode("!!!"),
            Err(CursorError::InvalidEncoding)
        );
    }

    #[test]
    fn test_decode_missing_separator() {
        let raw = URL_SAFE_NO_PAD.encode("2026-03-01T08:15:00Z");
        assert_eq!(KeysetCursor::decode(&raw), Err(CursorError::InvalidFormat));
    }

    #[test]
    fn test_decode_bad_id() {
        let raw = URL_SAFE_NO_PAD.encode("2026-03-01T08:15:00Z|abc");
        assert_eq!(KeysetCursor::decode(&raw), Err(CursorError::InvalidId));
    }

    #[test]
    fn test_decode_bad_timestamp() {
        let raw = URL_SAFE_NO_PAD.encode("yesterday|5");
        assert_eq!(
            KeysetCursor::decode(&raw),
            Err(CursorError::InvalidTimestamp)
        );
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None, 50, 500), 50);
        assert_eq!(clamp_limit(Some(0), 50, 500), 1);
        assert_eq!(clamp_limit(Some(-3), 50, 500), 1);
        assert_eq!(clamp_limit(Some(10_000), 50, 500), 500);
        assert_eq!(clamp_limit(Some(77), 50, 500), 77);
    }
}

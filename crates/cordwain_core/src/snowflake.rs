//! Discord snowflake identifiers.

use chrono::{DateTime, TimeZone, Utc};
use cordwain_error::{RestError, RestResult};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Milliseconds between the Unix epoch and the first second of 2015,
/// the epoch Discord counts snowflake timestamps from.
pub const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

const TIMESTAMP_SHIFT: u32 = 22;

/// A 64-bit Discord identifier.
///
/// The high 42 bits hold the creation time in milliseconds since
/// [`DISCORD_EPOCH_MS`]. Discord sends snowflakes as JSON strings; this type
/// serializes as a string and accepts both strings and numbers.
///
/// # Examples
///
/// ```
/// use cordwain_core::Snowflake;
///
/// let id: Snowflake = "175928847299117063".parse().unwrap();
/// assert_eq!(id.get(), 175928847299117063);
/// assert_eq!(id.timestamp_ms(), 1462015105796);
/// assert!("not-a-number".parse::<Snowflake>().is_err());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    derive_more::Display,
    derive_more::From,
)]
#[display("{}", _0)]
pub struct Snowflake(u64);

impl Snowflake {
    /// Wrap a raw id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw id.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Smallest snowflake that could have been created at `time`.
    ///
    /// Times before the Discord epoch saturate to zero.
    pub fn from_datetime(time: DateTime<Utc>) -> Self {
        let millis = u64::try_from(time.timestamp_millis()).unwrap_or(0);
        Self(millis.saturating_sub(DISCORD_EPOCH_MS) << TIMESTAMP_SHIFT)
    }

    /// Creation time in milliseconds since the Unix epoch.
    pub const fn timestamp_ms(self) -> u64 {
        (self.0 >> TIMESTAMP_SHIFT) + DISCORD_EPOCH_MS
    }

    /// Creation time encoded in the id.
    pub fn created_at(self) -> DateTime<Utc> {
        let millis = i64::try_from(self.timestamp_ms()).unwrap_or(i64::MAX);
        Utc.timestamp_millis_opt(millis)
            .single()
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Parse a decimal id, failing on anything that is not an unsigned 64-bit integer.
    #[track_caller]
    pub fn parse(raw: &str) -> RestResult<Self> {
        raw.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|e| RestError::malformed(format!("'{}' is not a valid snowflake: {}", raw, e)))
    }
}

impl FromStr for Snowflake {
    type Err = RestError;

    #[track_caller]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Snowflake> for u64 {
    fn from(id: Snowflake) -> Self {
        id.0
    }
}

impl Serialize for Snowflake {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SnowflakeVisitor;

        impl Visitor<'_> for SnowflakeVisitor {
            type Value = Snowflake;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a snowflake as a string or unsigned integer")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(Snowflake(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                u64::try_from(v)
                    .map(Snowflake)
                    .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse::<u64>()
                    .map(Snowflake)
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_any(SnowflakeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn round_trips_through_datetime() {
        let time = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let id = Snowflake::from_datetime(time);
        assert_eq!(id.created_at(), time);
    }

    #[test]
    fn ordering_follows_creation_time() {
        let now = Utc::now();
        let older = Snowflake::from_datetime(now - Duration::days(20));
        let newer = Snowflake::from_datetime(now - Duration::days(1));
        assert!(older < newer);
        assert!(older.created_at() < newer.created_at());
    }

    #[test]
    fn serializes_as_string() {
        let id = Snowflake::new(41771983423143937);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"41771983423143937\"");
    }

    #[test]
    fn deserializes_from_string_and_number() {
        let from_str: Snowflake = serde_json::from_str("\"41771983423143937\"").unwrap();
        let from_num: Snowflake = serde_json::from_str("41771983423143937").unwrap();
        assert_eq!(from_str, from_num);
        assert!(serde_json::from_str::<Snowflake>("\"abc\"").is_err());
        assert!(serde_json::from_str::<Snowflake>("-5").is_err());
    }

    #[test]
    fn pre_epoch_time_saturates() {
        let time = Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(Snowflake::from_datetime(time).get(), 0);
    }
}

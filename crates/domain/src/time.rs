//! Timestamp wire helpers.
//!
//! Stored documents carry timestamps as integer epoch seconds; sub-second
//! precision is dropped on write. Decoding is lenient: integers, fractional
//! numbers, numeric strings, and RFC 3339 strings (with or without a zone
//! suffix, which is then read as UTC) are all accepted.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serializer};

/// Build a UTC timestamp from whole epoch seconds.
pub fn from_epoch_seconds(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}

/// Drop sub-second precision, matching what survives a round trip through
/// the wire format.
pub fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    from_epoch_seconds(dt.timestamp()).unwrap_or(dt)
}

struct TimestampVisitor;

impl<'de> Visitor<'de> for TimestampVisitor {
    type Value = DateTime<Utc>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("epoch seconds or an RFC 3339 timestamp")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        from_epoch_seconds(v).ok_or_else(|| E::custom(format!("timestamp out of range: {v}")))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        let secs = i64::try_from(v).map_err(|_| E::custom(format!("timestamp out of range: {v}")))?;
        self.visit_i64(secs)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if !v.is_finite() {
            return Err(E::custom("timestamp is not a finite number"));
        }
        let secs = v.floor();
        let nanos = ((v - secs) * 1e9) as u32;
        Utc.timestamp_opt(secs as i64, nanos)
            .single()
            .ok_or_else(|| E::custom(format!("timestamp out of range: {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(v) {
            return Ok(dt.with_timezone(&Utc));
        }
        // Some writers omit the zone suffix.
        if let Ok(naive) = NaiveDateTime::parse_from_str(v, "%Y-%m-%dT%H:%M:%S%.f") {
            return Ok(Utc.from_utc_datetime(&naive));
        }
        if let Ok(n) = v.parse::<f64>() {
            return self.visit_f64(n);
        }
        Err(E::custom(format!("unrecognised timestamp: {v:?}")))
    }
}

/// `#[serde(with = "wm_domain::time::epoch_seconds")]`
pub mod epoch_seconds {
    use super::*;

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(dt.timestamp())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        d.deserialize_any(TimestampVisitor)
    }
}

/// Optional variant of [`epoch_seconds`]. Pair with `#[serde(default)]` so a
/// missing field decodes as `None`.
pub mod epoch_seconds_option {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapped(#[serde(with = "super::epoch_seconds")] DateTime<Utc>);

    pub fn serialize<S: Serializer>(dt: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        match dt {
            Some(dt) => s.serialize_some(&dt.timestamp()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        Ok(Option::<Wrapped>::deserialize(d)?.map(|w| w.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, Serialize, Deserialize)]
    struct Doc {
        #[serde(with = "epoch_seconds")]
        at: DateTime<Utc>,
        #[serde(default, with = "epoch_seconds_option")]
        maybe: Option<DateTime<Utc>>,
    }

    #[test]
    fn writes_whole_seconds() {
        let at = Utc.timestamp_opt(1_700_000_000, 987_000_000).unwrap();
        let json = serde_json::to_value(Doc { at, maybe: None }).unwrap();
        assert_eq!(json["at"], 1_700_000_000);
        assert!(json["maybe"].is_null());
    }

    #[test]
    fn reads_integer_float_and_strings() {
        let d: Doc = serde_json::from_str(r#"{"at": 100}"#).unwrap();
        assert_eq!(d.at.timestamp(), 100);
        assert!(d.maybe.is_none());

        let d: Doc = serde_json::from_str(r#"{"at": 100.5, "maybe": "1970-01-01T00:03:20Z"}"#).unwrap();
        assert_eq!(d.at.timestamp(), 100);
        assert_eq!(d.at.timestamp_subsec_millis(), 500);
        assert_eq!(d.maybe.unwrap().timestamp(), 200);

        let d: Doc = serde_json::from_str(r#"{"at": "1970-01-01T00:01:40.250"}"#).unwrap();
        assert_eq!(d.at.timestamp(), 100);
    }

    #[test]
    fn rejects_garbage() {
        assert!(serde_json::from_str::<Doc>(r#"{"at": "yesterday"}"#).is_err());
    }

    #[test]
    fn truncation_drops_subseconds() {
        let at = Utc.timestamp_opt(42, 999_999_999).unwrap();
        assert_eq!(truncate_to_seconds(at), Utc.timestamp_opt(42, 0).unwrap());
    }
}

//! Microsoft JSON date format
//!
//! Stored configurations were historically written with dates encoded as
//! `"/Date(<unix-millis>)/"`, optionally followed by a `+hhmm`/`-hhmm` offset
//! (`"/Date(1335205592410-0500)/"`). The millisecond value is always UTC; the
//! offset only records the writer's local zone and is ignored on read.
//!
//! Use with `#[serde(with = "crate::utils::ms_date")]` or the [`option`] variant.

use chrono::{DateTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serializer};

const PREFIX: &str = "/Date(";
const SUFFIX: &str = ")/";

/// Format a timestamp as `/Date(<millis>)/`
pub fn format(value: &DateTime<Utc>) -> String {
    format!("{}{}{}", PREFIX, value.timestamp_millis(), SUFFIX)
}

/// Parse a `/Date(<millis>[+-hhmm])/` string
pub fn parse(input: &str) -> Result<DateTime<Utc>, String> {
    let inner = input
        .strip_prefix(PREFIX)
        .and_then(|rest| rest.strip_suffix(SUFFIX))
        .ok_or_else(|| format!("'{}' is not a Microsoft JSON date", input))?;

    // The first character may be a sign on the millis; an offset sign can only follow digits.
    let millis_end = inner
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == '+' || *c == '-')
        .map(|(i, _)| i)
        .unwrap_or(inner.len());

    let (millis, offset) = inner.split_at(millis_end);
    if !offset.is_empty()
        && (offset.len() != 5 || !offset[1..].chars().all(|c| c.is_ascii_digit()))
    {
        return Err(format!(
            "invalid time zone offset '{}' in '{}'",
            offset, input
        ));
    }

    let millis: i64 = millis
        .parse()
        .map_err(|e| format!("invalid milliseconds in '{}': {}", input, e))?;

    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| format!("timestamp out of range in '{}'", input))
}

pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(value))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(de::Error::custom)
}

/// `Option<DateTime<Utc>>` variant; `null` maps to `None`
pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_str(&format(value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| parse(&raw).map_err(de::Error::custom))
            .transpose()
    }
}

//! Human-readable `Duration` fields for config files.
//!
//! Accepts `"250ms"`, `"5s"`, `"2m"` or a plain number of seconds (string or
//! integer). Use with `#[serde(with = "shared_types::duration_serde")]`.

use serde::{de, Deserialize, Deserializer, Serializer};
use std::time::Duration;

pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if duration.subsec_millis() == 0 {
        serializer.serialize_str(&format!("{}s", duration.as_secs()))
    } else {
        serializer.serialize_str(&format!("{}ms", duration.as_millis()))
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Seconds(u64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Text(s) => parse_duration(&s).map_err(de::Error::custom),
        Raw::Seconds(secs) => Ok(Duration::from_secs(secs)),
    }
}

/// Parse the textual forms listed in the module docs.
pub fn parse_duration(s: &str) -> Result<Duration, &'static str> {
    let s = s.trim();
    // "ms" before "s" and "m"
    if let Some(ms) = s.strip_suffix("ms") {
        ms.trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| "invalid milliseconds")
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| "invalid seconds")
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.trim()
            .parse::<u64>()
            .map(|m| Duration::from_secs(m * 60))
            .map_err(|_| "invalid minutes")
    } else {
        // Try parsing as plain seconds
        s.parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| "invalid duration format")
    }
}

/// Same as the parent module for `Option<Duration>`; `null` means unset.
pub mod option {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => super::serialize(d, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Wrapper(#[serde(with = "super")] Duration);

        Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(d)| d))
    }
}

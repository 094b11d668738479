//! Contains custom serialization and deserialization functions.

use steamid_ng::SteamID;
use serde::Serializer;

/// Values Steam sends as strings which should be parsed into something else, e.g. `"2"`.
pub mod string {
    use std::fmt::Display;
    use std::str::FromStr;
    use serde::{de, Serializer, Deserialize, Deserializer};

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?.parse().map_err(de::Error::custom)
    }
}

/// Optional string values where `"0"` means there is no value.
pub mod option_string_0_as_none {
    use std::fmt::Display;
    use std::str::FromStr;
    use serde::{Serializer, Deserialize, Deserializer};

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        match value {
            Some(string) => serializer.collect_str(string),
            None => serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let s: Option<String> = Option::<String>::deserialize(deserializer)?;

        if let Some(v) = s {
            return Ok(match v.as_str() {
                "0" => None,
                v => Some(v.parse::<T>().map_err(serde::de::Error::custom)?)
            });
        }

        Ok(None)
    }
}

/// Unix timestamps where `0` means there is no date, e.g. `escrow_end_date`.
pub mod ts_seconds_option_none_when_zero {
    use crate::time::ServerTime;
    use chrono::DateTime;
    use serde::{de, Serializer, Deserialize, Deserializer};

    pub fn serialize<S>(opt: &Option<ServerTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match opt {
            Some(date) => serializer.serialize_i64(date.timestamp()),
            None => serializer.serialize_i64(0),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<ServerTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<i64>::deserialize(deserializer)? {
            None | Some(0) => Ok(None),
            Some(timestamp) => DateTime::from_timestamp(timestamp, 0)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {timestamp}"))),
        }
    }
}

pub fn steamid_as_string<S>(steamid: &SteamID, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&u64::from(*steamid).to_string())
}

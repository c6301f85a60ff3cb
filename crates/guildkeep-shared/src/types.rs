use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::PLATFORM_EPOCH_MS;
use crate::error::SnowflakeError;

/// Platform identifier for guilds, channels, messages, users and roles.
///
/// Serialized as a decimal string, the way the platform's JSON API and the
/// on-disk records carry it. Deserialization also accepts a bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Snowflake(pub u64);

impl Snowflake {
    pub fn get(self) -> u64 {
        self.0
    }

    /// Creation time encoded in the id, in milliseconds since the Unix epoch.
    pub fn timestamp_ms(self) -> u64 {
        (self.0 >> 22) + PLATFORM_EPOCH_MS
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Snowflake {
    type Err = SnowflakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SnowflakeError::Empty);
        }
        s.parse::<u64>()
            .map(Snowflake)
            .map_err(|_| SnowflakeError::Invalid(s.to_string()))
    }
}

impl From<u64> for Snowflake {
    fn from(value: u64) -> Self {
        Self(value)
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

        impl<'de> Visitor<'de> for SnowflakeVisitor {
            type Value = Snowflake;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a snowflake as a decimal string or integer")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Snowflake, E> {
                Ok(Snowflake(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Snowflake, E> {
                u64::try_from(v)
                    .map(Snowflake)
                    .map_err(|_| E::custom(format!("negative snowflake: {v}")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Snowflake, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(SnowflakeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_from_id() {
        // 175928847299117063 is the platform's documented example id.
        let id = Snowflake(175_928_847_299_117_063);
        assert_eq!(id.timestamp_ms(), 1_462_015_105_796);
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Snowflake(42)).unwrap();
        assert_eq!(json, "\"42\"");
    }

    #[test]
    fn test_deserializes_string_or_number() {
        let a: Snowflake = serde_json::from_str("\"81384788765712384\"").unwrap();
        let b: Snowflake = serde_json::from_str("81384788765712384").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!("".parse::<Snowflake>(), Err(SnowflakeError::Empty));
        assert!("12ab".parse::<Snowflake>().is_err());
    }
}

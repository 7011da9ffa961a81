//! Common types shared across models.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Server-assigned identifier.
///
/// The service may send identifiers as JSON numbers or strings; the client
/// never interprets them beyond equality and path formatting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(String);

impl Id {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id can be placed in a URL path as one segment, unchanged.
    ///
    /// Service ids are numbers or UUID-like strings, so only ASCII
    /// alphanumerics, `-` and `_` are allowed.
    pub fn is_path_segment(&self) -> bool {
        !self.0.is_empty()
            && self
                .0
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid id '{0}' (expected letters, digits, '-' or '_')")]
pub struct InvalidId(pub String);

impl FromStr for Id {
    type Err = InvalidId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = Id::new(s.trim());
        if id.is_path_segment() {
            Ok(id)
        } else {
            Err(InvalidId(s.to_string()))
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Int(i64),
            Uint(u64),
            Str(String),
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Int(n) => Id(n.to_string()),
            Wire::Uint(n) => Id(n.to_string()),
            Wire::Str(s) => Id(s),
        })
    }
}

/// Account role as granted by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let name = trimmed
            .strip_prefix("ROLE_")
            .or_else(|| trimmed.strip_prefix("role_"))
            .unwrap_or(trimmed);

        if name.eq_ignore_ascii_case("USER") {
            Ok(Role::User)
        } else if name.eq_ignore_ascii_case("ADMIN") {
            Ok(Role::Admin)
        } else {
            Err(UnknownRole(s.to_string()))
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // The login endpoint sends "ADMIN"; the admin listing sends {"name": "ADMIN"}
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Name(String),
            Object { name: String },
        }

        let name = match Wire::deserialize(deserializer)? {
            Wire::Name(name) => name,
            Wire::Object { name } => name,
        };
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for task due dates.
///
/// Accepts `YYYY-MM-DDTHH:MM`, with optional seconds and fraction, and always
/// writes `YYYY-MM-DDTHH:MM:SS`.
pub mod due_date {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    const ACCEPTED_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    const ZONED_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M%:z", "%Y-%m-%dT%H:%M%z"];

    /// Zoned timestamps keep the wall-clock time written in them; the offset
    /// is dropped, not applied.
    pub fn parse(value: &str) -> Option<NaiveDateTime> {
        let value = value.trim();

        if let Ok(zoned) = DateTime::parse_from_rfc3339(value) {
            return Some(zoned.naive_local());
        }
        if let Some(zoned) = ZONED_FORMATS
            .iter()
            .find_map(|fmt| DateTime::parse_from_str(value, fmt).ok())
        {
            return Some(zoned.naive_local());
        }

        let value = value
            .strip_suffix('Z')
            .or_else(|| value.strip_suffix('z'))
            .unwrap_or(value);
        ACCEPTED_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    }

    pub fn format(value: &NaiveDateTime) -> String {
        value.format(WIRE_FORMAT).to_string()
    }

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date-time: {}", raw)))
    }

    /// Lenient form for data coming back from the server: a missing or
    /// unreadable value becomes `None` so one bad row cannot fail a listing.
    pub mod optional {
        use super::{format, parse};
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer};
        use serde_json::Value;

        pub fn serialize<S: Serializer>(
            value: &Option<NaiveDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.serialize_str(&format(value)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            let parsed = match Option::<Value>::deserialize(deserializer)? {
                None | Some(Value::Null) => return Ok(None),
                Some(Value::String(raw)) => parse(&raw).ok_or(Value::String(raw)),
                Some(other) => Err(other),
            };

            Ok(parsed
                .map_err(|raw| tracing::warn!(value = %raw, "Ignoring unreadable due date"))
                .ok())
        }
    }
}

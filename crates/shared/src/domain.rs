use std::fmt;

use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};

/// Server-assigned photo identifier. The backend is free to hand out
/// integers or strings, so both are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PhotoId {
    Number(i64),
    Text(String),
}

impl PhotoId {
    /// Zero and blank identifiers are treated as "no identifier".
    pub fn is_usable(&self) -> bool {
        match self {
            PhotoId::Number(n) => *n != 0,
            PhotoId::Text(s) => !s.trim().is_empty(),
        }
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoId::Number(n) => write!(f, "{n}"),
            PhotoId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for PhotoId {
    fn from(value: i64) -> Self {
        PhotoId::Number(value)
    }
}

impl From<&str> for PhotoId {
    fn from(value: &str) -> Self {
        PhotoId::Text(value.to_string())
    }
}

/// A gallery entry. Only `id` is required; the other fields fall back to
/// absent (or an empty `image`) when null or not a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub id: PhotoId,
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub image: String,
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub uploaded_at: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseString {
    Text(String),
    Other(IgnoredAny),
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match LooseString::deserialize(deserializer)? {
        LooseString::Text(value) => Some(value),
        LooseString::Other(_) => None,
    })
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(string_or_none(deserializer)?.unwrap_or_default())
}

impl Photo {
    pub fn display_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|title| !title.trim().is_empty())
    }

    pub fn raw_uploaded_at(&self) -> Option<&str> {
        self.uploaded_at
            .as_deref()
            .filter(|value| !value.trim().is_empty())
    }
}

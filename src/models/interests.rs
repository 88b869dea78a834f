//! Decoding of the `interests` field of catalog rows.
//!
//! The itinerary service stores interests as the textual repr of a list, so a
//! row usually carries `"['Adventure', 'Culture']"` instead of a JSON array.
//! [`Interests`] accepts both shapes. Once the service emits real arrays the
//! string branch simply stops being taken.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::MalformedInterests;

/// Ordered, de-duplicated set of trimmed interest names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Interests(Vec<String>);

impl Interests {
    /// Decode the encoded form, degrading to an empty set when it cannot be read.
    pub fn from_encoded(raw: &str) -> Self {
        match parse_interests(raw) {
            Ok(items) => Self(items),
            Err(e) => {
                warn!("Treating row interests as empty: {}", e);
                Self::default()
            }
        }
    }

    pub fn contains(&self, interest: &str) -> bool {
        self.0.iter().any(|item| item == interest)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Interests {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(normalize(iter.into_iter().map(Into::into)))
    }
}

impl<'de> Deserialize<'de> for Interests {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;

        Ok(match value {
            Value::String(raw) => Self::from_encoded(&raw),
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            Value::Null => Self::default(),
            other => {
                warn!("Treating row interests as empty: unexpected value {}", other);
                Self::default()
            }
        })
    }
}

/// Parse a list of quoted string literals such as `['Food', "Kids' Club"]`.
///
/// Real JSON is tried first so escapes like `\u00e9` decode properly. The
/// fallback accepts single or double quoted literals, backslash escapes and a
/// trailing comma.
pub fn parse_interests(raw: &str) -> Result<Vec<String>, MalformedInterests> {
    let trimmed = raw.trim();

    if let Ok(items) = serde_json::from_str::<Vec<String>>(trimmed) {
        return Ok(normalize(items));
    }

    let malformed = |reason: &str| MalformedInterests {
        raw: raw.to_string(),
        reason: reason.to_string(),
    };

    let body = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| malformed("expected a bracketed list"))?;

    let mut items = Vec::new();
    let mut chars = body.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let quote = match chars.next() {
            None => break,
            Some(q @ ('\'' | '"')) => q,
            Some(_) => return Err(malformed("expected a quoted string")),
        };

        let mut item = String::new();
        loop {
            match chars.next() {
                None => return Err(malformed("unterminated string literal")),
                Some('\\') => match chars.next() {
                    Some(escaped) => item.push(escaped),
                    None => return Err(malformed("dangling escape")),
                },
                Some(c) if c == quote => break,
                Some(c) => item.push(c),
            }
        }
        items.push(item);

        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        match chars.next() {
            None => break,
            Some(',') => {}
            Some(_) => return Err(malformed("expected ',' between items")),
        }
    }

    Ok(normalize(items))
}

fn normalize(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let item = item.trim();
        if !item.is_empty() && !out.iter().any(|seen| seen == item) {
            out.push(item.to_string());
        }
    }
    out
}

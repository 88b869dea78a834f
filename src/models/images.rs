//! Decoding of the `images_by_day` field of itinerary records.
//!
//! Like `interests`, the mapping may arrive as the textual repr of a dict
//! (`"{'1': {'Borough Market': 'https://...'}}"`) instead of a JSON object, or
//! not at all. Anything unreadable becomes an empty mapping so the rest of the
//! record still renders.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::warn;

/// Day number (as a string key) to place name to image URL, in server order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImagesByDay(Map<String, Value>);

impl ImagesByDay {
    /// Decode the encoded form, degrading to an empty mapping when it cannot be read.
    pub fn from_encoded(raw: &str) -> Self {
        let parsed = serde_json::from_str::<Map<String, Value>>(raw.trim()).or_else(|_| {
            requote(raw.trim())
                .ok_or_else(|| "unterminated string literal".to_string())
                .and_then(|json| serde_json::from_str(&json).map_err(|e| e.to_string()))
        });

        match parsed {
            Ok(map) => Self(map),
            Err(e) => {
                warn!("Treating images_by_day as empty: {}", e);
                Self::default()
            }
        }
    }

    /// Images for `day` as (place, url) pairs, or `None` when the day has no entry.
    pub fn for_day(&self, day: u32) -> Option<Vec<(String, String)>> {
        let places = self.0.get(&day.to_string())?;
        let pairs = places
            .as_object()
            .map(|places| {
                places
                    .iter()
                    .filter_map(|(place, url)| Some((place.clone(), url.as_str()?.to_string())))
                    .collect()
            })
            .unwrap_or_default();
        Some(pairs)
    }
}

impl<'de> Deserialize<'de> for ImagesByDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Object(map) => Self(map),
            Value::String(raw) => Self::from_encoded(&raw),
            Value::Null => Self::default(),
            other => {
                warn!("Treating images_by_day as empty: unexpected value {}", other);
                Self::default()
            }
        })
    }
}

/// Rewrite single or double quoted literals as JSON strings, leaving the rest
/// of the text alone. `None` when a literal never closes.
fn requote(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\'' && c != '"' {
            out.push(c);
            continue;
        }

        let mut literal = String::new();
        loop {
            match chars.next()? {
                '\\' => literal.push(chars.next()?),
                ch if ch == c => break,
                ch => literal.push(ch),
            }
        }
        out.push_str(&Value::String(literal).to_string());
    }

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_place_order() {
        let images: ImagesByDay = serde_json::from_str(
            r#"{"1": {"Tower Bridge": "https://img/b.jpg", "Abbey Road": "https://img/a.jpg"},
                "2": {}}"#,
        )
        .unwrap();
        assert_eq!(
            images.for_day(1).unwrap(),
            vec![
                ("Tower Bridge".to_string(), "https://img/b.jpg".to_string()),
                ("Abbey Road".to_string(), "https://img/a.jpg".to_string()),
            ]
        );
        assert_eq!(images.for_day(2), Some(Vec::new()));
        assert_eq!(images.for_day(3), None);
    }

    #[test]
    fn decodes_the_quoted_dict_form() {
        let raw = r#"{'1': {'Kew Gardens': 'https://img/k.jpg',
                           "Hawksmoor's": 'https://img/h.jpg'}}"#;
        let images: ImagesByDay = serde_json::from_value(Value::String(raw.to_string())).unwrap();
        assert_eq!(
            images.for_day(1).unwrap(),
            vec![
                ("Kew Gardens".to_string(), "https://img/k.jpg".to_string()),
                ("Hawksmoor's".to_string(), "https://img/h.jpg".to_string()),
            ]
        );
    }

    #[test]
    fn unreadable_forms_become_empty() {
        for raw in ["null", r#""{'1': {'A': 'u'""#, r#""not a dict""#, "[1, 2]", "7"] {
            let images: ImagesByDay = serde_json::from_str(raw).unwrap();
            assert_eq!(images, ImagesByDay::default(), "{raw}");
        }
    }
}

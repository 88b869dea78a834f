//! Data models for itinerary requests, catalog rows and itinerary records

mod images;
mod interests;

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{FailureReason, ValidationError};

pub use images::ImagesByDay;
pub use interests::Interests;

/// Trip types offered by the generate form and the catalog filter.
pub const TRIP_TYPES: [&str; 8] = [
    "Adventure",
    "Culture",
    "Relax",
    "Food",
    "Nature",
    "Nightlife",
    "Shopping",
    "Family",
];

/// Parameters for a new itinerary, serialized as the create-itinerary body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub destination: String,
    #[serde(rename = "duration")]
    pub duration_days: u32,
    pub interests: Vec<String>,
}

impl GenerationRequest {
    pub fn new(destination: impl Into<String>, duration_days: u32, interests: Vec<String>) -> Self {
        let mut request = Self {
            destination: destination.into().trim().to_string(),
            duration_days,
            interests: Vec::new(),
        };
        for interest in interests {
            let interest = interest.trim();
            if !interest.is_empty() && !request.interests.iter().any(|i| i == interest) {
                request.interests.push(interest.to_string());
            }
        }
        request
    }

    /// Add the interest if missing, remove it otherwise.
    pub fn toggle_interest(&mut self, interest: &str) {
        if let Some(pos) = self.interests.iter().position(|i| i == interest) {
            self.interests.remove(pos);
        } else {
            self.interests.push(interest.to_string());
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.destination.trim().is_empty() {
            return Err(ValidationError::EmptyDestination);
        }
        if self.duration_days == 0 {
            return Err(ValidationError::ZeroDuration);
        }
        if self.interests.is_empty() {
            return Err(ValidationError::NoInterests);
        }
        Ok(())
    }
}

/// Body returned by the create-itinerary endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedItinerary {
    pub destination_slug: String,
    pub duration: u32,
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
}

/// Navigation target of a generated or listed itinerary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItineraryRoute {
    pub destination_slug: String,
    pub duration_days: u32,
    pub id: String,
}

impl ItineraryRoute {
    /// Path segment carrying the duration, e.g. `3-days`.
    pub fn duration_segment(&self) -> String {
        format!("{}-days", self.duration_days)
    }

    pub fn path(&self) -> String {
        format!(
            "/itinerary/{}/{}/{}",
            self.destination_slug,
            self.duration_segment(),
            self.id
        )
    }

    /// Parse `/itinerary/{slug}/{n}-days/{id}`; the leading `/itinerary` and a
    /// bare `{n}` duration are also accepted.
    pub fn parse(path: &str) -> Option<Self> {
        let mut segments = path.trim_matches('/').split('/').filter(|s| !s.is_empty());
        let mut first = segments.next()?;
        if first == "itinerary" {
            first = segments.next()?;
        }
        let duration = segments.next()?;
        let id = segments.next()?;
        if segments.next().is_some() {
            return None;
        }

        let duration_days = duration
            .strip_suffix("-days")
            .unwrap_or(duration)
            .parse()
            .ok()?;

        Some(Self {
            destination_slug: first.to_string(),
            duration_days,
            id: id.to_string(),
        })
    }
}

impl From<CreatedItinerary> for ItineraryRoute {
    fn from(created: CreatedItinerary) -> Self {
        Self {
            destination_slug: created.destination_slug,
            duration_days: created.duration,
            id: created.id,
        }
    }
}

impl fmt::Display for ItineraryRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Outcome of one generation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    Success(ItineraryRoute),
    Failure(FailureReason),
}

impl GenerationResult {
    pub fn route(&self) -> Option<&ItineraryRoute> {
        match self {
            Self::Success(route) => Some(route),
            Self::Failure(_) => None,
        }
    }
}

/// One row of the itinerary catalog
#[derive(Debug, Clone, Deserialize)]
pub struct ItinerarySummary {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location_image: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub headline: String,
    pub destination_slug: String,
    pub duration: u32,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub interests: Interests,
}

impl ItinerarySummary {
    pub fn route(&self) -> ItineraryRoute {
        ItineraryRoute {
            destination_slug: self.destination_slug.clone(),
            duration_days: self.duration,
            id: self.id.clone(),
        }
    }
}

/// One day of an itinerary plan. Slot fields hold markup from the service.
#[derive(Debug, Clone, Deserialize)]
pub struct DayPlan {
    pub day: u32,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    pub morning: Option<String>,
    pub afternoon: Option<String>,
    pub evening: Option<String>,
}

/// Full itinerary record served by the detail endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ItineraryDetail {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub headline: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subheadline: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub quote: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location_image: String,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub interests: Interests,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub overview_introduction: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub overview_time_to_visit: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "itinerary_plan")]
    pub plan: Vec<DayPlan>,
    #[serde(default)]
    pub images_by_day: ImagesByDay,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number id, got {other}"
        ))),
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept RFC 3339 or a naive `YYYY-MM-DDTHH:MM:SS[.f]` (taken as UTC); anything
/// else becomes `None` instead of failing the whole record.
fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }

    Ok(NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc()))
}

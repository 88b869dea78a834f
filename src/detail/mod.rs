//! Projection of an itinerary record into what the detail view renders

use std::fmt;

use tracing::{info, warn};

use crate::error::DetailError;
use crate::models::{DayPlan, ItineraryDetail, ItineraryRoute};
use crate::traits::ItineraryService;

/// Time slots of a day, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    pub const ALL: [Self; 3] = [Self::Morning, Self::Afternoon, Self::Evening];

    pub const fn heading(self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Evening => "Evening",
        }
    }

    fn markup(self, plan: &DayPlan) -> Option<&str> {
        match self {
            Self::Morning => plan.morning.as_deref(),
            Self::Afternoon => plan.afternoon.as_deref(),
            Self::Evening => plan.evening.as_deref(),
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.heading())
    }
}

/// One slot of a day. `markup` comes from the service and is passed through
/// untouched; it is empty when the service sent nothing for the slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlot {
    pub time: TimeOfDay,
    pub markup: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarouselImage {
    pub place: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySection {
    pub day: u32,
    pub heading: String,
    pub slots: Vec<TimeSlot>,
    pub carousel: Vec<CarouselImage>,
}

/// Body of the detail view. Title and hero image live in [`PageMetadata`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderModel {
    pub subheadline: String,
    pub quote: String,
    pub location: String,
    pub duration_days: Option<u32>,
    pub interests: Vec<String>,
    pub introduction: String,
    pub time_to_visit: String,
    /// Creation date as `Mar 5, 2025`
    pub published: Option<String>,
    pub days: Vec<DaySection>,
}

/// Title, description and preview image of the detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
}

impl PageMetadata {
    pub fn for_detail(detail: &ItineraryDetail) -> Self {
        Self {
            title: detail.headline.clone(),
            description: detail.overview_introduction.clone(),
            image: (!detail.location_image.is_empty()).then(|| detail.location_image.clone()),
        }
    }

    pub fn not_found() -> Self {
        Self {
            title: "Itinerary Not Found".to_string(),
            description: "No itinerary data available.".to_string(),
            image: None,
        }
    }
}

/// Build the render model. Days stay in plan order.
pub fn project(raw: &ItineraryDetail) -> RenderModel {
    let days = raw
        .plan
        .iter()
        .map(|plan| {
            let carousel = match raw.images_by_day.for_day(plan.day) {
                Some(images) => images
                    .into_iter()
                    .map(|(place, url)| CarouselImage { place, url })
                    .collect(),
                None => {
                    warn!(
                        "Itinerary {} has no images for day {}, showing none",
                        raw.id, plan.day
                    );
                    Vec::new()
                }
            };

            DaySection {
                day: plan.day,
                heading: format!("Day {}: {}", plan.day, plan.title),
                slots: TimeOfDay::ALL
                    .into_iter()
                    .map(|time| TimeSlot {
                        time,
                        markup: time.markup(plan).unwrap_or_default().to_string(),
                    })
                    .collect(),
                carousel,
            }
        })
        .collect();

    RenderModel {
        subheadline: raw.subheadline.clone(),
        quote: raw.quote.clone(),
        location: raw.location.clone(),
        duration_days: raw.duration,
        interests: raw.interests.iter().map(str::to_string).collect(),
        introduction: raw.overview_introduction.clone(),
        time_to_visit: raw.overview_time_to_visit.clone(),
        published: raw.created_at.map(|at| at.format("%b %-d, %Y").to_string()),
        days,
    }
}

/// Detail view ready to render
#[derive(Debug, Clone)]
pub struct DetailView {
    pub metadata: PageMetadata,
    pub model: RenderModel,
}

/// Fetch and project the itinerary at `route`.
///
/// Any fetch failure, including an undecodable record, is `NotFound`: the
/// caller shows a not-found view rather than a broken page.
pub async fn load(
    service: &dyn ItineraryService,
    route: &ItineraryRoute,
) -> Result<DetailView, DetailError> {
    match service.get_itinerary(route).await {
        Ok(detail) => {
            info!("Loaded itinerary {} ({} days planned)", route, detail.plan.len());
            Ok(DetailView {
                metadata: PageMetadata::for_detail(&detail),
                model: project(&detail),
            })
        }
        Err(e) => {
            warn!("Itinerary {} unavailable: {}", route, e);
            Err(DetailError::NotFound(route.path()))
        }
    }
}

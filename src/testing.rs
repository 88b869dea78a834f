//! In-memory itinerary service and fixtures for tests

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::error::ServiceError;
use crate::models::{
    CreatedItinerary, GenerationRequest, ItineraryDetail, ItineraryRoute, ItinerarySummary,
};
use crate::traits::{ClientConfig, ItineraryService};

/// Canned answer of the stub service
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Transport,
    Malformed,
    Hang,
}

impl<T: Clone> Reply<T> {
    async fn resolve(&self, delay: Duration) -> Result<T, ServiceError> {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match self {
            Self::Ok(value) => Ok(value.clone()),
            Self::Transport => Err(ServiceError::Transport("502 Bad Gateway".to_string())),
            Self::Malformed => Err(ServiceError::Malformed("expected value at line 1".to_string())),
            Self::Hang => std::future::pending().await,
        }
    }
}

pub struct StubService {
    config: ClientConfig,
    create: Reply<CreatedItinerary>,
    create_delay: Duration,
    list: Reply<Vec<ItinerarySummary>>,
    detail: Reply<ItineraryDetail>,
    create_calls: AtomicUsize,
    limits: Mutex<Vec<Option<usize>>>,
    routes: Mutex<Vec<ItineraryRoute>>,
}

impl StubService {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::new("http://stub.test"),
            create: Reply::Transport,
            create_delay: Duration::ZERO,
            list: Reply::Transport,
            detail: Reply::Transport,
            create_calls: AtomicUsize::new(0),
            limits: Mutex::new(Vec::new()),
            routes: Mutex::new(Vec::new()),
        }
    }

    pub fn with_create(mut self, reply: Reply<CreatedItinerary>, delay: Duration) -> Self {
        self.create = reply;
        self.create_delay = delay;
        self
    }

    pub fn with_list(mut self, reply: Reply<Vec<ItinerarySummary>>) -> Self {
        self.list = reply;
        self
    }

    pub fn with_detail(mut self, reply: Reply<ItineraryDetail>) -> Self {
        self.detail = reply;
        self
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn requested_limits(&self) -> Vec<Option<usize>> {
        self.limits.lock().unwrap().clone()
    }

    pub fn requested_routes(&self) -> Vec<ItineraryRoute> {
        self.routes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ItineraryService for StubService {
    fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn create_itinerary(
        &self,
        _request: &GenerationRequest,
    ) -> Result<CreatedItinerary, ServiceError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.create.resolve(self.create_delay).await
    }

    async fn list_itineraries(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<ItinerarySummary>, ServiceError> {
        self.limits.lock().unwrap().push(limit);
        self.list.resolve(Duration::ZERO).await
    }

    async fn get_itinerary(&self, route: &ItineraryRoute) -> Result<ItineraryDetail, ServiceError> {
        self.routes.lock().unwrap().push(route.clone());
        self.detail.resolve(Duration::ZERO).await
    }
}

pub fn created(slug: &str, duration: u32, id: &str) -> CreatedItinerary {
    serde_json::from_value(json!({
        "destination_slug": slug,
        "duration": duration,
        "id": id,
    }))
    .unwrap()
}

/// Catalog row decoded through the real deserializer, so `interests` is parsed
/// from its encoded form.
pub fn summary(id: u32, location: &str, interests: &str) -> ItinerarySummary {
    serde_json::from_value(json!({
        "id": id,
        "location_image": format!("https://img.test/{id}.jpg"),
        "location": location,
        "headline": format!("{location} in style"),
        "destination_slug": location.to_lowercase().replace(' ', "-"),
        "duration": 3,
        "created_at": "2025-02-14T09:30:00Z",
        "interests": interests,
    }))
    .unwrap()
}

/// Detail record with one plan entry per day in `days`, in that order.
pub fn detail(days: &[u32]) -> ItineraryDetail {
    let plan: Vec<_> = days
        .iter()
        .map(|day| {
            json!({
                "day": day,
                "title": format!("Day {day} title"),
                "morning": format!("<p>Morning of day <b>{day}</b></p>"),
                "afternoon": null,
                "evening": format!("<p>Evening {day}</p>"),
            })
        })
        .collect();

    serde_json::from_value(json!({
        "id": 42,
        "headline": "Three days in London",
        "subheadline": "Markets, museums and the river",
        "quote": "When a man is tired of London, he is tired of life.",
        "location": "London, UK",
        "location_image": "https://img.test/london.jpg",
        "destination": "London",
        "duration": days.len(),
        "interests": "['Adventure', 'Culture']",
        "overview_introduction": "London rewards walkers.",
        "overview_time_to_visit": "Late spring.",
        "created_at": "2025-03-05T10:00:00+00:00",
        "itinerary_plan": plan,
        "images_by_day": {
            "1": {
                "Borough Market": "https://img.test/borough.jpg",
                "Tate Modern": "https://img.test/tate.jpg",
            },
            "2": {},
        },
    }))
    .unwrap()
}

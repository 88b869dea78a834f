//! Traits and configuration for talking to the itinerary service

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::models::{
    CreatedItinerary, GenerationRequest, ItineraryDetail, ItineraryRoute, ItinerarySummary,
};

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Configuration for the remote itinerary service
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the service, without a trailing slash
    pub base_url: String,
    /// User agent sent with every request
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_agent: format!("traveltales-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Reads `API_BASE_URL`, falling back to a local development server.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }
}

/// Remote itinerary service.
///
/// Every failure is a [`ServiceError`]: unreachable hosts and non-2xx statuses
/// are `Transport`, undecodable bodies are `Malformed`.
#[async_trait]
pub trait ItineraryService: Send + Sync {
    /// Get the configuration for this service
    fn config(&self) -> &ClientConfig;

    /// Ask the service to generate a new itinerary
    async fn create_itinerary(
        &self,
        request: &GenerationRequest,
    ) -> Result<CreatedItinerary, ServiceError>;

    /// List generated itineraries, newest first, optionally capped at `limit`
    async fn list_itineraries(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<ItinerarySummary>, ServiceError>;

    /// Fetch one itinerary record
    async fn get_itinerary(&self, route: &ItineraryRoute) -> Result<ItineraryDetail, ServiceError>;

    /// Join an API path onto the configured base URL
    ///
    /// # Arguments
    /// * `path` - Path starting with `/`
    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.config().base_url, path)
    }
}

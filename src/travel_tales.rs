use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tracing::warn;

use crate::catalog::{ActiveFilter, Catalog};
use crate::client::HttpItineraryService;
use crate::detail::{self, DetailView};
use crate::error::{DetailError, ValidationError};
use crate::generation::{GenerationConfig, GenerationController, GenerationStatus};
use crate::models::{GenerationRequest, GenerationResult, ItineraryRoute, ItinerarySummary};
use crate::traits::{ClientConfig, ItineraryService};

/// Rows shown on the landing page
const LATEST_COUNT: usize = 3;

/// What the catalog view should show
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub filter: ActiveFilter,
    pub page: usize,
    pub limit: Option<usize>,
}

pub struct TravelTales {
    service: Arc<dyn ItineraryService>,
    generator: GenerationController,
}

impl TravelTales {
    pub fn new(client_config: ClientConfig, generation_config: GenerationConfig) -> Result<Self> {
        let service: Arc<dyn ItineraryService> =
            Arc::new(HttpItineraryService::new(client_config)?);
        Ok(Self::with_service(service, generation_config))
    }

    pub fn with_service(
        service: Arc<dyn ItineraryService>,
        generation_config: GenerationConfig,
    ) -> Self {
        let generator = GenerationController::new(service.clone(), generation_config);

        Self { service, generator }
    }

    pub fn base_url(&self) -> &str {
        &self.service.config().base_url
    }

    pub fn progress(&self) -> watch::Receiver<GenerationStatus> {
        self.generator.subscribe()
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ValidationError> {
        self.generator.generate(request).await
    }

    /// Load the catalog once and apply `query` to it.
    pub async fn browse(&self, query: &CatalogQuery) -> Catalog {
        let mut catalog = Catalog::load(self.service.as_ref(), query.limit).await;

        let state = catalog.state_mut();
        if let Some(search) = &query.search {
            state.set_search_text(search.clone());
        }
        state.set_filter(query.filter);

        let page_count = catalog.current_page().page_count;
        if query.page > 1 && !catalog.state_mut().go_to(query.page, page_count) {
            warn!(
                "Page {} does not exist ({} pages), showing page 1",
                query.page, page_count
            );
        }

        catalog
    }

    /// Most recent itineraries for the landing page; empty when unavailable.
    pub async fn latest(&self) -> Vec<ItinerarySummary> {
        Catalog::load(self.service.as_ref(), Some(LATEST_COUNT))
            .await
            .rows()
            .to_vec()
    }

    pub async fn show(&self, route: &ItineraryRoute) -> Result<DetailView, DetailError> {
        detail::load(self.service.as_ref(), route).await
    }
}

//! Search, filter and pagination over the itinerary catalog

use std::fmt;
use std::str::FromStr;

use tracing::{info, warn};

use crate::models::{ItinerarySummary, TRIP_TYPES};
use crate::traits::ItineraryService;

/// Rows shown per catalog page
pub const PAGE_SIZE: usize = 12;

/// Category filter of the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveFilter {
    #[default]
    All,
    Interest(&'static str),
}

impl ActiveFilter {
    /// "All" followed by every trip type, in display order
    pub fn options() -> impl Iterator<Item = Self> {
        std::iter::once(Self::All).chain(TRIP_TYPES.into_iter().map(Self::Interest))
    }

    pub fn matches(self, row: &ItinerarySummary) -> bool {
        match self {
            Self::All => true,
            Self::Interest(interest) => row.interests.contains(interest),
        }
    }
}

impl FromStr for ActiveFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        TRIP_TYPES
            .into_iter()
            .find(|trip_type| trip_type.eq_ignore_ascii_case(s))
            .map(Self::Interest)
            .ok_or_else(|| {
                format!(
                    "unknown filter '{s}', expected All or one of {}",
                    TRIP_TYPES.join(", ")
                )
            })
    }
}

impl fmt::Display for ActiveFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Interest(interest) => f.write_str(interest),
        }
    }
}

/// Live search/filter/page state of the catalog view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogViewState {
    search_text: String,
    active_filter: ActiveFilter,
    page: usize,
}

impl Default for CatalogViewState {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            active_filter: ActiveFilter::All,
            page: 1,
        }
    }
}

impl CatalogViewState {
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn active_filter(&self) -> ActiveFilter {
        self.active_filter
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Changing the search text goes back to the first page.
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
        self.page = 1;
    }

    /// Changing the filter goes back to the first page.
    pub fn set_filter(&mut self, filter: ActiveFilter) {
        self.active_filter = filter;
        self.page = 1;
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self, page_count: usize) -> bool {
        self.page < page_count
    }

    /// Move back a page; a no-op on the first page.
    pub fn previous_page(&mut self) -> bool {
        if self.has_previous() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Move forward a page; a no-op on the last page.
    pub fn next_page(&mut self, page_count: usize) -> bool {
        if self.has_next(page_count) {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Jump to `page` if it exists.
    pub fn go_to(&mut self, page: usize, page_count: usize) -> bool {
        if (1..=page_count).contains(&page) {
            self.page = page;
            true
        } else {
            false
        }
    }
}

/// One page of the filtered catalog
#[derive(Debug)]
pub struct CatalogPage<'a> {
    pub rows: Vec<&'a ItinerarySummary>,
    pub page_count: usize,
}

/// Filter `rows` by `state` and cut out the requested page.
///
/// Rows keep their catalog order. `state.page` must lie in `1..=page_count`;
/// any other page yields no rows.
pub fn filter_and_paginate<'a>(
    rows: &'a [ItinerarySummary],
    state: &CatalogViewState,
) -> CatalogPage<'a> {
    let needle = state.search_text.to_lowercase();

    let visible: Vec<&ItinerarySummary> = rows
        .iter()
        .filter(|row| row.location.to_lowercase().contains(&needle))
        .filter(|row| state.active_filter.matches(row))
        .collect();

    let page_count = visible.len().div_ceil(PAGE_SIZE);
    let start = state.page.saturating_sub(1).saturating_mul(PAGE_SIZE);

    CatalogPage {
        rows: visible.into_iter().skip(start).take(PAGE_SIZE).collect(),
        page_count,
    }
}

/// Fetched catalog plus its view state. The fetched rows are never modified.
pub struct Catalog {
    rows: Vec<ItinerarySummary>,
    state: CatalogViewState,
}

impl Catalog {
    /// Fetch the catalog once. A failed fetch yields an empty catalog.
    pub async fn load(service: &dyn ItineraryService, limit: Option<usize>) -> Self {
        let rows = match service.list_itineraries(limit).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Could not load itineraries, showing none: {}", e);
                Vec::new()
            }
        };

        info!("Catalog loaded with {} itineraries", rows.len());
        Self::from_rows(rows)
    }

    pub fn from_rows(rows: Vec<ItinerarySummary>) -> Self {
        Self {
            rows,
            state: CatalogViewState::default(),
        }
    }

    pub fn rows(&self) -> &[ItinerarySummary] {
        &self.rows
    }

    pub fn state(&self) -> &CatalogViewState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut CatalogViewState {
        &mut self.state
    }

    pub fn current_page(&self) -> CatalogPage<'_> {
        filter_and_paginate(&self.rows, &self.state)
    }
}

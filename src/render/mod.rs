//! Plain-text presentation of the catalog, detail and progress views.
//!
//! The render model keeps slot markup verbatim; flattening it to text happens
//! here, for the terminal only.

use scraper::Html;

use crate::catalog::{ActiveFilter, CatalogPage, CatalogViewState};
use crate::detail::{DetailView, PageMetadata};
use crate::generation::GenerationStatus;
use crate::models::ItinerarySummary;

/// Shown in place of a missing location image
pub const PLACEHOLDER_IMAGE: &str = "/images/placeholder.jpg";

const BAR_WIDTH: usize = 30;

/// Flatten service markup into a single line of text.
pub fn markup_to_text(markup: &str) -> String {
    let fragment = Html::parse_fragment(markup);
    let text: String = fragment.root_element().text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn progress_line(status: GenerationStatus) -> String {
    let percent = usize::from(status.percent());
    let filled = BAR_WIDTH * percent / 100;
    let bar = format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled));

    match status {
        GenerationStatus::Idle => format!("{bar} waiting to start"),
        GenerationStatus::InFlight { .. } => {
            format!("{bar} {percent}% - Crafting your perfect itinerary...")
        }
        GenerationStatus::Completed => format!("{bar} 100% - Your itinerary is ready!"),
        GenerationStatus::Failed { reason, .. } => format!("{bar} {reason}"),
    }
}

pub fn card(row: &ItinerarySummary) -> Vec<String> {
    let image = if row.location_image.is_empty() {
        PLACEHOLDER_IMAGE
    } else {
        row.location_image.as_str()
    };

    let mut lines = vec![
        format!("* {}", row.location),
        format!("  {} Days", row.duration),
    ];
    if let Some(created_at) = row.created_at {
        lines.push(format!("  Created on {}", created_at.format("%-m/%-d/%Y")));
    }
    if !row.interests.is_empty() {
        let chips: Vec<String> = row.interests.iter().map(|i| format!("({i})")).collect();
        lines.push(format!("  {}", chips.join(" ")));
    }
    lines.push(format!("  {}", image));
    lines.push(format!("  -> {}", row.route()));
    lines
}

pub fn catalog(page: &CatalogPage<'_>, state: &CatalogViewState) -> String {
    let mut lines = vec!["Latest Itineraries".to_string(), String::new()];

    if !state.search_text().is_empty() {
        lines.push(format!("Search: {}", state.search_text()));
    }
    let filters: Vec<String> = ActiveFilter::options()
        .map(|filter| {
            if filter == state.active_filter() {
                format!("[{filter}]")
            } else {
                filter.to_string()
            }
        })
        .collect();
    lines.push(format!("Filter: {}", filters.join(" ")));
    lines.push(String::new());

    if page.rows.is_empty() {
        lines.push("No itineraries match.".to_string());
    }
    for row in &page.rows {
        lines.extend(card(row));
        lines.push(String::new());
    }

    let previous = if state.has_previous() { "<" } else { " " };
    let next = if state.has_next(page.page_count) { ">" } else { " " };
    lines.push(format!(
        "{previous} Page {} of {} {next}",
        state.page(),
        page.page_count
    ));

    lines.join("\n")
}

/// Compact list used for the landing page's latest itineraries.
pub fn latest(rows: &[ItinerarySummary]) -> String {
    if rows.is_empty() {
        return "No itineraries yet.".to_string();
    }
    rows.iter()
        .map(|row| {
            format!(
                "{} - {} ({} days) -> {}",
                row.location,
                row.headline,
                row.duration,
                row.route()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn detail(view: &DetailView) -> String {
    let model = &view.model;
    let mut lines = vec![
        view.metadata.title.clone(),
        model.subheadline.clone(),
        String::new(),
    ];

    let mut meta = Vec::new();
    if let Some(published) = &model.published {
        meta.push(format!("Published {published}"));
    }
    if let Some(days) = model.duration_days {
        meta.push(format!("{days} days"));
    }
    meta.push(model.location.clone());
    lines.push(meta.join(" | "));
    if !model.interests.is_empty() {
        lines.push(model.interests.join(", "));
    }
    if let Some(image) = &view.metadata.image {
        lines.push(image.clone());
    }

    lines.push(String::new());
    lines.push(format!("\"{}\"", model.quote));
    lines.push(String::new());
    lines.push("Introduction".to_string());
    lines.push(model.introduction.clone());
    lines.push(String::new());
    lines.push("Best Time to Visit".to_string());
    lines.push(model.time_to_visit.clone());

    for day in &model.days {
        lines.push(String::new());
        lines.push(day.heading.clone());
        for slot in &day.slots {
            lines.push(format!("  {}", slot.time));
            lines.push(format!("    {}", markup_to_text(&slot.markup)));
        }
        if !day.carousel.is_empty() {
            lines.push(format!("  Photos from day {}", day.day));
        }
        for image in &day.carousel {
            lines.push(format!("  [{}] {}", image.place, image.url));
        }
    }

    lines.join("\n")
}

pub fn not_found() -> String {
    let metadata = PageMetadata::not_found();
    format!("{}\n{}", metadata.title, metadata.description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::filter_and_paginate;
    use crate::detail::{PageMetadata, project};
    use crate::error::FailureReason;
    use crate::testing::{detail as detail_fixture, summary};

    #[test]
    fn markup_is_flattened_for_the_terminal() {
        assert_eq!(
            markup_to_text("<p>Visit <b>Tower Bridge</b>\n and  <a href='#'>walk</a>.</p>"),
            "Visit Tower Bridge and walk."
        );
        assert_eq!(markup_to_text(""), "");
    }

    #[test]
    fn progress_bar_tracks_status() {
        assert!(
            progress_line(GenerationStatus::InFlight { percent: 50 }).contains("50% - Crafting")
        );
        let full_bar = format!("[{}]", "#".repeat(BAR_WIDTH));
        assert!(progress_line(GenerationStatus::Completed).starts_with(&full_bar));
        assert!(
            progress_line(GenerationStatus::Failed {
                reason: FailureReason::Timeout,
                percent: 40
            })
            .contains("took too long")
        );
    }

    #[test]
    fn catalog_page_shows_cards_and_controls() {
        let mut row = summary(1, "Lisbon", "['Culture']");
        row.location_image.clear();
        let rows = vec![row];
        let state = CatalogViewState::default();

        let text = catalog(&filter_and_paginate(&rows, &state), &state);

        assert!(text.contains("[All] Adventure"));
        assert!(text.contains("3 Days"));
        assert!(text.contains("Created on 2/14/2025"));
        assert!(text.contains("(Culture)"));
        assert!(text.contains(PLACEHOLDER_IMAGE));
        assert!(text.contains("-> /itinerary/lisbon/3-days/1"));
        assert!(text.ends_with("  Page 1 of 1  "));
    }

    #[test]
    fn detail_page_lists_slots_and_images() {
        let record = detail_fixture(&[1]);
        let view = DetailView {
            metadata: PageMetadata::for_detail(&record),
            model: project(&record),
        };

        let text = detail(&view);

        assert!(text.contains("Day 1: Day 1 title"));
        assert!(text.contains("  Afternoon\n    \n"));
        assert!(text.contains("Morning of day 1"));
        assert!(text.contains("[Borough Market] https://img.test/borough.jpg"));
        assert!(not_found().starts_with("Itinerary Not Found"));
    }
}

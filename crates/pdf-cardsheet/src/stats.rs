use crate::config::SheetConfig;
use crate::layout::{expand_cards, plan_pages};
use crate::types::*;

/// Calculate statistics for an export without rendering it
pub fn calculate_statistics(cards: &[Card], config: &SheetConfig) -> Result<SheetStatistics> {
    config.validate()?;

    let (columns, rows) = config.grid_dimensions()?;
    let jobs = plan_pages(cards, config)?;

    let face_pages = jobs
        .iter()
        .filter(|job| job.page_type == PageType::Face)
        .count();
    let back_pages = jobs.len() - face_pages;

    // Card backs mirror their faces; booklet padding can land on either side
    let brochure = config.sides == SidesMode::Brochure;
    let blank_slots = jobs
        .iter()
        .filter(|job| brochure || job.page_type == PageType::Face)
        .map(|job| job.slots.len() - job.filled_slots())
        .sum();

    // A back page shares its sheet with the preceding face page
    let output_sheets = face_pages;

    Ok(SheetStatistics {
        expanded_cards: expand_cards(cards).len(),
        tiles_per_page: columns * rows,
        face_pages,
        back_pages,
        output_pages: jobs.len(),
        output_sheets,
        blank_slots,
    })
}

//! Sheet planning
//!
//! Expands the card list by repeat count and groups it into page jobs of
//! `rows * columns` slots, according to the sides mode.
//!
//! ## Brochure order
//!
//! Brochure mode treats the expanded list as booklet pages, padded to a
//! multiple of 4. Consecutive pages form pairs `P[0..m]`; the signature order
//! is `reverse(P[m-1]), P[0], reverse(P[m-2]), P[1], ...` so that the
//! outermost sheet carries the first and last pages.
//!
//! For 8 pages on a 2x1 grid:
//! - Sheet 1: face [8, 1], back [7, 2] (mirrored at render time to [2, 7])
//! - Sheet 2: face [6, 3], back [5, 4] (mirrored to [4, 5])

use crate::config::SheetConfig;
use crate::types::*;

use super::{PageJob, TileSource};

// =============================================================================
// Planning
// =============================================================================

/// Plan every page of the export, in output order.
///
/// An empty card list yields no jobs.
pub fn plan_pages(cards: &[Card], config: &SheetConfig) -> Result<Vec<PageJob>> {
    let (columns, rows) = config.grid_dimensions()?;
    let tiles = columns * rows;

    let expanded = expand_cards(cards);
    if expanded.is_empty() {
        return Ok(Vec::new());
    }

    let jobs = match config.sides {
        SidesMode::OneSide => plan_one_side(&expanded, tiles),
        SidesMode::DoubleSides | SidesMode::FoldInHalf => {
            plan_double_sides(&expanded, tiles, config.global_background.as_ref())
        }
        SidesMode::Brochure => plan_brochure(&expanded, tiles, config.brochure_repeat_per_page),
    };

    Ok(jobs)
}

/// Expand each card into `repeat` copies, preserving list order.
pub fn expand_cards(cards: &[Card]) -> Vec<&Card> {
    cards
        .iter()
        .flat_map(|card| std::iter::repeat_n(card, card.repeat as usize))
        .collect()
}

fn face_tile(card: &Card) -> TileSource {
    TileSource {
        card_id: Some(card.id.clone()),
        image: card.face.clone(),
        bleed: card.bleed,
    }
}

fn back_tile(card: &Card, global_background: Option<&ImageRef>) -> Option<TileSource> {
    card.back
        .as_ref()
        .or(global_background)
        .map(|image| TileSource {
            card_id: Some(card.id.clone()),
            image: image.clone(),
            bleed: card.bleed,
        })
}

/// Pad `slots` with blanks up to `tiles` entries
fn padded(mut slots: Vec<Option<TileSource>>, tiles: usize) -> Vec<Option<TileSource>> {
    slots.resize(tiles, None);
    slots
}

fn plan_one_side(expanded: &[&Card], tiles: usize) -> Vec<PageJob> {
    expanded
        .chunks(tiles)
        .map(|chunk| PageJob {
            slots: padded(chunk.iter().map(|c| Some(face_tile(c))).collect(), tiles),
            page_type: PageType::Face,
        })
        .collect()
}

fn plan_double_sides(
    expanded: &[&Card],
    tiles: usize,
    global_background: Option<&ImageRef>,
) -> Vec<PageJob> {
    let mut jobs = Vec::with_capacity(expanded.len().div_ceil(tiles) * 2);

    for chunk in expanded.chunks(tiles) {
        jobs.push(PageJob {
            slots: padded(chunk.iter().map(|c| Some(face_tile(c))).collect(), tiles),
            page_type: PageType::Face,
        });
        jobs.push(PageJob {
            slots: padded(
                chunk
                    .iter()
                    .map(|c| back_tile(c, global_background))
                    .collect(),
                tiles,
            ),
            page_type: PageType::Back,
        });
    }

    jobs
}

fn plan_brochure(expanded: &[&Card], tiles: usize, repeat_per_page: bool) -> Vec<PageJob> {
    let pages: Vec<Option<TileSource>> = expanded.iter().map(|c| Some(face_tile(c))).collect();
    let pairs = signature_pairs(&pages);

    let mut jobs = Vec::new();

    if repeat_per_page {
        for (first, second) in pairs {
            jobs.push(PageJob {
                slots: vec![first; tiles],
                page_type: PageType::Face,
            });
            jobs.push(PageJob {
                slots: vec![second; tiles],
                page_type: PageType::Back,
            });
        }
        return jobs;
    }

    for chunk in pairs.chunks(tiles) {
        jobs.push(PageJob {
            slots: padded(chunk.iter().map(|(first, _)| first.clone()).collect(), tiles),
            page_type: PageType::Face,
        });
        jobs.push(PageJob {
            slots: padded(
                chunk.iter().map(|(_, second)| second.clone()).collect(),
                tiles,
            ),
            page_type: PageType::Back,
        });
    }

    jobs
}

// =============================================================================
// Signature Order
// =============================================================================

/// Arrange booklet pages into saddle-stitch signature order.
///
/// Pads `pages` with blanks to a multiple of 4 (minimum 4), then returns the
/// `(face, back)` pairs in sheet order.
pub fn signature_pairs<T: Clone>(pages: &[Option<T>]) -> Vec<(Option<T>, Option<T>)> {
    let padded_len = pages.len().div_ceil(4).max(1) * 4;
    let mut padded_pages = pages.to_vec();
    padded_pages.resize(padded_len, None);

    let pairs: Vec<(Option<T>, Option<T>)> = padded_pages
        .chunks(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect();

    let m = pairs.len();
    let mut ordered = Vec::with_capacity(m);
    for i in 0..m / 2 {
        let (outer_first, outer_second) = pairs[m - 1 - i].clone();
        ordered.push((outer_second, outer_first));
        ordered.push(pairs[i].clone());
    }

    ordered
}

// =============================================================================
// Tests
// =============================================================================

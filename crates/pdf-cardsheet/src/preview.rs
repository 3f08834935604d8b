use std::sync::Arc;

use crate::config::{SheetConfig, validate_cards};
use crate::export::{CancelToken, NoProgress, encode_pdf, render_document};
use crate::fill::{ColorCache, analyze_backgrounds};
use crate::layout::plan_pages;
use crate::render::PreviewQuality;
use crate::store::ImageStore;
use crate::types::*;

/// Render a single page of the export as a one-page PDF.
///
/// The page goes through the same planning and rendering as a full export;
/// only the page at `page_index` (0-based) is drawn. `Low` quality embeds
/// downsampled images.
pub async fn render_preview(
    config: &SheetConfig,
    cards: &[Card],
    store: Arc<dyn ImageStore>,
    colors: &mut ColorCache,
    page_index: usize,
    quality: PreviewQuality,
) -> Result<Vec<u8>> {
    config.validate()?;
    validate_cards(cards)?;

    let mut jobs = plan_pages(cards, config)?;
    if page_index >= jobs.len() {
        return Err(SheetError::NoPage(page_index));
    }
    let job = jobs.swap_remove(page_index);

    if config.margin_filling {
        analyze_backgrounds(std::slice::from_ref(&job), Arc::clone(&store), colors).await;
    }

    let config = config.clone();
    let colors = colors.clone();
    let document = tokio::task::spawn_blocking(move || {
        render_document(
            &config,
            std::slice::from_ref(&job),
            page_index + 1,
            store.as_ref(),
            &colors,
            quality,
            &NoProgress,
            &CancelToken::new(),
        )
    })
    .await??;

    encode_pdf(document).await
}

/// Number of pages an export of `cards` would produce
pub fn page_count(config: &SheetConfig, cards: &[Card]) -> Result<usize> {
    Ok(plan_pages(cards, config)?.len())
}

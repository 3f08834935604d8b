//! Card sheet export
//!
//! This module orchestrates an export:
//! 1. Validate the configuration and card list
//! 2. Plan page jobs
//! 3. Sample border colors for margin filling (concurrent, awaited up front)
//! 4. Render every page job in order, reporting progress
//! 5. Finalize the pages tree and catalog

mod io;
mod progress;

pub use io::{encode_pdf, save_pdf};
pub(crate) use io::write_atomically;
pub use progress::*;

use std::path::Path;
use std::sync::Arc;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::config::{SheetConfig, validate_cards};
use crate::fill::{ColorCache, analyze_backgrounds};
use crate::layout::{PageJob, plan_pages};
use crate::render::{PreviewQuality, SheetRenderer};
use crate::store::ImageStore;
use crate::types::*;

/// Result of a completed export
#[derive(Debug)]
pub enum ExportOutcome {
    /// The card list produced no pages
    Empty,
    Rendered { document: Document, pages: usize },
}

impl ExportOutcome {
    pub fn page_count(&self) -> usize {
        match self {
            ExportOutcome::Empty => 0,
            ExportOutcome::Rendered { pages, .. } => *pages,
        }
    }

    pub fn into_document(self) -> Option<Document> {
        match self {
            ExportOutcome::Empty => None,
            ExportOutcome::Rendered { document, .. } => Some(document),
        }
    }
}

/// Export a card list to a PDF document.
///
/// `colors` is reused across runs; entries for images whose bytes changed
/// are re-sampled. The sink receives progress events followed by exactly one
/// terminal event.
pub async fn export(
    config: &SheetConfig,
    cards: &[Card],
    store: Arc<dyn ImageStore>,
    colors: &mut ColorCache,
    progress: Arc<dyn ProgressSink>,
    cancel: &CancelToken,
) -> Result<ExportOutcome> {
    let result = run_export(config, cards, store, colors, Arc::clone(&progress), cancel).await;
    report_outcome(
        progress.as_ref(),
        result.as_ref().map(ExportOutcome::page_count),
    );
    result
}

/// Export a card list and save it to `path`.
///
/// Returns the number of pages written. Nothing is written for an empty
/// card list or a cancelled export. The terminal event is sent once the
/// save has completed.
pub async fn export_to_file(
    config: &SheetConfig,
    cards: &[Card],
    store: Arc<dyn ImageStore>,
    colors: &mut ColorCache,
    progress: Arc<dyn ProgressSink>,
    cancel: &CancelToken,
    path: impl AsRef<Path>,
) -> Result<usize> {
    let result = export_and_save(
        config,
        cards,
        store,
        colors,
        Arc::clone(&progress),
        cancel,
        path.as_ref(),
    )
    .await;

    report_outcome(progress.as_ref(), result.as_ref().copied());
    result
}

/// Send the single terminal event for a finished export
fn report_outcome(progress: &dyn ProgressSink, result: std::result::Result<usize, &SheetError>) {
    match result {
        Ok(pages) => progress.finished(pages),
        Err(SheetError::Cancelled) => {
            log::info!("Export cancelled");
            progress.cancelled();
        }
        Err(e) => {
            log::error!("Export failed: {}", e);
            progress.failed(&e.to_string());
        }
    }
}

async fn export_and_save(
    config: &SheetConfig,
    cards: &[Card],
    store: Arc<dyn ImageStore>,
    colors: &mut ColorCache,
    progress: Arc<dyn ProgressSink>,
    cancel: &CancelToken,
    path: &Path,
) -> Result<usize> {
    match run_export(config, cards, store, colors, progress, cancel).await? {
        ExportOutcome::Empty => Ok(0),
        ExportOutcome::Rendered { document, pages } => {
            if cancel.is_cancelled() {
                return Err(SheetError::Cancelled);
            }
            save_pdf(document, path).await?;
            Ok(pages)
        }
    }
}

async fn run_export(
    config: &SheetConfig,
    cards: &[Card],
    store: Arc<dyn ImageStore>,
    colors: &mut ColorCache,
    progress: Arc<dyn ProgressSink>,
    cancel: &CancelToken,
) -> Result<ExportOutcome> {
    config.validate()?;
    validate_cards(cards)?;

    let jobs = plan_pages(cards, config)?;
    if jobs.is_empty() {
        log::info!("No cards to export");
        progress.progress(100);
        return Ok(ExportOutcome::Empty);
    }
    log::info!("Exporting {} cards as {} pages", cards.len(), jobs.len());

    if config.margin_filling {
        let sampled = analyze_backgrounds(&jobs, Arc::clone(&store), colors).await;
        log::debug!("Sampled {} border colors", sampled);
    }

    if cancel.is_cancelled() {
        return Err(SheetError::Cancelled);
    }

    let config = config.clone();
    let colors = colors.clone();
    let cancel = cancel.clone();
    let pages = jobs.len();

    let document = tokio::task::spawn_blocking(move || {
        render_document(
            &config,
            &jobs,
            1,
            store.as_ref(),
            &colors,
            PreviewQuality::High,
            progress.as_ref(),
            &cancel,
        )
    })
    .await??;

    Ok(ExportOutcome::Rendered { document, pages })
}

/// Render page jobs into a new document, strictly in order.
///
/// Page numbers start at `first_page_number`. The cancel token is checked
/// before each job; progress is reported after each.
#[allow(clippy::too_many_arguments)]
pub fn render_document(
    config: &SheetConfig,
    jobs: &[PageJob],
    first_page_number: usize,
    store: &dyn ImageStore,
    colors: &ColorCache,
    quality: PreviewQuality,
    progress: &dyn ProgressSink,
    cancel: &CancelToken,
) -> Result<Document> {
    let mut output = Document::with_version("1.7");
    let pages_tree_id = output.new_object_id();
    let mut renderer = SheetRenderer::new(config, store, colors, quality)?;

    let total = jobs.len();
    let mut page_refs = Vec::with_capacity(total);
    progress.progress(0);

    for (index, job) in jobs.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(SheetError::Cancelled);
        }

        let page_id =
            renderer.render_page(&mut output, pages_tree_id, job, first_page_number + index)?;
        page_refs.push(Object::Reference(page_id));

        progress.progress(percent_complete(index + 1, total));
    }

    finalize_document(&mut output, pages_tree_id, page_refs);
    Ok(output)
}

/// Create pages tree and catalog, finalize document structure
fn finalize_document(output: &mut Document, pages_tree_id: ObjectId, page_refs: Vec<Object>) {
    let count = page_refs.len() as i64;
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(page_refs)),
        ("Count", Object::Integer(count)),
    ]);
    output
        .objects
        .insert(pages_tree_id, Object::Dictionary(pages_dict));

    let catalog_id = output.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_tree_id)),
    ]));

    output.trailer.set("Root", catalog_id);
}

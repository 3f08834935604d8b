pub mod cards;
pub mod config;
pub mod constants;
pub mod export;
pub mod fill;
pub mod layout;
pub mod marks;
#[cfg(feature = "serde")]
pub mod presets;
mod preview;
pub mod render;
mod stats;
pub mod store;
mod types;

pub use cards::{load_cards_csv, parse_cards_csv};
pub use config::{SheetConfig, validate_cards};
pub use export::{
    CancelToken, ExportEvent, ExportOutcome, NoProgress, ProgressFn, ProgressSink, export,
    export_to_file, render_document, save_pdf,
};
pub use fill::{ColorCache, analyze_backgrounds, sample_border_color};
pub use layout::{plan_pages, signature_pairs};
pub use marks::generate_cut_marks;
#[cfg(feature = "serde")]
pub use presets::PresetStore;
pub use preview::{page_count, render_preview};
pub use render::PreviewQuality;
pub use stats::calculate_statistics;
pub use store::{DirImageStore, ImageStore, MemoryImageStore};
pub use types::*;

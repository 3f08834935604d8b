//! PDF rendering for card sheets
//!
//! - Embedding card images as image XObjects
//! - Building one output page per page job

mod image;
mod page;

pub use image::{ImageEmbedder, PreviewQuality, embed_image};
pub use page::SheetRenderer;

//! Layout calculation modules for card sheets
//!
//! This module handles all the geometric calculations for a card sheet:
//! - Sheet planning (which card goes on which page and slot)
//! - Duplex alignment of back pages
//! - Tile geometry (bleed, margins, scale, offsets)

mod flip;
mod geometry;
mod planner;
mod types;

pub use flip::*;
pub use geometry::*;
pub use planner::*;
pub use types::*;

//! Layout data types for card sheets
//!
//! These types represent the intermediate results between card planning
//! and PDF rendering.

use crate::types::{BleedOverride, ImageRef, PageType};

/// Position within the grid (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPosition {
    /// Row index (0 = top row)
    pub row: usize,
    /// Column index (0 = leftmost column)
    pub col: usize,
}

impl GridPosition {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Position of the slot at `index` in a grid with `columns` columns
    pub fn from_index(index: usize, columns: usize) -> Self {
        Self {
            row: index / columns,
            col: index % columns,
        }
    }
}

/// What gets drawn into one grid slot
#[derive(Debug, Clone, PartialEq)]
pub struct TileSource {
    /// Id of the card this tile came from (`None` for padding blanks)
    pub card_id: Option<String>,
    pub image: ImageRef,
    pub bleed: Option<BleedOverride>,
}

/// One output page's worth of tile assignments
#[derive(Debug, Clone, PartialEq)]
pub struct PageJob {
    /// Slots in grid order (`row * columns + col`), `None` = blank tile
    pub slots: Vec<Option<TileSource>>,
    pub page_type: PageType,
}

impl PageJob {
    pub fn image_keys(&self) -> impl Iterator<Item = &str> {
        self.slots
            .iter()
            .flatten()
            .map(|tile| tile.image.key.as_str())
    }

    pub fn filled_slots(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

/// A rectangular area in millimeters, top-left origin (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X position (left edge)
    pub x: f32,
    /// Y position (top edge)
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge y coordinate
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Grow (or shrink, for negative values) on every side
    pub fn expand(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(
            self.x - dx,
            self.y - dy,
            self.width + 2.0 * dx,
            self.height + 2.0 * dy,
        )
    }
}

/// Final placement of one tile on a page
#[derive(Debug, Clone, PartialEq)]
pub struct TilePlacement {
    /// Grid position the tile is drawn at (after duplex remapping)
    pub grid_pos: GridPosition,
    /// Tile box: card plus bleed
    pub tile: Rect,
    /// Bleed on each side of the trim box
    pub bleed_x: f32,
    pub bleed_y: f32,
    /// Margin between neighbouring trim boxes, used for margin filling
    pub margin_x: f32,
    pub margin_y: f32,
    /// Whether the image is drawn rotated by 180°
    pub rotated: bool,
}

impl TilePlacement {
    /// Trim box (tile box minus bleed)
    pub fn trim(&self) -> Rect {
        self.tile.expand(-self.bleed_x, -self.bleed_y)
    }

    /// Trim box grown by half the margin on each side
    pub fn fill_area(&self) -> Rect {
        self.trim()
            .expand(self.margin_x / 2.0, self.margin_y / 2.0)
    }
}

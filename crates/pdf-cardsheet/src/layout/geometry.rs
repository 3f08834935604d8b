//! Tile geometry
//!
//! Converts a grid position into a tile rectangle in page space
//! (millimeters, top-left origin). The grid is laid out around the sheet
//! center and shifted by half the sheet size afterwards:
//!
//! ```text
//! imageX = (cx - columns/2) * imageW + (cx - (columns-1)/2) * (marginX - 2*bleedX)
//! ```
//!
//! Adjacent tile boxes are `margin - 2*bleed` apart, so adjacent trim boxes
//! are exactly `margin` apart.

use crate::config::SheetConfig;
use crate::types::{BleedOverride, PageType, Result};

use super::{FlipTransform, GridPosition, Rect, TilePlacement};

/// Scaled layout parameters for one page type
#[derive(Debug, Clone, PartialEq)]
pub struct SheetGeometry {
    pub columns: usize,
    pub rows: usize,
    pub sheet_width: f32,
    pub sheet_height: f32,
    pub card_width: f32,
    pub card_height: f32,
    pub margin_x: f32,
    pub margin_y: f32,
    pub bleed_x: f32,
    pub bleed_y: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    /// Scale factor, also applied to per-card bleed overrides
    pub scale: f32,
}

impl SheetGeometry {
    pub fn new(config: &SheetConfig, page_type: PageType) -> Result<Self> {
        let (columns, rows) = config.grid_dimensions()?;
        let (sheet_width, sheet_height) = config.sheet_dimensions_mm();
        let s = config.scale();

        let mut geometry = Self {
            columns,
            rows,
            sheet_width,
            sheet_height,
            card_width: config.card_width_mm * s,
            card_height: config.card_height_mm * s,
            margin_x: config.margin_x_mm * s,
            margin_y: config.margin_y_mm * s,
            bleed_x: config.bleed_x_mm * s,
            bleed_y: config.bleed_y_mm * s,
            offset_x: config.offset_x_mm * s,
            offset_y: config.offset_y_mm * s,
            scale: s,
        };

        // Fold the margin into the bleed box so shifted backs leave no seams
        if config.avoid_dislocation && page_type == PageType::Back {
            geometry.card_width += geometry.margin_x;
            geometry.bleed_x = geometry.margin_x / 2.0;
            geometry.margin_x = 0.0;

            geometry.card_height += geometry.margin_y;
            geometry.bleed_y = geometry.margin_y / 2.0;
            geometry.margin_y = 0.0;
        }

        Ok(geometry)
    }

    /// Tile box width (card plus bleed on both sides)
    pub fn image_width(&self) -> f32 {
        self.card_width + 2.0 * self.bleed_x
    }

    /// Tile box height (card plus bleed on both sides)
    pub fn image_height(&self) -> f32 {
        self.card_height + 2.0 * self.bleed_y
    }

    /// Tile box at a grid position, before offsets
    pub fn tile_rect(&self, pos: GridPosition) -> Rect {
        let image_x = grid_origin(
            pos.col,
            self.columns,
            f64::from(self.image_width()),
            f64::from(self.margin_x) - 2.0 * f64::from(self.bleed_x),
            f64::from(self.sheet_width),
        );
        let image_y = grid_origin(
            pos.row,
            self.rows,
            f64::from(self.image_height()),
            f64::from(self.margin_y) - 2.0 * f64::from(self.bleed_y),
            f64::from(self.sheet_height),
        );

        Rect::new(
            image_x as f32,
            image_y as f32,
            self.image_width(),
            self.image_height(),
        )
    }

    /// Place the tile for slot `index` of a page.
    ///
    /// The flip transform decides the drawn grid position, the rotation and
    /// the sign of the offsets.
    pub fn place(&self, index: usize, transform: FlipTransform) -> TilePlacement {
        let logical = GridPosition::from_index(index, self.columns);
        let grid_pos = transform.remap(logical, self.columns, self.rows);

        let (sign_x, sign_y) = transform.offset_signs();
        let mut tile = self.tile_rect(grid_pos);
        tile.x += self.offset_x * sign_x;
        tile.y += self.offset_y * sign_y;

        TilePlacement {
            grid_pos,
            tile,
            bleed_x: self.bleed_x,
            bleed_y: self.bleed_y,
            margin_x: self.margin_x,
            margin_y: self.margin_y,
            rotated: transform.rotates(),
        }
    }

    /// Rectangle the artwork is drawn into.
    ///
    /// Without an override this is the tile box. With one, the artwork's own
    /// bleed is laid around the trim box; the renderer clips it to the tile.
    pub fn artwork_rect(&self, placement: &TilePlacement, bleed: Option<BleedOverride>) -> Rect {
        match bleed {
            Some(b) => placement
                .trim()
                .expand(b.x_mm * self.scale, b.y_mm * self.scale),
            None => placement.tile,
        }
    }

    /// Whether a grid position lies on the sheet boundary, as
    /// `(left, right, top, bottom)`
    pub fn outer_edges(&self, pos: GridPosition) -> (bool, bool, bool, bool) {
        (
            pos.col == 0,
            pos.col == self.columns - 1,
            pos.row == 0,
            pos.row == self.rows - 1,
        )
    }
}

/// Leading edge of tile `index` along one axis of a centered grid
fn grid_origin(index: usize, count: usize, image: f64, gap: f64, sheet: f64) -> f64 {
    let i = index as f64;
    let n = count as f64;
    (i - n / 2.0) * image + (i - (n - 1.0) / 2.0) * gap + sheet / 2.0
}

// =============================================================================
// Tests
// =============================================================================

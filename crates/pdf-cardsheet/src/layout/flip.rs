//! Duplex alignment for back pages
//!
//! When a sheet is turned over for its second pass, the back tiles must land
//! behind their face tiles. Which axis gets mirrored depends on the binding
//! edge and the sheet orientation:
//!
//! | flip        | portrait         | landscape        |
//! |-------------|------------------|------------------|
//! | long edge   | mirror columns   | rotate 180°, mirror rows |
//! | short edge  | rotate 180°, mirror rows | mirror columns |
//! | none        | unchanged        | unchanged        |

use crate::types::{FlipWay, PageType};

use super::GridPosition;

/// Remapping applied to one page's tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipTransform {
    /// Tiles stay where they are
    Identity,
    /// `col' = columns - 1 - col`, offset X sign flipped
    MirrorColumns,
    /// `row' = rows - 1 - row`, tiles rotated 180°, offset Y sign flipped
    MirrorRowsRotated,
}

impl FlipTransform {
    /// Resolve the transform for a page.
    ///
    /// Face pages are never remapped.
    pub fn resolve(page_type: PageType, flip: FlipWay, landscape: bool) -> Self {
        if page_type == PageType::Face {
            return FlipTransform::Identity;
        }

        match (flip, landscape) {
            (FlipWay::LongEdgeBinding, true) | (FlipWay::ShortEdgeBinding, false) => {
                FlipTransform::MirrorRowsRotated
            }
            (FlipWay::LongEdgeBinding, false) | (FlipWay::ShortEdgeBinding, true) => {
                FlipTransform::MirrorColumns
            }
            (FlipWay::None, _) => FlipTransform::Identity,
        }
    }

    /// Grid position a tile at `pos` is drawn at
    pub fn remap(self, pos: GridPosition, columns: usize, rows: usize) -> GridPosition {
        match self {
            FlipTransform::Identity => pos,
            FlipTransform::MirrorColumns => GridPosition::new(pos.row, columns - 1 - pos.col),
            FlipTransform::MirrorRowsRotated => GridPosition::new(rows - 1 - pos.row, pos.col),
        }
    }

    pub fn rotates(self) -> bool {
        self == FlipTransform::MirrorRowsRotated
    }

    /// Sign multipliers `(x, y)` applied to the configured offsets
    pub fn offset_signs(self) -> (f32, f32) {
        match self {
            FlipTransform::Identity => (1.0, 1.0),
            FlipTransform::MirrorColumns => (-1.0, 1.0),
            FlipTransform::MirrorRowsRotated => (1.0, -1.0),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const FLIPS: [FlipWay; 3] = [
        FlipWay::None,
        FlipWay::LongEdgeBinding,
        FlipWay::ShortEdgeBinding,
    ];

    #[test]
    fn test_truth_table() {
        use FlipTransform::*;

        let cases = [
            (FlipWay::LongEdgeBinding, false, MirrorColumns),
            (FlipWay::LongEdgeBinding, true, MirrorRowsRotated),
            (FlipWay::ShortEdgeBinding, false, MirrorRowsRotated),
            (FlipWay::ShortEdgeBinding, true, MirrorColumns),
            (FlipWay::None, false, Identity),
            (FlipWay::None, true, Identity),
        ];

        for (flip, landscape, expected) in cases {
            assert_eq!(
                FlipTransform::resolve(PageType::Back, flip, landscape),
                expected,
                "{:?} landscape={}",
                flip,
                landscape
            );
        }
    }

    #[test]
    fn test_face_pages_untouched() {
        for flip in FLIPS {
            for landscape in [false, true] {
                assert_eq!(
                    FlipTransform::resolve(PageType::Face, flip, landscape),
                    FlipTransform::Identity
                );
            }
        }
    }

    #[test]
    fn test_remap_is_involution() {
        let (columns, rows) = (3, 4);
        for flip in FLIPS {
            for landscape in [false, true] {
                let transform = FlipTransform::resolve(PageType::Back, flip, landscape);
                for row in 0..rows {
                    for col in 0..columns {
                        let pos = GridPosition::new(row, col);
                        let twice = transform.remap(
                            transform.remap(pos, columns, rows),
                            columns,
                            rows,
                        );
                        assert_eq!(twice, pos);
                    }
                }
            }
        }
    }

    #[test]
    fn test_mirror_rows_rotates_and_flips_y_offset() {
        let transform =
            FlipTransform::resolve(PageType::Back, FlipWay::LongEdgeBinding, true);
        assert!(transform.rotates());
        assert_eq!(transform.offset_signs(), (1.0, -1.0));
        assert_eq!(
            transform.remap(GridPosition::new(0, 1), 2, 3),
            GridPosition::new(2, 1)
        );
    }

    #[test]
    fn test_mirror_columns_flips_x_offset() {
        let transform =
            FlipTransform::resolve(PageType::Back, FlipWay::LongEdgeBinding, false);
        assert!(!transform.rotates());
        assert_eq!(transform.offset_signs(), (-1.0, 1.0));
        assert_eq!(
            transform.remap(GridPosition::new(0, 0), 3, 1),
            GridPosition::new(0, 2)
        );
    }
}

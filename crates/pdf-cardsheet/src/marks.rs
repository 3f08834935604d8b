//! Cut marks for card sheets
//!
//! Two kinds of marks are generated per tile:
//! - **Cross** marks: a small plus centered on each trim corner.
//! - **Normal** marks: on tiles touching the sheet boundary, lines running
//!   from the sheet edge to the tile along the trim lines facing that edge.
//!
//! Neighbouring tiles produce coincident marks at shared boundaries.
//! Coordinates are snapped to fixed point (1/100 mm) and de-duplicated
//! before drawing, since overlapping strokes print as double-width lines.
//! Each tile computes its corners from its own origin, so the same corner
//! can round to adjacent keys; a new point within one key step of a known
//! point reuses that point.

use std::collections::HashSet;

use crate::constants::{CROSS_MARK_ARM_MM, MARK_KEY_SCALE, mm_to_pt};
use crate::layout::{SheetGeometry, TilePlacement};
use crate::types::{CutLineMode, Rgb};

/// A point snapped to 1/100 mm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkPoint {
    pub x: i64,
    pub y: i64,
}

impl MarkPoint {
    pub fn new(x_mm: f32, y_mm: f32) -> Self {
        let scale = f64::from(MARK_KEY_SCALE);
        Self {
            x: (f64::from(x_mm) * scale).round() as i64,
            y: (f64::from(y_mm) * scale).round() as i64,
        }
    }

    /// Points one key step away or less, this point first
    fn neighborhood(self) -> impl Iterator<Item = MarkPoint> {
        [0, -1, 1].into_iter().flat_map(move |dx| {
            [0, -1, 1].into_iter().map(move |dy| MarkPoint {
                x: self.x + dx,
                y: self.y + dy,
            })
        })
    }

    pub fn x_mm(self) -> f32 {
        self.x as f32 / MARK_KEY_SCALE
    }

    pub fn y_mm(self) -> f32 {
        self.y as f32 / MARK_KEY_SCALE
    }
}

/// A line segment between two snapped points, endpoints in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkSegment {
    pub from: MarkPoint,
    pub to: MarkPoint,
}

impl MarkSegment {
    pub fn new(a: MarkPoint, b: MarkPoint) -> Self {
        if a <= b {
            Self { from: a, to: b }
        } else {
            Self { from: b, to: a }
        }
    }

    fn is_degenerate(&self) -> bool {
        self.from == self.to
    }
}

/// Stroke style for cut marks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkStyle {
    pub line_weight_pt: f32,
    pub color: Rgb,
}

/// De-duplicated cut marks for one page, in first-seen order
#[derive(Debug, Clone, Default)]
pub struct CutMarks {
    points: HashSet<MarkPoint>,
    seen_crosses: HashSet<MarkPoint>,
    seen_lines: HashSet<MarkSegment>,
    crosses: Vec<MarkPoint>,
    lines: Vec<MarkSegment>,
}

impl CutMarks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cross centers
    pub fn crosses(&self) -> &[MarkPoint] {
        &self.crosses
    }

    /// Edge lines
    pub fn lines(&self) -> &[MarkSegment] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.crosses.is_empty() && self.lines.is_empty()
    }

    /// Snap a coordinate to a known point when one is within a key step
    fn snap(&mut self, x: f32, y: f32) -> MarkPoint {
        let point = MarkPoint::new(x, y);
        if let Some(known) = point
            .neighborhood()
            .find(|candidate| self.points.contains(candidate))
        {
            return known;
        }
        self.points.insert(point);
        point
    }

    fn add_cross(&mut self, x: f32, y: f32) {
        let point = self.snap(x, y);
        if self.seen_crosses.insert(point) {
            self.crosses.push(point);
        }
    }

    fn add_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let from = self.snap(x1, y1);
        let to = self.snap(x2, y2);
        let segment = MarkSegment::new(from, to);
        if segment.is_degenerate() {
            return;
        }
        if self.seen_lines.insert(segment) {
            self.lines.push(segment);
        }
    }

    /// Add the marks of one tile.
    ///
    /// Marks follow the unrotated tile box: rotation only affects the artwork.
    pub fn add_tile(
        &mut self,
        placement: &TilePlacement,
        geometry: &SheetGeometry,
        mode: CutLineMode,
    ) {
        let trim = placement.trim();
        let tile = placement.tile;

        if mode.draws_cross() {
            self.add_cross(trim.x, trim.y);
            self.add_cross(trim.right(), trim.y);
            self.add_cross(trim.x, trim.bottom());
            self.add_cross(trim.right(), trim.bottom());
        }

        if mode.draws_normal() {
            let (left, right, top, bottom) = geometry.outer_edges(placement.grid_pos);

            if left {
                self.add_line(0.0, trim.y, tile.x, trim.y);
                self.add_line(0.0, trim.bottom(), tile.x, trim.bottom());
            }
            if right {
                let edge = geometry.sheet_width;
                self.add_line(tile.right(), trim.y, edge, trim.y);
                self.add_line(tile.right(), trim.bottom(), edge, trim.bottom());
            }
            if top {
                self.add_line(trim.x, 0.0, trim.x, tile.y);
                self.add_line(trim.right(), 0.0, trim.right(), tile.y);
            }
            if bottom {
                let edge = geometry.sheet_height;
                self.add_line(trim.x, tile.bottom(), trim.x, edge);
                self.add_line(trim.right(), tile.bottom(), trim.right(), edge);
            }
        }
    }

    /// PDF content stream operations for these marks.
    ///
    /// Page space is top-left origin in millimeters; PDF space is bottom-left
    /// origin in points.
    pub fn to_pdf_ops(&self, style: &MarkStyle, sheet_height_mm: f32) -> String {
        if self.is_empty() {
            return String::new();
        }

        let px = |x: f32| mm_to_pt(x);
        let py = |y: f32| mm_to_pt(sheet_height_mm - y);

        let mut ops = String::new();
        ops.push_str("q\n");
        ops.push_str(&format!("{} RG\n", style.color.to_pdf_operands()));
        ops.push_str(&format!("{} w\n", style.line_weight_pt));
        ops.push_str("[] 0 d\n");

        for segment in &self.lines {
            ops.push_str(&format!(
                "{} {} m {} {} l S\n",
                px(segment.from.x_mm()),
                py(segment.from.y_mm()),
                px(segment.to.x_mm()),
                py(segment.to.y_mm())
            ));
        }

        for center in &self.crosses {
            let (x, y) = (center.x_mm(), center.y_mm());
            ops.push_str(&format!(
                "{} {} m {} {} l S\n",
                px(x - CROSS_MARK_ARM_MM),
                py(y),
                px(x + CROSS_MARK_ARM_MM),
                py(y)
            ));
            ops.push_str(&format!(
                "{} {} m {} {} l S\n",
                px(x),
                py(y - CROSS_MARK_ARM_MM),
                px(x),
                py(y + CROSS_MARK_ARM_MM)
            ));
        }

        ops.push_str("Q\n");
        ops
    }
}

/// Generate the de-duplicated cut marks for all placements of a page
pub fn generate_cut_marks(
    placements: &[TilePlacement],
    geometry: &SheetGeometry,
    mode: CutLineMode,
) -> CutMarks {
    let mut marks = CutMarks::new();
    if mode == CutLineMode::None {
        return marks;
    }
    for placement in placements {
        marks.add_tile(placement, geometry, mode);
    }
    marks
}

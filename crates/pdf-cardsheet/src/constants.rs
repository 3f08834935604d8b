//! Shared constants for card sheet layout and rendering
//!
//! This module centralizes magic numbers and constants used throughout
//! the export process.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4; // ≈ 2.83465

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

// =============================================================================
// Cut Marks
// =============================================================================

/// Half length of each arm of a cross mark (millimeters)
pub const CROSS_MARK_ARM_MM: f32 = 2.0;

/// Fixed-point scale for mark de-duplication (2 decimal places)
pub const MARK_KEY_SCALE: f32 = 100.0;

// =============================================================================
// Background Fill
// =============================================================================

/// Width of each sampled border strip (pixels)
pub const BORDER_SAMPLE_PX: u32 = 10;

// =============================================================================
// Preview
// =============================================================================

/// Longest edge of an embedded image in low quality previews (pixels)
pub const LOW_QUALITY_MAX_PX: u32 = 256;

// =============================================================================
// Page Numbers
// =============================================================================

/// Font size for page numbers (points)
pub const PAGE_NUMBER_FONT_SIZE: f32 = 8.0;

/// Baseline distance from the bottom sheet edge (points)
pub const PAGE_NUMBER_OFFSET: f32 = 10.0;

/// Approximate character width ratio for Helvetica
pub const HELVETICA_CHAR_WIDTH_RATIO: f32 = 0.5;

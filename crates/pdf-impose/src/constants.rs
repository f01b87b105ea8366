//! Shared constants for PDF imposition
//!
//! This module centralizes magic numbers and constants used throughout
//! the imposition process.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per inch
pub const POINTS_PER_INCH: f64 = 72.0;

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f64 = POINTS_PER_INCH / 25.4; // ≈ 2.83465

/// Points per pica
pub const POINTS_PER_PICA: f64 = 12.0;

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f64) -> f64 {
    mm * POINTS_PER_MM
}

/// Convert points to millimeters
#[inline]
pub fn pt_to_mm(pt: f64) -> f64 {
    pt / POINTS_PER_MM
}

// =============================================================================
// Geometry
// =============================================================================

/// Default page dimensions when a source page has no usable MediaBox (US Letter)
pub const DEFAULT_PAGE_DIMENSIONS: (f64, f64) = (612.0, 792.0);

/// Row and column sums of a matrix may differ by this much (points)
/// before the layout is considered inconsistent
pub const SIZE_TOLERANCE: f64 = 1e-6;

/// Decimal digits kept when dividing sizes, before flooring to a page count
pub const RATIO_DIGITS: i32 = 6;

/// Source pages whose sizes differ by more than this (points) trigger a warning
pub const PAGE_SIZE_WARNING_TOLERANCE: f64 = 0.5;

// =============================================================================
// Printer's Marks
// =============================================================================

/// Crop marks stop this far (at most) before the page block
pub const CROP_SPACE_MAX: f64 = 20.0;

/// Line width for crop marks (points)
pub const CROP_MARK_WIDTH: f64 = 0.25;

/// Maximum height of one bind mark (points)
pub const BIND_MARK_MAX_HEIGHT: f64 = 28.0;

/// Half width of a bind mark, on each side of the spine (points)
pub const BIND_MARK_HALF_WIDTH: f64 = 1.0;

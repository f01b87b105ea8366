//! Printer's marks geometry for imposed pages
//!
//! Marks are computed in layout coordinates (top-left origin) from the
//! imposition matrix itself, so they follow margins and creep exactly.
//! - Crop marks: short lines in the output margins, in line with page edges
//! - Bind marks: small rectangles on the spine, one step lower per signature

use crate::constants::{BIND_MARK_HALF_WIDTH, BIND_MARK_MAX_HEIGHT, CROP_SPACE_MAX};
use crate::layout::{Line, Matrix, Point, Rect, Size};

/// Everything a scheme needs to know to draw marks on one output page
#[derive(Debug, Clone, Copy)]
pub struct MarkContext<'a> {
    /// Index of the output page (0 for the first recto)
    pub number: usize,
    /// Number of source pages, blank padding included
    pub total: usize,
    pub matrix: &'a Matrix,
    /// Size of the output page
    pub sheet: Size,
    /// Size of one source page
    pub source: Size,
}

/// Gap left between a crop mark and the page block
pub fn crop_space(margin: f64) -> f64 {
    CROP_SPACE_MAX.min(margin / 2.0)
}

/// Left and right edges of each group of `span` columns on row `y`
fn column_edges(matrix: &Matrix, y: usize, span: usize, source: Size) -> Vec<f64> {
    let mut edges = Vec::new();
    let width = matrix.width();
    for start in (0..width).step_by(span.max(1)) {
        let end = (start + span).min(width) - 1;
        edges.push(matrix.topleft((start, y), source).x);
        edges.push(matrix.topleft((end, y), source).x + matrix[(end, y)].footprint(source).width);
    }
    dedup_close(edges)
}

/// Top and bottom edges of each group of `span` rows on column `x`
fn row_edges(matrix: &Matrix, x: usize, span: usize, source: Size) -> Vec<f64> {
    let mut edges = Vec::new();
    let height = matrix.height();
    for start in (0..height).step_by(span.max(1)) {
        let end = (start + span).min(height) - 1;
        edges.push(matrix.topleft((x, start), source).y);
        edges.push(matrix.topleft((x, end), source).y + matrix[(x, end)].footprint(source).height);
    }
    dedup_close(edges)
}

fn dedup_close(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
    values
}

/// Crop marks around every block of `span` (columns, rows) pages.
///
/// Lines start at the sheet edge and stop [`crop_space`] before the page
/// block; sides without output margin get no line.
pub fn grid_crop_marks(matrix: &Matrix, sheet: Size, source: Size, span: (usize, usize)) -> Vec<Line> {
    let omargin = matrix.omargin;
    let mut lines = Vec::new();

    let top_end = omargin.top - crop_space(omargin.top);
    if top_end > 0.0 {
        for x in column_edges(matrix, 0, span.0, source) {
            lines.push(Line::new(Point::new(x, 0.0), Point::new(x, top_end)));
        }
    }
    let bottom_length = omargin.bottom - crop_space(omargin.bottom);
    if bottom_length > 0.0 {
        for x in column_edges(matrix, matrix.height() - 1, span.0, source) {
            lines.push(Line::new(
                Point::new(x, sheet.height),
                Point::new(x, sheet.height - bottom_length),
            ));
        }
    }

    let left_end = omargin.left - crop_space(omargin.left);
    if left_end > 0.0 {
        for y in row_edges(matrix, 0, span.1, source) {
            lines.push(Line::new(Point::new(0.0, y), Point::new(left_end, y)));
        }
    }
    let right_length = omargin.right - crop_space(omargin.right);
    if right_length > 0.0 {
        for y in row_edges(matrix, matrix.width() - 1, span.1, source) {
            lines.push(Line::new(
                Point::new(sheet.width, y),
                Point::new(sheet.width - right_length, y),
            ));
        }
    }

    lines
}

/// Bind mark of signature `index` (out of `count`) on the rightmost spine
/// of the sheet.
///
/// Marks step up from the bottom of the page block, so that once signatures
/// are gathered the marks form a staircase along the spine.
pub fn spine_mark(matrix: &Matrix, source: Size, index: usize, count: usize) -> Option<Rect> {
    let (width, height) = matrix.signature();
    if width < 2 {
        return None;
    }
    let corner = (width - 1, height - 1);
    let page = &matrix[corner];
    let topleft = matrix.topleft(corner, source);
    let footprint = page.footprint(source);

    let spine = topleft.x - page.left;
    let bottom = topleft.y + footprint.height;
    let step = BIND_MARK_MAX_HEIGHT.min(footprint.height / (count + 2) as f64);

    Some(Rect::from_corners(
        Point::new(spine - BIND_MARK_HALF_WIDTH, bottom - step * (index + 2) as f64),
        Point::new(spine + BIND_MARK_HALF_WIDTH, bottom - step * (index + 1) as f64),
    ))
}

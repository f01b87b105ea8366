//! Imposition matrices
//!
//! A [`Matrix`] describes one side of one output sheet: a grid of
//! [`Page`] slots, each naming a source page (by its index in the padded
//! source sequence), the angle it is drawn at, and the margins around it.
//!
//! Margins are half-gaps: two neighbouring slots each carry half of the
//! space between them. The outer edges of the page block usually carry
//! nothing; the space around the block is the matrix `omargin`.

use super::{Point, Size};
use crate::constants::SIZE_TOLERANCE;
use crate::types::{Margins, Rotation};
use std::ops::{Index, IndexMut};

/// One slot of an imposition matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page {
    /// Index into the padded source sequence
    pub number: usize,
    /// Angle the source page is drawn at
    pub rotate: Rotation,
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Page {
    pub fn new(number: usize) -> Self {
        Self {
            number,
            rotate: Rotation::None,
            left: 0.0,
            right: 0.0,
            top: 0.0,
            bottom: 0.0,
        }
    }

    pub fn with_rotation(mut self, rotate: Rotation) -> Self {
        self.rotate = rotate;
        self
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.left = margins.left;
        self.right = margins.right;
        self.top = margins.top;
        self.bottom = margins.bottom;
        self
    }

    /// Same slot, pointing at another source page
    pub fn with_number(mut self, number: usize) -> Self {
        self.number = number;
        self
    }

    pub fn margins(&self) -> Margins {
        Margins::new(self.left, self.right, self.top, self.bottom)
    }

    /// Area covered by the source page itself, once rotated
    pub fn footprint(&self, source: Size) -> Size {
        source.rotated(self.rotate)
    }
}

/// A complete grid of pages for one side of an output sheet.
///
/// Pages are stored column by column: `pages[x][y]`, `x` counting from the
/// left and `y` from the top. A matrix never has holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pages: Vec<Vec<Page>>,
    /// Space around the page block
    pub omargin: Margins,
}

impl Matrix {
    /// Build a matrix from its columns.
    ///
    /// # Panics
    /// If there are no columns, or columns differ in length.
    pub fn new(pages: Vec<Vec<Page>>) -> Self {
        assert!(
            !pages.is_empty() && !pages[0].is_empty(),
            "a matrix holds at least one page"
        );
        assert!(
            pages.iter().all(|column| column.len() == pages[0].len()),
            "matrix columns must have the same height"
        );
        Self {
            pages,
            omargin: Margins::default(),
        }
    }

    /// Build a `width` x `height` matrix, computing each slot from its coordinates
    pub fn from_fn(width: usize, height: usize, mut page: impl FnMut(usize, usize) -> Page) -> Self {
        Self::new(
            (0..width)
                .map(|x| (0..height).map(|y| page(x, y)).collect())
                .collect(),
        )
    }

    pub fn with_omargin(mut self, omargin: Margins) -> Self {
        self.omargin = omargin;
        self
    }

    /// Add `angle` to every slot
    pub fn rotate(&mut self, angle: Rotation) {
        for page in self.pages.iter_mut().flatten() {
            page.rotate += angle;
        }
    }

    pub fn rotated(mut self, angle: Rotation) -> Self {
        self.rotate(angle);
        self
    }

    pub fn width(&self) -> usize {
        self.pages.len()
    }

    pub fn height(&self) -> usize {
        self.pages[0].len()
    }

    /// Grid dimensions (columns, rows)
    pub fn signature(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    /// Every coordinate, `x` outer and `y` inner
    pub fn coordinates(&self) -> impl Iterator<Item = (usize, usize)> + use<> {
        let (width, height) = self.signature();
        (0..width).flat_map(move |x| (0..height).map(move |y| (x, y)))
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&Page> {
        self.pages.get(x).and_then(|column| column.get(y))
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut Page> {
        self.pages.get_mut(x).and_then(|column| column.get_mut(y))
    }

    /// All slots, in coordinate order
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter().flatten()
    }

    /// Copy of this matrix with every page number shifted by `offset`
    pub fn stack(&self, offset: usize) -> Matrix {
        let mut stacked = self.clone();
        for page in stacked.pages.iter_mut().flatten() {
            page.number += offset;
        }
        stacked
    }

    /// Top-left corner of slot `(x, y)` on the output sheet.
    ///
    /// Preceding slots on the same row (resp. column) contribute their
    /// margins plus their footprint, with sideways slots contributing the
    /// source height as width.
    pub fn topleft(&self, (x, y): (usize, usize), source: Size) -> Point {
        let mut left = self.omargin.left;
        for i in 0..x {
            let page = &self[(i, y)];
            left += page.left + page.right + page.footprint(source).width;
        }
        left += self[(x, y)].left;

        let mut top = self.omargin.top;
        for j in 0..y {
            let page = &self[(x, j)];
            top += page.top + page.bottom + page.footprint(source).height;
        }
        top += self[(x, y)].top;

        Point::new(left, top)
    }

    /// Size of the output sheet needed for this matrix.
    ///
    /// # Panics
    /// If rows (or columns) disagree on their total size by more than
    /// [`SIZE_TOLERANCE`]: the scheme produced an inconsistent layout.
    pub fn pagesize(&self, source: Size) -> Size {
        let rows: Vec<f64> = (0..self.height())
            .map(|y| {
                self.omargin.horizontal()
                    + (0..self.width())
                        .map(|x| {
                            let page = &self[(x, y)];
                            page.left + page.right + page.footprint(source).width
                        })
                        .sum::<f64>()
            })
            .collect();
        let columns: Vec<f64> = (0..self.width())
            .map(|x| {
                self.omargin.vertical()
                    + (0..self.height())
                        .map(|y| {
                            let page = &self[(x, y)];
                            page.top + page.bottom + page.footprint(source).height
                        })
                        .sum::<f64>()
            })
            .collect();

        let width = reconcile(&rows, "row");
        let height = reconcile(&columns, "column");
        Size::new(width, height)
    }
}

/// Largest of near-equal sums
fn reconcile(sums: &[f64], what: &str) -> f64 {
    let max = sums.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = sums.iter().copied().fold(f64::INFINITY, f64::min);
    assert!(
        max - min <= SIZE_TOLERANCE,
        "inconsistent imposition matrix: {what} sizes range from {min} to {max}"
    );
    max
}

impl Index<(usize, usize)> for Matrix {
    type Output = Page;

    fn index(&self, (x, y): (usize, usize)) -> &Page {
        &self.pages[x][y]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Page {
        &mut self.pages[x][y]
    }
}

/// Repeat a list of matrices `repeat` times, shifting page numbers by
/// `step` on each repetition.
///
/// Given one sheet holding pages 0 to 7 with `repeat = 3, step = 8`, this
/// yields the sheet for pages 0-7, then 8-15, then 16-23.
pub fn stack_matrixes(
    sheet: Vec<Matrix>,
    repeat: usize,
    step: usize,
) -> impl Iterator<Item = Matrix> {
    (0..repeat).flat_map(move |i| {
        sheet
            .iter()
            .map(|matrix| matrix.stack(i * step))
            .collect::<Vec<_>>()
    })
}

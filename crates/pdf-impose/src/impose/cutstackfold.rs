//! Cut, stack, fold: sheets are cut into pieces, pieces are stacked, and the
//! whole stack is folded once into a single booklet.
//!
//! Each piece holds two pages per side, facing each other across the fold.
//! Pieces are stacked by position first (all pieces cut from position 0,
//! then all from position 1...), sheet order being kept within a position.
//! The piece cut from position `i` of sheet `k` is therefore the
//! `(i * sheets + k)`-th from the outside of the booklet.

use super::{Impositor, Settings, paired_margins};
use crate::layout::{Line, Matrix, Page};
use crate::marks::{MarkContext, grid_crop_marks};
use crate::types::Bind;
use crate::units::Creep;

#[derive(Debug, Clone, PartialEq)]
pub struct CutStackFoldImpositor {
    settings: Settings,
    /// Pieces per sheet (columns, rows); each piece is two pages wide
    signature: (usize, usize),
    imargin: f64,
    bind: Bind,
    creep: Creep,
    /// Sheets per booklet, 0 for a single booklet
    group: usize,
}

impl CutStackFoldImpositor {
    /// # Panics
    /// If the signature is empty.
    pub fn new(settings: Settings, signature: (usize, usize), imargin: f64) -> Self {
        assert!(signature.0 > 0 && signature.1 > 0, "empty signature");
        Self {
            settings,
            signature,
            imargin,
            bind: Bind::default(),
            creep: Creep::None,
            group: 0,
        }
    }

    pub fn with_bind(mut self, bind: Bind) -> Self {
        self.bind = bind;
        self
    }

    pub fn with_creep(mut self, creep: Creep) -> Self {
        self.creep = creep;
        self
    }

    pub fn with_group(mut self, group: usize) -> Self {
        self.group = group;
        self
    }

    fn pieces(&self) -> usize {
        self.signature.0 * self.signature.1
    }

    /// Sheets per booklet, for `pages` pages
    pub fn sheets_per_booklet(&self, pages: usize) -> usize {
        if self.group == 0 {
            (pages / (4 * self.pieces())).max(1)
        } else {
            self.group
        }
    }

    /// Recto and verso of sheet `sheet` of a booklet made of `sheets` sheets
    fn sheet_matrixes(&self, sheet: usize, sheets: usize) -> [Matrix; 2] {
        let (width, height) = self.signature;
        let columns = 2 * width;
        let total = 4 * self.pieces() * sheets;
        let stack = 2 * sheets;
        let count = self.pieces() * sheets;

        let slot = |x: usize, y: usize, number: usize, piece: usize| {
            let depth = count - 1 - (piece * sheets + sheet);
            let margins = paired_margins(
                x,
                y,
                (columns, height),
                self.imargin,
                &self.creep,
                depth,
                count,
            );
            Page::new(number).with_margins(margins)
        };

        let recto = Matrix::from_fn(columns, height, |x, y| {
            let piece = (x / 2) * height + y;
            let low = piece * stack + 2 * sheet;
            if x % 2 == 0 {
                slot(x, y, total - low - 1, piece)
            } else {
                slot(x, y, low, piece)
            }
        });
        let verso = Matrix::from_fn(columns, height, |x, y| {
            // Behind column x of the recto
            let mirrored = columns - 1 - x;
            let piece = (mirrored / 2) * height + y;
            let low = piece * stack + 2 * sheet;
            if mirrored % 2 == 0 {
                slot(x, y, total - low - 2, piece)
            } else {
                slot(x, y, low + 1, piece)
            }
        });

        let angle = self.bind.angle();
        [recto, verso].map(|matrix| matrix.rotated(angle).with_omargin(self.settings.omargin))
    }
}

impl Impositor for CutStackFoldImpositor {
    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn page_multiple(&self) -> usize {
        4 * self.pieces() * self.group.max(1)
    }

    fn matrixes(&self, pages: usize) -> Box<dyn Iterator<Item = Matrix> + '_> {
        let sheets = self.sheets_per_booklet(pages);
        let per_booklet = 4 * self.pieces() * sheets;
        assert!(pages % per_booklet == 0);

        Box::new((0..pages / per_booklet).flat_map(move |booklet| {
            (0..sheets).flat_map(move |sheet| {
                self.sheet_matrixes(sheet, sheets)
                    .map(|matrix| matrix.stack(booklet * per_booklet))
            })
        }))
    }

    fn crop_marks(&self, context: &MarkContext) -> Vec<Line> {
        grid_crop_marks(context.matrix, context.sheet, context.source, (2, 1))
    }
}

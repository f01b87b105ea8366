//! Copy, cut, fold: every piece of a sheet carries the same pages, so that
//! cutting a stack of sheets gives several identical booklets at once.

use super::{Impositor, Settings, paired_margins};
use crate::layout::{Line, Matrix, Page};
use crate::marks::{MarkContext, grid_crop_marks};
use crate::types::Bind;
use crate::units::Creep;

/// Pages of a single folded sheet: recto `[3, 0]`, verso `[1, 2]`
const RECTO: [usize; 2] = [3, 0];
const VERSO: [usize; 2] = [1, 2];

#[derive(Debug, Clone, PartialEq)]
pub struct CopyCutFoldImpositor {
    settings: Settings,
    /// Copies per sheet (columns, rows); each copy is two pages wide
    signature: (usize, usize),
    imargin: f64,
    bind: Bind,
    creep: Creep,
    /// Sheets per booklet, 0 for a single booklet
    group: usize,
}

impl CopyCutFoldImpositor {
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

    /// Sheets per booklet, for `pages` pages
    pub fn sheets_per_booklet(&self, pages: usize) -> usize {
        if self.group == 0 {
            (pages / 4).max(1)
        } else {
            self.group
        }
    }

    /// Sheet `sheet` (0 is the outer one) of a booklet of `sheets` sheets.
    ///
    /// The two lowest pages of the folded sheet move forward by two pages
    /// per outer sheet, the two highest ones move back.
    fn sheet_matrixes(&self, sheet: usize, sheets: usize) -> [Matrix; 2] {
        let columns = 2 * self.signature.0;
        let height = self.signature.1;
        let number = |base: usize| {
            if base < 2 {
                base + 2 * sheet
            } else {
                base + 4 * sheets - 4 - 2 * sheet
            }
        };
        let depth = sheets - 1 - sheet;

        let side = |bases: [usize; 2]| {
            Matrix::from_fn(columns, height, |x, y| {
                let margins = paired_margins(
                    x,
                    y,
                    (columns, height),
                    self.imargin,
                    &self.creep,
                    depth,
                    sheets,
                );
                Page::new(number(bases[x % 2])).with_margins(margins)
            })
        };

        let angle = self.bind.angle();
        [side(RECTO), side(VERSO)]
            .map(|matrix| matrix.rotated(angle).with_omargin(self.settings.omargin))
    }
}

impl Impositor for CopyCutFoldImpositor {
    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn page_multiple(&self) -> usize {
        4 * self.group.max(1)
    }

    fn matrixes(&self, pages: usize) -> Box<dyn Iterator<Item = Matrix> + '_> {
        let sheets = self.sheets_per_booklet(pages);
        let per_booklet = 4 * sheets;
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

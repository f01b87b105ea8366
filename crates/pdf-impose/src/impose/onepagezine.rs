//! One-page zine: eight pages on one side of a single sheet, folded into a
//! small booklet. The back of the sheet is left free for a poster.

use super::{Impositor, Settings, grid_margins};
use crate::layout::{Line, Matrix, Page, stack_matrixes};
use crate::marks::{MarkContext, grid_crop_marks};
use crate::types::{Bind, Rotation};

/// `(page, rotation)` of every slot, column by column, top to bottom
const LAYOUT: [[(usize, Rotation); 2]; 4] = [
    [(4, Rotation::Deg180), (5, Rotation::None)],
    [(3, Rotation::Deg180), (6, Rotation::None)],
    [(2, Rotation::Deg180), (7, Rotation::None)],
    [(1, Rotation::Deg180), (0, Rotation::None)],
];

const SIGNATURE: (usize, usize) = (4, 2);

#[derive(Debug, Clone, PartialEq)]
pub struct OnePageZineImpositor {
    settings: Settings,
    imargin: f64,
    bind: Bind,
}

impl OnePageZineImpositor {
    pub fn new(settings: Settings, imargin: f64) -> Self {
        Self {
            settings,
            imargin,
            bind: Bind::default(),
        }
    }

    pub fn with_bind(mut self, bind: Bind) -> Self {
        self.bind = bind;
        self
    }

    fn base_matrix(&self) -> Matrix {
        Matrix::from_fn(SIGNATURE.0, SIGNATURE.1, |x, y| {
            let (number, rotate) = LAYOUT[x][y];
            Page::new(number)
                .with_rotation(rotate)
                .with_margins(grid_margins(x, y, SIGNATURE, self.imargin))
        })
        .rotated(self.bind.angle())
        .with_omargin(self.settings.omargin)
    }
}

impl Impositor for OnePageZineImpositor {
    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn page_multiple(&self) -> usize {
        8
    }

    fn matrixes(&self, pages: usize) -> Box<dyn Iterator<Item = Matrix> + '_> {
        assert!(pages % 8 == 0);
        Box::new(stack_matrixes(vec![self.base_matrix()], pages / 8, 8))
    }

    fn crop_marks(&self, context: &MarkContext) -> Vec<Line> {
        grid_crop_marks(context.matrix, context.sheet, context.source, SIGNATURE)
    }

    fn sides_per_sheet(&self) -> usize {
        1
    }
}

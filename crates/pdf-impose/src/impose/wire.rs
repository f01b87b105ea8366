//! Wire binding: sheets are cut into single leaves, and the leaves of every
//! sheet stacked so that the first leaf of each sheet comes first.

use super::cards::CardsImpositor;
use super::{Impositor, Settings};
use crate::layout::{Line, Matrix, stack_matrixes};
use crate::marks::MarkContext;

/// Like [`CardsImpositor`], but numbered so that cut leaves of successive
/// sheets interleave: slot `i` of sheet `k` holds page `2 * (i * sheets + k)`.
#[derive(Debug, Clone, PartialEq)]
pub struct WireImpositor {
    cards: CardsImpositor,
}

impl WireImpositor {
    pub fn new(settings: Settings, signature: (usize, usize), imargin: f64) -> Self {
        Self {
            cards: CardsImpositor::new(settings, signature, imargin),
        }
    }

    pub fn signature(&self) -> (usize, usize) {
        self.cards.signature()
    }
}

impl Impositor for WireImpositor {
    fn settings(&self) -> &Settings {
        self.cards.settings()
    }

    fn page_multiple(&self) -> usize {
        self.cards.page_multiple()
    }

    fn matrixes(&self, pages: usize) -> Box<dyn Iterator<Item = Matrix> + '_> {
        let per_sheet = self.page_multiple();
        assert!(pages % per_sheet == 0);
        let sheets = pages / per_sheet;
        Box::new(stack_matrixes(self.cards.base_matrixes(sheets), sheets, 2))
    }

    fn crop_marks(&self, context: &MarkContext) -> Vec<Line> {
        self.cards.crop_marks(context)
    }
}

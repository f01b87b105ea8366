//! Cards: each sheet is cut into independent cards, printed on both sides

use super::{Impositor, Settings, grid_margins};
use crate::layout::{Line, Matrix, Page, stack_matrixes};
use crate::marks::{MarkContext, grid_crop_marks};

#[derive(Debug, Clone, PartialEq)]
pub struct CardsImpositor {
    settings: Settings,
    signature: (usize, usize),
    imargin: f64,
}

impl CardsImpositor {
    /// # Panics
    /// If the signature is empty.
    pub fn new(settings: Settings, signature: (usize, usize), imargin: f64) -> Self {
        assert!(signature.0 > 0 && signature.1 > 0, "empty signature");
        Self {
            settings,
            signature,
            imargin,
        }
    }

    pub fn signature(&self) -> (usize, usize) {
        self.signature
    }

    /// Recto and verso of the first sheet.
    ///
    /// Card `i` gets page `2i` on the recto and `2i + 1` on the verso, at the
    /// horizontally mirrored position, so that both sides line up once cut.
    pub(crate) fn base_matrixes(&self, scale: usize) -> Vec<Matrix> {
        let (width, height) = self.signature;
        let slot = |x: usize, y: usize, number: usize| {
            Page::new(number).with_margins(grid_margins(x, y, self.signature, self.imargin))
        };

        let recto = Matrix::from_fn(width, height, |x, y| slot(x, y, 2 * (x * height + y) * scale));
        let verso = Matrix::from_fn(width, height, |x, y| {
            let card = (width - 1 - x) * height + y;
            slot(x, y, 2 * card * scale + 1)
        });

        vec![
            recto.with_omargin(self.settings.omargin),
            verso.with_omargin(self.settings.omargin),
        ]
    }
}

impl Impositor for CardsImpositor {
    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn page_multiple(&self) -> usize {
        2 * self.signature.0 * self.signature.1
    }

    fn matrixes(&self, pages: usize) -> Box<dyn Iterator<Item = Matrix> + '_> {
        let step = self.page_multiple();
        assert!(pages % step == 0);
        Box::new(stack_matrixes(self.base_matrixes(1), pages / step, step))
    }

    fn crop_marks(&self, context: &MarkContext) -> Vec<Line> {
        grid_crop_marks(context.matrix, context.sheet, context.source, (1, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verso_mirrors_recto() {
        let cards = CardsImpositor::new(Settings::default(), (3, 2), 0.0);
        let sheet = cards.base_matrixes(1);
        for (x, y) in sheet[0].coordinates() {
            assert_eq!(sheet[0][(x, y)].number + 1, sheet[1][(2 - x, y)].number);
        }
    }
}

//! Folded signatures: perfect binding, saddle stitching and hardcover
//!
//! Every sheet is folded along a fold sequence (see
//! [`crate::layout::fold_recto`]) into a signature. Sheets are then nested
//! into groups before binding:
//! - perfect binding: signatures of `group` sheets are glued one after
//!   the other
//! - hardcover: the same, with creep compensation inside each signature
//! - saddle stitching: all sheets are nested into a single signature
//!
//! ## Nested sheets
//!
//! Within a group of `g` sheets, the outer sheet keeps the first and last
//! pages of the group. Every page number `n` of a single sheet skips
//! `4 * (g - 1)` pages at each boundary between fold units of four pages;
//! inner sheet `i` then moves the first half of each unit forward by `2i`
//! and the second half back by `2i`. With `h` and `g = 2`:
//! - outer sheet: recto `[7, 0]`, verso `[1, 6]`
//! - inner sheet: recto `[5, 2]`, verso `[3, 4]`

use super::{Impositor, Settings, paired_margins};
use crate::layout::{
    Line, Matrix, Page, Rect, evenodd, fold_recto, folds_signature, stack_matrixes, validate_folds,
};
use crate::marks::{MarkContext, grid_crop_marks, spine_mark};
use crate::types::*;
use crate::units::Creep;

/// How folded sheets are gathered and bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Binding {
    #[default]
    Perfect,
    Saddle,
    Hardcover,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerfectImpositor {
    settings: Settings,
    binding: Binding,
    folds: String,
    signature: (usize, usize),
    imargin: f64,
    bind: Bind,
    creep: Creep,
    /// Sheets per signature, 0 to nest every sheet together
    group: usize,
}

impl PerfectImpositor {
    pub fn new(settings: Settings, binding: Binding, folds: &str, imargin: f64) -> Result<Self> {
        validate_folds(folds)?;
        Ok(Self {
            settings,
            binding,
            folds: folds.to_string(),
            signature: folds_signature(folds),
            imargin,
            bind: Bind::default(),
            creep: Creep::None,
            group: match binding {
                Binding::Saddle => 0,
                Binding::Perfect | Binding::Hardcover => 1,
            },
        })
    }

    pub fn with_bind(mut self, bind: Bind) -> Self {
        self.bind = bind;
        self
    }

    /// Creep is ignored by perfect binding, whose folds are cut off
    pub fn with_creep(mut self, creep: Creep) -> Self {
        if self.binding != Binding::Perfect {
            self.creep = creep;
        }
        self
    }

    /// Group size; saddle stitching always nests every sheet together
    pub fn with_group(mut self, group: usize) -> Self {
        if self.binding != Binding::Saddle {
            self.group = group;
        }
        self
    }

    pub fn folds(&self) -> &str {
        &self.folds
    }

    pub fn signature(&self) -> (usize, usize) {
        self.signature
    }

    pub fn binding(&self) -> Binding {
        self.binding
    }

    fn pages_per_sheet(&self) -> usize {
        2 * self.signature.0 * self.signature.1
    }

    /// Sheets per group for `pages` pages
    pub fn sheets_per_group(&self, pages: usize) -> usize {
        if self.group == 0 {
            pages.div_ceil(self.pages_per_sheet()).max(1)
        } else {
            self.group
        }
    }

    /// Angle of pages on row `y`: with several rows, every other row is
    /// upside down so that heads meet at the horizontal folds
    fn row_rotation(&self, y: usize) -> Rotation {
        let upside_down = if self.signature.1 == 1 {
            y % 2 == 1
        } else {
            y % 2 == 0
        };
        if upside_down {
            Rotation::Deg180
        } else {
            Rotation::None
        }
    }

    /// Recto and verso of a single sheet, nested `depth` sheets deep in a
    /// group of `count`
    fn base_matrixes(&self, depth: usize, count: usize) -> [Matrix; 2] {
        let recto = fold_recto(&self.folds);
        let (width, height) = self.signature;

        let slot = |x: usize, y: usize, number: usize| {
            let margins = paired_margins(
                x,
                y,
                self.signature,
                self.imargin,
                &self.creep,
                depth,
                count,
            );
            Page::new(number)
                .with_rotation(self.row_rotation(y))
                .with_margins(margins)
        };

        let front = Matrix::from_fn(width, height, |x, y| slot(x, y, recto[x][y]));
        let back = Matrix::from_fn(width, height, |x, y| {
            slot(x, y, evenodd(recto[width - 1 - x][y]))
        });
        [front, back]
    }

    /// Every side of one group of `group` nested sheets, outer sheet first
    fn group_matrixes(&self, group: usize) -> Vec<Matrix> {
        let angle = self.bind.angle();
        let mut matrixes = Vec::with_capacity(2 * group);

        for inner in 0..group {
            for mut matrix in self.base_matrixes(group - 1 - inner, group) {
                for coord in matrix.coordinates() {
                    let number = matrix[coord].number;
                    let outer = number + (number + 2) / 4 * 4 * (group - 1);
                    matrix[coord].number = if inner == 0 {
                        outer
                    } else if number % 4 <= 1 {
                        outer + 2 * inner
                    } else {
                        outer - 2 * inner
                    };
                }
                matrixes.push(matrix.rotated(angle).with_omargin(self.settings.omargin));
            }
        }

        matrixes
    }
}

impl Impositor for PerfectImpositor {
    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn page_multiple(&self) -> usize {
        self.pages_per_sheet() * self.group.max(1)
    }

    fn matrixes(&self, pages: usize) -> Box<dyn Iterator<Item = Matrix> + '_> {
        let group = self.sheets_per_group(pages);
        let per_group = self.pages_per_sheet() * group;
        assert!(pages % per_group == 0);

        log::debug!(
            "Folding {} into groups of {group} sheets ({per_group} pages)",
            self.folds
        );
        Box::new(stack_matrixes(
            self.group_matrixes(group),
            pages / per_group,
            per_group,
        ))
    }

    fn crop_marks(&self, context: &MarkContext) -> Vec<Line> {
        let span = match self.binding {
            Binding::Saddle => self.signature,
            Binding::Perfect | Binding::Hardcover => (2, 1),
        };
        grid_crop_marks(context.matrix, context.sheet, context.source, span)
    }

    /// One mark per signature, on the recto of each sheet
    fn bind_marks(&self, context: &MarkContext) -> Vec<Rect> {
        if self.binding == Binding::Saddle || context.number % 2 == 1 {
            return Vec::new();
        }
        let group = self.sheets_per_group(context.total);
        let signatures = context.total / (self.pages_per_sheet() * group);
        let index = context.number / 2 / group;

        spine_mark(context.matrix, context.source, index, signatures)
            .into_iter()
            .collect()
    }
}

//! PDF imposition - arranging pages for printing and binding
//!
//! This module orchestrates the imposition process:
//! 1. Load the source documents and count their pages
//! 2. Pad the page sequence with blank pages, before the `last` pages
//! 3. Ask the imposition schema for its matrices, one per output page
//! 4. Place source pages on output pages, with margins and rotation
//! 5. Draw printer's marks and copy document metadata

mod cards;
mod copycutfold;
mod cutstackfold;
mod engine;
mod io;
mod onepagezine;
mod perfect;
mod wire;

pub use cards::CardsImpositor;
pub use copycutfold::CopyCutFoldImpositor;
pub use cutstackfold::CutStackFoldImpositor;
pub use engine::impose_pages;
pub use io::{load_multiple_pdfs, load_pdf, save_pdf};
pub use onepagezine::OnePageZineImpositor;
pub use perfect::{Binding, PerfectImpositor};
pub use wire::WireImpositor;

use crate::layout::{Line, Matrix, Rect};
use crate::marks::MarkContext;
use crate::options::ImpositionOptions;
use crate::render::{PdfReader, PdfWriter, Reader};
use crate::types::*;
use crate::units::Creep;
use lopdf::Document;
use std::path::PathBuf;

/// Settings shared by every imposition schema
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Settings {
    /// Source pages kept at the very end, after blank padding
    pub last: usize,
    /// Space around the page block on each output page
    pub omargin: Margins,
    pub marks: Marks,
}

/// An imposition schema.
///
/// A schema decides how many blank pages the source needs and where every
/// page goes; the engine ([`impose_pages`]) does the rest.
pub trait Impositor {
    fn settings(&self) -> &Settings;

    /// The padded page count is always a multiple of this
    fn page_multiple(&self) -> usize;

    /// Number of blank pages to add to `source` pages
    fn blank_page_number(&self, source: usize) -> usize {
        let multiple = self.page_multiple();
        (multiple - source % multiple) % multiple
    }

    /// One matrix per output page, in output order.
    ///
    /// `pages` is the padded page count, a multiple of [`Impositor::page_multiple`].
    fn matrixes(&self, pages: usize) -> Box<dyn Iterator<Item = Matrix> + '_>;

    fn crop_marks(&self, _context: &MarkContext) -> Vec<Line> {
        Vec::new()
    }

    fn bind_marks(&self, _context: &MarkContext) -> Vec<Rect> {
        Vec::new()
    }

    /// Output pages printed on one physical sheet
    fn sides_per_sheet(&self) -> usize {
        2
    }
}

/// Main imposition function
pub async fn impose(documents: &[Document], options: &ImpositionOptions) -> Result<Document> {
    options.validate()?;

    let documents = documents.to_vec();
    let options = options.clone();

    tokio::task::spawn_blocking(move || impose_sync(documents, &options)).await?
}

fn impose_sync(documents: Vec<Document>, options: &ImpositionOptions) -> Result<Document> {
    let reader = PdfReader::new(documents)?;
    if reader.is_empty() {
        return Err(ImposeError::NoPages);
    }

    let impositor = options.build(reader.size(), reader.len())?;
    log::info!(
        "Imposing {} pages with the {} schema",
        reader.len(),
        options.schema
    );
    impose_pages(impositor.as_ref(), reader, PdfWriter::new())
}

/// Load the input files, impose them and save the result.
///
/// Returns the path of the written file.
pub async fn impose_files(options: &ImpositionOptions) -> Result<PathBuf> {
    options.validate()?;

    let documents = load_multiple_pdfs(&options.input_files).await?;
    let output = options.output_path()?;
    let imposed = impose(&documents, options).await?;
    save_pdf(imposed, &output).await?;

    log::info!("Wrote {}", output.display());
    Ok(output)
}

// =============================================================================
// Margins shared by the schemas
// =============================================================================

/// Half gaps around slot `(x, y)` of a plain grid: nothing on the outer
/// edges, half of `imargin` between neighbours.
pub(crate) fn grid_margins(x: usize, y: usize, signature: (usize, usize), imargin: f64) -> Margins {
    let half = imargin / 2.0;
    let inner = |at_edge: bool| if at_edge { 0.0 } else { half };
    Margins::new(
        inner(x == 0),
        inner(x + 1 == signature.0),
        inner(y == 0),
        inner(y + 1 == signature.1),
    )
}

/// Margins of slot `(x, y)` in a grid of folded pairs: columns `2k` and
/// `2k + 1` face each other across a fold.
///
/// The fold gets `creep(depth)`, split between both pages. The outer edges
/// of the pair get the rest of the largest creep, so that every sheet of a
/// stack keeps the same size.
pub(crate) fn paired_margins(
    x: usize,
    y: usize,
    signature: (usize, usize),
    imargin: f64,
    creep: &Creep,
    depth: usize,
    count: usize,
) -> Margins {
    let half = imargin / 2.0;
    let fold = creep.eval(depth);
    let outer = (creep.max_over(count) - fold) / 2.0;

    let (left, right) = if x % 2 == 0 {
        let edge = if x == 0 { 0.0 } else { half };
        (edge + outer, fold / 2.0)
    } else {
        let edge = if x + 1 == signature.0 { 0.0 } else { half };
        (fold / 2.0, edge + outer)
    };
    let top = if y == 0 { 0.0 } else { half };
    let bottom = if y + 1 == signature.1 { 0.0 } else { half };

    Margins::new(left, right, top, bottom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_margins_edges() {
        let margins = grid_margins(0, 1, (2, 3), 10.0);
        assert_eq!(margins, Margins::new(0.0, 5.0, 5.0, 5.0));
        let margins = grid_margins(1, 2, (2, 3), 10.0);
        assert_eq!(margins, Margins::new(5.0, 0.0, 5.0, 0.0));
    }

    #[test]
    fn test_paired_margins_keep_pair_width() {
        let creep = Creep::Linear {
            slope: 2.0,
            intercept: 0.0,
        };
        // Two pairs, 3 nested pieces: the largest creep is 4
        for depth in 0..3 {
            let left = paired_margins(2, 0, (4, 1), 10.0, &creep, depth, 3);
            let right = paired_margins(3, 0, (4, 1), 10.0, &creep, depth, 3);
            let width = left.horizontal() + right.horizontal();
            assert!((width - 9.0).abs() < 1e-9);
            assert_eq!(left.right + right.left, creep.eval(depth));
        }
    }
}

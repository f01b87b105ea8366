//! Source and destination documents for imposition
//!
//! The imposition engine only talks to a [`Reader`] (ordered source pages,
//! with blank padding) and a [`Writer`] (output pages, page placement and
//! marks). This module defines both and implements them on top of lopdf:
//! - Reading page sizes and handles from source documents
//! - Creating XObjects from source pages
//! - Placing them with rotation/translation matrices
//! - Deep copying PDF objects

mod reader;
mod writer;
mod xobject;

pub use reader::{BlankWindow, PdfReader, SourcePage};
pub use writer::PdfWriter;
pub use xobject::{PageBox, copy_object_deep, create_page_xobject, get_page_box};

use crate::layout::{Line, Point, Rect, Size};
use crate::types::{Result, Rotation};

/// Ordered access to source pages.
///
/// Logical page numbers include the blank pages configured with
/// [`Reader::set_final_blank_pages`].
pub trait Reader {
    /// Handle on one non-blank source page
    type Page;

    /// Size of a representative source page
    fn size(&self) -> Size;

    /// Number of pages, blank padding included
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Page `number`, or `None` for a blank page
    fn get(&self, number: usize) -> Option<Self::Page>;

    /// Insert `count` blank pages before the page currently at `position`
    fn set_final_blank_pages(&mut self, count: usize, position: usize);
}

/// Destination of an imposition: builds output pages from source pages
pub trait Writer<R: Reader> {
    type Output;

    /// Create an empty output page; returns its identifier
    fn new_page(&mut self, size: Size) -> Result<usize>;

    /// Draw `page` on output page `sheet`, its top-left corner at
    /// `topleft`, turned counter-clockwise by `rotate`
    fn insert(
        &mut self,
        sheet: usize,
        reader: &R,
        page: &R::Page,
        topleft: Point,
        rotate: Rotation,
    ) -> Result<()>;

    fn draw_line(&mut self, sheet: usize, line: Line) -> Result<()>;

    /// Draw a filled rectangle
    fn draw_rect(&mut self, sheet: usize, rect: Rect) -> Result<()>;

    /// Copy document metadata from the source
    fn set_metadata(&mut self, reader: &R) -> Result<()>;

    fn finish(self) -> Result<Self::Output>;
}

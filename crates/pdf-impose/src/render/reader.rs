//! Source side of an imposition: pages of one or more PDF documents

use super::Reader;
use super::xobject::get_page_box;
use crate::constants::PAGE_SIZE_WARNING_TOLERANCE;
use crate::layout::Size;
use crate::types::*;
use lopdf::{Document, ObjectId};

/// Blank pages inserted in the logical page sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlankWindow {
    /// Number of blank pages
    pub count: usize,
    /// Logical index of the first blank page
    pub position: usize,
}

impl BlankWindow {
    pub fn new(count: usize, position: usize) -> Self {
        Self { count, position }
    }

    /// Physical index of logical page `number`, given `physical` real pages.
    ///
    /// Returns `None` for blank pages and for numbers past the end.
    pub fn resolve(&self, number: usize, physical: usize) -> Option<usize> {
        let position = self.position.min(physical);
        if number >= physical + self.count {
            None
        } else if number < position {
            Some(number)
        } else if number < position + self.count {
            None
        } else {
            Some(number - self.count)
        }
    }
}

/// Handle on one page of one source document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourcePage {
    /// Index of the document in the reader
    pub document: usize,
    /// Page object in that document
    pub id: ObjectId,
}

/// Reads pages from several documents, in order, as one sequence
#[derive(Debug)]
pub struct PdfReader {
    documents: Vec<Document>,
    pages: Vec<SourcePage>,
    size: Size,
    blanks: BlankWindow,
}

impl PdfReader {
    pub fn new(documents: Vec<Document>) -> Result<Self> {
        let mut pages = Vec::new();
        for (index, doc) in documents.iter().enumerate() {
            pages.extend(doc.get_pages().values().map(|&id| SourcePage {
                document: index,
                id,
            }));
        }

        let size = match pages.first() {
            Some(first) => {
                let size = get_page_box(&documents[first.document], first.id)?.size();
                warn_on_size_mismatch(&documents, &pages, size)?;
                size
            }
            None => Size::default(),
        };

        log::debug!(
            "Read {} pages from {} documents, page size {:.1}x{:.1} pt",
            pages.len(),
            documents.len(),
            size.width,
            size.height
        );

        Ok(Self {
            documents,
            pages,
            size,
            blanks: BlankWindow::default(),
        })
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Document holding `page`
    pub fn document(&self, page: &SourcePage) -> &Document {
        &self.documents[page.document]
    }

    /// Number of real (non-blank) pages
    pub fn source_pages(&self) -> usize {
        self.pages.len()
    }
}

fn warn_on_size_mismatch(documents: &[Document], pages: &[SourcePage], size: Size) -> Result<()> {
    for (number, page) in pages.iter().enumerate().skip(1) {
        let other = get_page_box(&documents[page.document], page.id)?.size();
        if (other.width - size.width).abs() > PAGE_SIZE_WARNING_TOLERANCE
            || (other.height - size.height).abs() > PAGE_SIZE_WARNING_TOLERANCE
        {
            log::warn!(
                "Page {} is {:.1}x{:.1} pt but the first page is {:.1}x{:.1} pt; \
                 pages of different sizes will not line up",
                number + 1,
                other.width,
                other.height,
                size.width,
                size.height
            );
            return Ok(());
        }
    }
    Ok(())
}

impl Reader for PdfReader {
    type Page = SourcePage;

    fn size(&self) -> Size {
        self.size
    }

    fn len(&self) -> usize {
        self.pages.len() + self.blanks.count
    }

    fn get(&self, number: usize) -> Option<SourcePage> {
        self.blanks
            .resolve(number, self.pages.len())
            .map(|index| self.pages[index])
    }

    fn set_final_blank_pages(&mut self, count: usize, position: usize) {
        self.blanks = BlankWindow::new(count, position);
    }
}

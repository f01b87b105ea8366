//! Schema-independent imposition loop

use super::Impositor;
use crate::marks::MarkContext;
use crate::render::{Reader, Writer};
use crate::types::*;

/// Impose every page of `reader` onto `writer`, following `impositor`.
///
/// # Panics
/// If the schema's padding and its matrices disagree on the page count.
pub fn impose_pages<R, W>(impositor: &dyn Impositor, mut reader: R, mut writer: W) -> Result<W::Output>
where
    R: Reader,
    W: Writer<R>,
{
    let source_pages = reader.len();
    if source_pages == 0 {
        return Err(ImposeError::NoPages);
    }

    let settings = *impositor.settings();
    let blanks = impositor.blank_page_number(source_pages);
    reader.set_final_blank_pages(blanks, source_pages.saturating_sub(settings.last));
    if blanks > 0 {
        log::info!("Adding {blanks} blank pages to {source_pages} source pages");
    }

    let total = reader.len();
    assert!(
        total % impositor.page_multiple() == 0,
        "{total} pages cannot be imposed by {} pages",
        impositor.page_multiple()
    );

    let source = reader.size();
    let mut output_pages = 0;
    for (number, matrix) in impositor.matrixes(total).enumerate() {
        let size = matrix.pagesize(source);
        let sheet = writer.new_page(size)?;

        for coord in matrix.coordinates() {
            let slot = &matrix[coord];
            // Blank pages are left empty
            let Some(page) = reader.get(slot.number) else {
                continue;
            };
            writer.insert(sheet, &reader, &page, matrix.topleft(coord, source), slot.rotate)?;
        }

        if settings.marks.any() {
            let context = MarkContext {
                number,
                total,
                matrix: &matrix,
                sheet: size,
                source,
            };
            if settings.marks.crop {
                for line in impositor.crop_marks(&context) {
                    writer.draw_line(sheet, line)?;
                }
            }
            if settings.marks.bind {
                for rect in impositor.bind_marks(&context) {
                    writer.draw_rect(sheet, rect)?;
                }
            }
        }

        log::debug!(
            "Output page {}: {}x{} matrix, {:.1}x{:.1} pt",
            number + 1,
            matrix.width(),
            matrix.height(),
            size.width,
            size.height
        );
        output_pages += 1;
    }

    writer.set_metadata(&reader)?;
    log::info!("Imposed {total} pages on {output_pages} output pages");
    writer.finish()
}

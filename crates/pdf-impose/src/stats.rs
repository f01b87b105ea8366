use crate::impose::Impositor;
use crate::options::ImpositionOptions;
use crate::render::get_page_box;
use crate::types::*;
use lopdf::Document;

/// Statistics of imposing `source_pages` pages with `impositor`
pub fn statistics_for(impositor: &dyn Impositor, source_pages: usize) -> ImpositionStatistics {
    let blank_pages_added = impositor.blank_page_number(source_pages);
    let padded_pages = source_pages + blank_pages_added;
    let output_pages = impositor.matrixes(padded_pages).count();

    ImpositionStatistics {
        source_pages,
        blank_pages_added,
        padded_pages,
        output_pages,
        output_sheets: output_pages.div_ceil(impositor.sides_per_sheet()),
    }
}

/// Calculate statistics for the imposition
pub fn calculate_statistics(
    documents: &[Document],
    options: &ImpositionOptions,
) -> Result<ImpositionStatistics> {
    // Count total source pages
    let source_pages: usize = documents.iter().map(|doc| doc.get_pages().len()).sum();
    if source_pages == 0 {
        return Err(ImposeError::NoPages);
    }

    // Size of the first page stands for every page
    let (doc, first) = documents
        .iter()
        .find_map(|doc| doc.get_pages().values().next().map(|&id| (doc, id)))
        .ok_or(ImposeError::NoPages)?;
    let source = get_page_box(doc, first)?.size();

    let impositor = options.build(source, source_pages)?;
    Ok(statistics_for(impositor.as_ref(), source_pages))
}

//! Destination side of an imposition: a new PDF document

use super::reader::{PdfReader, SourcePage};
use super::xobject::{PageBox, copy_object_deep, create_page_xobject};
use super::Writer;
use crate::constants::CROP_MARK_WIDTH;
use crate::layout::{Line, Point, Rect, Size};
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// One output page under construction
struct Sheet {
    size: Size,
    content: String,
    xobjects: Dictionary,
}

impl Sheet {
    /// Convert a layout y coordinate (downwards) into PDF space (upwards)
    fn flip(&self, y: f64) -> f64 {
        self.size.height - y
    }
}

/// Builds the imposed document
pub struct PdfWriter {
    output: Document,
    sheets: Vec<Sheet>,
    /// Objects already copied, per source document
    copied: HashMap<usize, HashMap<ObjectId, ObjectId>>,
    /// One form per source page, shared by every output page using it
    forms: HashMap<SourcePage, (ObjectId, PageBox)>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self {
            output: Document::with_version("1.7"),
            sheets: Vec::new(),
            copied: HashMap::new(),
            forms: HashMap::new(),
        }
    }

    fn sheet_mut(&mut self, sheet: usize) -> Result<&mut Sheet> {
        self.sheets
            .get_mut(sheet)
            .ok_or_else(|| ImposeError::Config(format!("No output page {sheet}")))
    }

    fn form(&mut self, reader: &PdfReader, page: &SourcePage) -> Result<(ObjectId, PageBox)> {
        if let Some(&form) = self.forms.get(page) {
            return Ok(form);
        }
        let cache = self.copied.entry(page.document).or_default();
        let form = create_page_xobject(&mut self.output, reader.document(page), page.id, cache)?;
        self.forms.insert(*page, form);
        Ok(form)
    }
}

/// Format a number for a content stream
fn num(value: f64) -> String {
    let text = format!("{value:.4}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Transformation placing a `width` x `height` form with the lower-left
/// corner of its footprint at `(x, y)`, turned counter-clockwise
fn placement_matrix(rotate: Rotation, x: f64, y: f64, width: f64, height: f64) -> [f64; 6] {
    match rotate {
        Rotation::None => [1.0, 0.0, 0.0, 1.0, x, y],
        Rotation::Deg90 => [0.0, 1.0, -1.0, 0.0, x + height, y],
        Rotation::Deg180 => [-1.0, 0.0, 0.0, -1.0, x + width, y + height],
        Rotation::Deg270 => [0.0, -1.0, 1.0, 0.0, x, y + width],
    }
}

impl Writer<PdfReader> for PdfWriter {
    type Output = Document;

    fn new_page(&mut self, size: Size) -> Result<usize> {
        self.sheets.push(Sheet {
            size,
            content: String::new(),
            xobjects: Dictionary::new(),
        });
        Ok(self.sheets.len() - 1)
    }

    fn insert(
        &mut self,
        sheet: usize,
        reader: &PdfReader,
        page: &SourcePage,
        topleft: Point,
        rotate: Rotation,
    ) -> Result<()> {
        let (form_id, page_box) = self.form(reader, page)?;
        let target = self.sheet_mut(sheet)?;

        let name = format!("P{}", target.xobjects.len());
        target.xobjects.set(name.as_bytes(), Object::Reference(form_id));

        // The form is drawn unrotated, so the page's own /Rotate joins the turn
        let turn = rotate + page_box.rotate;
        let footprint = page_box.size().rotated(rotate);
        let x = topleft.x;
        let y = target.flip(topleft.y + footprint.height);
        let cm = placement_matrix(turn, x, y, page_box.width, page_box.height);
        let cm: Vec<String> = cm.iter().map(|&v| num(v)).collect();
        target
            .content
            .push_str(&format!("q {} cm /{} Do Q\n", cm.join(" "), name));
        Ok(())
    }

    fn draw_line(&mut self, sheet: usize, line: Line) -> Result<()> {
        let target = self.sheet_mut(sheet)?;
        let ops = format!(
            "q 0 0 0 RG {} w {} {} m {} {} l S Q\n",
            num(CROP_MARK_WIDTH),
            num(line.from.x),
            num(target.flip(line.from.y)),
            num(line.to.x),
            num(target.flip(line.to.y)),
        );
        target.content.push_str(&ops);
        Ok(())
    }

    fn draw_rect(&mut self, sheet: usize, rect: Rect) -> Result<()> {
        let target = self.sheet_mut(sheet)?;
        let ops = format!(
            "q 0 0 0 rg {} {} {} {} re f Q\n",
            num(rect.x),
            num(target.flip(rect.bottom())),
            num(rect.width),
            num(rect.height),
        );
        target.content.push_str(&ops);
        Ok(())
    }

    fn set_metadata(&mut self, reader: &PdfReader) -> Result<()> {
        let Some(source) = reader.documents().first() else {
            return Ok(());
        };
        let Ok(info) = source.trailer.get(b"Info") else {
            return Ok(());
        };

        let cache = self.copied.entry(0).or_default();
        let info = match copy_object_deep(&mut self.output, source, info, cache)? {
            Object::Reference(id) => id,
            other => self.output.add_object(other),
        };
        self.output.trailer.set("Info", Object::Reference(info));
        log::debug!("Copied document information from the first source document");
        Ok(())
    }

    fn finish(mut self) -> Result<Document> {
        let pages_tree_id = self.output.new_object_id();
        let mut page_refs = Vec::with_capacity(self.sheets.len());

        for sheet in std::mem::take(&mut self.sheets) {
            let content_id = self
                .output
                .add_object(Stream::new(Dictionary::new(), sheet.content.into_bytes()));

            let mut resources = Dictionary::new();
            resources.set("XObject", Object::Dictionary(sheet.xobjects));

            let page_id = self.output.add_object(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_tree_id)),
                (
                    "MediaBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Real(sheet.size.width as f32),
                        Object::Real(sheet.size.height as f32),
                    ]),
                ),
                ("Resources", Object::Dictionary(resources)),
                ("Contents", Object::Reference(content_id)),
            ]));
            page_refs.push(Object::Reference(page_id));
        }

        finalize_document(&mut self.output, pages_tree_id, page_refs);
        Ok(self.output)
    }
}

/// Create pages tree and catalog, finalize document structure
fn finalize_document(output: &mut Document, pages_tree_id: ObjectId, page_refs: Vec<Object>) {
    let count = page_refs.len() as i64;
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(page_refs)),
        ("Count", Object::Integer(count)),
    ]);
    output
        .objects
        .insert(pages_tree_id, Object::Dictionary(pages_dict));

    let catalog_id = output.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_tree_id)),
    ]));

    output.trailer.set("Root", catalog_id);
}

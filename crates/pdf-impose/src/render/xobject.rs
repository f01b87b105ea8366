//! XObject creation for imposition
//!
//! This module handles creating Form XObjects from source PDF pages,
//! which are then placed onto output pages with transformations.

use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::layout::Size;
use crate::types::{Result, Rotation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

// =============================================================================
// Page Boxes
// =============================================================================

/// Visible area of a source page, in its own user space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    /// Lower-left x
    pub x: f64,
    /// Lower-left y
    pub y: f64,
    /// Width before `/Rotate` is applied
    pub width: f64,
    /// Height before `/Rotate` is applied
    pub height: f64,
    /// Page `/Rotate`, as a counter-clockwise turn
    pub rotate: Rotation,
}

impl PageBox {
    /// Size of the page as it is displayed
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height).rotated(self.rotate)
    }
}

impl Default for PageBox {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: DEFAULT_PAGE_DIMENSIONS.0,
            height: DEFAULT_PAGE_DIMENSIONS.1,
            rotate: Rotation::None,
        }
    }
}

/// Look up a page attribute, following the page tree up for inherited ones
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    // Bounded walk, in case of a cyclic page tree
    for _ in 0..32 {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Inherited attribute `key`, with references resolved
fn resolved<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    inherited(doc, page_id, key).and_then(|obj| match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    })
}

/// Rectangle `key` of a page as `[x0, y0, x1, y1]`, corners normalized
fn page_rect(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<[f64; 4]> {
    let values = resolved(doc, page_id, key)?.as_array().ok()?;
    let numbers: Vec<f64> = values.iter().filter_map(extract_number).collect();
    let [a, b, c, d] = numbers[..] else {
        return None;
    };
    Some([a.min(c), b.min(d), a.max(c), b.max(d)])
}

/// Counter-clockwise turn matching a page `/Rotate` (clockwise, in degrees)
fn page_rotation(doc: &Document, page_id: ObjectId) -> Rotation {
    let Some(degrees) = resolved(doc, page_id, b"Rotate").and_then(extract_number) else {
        return Rotation::None;
    };
    Rotation::from_degrees(-(degrees as i32)).unwrap_or_else(|| {
        log::warn!("Ignoring /Rotate {degrees}, which is not a multiple of 90");
        Rotation::None
    })
}

/// Get the visible box of a source page: its CropBox clipped to the
/// MediaBox, or the MediaBox alone, falling back to US Letter
pub fn get_page_box(doc: &Document, page_id: ObjectId) -> Result<PageBox> {
    let rotate = page_rotation(doc, page_id);
    let Some(media) = page_rect(doc, page_id, b"MediaBox") else {
        return Ok(PageBox {
            rotate,
            ..PageBox::default()
        });
    };

    let visible = page_rect(doc, page_id, b"CropBox")
        .map(|crop| {
            [
                crop[0].max(media[0]),
                crop[1].max(media[1]),
                crop[2].min(media[2]),
                crop[3].min(media[3]),
            ]
        })
        .filter(|clipped| clipped[2] > clipped[0] && clipped[3] > clipped[1])
        .unwrap_or(media);

    Ok(PageBox {
        x: visible[0],
        y: visible[1],
        width: visible[2] - visible[0],
        height: visible[3] - visible[1],
        rotate,
    })
}

/// Extract numeric value from a PDF object
fn extract_number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

// =============================================================================
// XObject Creation
// =============================================================================

/// Create a Form XObject from a source page.
///
/// The form's own space starts at the lower-left corner of the page's
/// visible box, so placing it at `(x, y)` puts the page corner there.
/// `/Rotate` is left to the placement matrix.
/// Objects copied from the source are recorded in `cache` so that shared
/// resources are only copied once per source document.
pub fn create_page_xobject(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<(ObjectId, PageBox)> {
    let page_box = get_page_box(source, page_id)?;
    let page_dict = source.get_dictionary(page_id)?;
    let content_data = get_page_content(source, page_dict)?;

    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("FormType", Object::Integer(1));
    xobject_dict.set(
        "BBox",
        Object::Array(
            [
                page_box.x,
                page_box.y,
                page_box.x + page_box.width,
                page_box.y + page_box.height,
            ]
            .into_iter()
            .map(|v| Object::Real(v as f32))
            .collect(),
        ),
    );
    xobject_dict.set(
        "Matrix",
        Object::Array(
            [1.0, 0.0, 0.0, 1.0, -page_box.x, -page_box.y]
                .into_iter()
                .map(|v| Object::Real(v as f32))
                .collect(),
        ),
    );

    if let Some(resources) = inherited(source, page_id, b"Resources") {
        xobject_dict.set(
            "Resources",
            copy_object_deep(output, source, resources, cache)?,
        );
    }

    let id = output.add_object(Stream::new(xobject_dict, content_data));
    Ok((id, page_box))
}

// =============================================================================
// Page Content Extraction
// =============================================================================

/// Get the content stream data from a page.
fn get_page_content(doc: &Document, page_dict: &Dictionary) -> Result<Vec<u8>> {
    let contents = match page_dict.get(b"Contents") {
        Ok(c) => c,
        Err(_) => return Ok(Vec::new()), // No content = blank page
    };

    match contents {
        Object::Reference(id) => match doc.get_object(*id)? {
            Object::Array(refs) => concatenate_streams(doc, refs),
            Object::Stream(stream) => Ok(stream_data(stream)),
            _ => Ok(Vec::new()),
        },
        Object::Array(refs) => concatenate_streams(doc, refs),
        _ => Ok(Vec::new()),
    }
}

fn stream_data(stream: &Stream) -> Vec<u8> {
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

/// Concatenate multiple content streams
fn concatenate_streams(doc: &Document, refs: &[Object]) -> Result<Vec<u8>> {
    let mut result = Vec::new();

    for obj in refs {
        if let Object::Reference(id) = obj {
            if let Ok(stream) = doc.get_object(*id)?.as_stream() {
                result.extend_from_slice(&stream_data(stream));
                result.push(b'\n');
            }
        }
    }

    Ok(result)
}

// =============================================================================
// Deep Copy
// =============================================================================

/// Deep copy an object from source to output document, following references.
///
/// Uses a cache to avoid copying the same object multiple times. A
/// reference is registered before its target is copied, so cycles
/// (`/Parent` links, annotations pointing back at pages) terminate.
pub fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }

            let new_id = output.new_object_id();
            cache.insert(*id, new_id);
            let referenced = source.get_object(*id)?;
            let copied = copy_object_deep(output, source, referenced, cache)?;
            output.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(
            output, source, dict, cache,
        )?)),
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => Ok(Object::Stream(Stream {
            dict: copy_dictionary(output, source, &stream.dict, cache)?,
            content: stream.content.clone(),
            allows_compression: stream.allows_compression,
            start_position: None,
        })),
        // Primitive types: just clone
        _ => Ok(obj.clone()),
    }
}

fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary> {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        // Page links would drag the whole source page tree along
        if key.as_slice() == b"Parent" {
            continue;
        }
        new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    Ok(new_dict)
}

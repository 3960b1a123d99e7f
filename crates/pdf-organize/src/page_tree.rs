//! Page-tree lookups shared by the loader and the encoder

use crate::constants::{DEFAULT_PAGE_DIMENSIONS, MAX_PAGE_TREE_DEPTH};
use crate::types::Rotation;
use lopdf::{Document, Object, ObjectId};

/// Look up `key` on a page, falling back to its ancestors.
pub(crate) fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node_id = page_id;

    for _ in 0..MAX_PAGE_TREE_DEPTH {
        let dict = doc.get_dictionary(node_id).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        node_id = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
    }

    None
}

/// Follow a reference one level, leaving direct objects untouched.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// The page's own /Rotate (possibly inherited), snapped to a quarter turn.
pub(crate) fn intrinsic_rotation(doc: &Document, page_id: ObjectId) -> Rotation {
    let degrees = inherited_attribute(doc, page_id, b"Rotate")
        .and_then(|obj| extract_number(resolve(doc, obj)))
        .map(|degrees| degrees.round() as i64)
        .unwrap_or(0);

    Rotation::from_degrees(degrees).unwrap_or_else(|| {
        log::warn!("Ignoring non-quarter-turn /Rotate {degrees} on page {page_id:?}");
        Rotation::None
    })
}

/// Page size (width, height) in points from the inherited MediaBox.
pub fn page_dimensions(doc: &Document, page_id: ObjectId) -> (f32, f32) {
    let Some(media_box) = inherited_attribute(doc, page_id, b"MediaBox")
        .map(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_array().ok())
    else {
        return DEFAULT_PAGE_DIMENSIONS;
    };

    let coords: Vec<f32> = media_box
        .iter()
        .filter_map(|obj| extract_number(resolve(doc, obj)))
        .collect();
    match coords.as_slice() {
        [x0, y0, x1, y1] => ((x1 - x0).abs(), (y1 - y0).abs()),
        _ => DEFAULT_PAGE_DIMENSIONS,
    }
}

fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

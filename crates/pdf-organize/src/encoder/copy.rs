//! Deep copy of PDF objects between documents

use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Source objects already copied, keyed by (source index, source object id).
pub(super) type CopyCache = HashMap<(usize, ObjectId), ObjectId>;

/// Deep copy an object from `source` into `output`, following references.
///
/// The target id is reserved before recursing, so reference cycles resolve to
/// the object being copied instead of looping.
pub(super) fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    source_index: usize,
    obj: &Object,
    cache: &mut CopyCache,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(&(source_index, *id)) {
                return Ok(Object::Reference(new_id));
            }

            let referenced = source.get_object(*id)?;
            let new_id = output.new_object_id();
            cache.insert((source_index, *id), new_id);

            let copied = copy_object_deep(output, source, source_index, referenced, cache)?;
            output.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(
            output,
            source,
            source_index,
            dict,
            cache,
        )?)),
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, source_index, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => Ok(Object::Stream(Stream {
            dict: copy_dictionary(output, source, source_index, &stream.dict, cache)?,
            content: stream.content.clone(),
            allows_compression: stream.allows_compression,
            start_position: None,
        })),
        // Primitive types: just clone
        _ => Ok(obj.clone()),
    }
}

/// Copy a dictionary's entries.
///
/// Page-tree nodes reached through references (link targets, annotation
/// owners) lose their /Parent so the source's whole page tree is not dragged
/// along.
pub(super) fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    source_index: usize,
    dict: &Dictionary,
    cache: &mut CopyCache,
) -> Result<Dictionary> {
    let skip_parent = is_page_tree_node(dict);
    let mut new_dict = Dictionary::new();

    for (key, value) in dict.iter() {
        if skip_parent && key == b"Parent" {
            continue;
        }
        new_dict.set(
            key.clone(),
            copy_object_deep(output, source, source_index, value, cache)?,
        );
    }

    Ok(new_dict)
}

fn is_page_tree_node(dict: &Dictionary) -> bool {
    matches!(
        dict.get(b"Type"),
        Ok(Object::Name(name)) if name == b"Page" || name == b"Pages"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_objects_are_copied_once() {
        let mut source = Document::with_version("1.7");
        let font_id = source.add_object(Dictionary::from_iter(vec![(
            "Type",
            Object::Name(b"Font".to_vec()),
        )]));
        let array = Object::Array(vec![
            Object::Reference(font_id),
            Object::Reference(font_id),
        ]);

        let mut output = Document::with_version("1.7");
        let mut cache = CopyCache::new();
        let copied = copy_object_deep(&mut output, &source, 0, &array, &mut cache).unwrap();

        let Object::Array(items) = copied else {
            panic!("expected array");
        };
        assert_eq!(
            items[0].as_reference().unwrap(),
            items[1].as_reference().unwrap()
        );
        assert_eq!(output.objects.len(), 1);
    }

    #[test]
    fn self_reference_terminates() {
        let mut source = Document::with_version("1.7");
        let id = source.new_object_id();
        source.objects.insert(
            id,
            Object::Dictionary(Dictionary::from_iter(vec![("Next", Object::Reference(id))])),
        );

        let mut output = Document::with_version("1.7");
        let mut cache = CopyCache::new();
        let copied =
            copy_object_deep(&mut output, &source, 0, &Object::Reference(id), &mut cache).unwrap();

        let Object::Reference(new_id) = copied else {
            panic!("expected reference");
        };
        let dict = output.get_dictionary(new_id).unwrap();
        assert!(matches!(dict.get(b"Next"), Ok(Object::Reference(r)) if *r == new_id));
    }
}

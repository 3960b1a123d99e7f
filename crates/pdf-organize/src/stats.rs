use crate::collection::Collection;
use crate::registry::{Source, SourceRegistry};
use crate::types::*;

/// Calculate statistics for the current editing state
pub fn calculate_statistics(
    collection: &Collection,
    registry: &SourceRegistry,
) -> CollectionStatistics {
    let mut items_per_source = vec![0; registry.len()];
    let mut rotated_items = 0;
    let mut skipped_on_export = 0;

    for item in collection.items() {
        if let Some(count) = items_per_source.get_mut(item.source_index) {
            *count += 1;
        }
        if item.rotation != Rotation::None {
            rotated_items += 1;
        }
        if let Ok(Source::Image(image)) = registry.get(item.source_index) {
            if !image.format.is_embeddable() {
                skipped_on_export += 1;
            }
        }
    }

    let unused_sources = items_per_source.iter().filter(|&&count| count == 0).count();

    CollectionStatistics {
        items: collection.len(),
        sources: registry.len(),
        items_per_source,
        rotated_items,
        selected_items: collection.selection_len(),
        unused_sources,
        skipped_on_export,
    }
}

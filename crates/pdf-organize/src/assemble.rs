//! Rebuild a PDF from the collection
//!
//! Items are processed strictly in order against a single encoder. Each step
//! mutates the one output document, so there is nothing to parallelize: the
//! whole pipeline is a plain loop with exclusive ownership of the encoder.

use crate::collection::{Collection, Item};
use crate::encoder::{DocumentEncoder, ImagePlacement, LopdfEncoder};
use crate::options::ExportOptions;
use crate::registry::{Source, SourceRegistry};
use crate::types::*;
use log::{debug, info, warn};

/// Finished export
#[derive(Debug, Clone)]
pub struct AssembledDocument {
    pub bytes: Vec<u8>,
    /// Pages written to the output
    pub page_count: usize,
    /// Items left out because their format cannot be embedded
    pub skipped: Vec<ItemId>,
}

/// Assemble a snapshot of `items` into a new PDF.
///
/// The work runs on the blocking pool; the caller's collection is not
/// borrowed past this call.
pub async fn assemble(
    items: &[Item],
    registry: &SourceRegistry,
    options: &ExportOptions,
) -> Result<AssembledDocument> {
    options.validate()?;

    let items = items.to_vec();
    let registry = registry.clone();
    let options = options.clone();

    tokio::task::spawn_blocking(move || {
        assemble_with(LopdfEncoder::create(&options), &items, &registry)
    })
    .await?
}

/// Assemble only the selected items, in display order.
pub async fn assemble_selection(
    collection: &Collection,
    registry: &SourceRegistry,
    options: &ExportOptions,
) -> Result<AssembledDocument> {
    let selected: Vec<Item> = collection.selected_items().cloned().collect();
    if selected.is_empty() {
        return Err(OrganizeError::Config("No items selected".to_string()));
    }
    assemble(&selected, registry, options).await
}

/// Run the assembly loop against any encoder.
///
/// Any failure aborts the whole assembly and is reported as
/// [`OrganizeError::Assembly`]; no partial output is returned.
pub fn assemble_with<E: DocumentEncoder>(
    mut encoder: E,
    items: &[Item],
    registry: &SourceRegistry,
) -> Result<AssembledDocument> {
    info!("Assembling {} items from {} sources", items.len(), registry.len());

    let mut page_count = 0;
    let mut skipped = Vec::new();

    for (idx, item) in items.iter().enumerate() {
        let placed = place_item(&mut encoder, item, registry).map_err(|e| {
            OrganizeError::Assembly(format!("page {} (item {}): {}", idx + 1, item.id, e))
        })?;

        if placed {
            page_count += 1;
        } else {
            skipped.push(item.id.clone());
        }
    }

    let bytes = encoder
        .serialize()
        .map_err(|e| OrganizeError::Assembly(format!("serialization: {}", e)))?;

    info!(
        "Assembled {} pages ({} skipped, {} bytes)",
        page_count,
        skipped.len(),
        bytes.len()
    );

    Ok(AssembledDocument {
        bytes,
        page_count,
        skipped,
    })
}

/// Write one item to the output. Returns false when the item was skipped.
fn place_item<E: DocumentEncoder>(
    encoder: &mut E,
    item: &Item,
    registry: &SourceRegistry,
) -> Result<bool> {
    match registry.get(item.source_index)? {
        Source::Pdf(pdf) => {
            debug!(
                "Copying page {} of {} with rotation {}",
                item.original_index + 1,
                pdf.name,
                item.effective_rotation().degrees()
            );
            // Rotation is set on the copy the output owns, never on the source.
            let page = encoder.copy_page(item.source_index, pdf, item.original_index)?;
            encoder.set_rotation(page, item.effective_rotation())?;
            Ok(true)
        }
        Source::Image(image) if !image.format.is_embeddable() => {
            warn!(
                "Skipping {}: {} images cannot be embedded",
                image.name,
                image.format.mime_type()
            );
            Ok(false)
        }
        Source::Image(image) => {
            let rotation = item.effective_rotation();
            debug!("Embedding {} with rotation {}", image.name, rotation.degrees());

            let embedded = encoder.embed_image(image)?;
            let (width, height) = (embedded.width as f32, embedded.height as f32);
            let (page_width, page_height) = if rotation.swaps_dimensions() {
                (height, width)
            } else {
                (width, height)
            };

            let page = encoder.add_page(page_width, page_height)?;
            // Drawing angles run counter-clockwise, stored rotations clockwise.
            encoder.draw_image(
                page,
                embedded.handle,
                ImagePlacement {
                    center: (page_width / 2.0, page_height / 2.0),
                    width,
                    height,
                    angle_degrees: -rotation.degrees(),
                },
            )?;
            Ok(true)
        }
    }
}

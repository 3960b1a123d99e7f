//! `lopdf`-backed document encoder

use super::copy::{CopyCache, copy_object_deep};
use super::xobject::build_image_xobject;
use super::{DocumentEncoder, EmbeddedImage, ImagePlacement};
use crate::constants::{IMAGE_XOBJECT_PREFIX, INHERITABLE_PAGE_KEYS};
use crate::options::ExportOptions;
use crate::page_tree::inherited_attribute;
use crate::registry::{ImageSource, PdfSource};
use crate::types::{Result, Rotation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Builds the output PDF in memory.
///
/// The page tree root is reserved up front; its /Kids and /Count are written
/// once, at serialization.
pub struct LopdfEncoder {
    document: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
    copied: CopyCache,
    images_drawn: usize,
    compress: bool,
    title: Option<String>,
}

impl LopdfEncoder {
    fn append_page(&mut self, page_id: ObjectId, page_dict: Dictionary) {
        self.document
            .objects
            .insert(page_id, Object::Dictionary(page_dict));
        self.kids.push(page_id);
    }
}

impl DocumentEncoder for LopdfEncoder {
    type Page = ObjectId;
    type Image = ObjectId;

    fn create(options: &ExportOptions) -> Self {
        let mut document = Document::with_version(options.pdf_version.as_str());
        let pages_id = document.new_object_id();

        Self {
            document,
            pages_id,
            kids: Vec::new(),
            copied: CopyCache::new(),
            images_drawn: 0,
            compress: options.compress,
            title: options.title.clone(),
        }
    }

    fn copy_page(
        &mut self,
        source_index: usize,
        source: &PdfSource,
        page_index: usize,
    ) -> Result<ObjectId> {
        let doc = &source.document;
        let page_id = source.page_id(page_index)?;
        let page_dict = doc.get_dictionary(page_id)?;

        // Map the source page to its copy first so annotations pointing back
        // at the page land on the copy. A page already reached through a link
        // exists as a detached copy; that object becomes the full page.
        let new_page_id = match self.copied.get(&(source_index, page_id)) {
            Some(&existing) if !self.kids.contains(&existing) => existing,
            _ => {
                let id = self.document.new_object_id();
                self.copied.insert((source_index, page_id), id);
                id
            }
        };

        let mut new_dict = Dictionary::new();
        for (key, value) in page_dict.iter() {
            if key == b"Parent" {
                continue;
            }
            let copied = copy_object_deep(
                &mut self.document,
                doc,
                source_index,
                value,
                &mut self.copied,
            )?;
            new_dict.set(key.clone(), copied);
        }

        // Attributes inherited from the source page tree become explicit.
        for &key in INHERITABLE_PAGE_KEYS {
            if new_dict.has(key) {
                continue;
            }
            if let Some(value) = inherited_attribute(doc, page_id, key) {
                let copied = copy_object_deep(
                    &mut self.document,
                    doc,
                    source_index,
                    value,
                    &mut self.copied,
                )?;
                new_dict.set(key.to_vec(), copied);
            }
        }

        new_dict.set("Parent", Object::Reference(self.pages_id));
        self.append_page(new_page_id, new_dict);
        Ok(new_page_id)
    }

    fn embed_image(&mut self, image: &ImageSource) -> Result<EmbeddedImage<ObjectId>> {
        let xobject = build_image_xobject(image)?;
        let mut stream = xobject.image;

        if let Some(mask) = xobject.soft_mask {
            let mask_id = self.document.add_object(mask);
            stream.dict.set("SMask", Object::Reference(mask_id));
        }

        Ok(EmbeddedImage {
            handle: self.document.add_object(stream),
            width: xobject.width,
            height: xobject.height,
        })
    }

    fn add_page(&mut self, width: f32, height: f32) -> Result<ObjectId> {
        let page_id = self.document.new_object_id();
        let page_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(self.pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(width),
                    Object::Real(height),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
        ]);
        self.append_page(page_id, page_dict);
        Ok(page_id)
    }

    fn draw_image(
        &mut self,
        page: ObjectId,
        image: ObjectId,
        placement: ImagePlacement,
    ) -> Result<()> {
        self.images_drawn += 1;
        let name = format!("{}{}", IMAGE_XOBJECT_PREFIX, self.images_drawn);

        let [a, b, c, d, e, f] = placement.matrix();
        let content = format!("q {a} {b} {c} {d} {e} {f} cm /{name} Do Q\n");
        let content_id = self
            .document
            .add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let page_dict = self.document.get_dictionary_mut(page)?;

        let resources = page_dict.get_mut(b"Resources")?.as_dict_mut()?;
        if !resources.has(b"XObject") {
            resources.set("XObject", Object::Dictionary(Dictionary::new()));
        }
        resources
            .get_mut(b"XObject")?
            .as_dict_mut()?
            .set(name.into_bytes(), Object::Reference(image));

        let drawn = Object::Reference(content_id);
        let contents = match page_dict.get(b"Contents").ok().cloned() {
            Some(Object::Array(mut existing)) => {
                existing.push(drawn);
                existing
            }
            Some(existing) => vec![existing, drawn],
            None => vec![drawn],
        };
        page_dict.set("Contents", Object::Array(contents));

        Ok(())
    }

    fn set_rotation(&mut self, page: ObjectId, rotation: Rotation) -> Result<()> {
        self.document
            .get_dictionary_mut(page)?
            .set("Rotate", Object::Integer(rotation.degrees() as i64));
        Ok(())
    }

    fn serialize(mut self) -> Result<Vec<u8>> {
        let count = self.kids.len() as i64;
        let kids = self.kids.iter().map(|&id| Object::Reference(id)).collect();
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(count)),
        ]);
        self.document
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        let catalog_id = self.document.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_id)),
        ]));
        self.document.trailer.set("Root", catalog_id);

        let mut info = Dictionary::from_iter(vec![(
            "Producer",
            Object::string_literal(concat!("pdf-organize ", env!("CARGO_PKG_VERSION"))),
        )]);
        if let Some(title) = &self.title {
            info.set("Title", Object::string_literal(title.as_str()));
        }
        let info_id = self.document.add_object(info);
        self.document.trailer.set("Info", info_id);

        if self.compress {
            self.document.compress();
        }

        let mut bytes = Vec::new();
        self.document.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

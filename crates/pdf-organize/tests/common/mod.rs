#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use lopdf::{Dictionary, Document, Object, Stream};
use std::io::Cursor;

/// Build a PDF whose page `i` is `600 + i` points wide and `800 + tag` high,
/// so pages can be told apart after reassembly.
pub fn create_test_pdf(tag: usize, num_pages: usize) -> Document {
    create_rotated_test_pdf(tag, num_pages, None)
}

/// Same as [`create_test_pdf`], with an inherited /Rotate on the page tree.
pub fn create_rotated_test_pdf(tag: usize, num_pages: usize, rotate: Option<i64>) -> Document {
    let mut doc = Document::with_version("1.7");

    // Create page tree root ID
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));

    let mut kids = Vec::new();
    for i in 0..num_pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(600 + i as i64),
                    Object::Integer(800 + tag as i64),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    // Resources live on the page tree root and are inherited by every page
    let mut pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
        (
            "Resources",
            Object::Dictionary(Dictionary::from_iter(vec![(
                "Font",
                Object::Dictionary(Dictionary::from_iter(vec![(
                    "F1",
                    Object::Reference(font_id),
                )])),
            )])),
        ),
    ]);
    if let Some(degrees) = rotate {
        pages_dict.set("Rotate", Object::Integer(degrees));
    }
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));

    doc.trailer.set("Root", catalog_id);

    doc
}

/// Two-page PDF whose first page carries a link annotation targeting the second.
pub fn linked_test_pdf(tag: usize) -> Document {
    let mut doc = create_test_pdf(tag, 2);
    let pages: Vec<_> = doc.get_pages().values().copied().collect();

    let link_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Annot".to_vec())),
        ("Subtype", Object::Name(b"Link".to_vec())),
        (
            "Rect",
            Object::Array(vec![
                Object::Integer(10),
                Object::Integer(10),
                Object::Integer(110),
                Object::Integer(30),
            ]),
        ),
        (
            "Dest",
            Object::Array(vec![
                Object::Reference(pages[1]),
                Object::Name(b"Fit".to_vec()),
            ]),
        ),
    ]));
    doc.get_dictionary_mut(pages[0])
        .unwrap()
        .set("Annots", Object::Array(vec![Object::Reference(link_id)]));

    doc
}

pub fn pdf_bytes(tag: usize, num_pages: usize) -> Vec<u8> {
    to_bytes(create_test_pdf(tag, num_pages))
}

pub fn to_bytes(mut doc: Document) -> Vec<u8> {
    let mut writer = Vec::new();
    doc.save_to(&mut writer).unwrap();
    writer
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 40, 40]));
    encode(DynamicImage::ImageRgb8(img), ImageFormat::Png)
}

pub fn png_rgba_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 128]));
    encode(DynamicImage::ImageRgba8(img), ImageFormat::Png)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([40, 200, 40]));
    encode(DynamicImage::ImageRgb8(img), ImageFormat::Jpeg)
}

pub fn webp_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([40, 40, 200, 255]));
    encode(DynamicImage::ImageRgba8(img), ImageFormat::WebP)
}

/// Marker segments of a 4x2 Adobe CMYK JPEG. Enough for the encoder, which
/// passes JPEG data through without decoding it.
pub fn cmyk_jpeg_headers() -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xEE, 0x00, 0x0E];
    bytes.extend_from_slice(b"Adobe");
    bytes.extend_from_slice(&[0x00, 0x64, 0x00, 0x00, 0x00, 0x00, 0x02]);
    bytes.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x14, 0x08, 0x00, 0x02, 0x00, 0x04, 0x04]);
    for id in 1..=4u8 {
        bytes.extend_from_slice(&[id, 0x11, 0x00]);
    }
    bytes.extend_from_slice(&[0xFF, 0xD9]);
    bytes
}

fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

/// (width, height, /Rotate) of every page of a serialized PDF, in order.
pub fn page_summary(bytes: &[u8]) -> Vec<(f32, f32, i64)> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let (width, height) = pdf_organize::page_dimensions(&doc, page_id);
            let rotate = doc
                .get_dictionary(page_id)
                .unwrap()
                .get(b"Rotate")
                .and_then(Object::as_i64)
                .unwrap_or(0);
            (width, height, rotate)
        })
        .collect()
}

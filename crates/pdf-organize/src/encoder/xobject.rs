//! Image XObject construction
//!
//! JPEG data is passed through untouched behind a DCTDecode filter, with the
//! color space taken from the frame header. PNG data is decoded to 8-bit RGB,
//! with the alpha channel split into a soft mask.

use crate::registry::ImageSource;
use crate::types::{ImageFormat, OrganizeError, Result};
use image::ImageFormat as CodecFormat;
use lopdf::{Dictionary, Object, Stream};

/// Image XObject streams ready to be added to a document.
pub(super) struct ImageXObject {
    pub image: Stream,
    pub soft_mask: Option<Stream>,
    pub width: u32,
    pub height: u32,
}

pub(super) fn build_image_xobject(source: &ImageSource) -> Result<ImageXObject> {
    match source.format {
        ImageFormat::Jpeg => jpeg_xobject(source),
        ImageFormat::Png => png_xobject(&source.bytes),
        ImageFormat::Webp => Err(OrganizeError::UnsupportedInput(format!(
            "{}: WEBP images cannot be embedded",
            source.name
        ))),
    }
}

fn jpeg_xobject(source: &ImageSource) -> Result<ImageXObject> {
    let header = read_jpeg_header(&source.bytes).ok_or_else(|| OrganizeError::Load {
        name: source.name.clone(),
        reason: "JPEG frame header not found".to_string(),
    })?;

    let color_space = match header.components {
        1 => "DeviceGray",
        3 => "DeviceRGB",
        4 => "DeviceCMYK",
        n => {
            return Err(OrganizeError::UnsupportedInput(format!(
                "{}: JPEG with {} color components",
                source.name, n
            )));
        }
    };

    let mut dict = image_dictionary(header.width, header.height, color_space);
    dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
    // Adobe-written CMYK JPEGs store inverted samples
    if header.components == 4 && header.adobe {
        dict.set(
            "Decode",
            Object::Array([1, 0, 1, 0, 1, 0, 1, 0].map(Object::Integer).to_vec()),
        );
    }

    Ok(ImageXObject {
        image: Stream::new(dict, source.bytes.clone()).with_compression(false),
        soft_mask: None,
        width: header.width,
        height: header.height,
    })
}

/// Frame facts read from a JPEG's marker segments.
#[derive(Debug, PartialEq)]
struct JpegHeader {
    width: u32,
    height: u32,
    components: u8,
    /// An Adobe APP14 segment precedes the frame
    adobe: bool,
}

/// Walk the marker segments up to the first start-of-frame.
fn read_jpeg_header(bytes: &[u8]) -> Option<JpegHeader> {
    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return None;
    }

    let mut pos = 2;
    let mut adobe = false;
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            return None;
        }
        let marker = bytes[pos + 1];
        match marker {
            // fill byte
            0xFF => {
                pos += 1;
                continue;
            }
            // standalone markers carry no length
            0x01 | 0xD0..=0xD7 => {
                pos += 2;
                continue;
            }
            _ => {}
        }

        let len = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        let segment = bytes.get(pos + 4..pos + 2 + len)?;
        match marker {
            0xEE if segment.starts_with(b"Adobe") => adobe = true,
            // SOF0-SOF15, minus DHT, JPG and DAC
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                let &[_, h0, h1, w0, w1, components, ..] = segment else {
                    return None;
                };
                return Some(JpegHeader {
                    width: u16::from_be_bytes([w0, w1]) as u32,
                    height: u16::from_be_bytes([h0, h1]) as u32,
                    components,
                    adobe,
                });
            }
            // start of scan before any frame
            0xDA => return None,
            _ => {}
        }
        pos += 2 + len;
    }

    None
}

fn png_xobject(bytes: &[u8]) -> Result<ImageXObject> {
    let decoded = image::load_from_memory_with_format(bytes, CodecFormat::Png)?;
    let (width, height) = (decoded.width(), decoded.height());

    if !decoded.color().has_alpha() {
        let rgb = decoded.to_rgb8().into_raw();
        return Ok(ImageXObject {
            image: Stream::new(image_dictionary(width, height, "DeviceRGB"), rgb),
            soft_mask: None,
            width,
            height,
        });
    }

    let rgba = decoded.to_rgba8().into_raw();
    let pixel_count = rgba.len() / 4;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    for pixel in rgba.chunks_exact(4) {
        rgb.extend_from_slice(&pixel[..3]);
        alpha.push(pixel[3]);
    }

    Ok(ImageXObject {
        image: Stream::new(image_dictionary(width, height, "DeviceRGB"), rgb),
        soft_mask: Some(Stream::new(
            image_dictionary(width, height, "DeviceGray"),
            alpha,
        )),
        width,
        height,
    })
}

fn image_dictionary(width: u32, height: u32, color_space: &str) -> Dictionary {
    Dictionary::from_iter(vec![
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Image".to_vec())),
        ("Width", Object::Integer(width as i64)),
        ("Height", Object::Integer(height as i64)),
        ("ColorSpace", Object::Name(color_space.as_bytes().to_vec())),
        ("BitsPerComponent", Object::Integer(8)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Marker segments of a 4x2 JPEG with `components` channels, no entropy data.
    fn jpeg_headers(components: u8, adobe: bool) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8];
        if adobe {
            bytes.extend_from_slice(&[0xFF, 0xEE, 0x00, 0x0E]);
            bytes.extend_from_slice(b"Adobe");
            bytes.extend_from_slice(&[0x00, 0x64, 0x00, 0x00, 0x00, 0x00, 0x02]);
        }
        let sof_len = 8 + 3 * components as u16;
        bytes.extend_from_slice(&[0xFF, 0xC0]);
        bytes.extend_from_slice(&sof_len.to_be_bytes());
        bytes.extend_from_slice(&[0x08, 0x00, 0x02, 0x00, 0x04, components]);
        for id in 1..=components {
            bytes.extend_from_slice(&[id, 0x11, 0x00]);
        }
        bytes.extend_from_slice(&[0xFF, 0xD9]);
        bytes
    }

    fn jpeg_source(bytes: Vec<u8>) -> ImageSource {
        ImageSource {
            name: "scan.jpg".to_string(),
            format: ImageFormat::Jpeg,
            bytes,
        }
    }

    #[test]
    fn reads_frame_header() {
        let header = read_jpeg_header(&jpeg_headers(4, true)).unwrap();
        assert_eq!(
            header,
            JpegHeader {
                width: 4,
                height: 2,
                components: 4,
                adobe: true
            }
        );

        let header = read_jpeg_header(&jpeg_headers(3, false)).unwrap();
        assert_eq!((header.components, header.adobe), (3, false));

        assert!(read_jpeg_header(b"\x89PNG").is_none());
        assert!(read_jpeg_header(&[0xFF, 0xD8, 0xFF, 0xC0, 0x00]).is_none());
    }

    #[test]
    fn cmyk_jpeg_is_labelled_cmyk() {
        let xobject = build_image_xobject(&jpeg_source(jpeg_headers(4, false))).unwrap();
        let dict = &xobject.image.dict;

        assert!(matches!(
            dict.get(b"ColorSpace"),
            Ok(Object::Name(name)) if name == b"DeviceCMYK"
        ));
        assert!(dict.get(b"Decode").is_err());
        assert_eq!((xobject.width, xobject.height), (4, 2));
    }

    #[test]
    fn adobe_cmyk_jpeg_gets_inverted_decode() {
        let xobject = build_image_xobject(&jpeg_source(jpeg_headers(4, true))).unwrap();
        let decode = xobject.image.dict.get(b"Decode").unwrap().as_array().unwrap();

        assert_eq!(decode.len(), 8);
        assert!(matches!(decode[0], Object::Integer(1)));
        assert!(matches!(decode[1], Object::Integer(0)));
    }

    #[test]
    fn gray_and_rgb_jpegs_keep_their_color_space() {
        for (components, expected) in [(1, b"DeviceGray".as_slice()), (3, b"DeviceRGB")] {
            let xobject =
                build_image_xobject(&jpeg_source(jpeg_headers(components, false))).unwrap();
            assert!(matches!(
                xobject.image.dict.get(b"ColorSpace"),
                Ok(Object::Name(name)) if name == expected
            ));
        }
    }
}

//! Image XObject embedding
//!
//! JPEG files are embedded as-is with `DCTDecode`. Everything else is decoded,
//! flattened to 8-bit RGB and stored with `FlateDecode`; an alpha channel
//! becomes a separate soft mask.

use std::collections::HashMap;
use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::{ColorType, DynamicImage, ImageFormat};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::constants::LOW_QUALITY_MAX_PX;
use crate::store::ImageStore;
use crate::types::*;

/// Resolution of embedded images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewQuality {
    /// Images downsampled to `LOW_QUALITY_MAX_PX` on the longest edge
    Low,
    /// Images at full resolution
    #[default]
    High,
}

/// Embeds each image key at most once per output document
pub struct ImageEmbedder {
    quality: PreviewQuality,
    /// `None` remembers a failed key so it is not decoded again
    embedded: HashMap<String, Option<ObjectId>>,
}

impl ImageEmbedder {
    pub fn new(quality: PreviewQuality) -> Self {
        Self {
            quality,
            embedded: HashMap::new(),
        }
    }

    /// XObject for `key`, embedding it on first use.
    ///
    /// Returns `None` when the image is missing or cannot be decoded; the
    /// failure is logged once.
    pub fn xobject_for(
        &mut self,
        output: &mut Document,
        store: &dyn ImageStore,
        key: &str,
    ) -> Option<ObjectId> {
        if let Some(cached) = self.embedded.get(key) {
            return *cached;
        }

        let result = match store.resolve(key) {
            Some(bytes) => match embed_image(output, &bytes, self.quality) {
                Ok(id) => Some(id),
                Err(e) => {
                    log::warn!("Skipping image {}: {}", key, e);
                    None
                }
            },
            None => {
                log::warn!("Image {} not found, leaving tile blank", key);
                None
            }
        };

        self.embedded.insert(key.to_string(), result);
        result
    }
}

/// Add an image XObject for encoded image bytes to `output`
pub fn embed_image(
    output: &mut Document,
    bytes: &[u8],
    quality: PreviewQuality,
) -> Result<ObjectId> {
    let format = image::guess_format(bytes)?;
    let mut decoded = image::load_from_memory_with_format(bytes, format)?;

    let (width, height) = (decoded.width(), decoded.height());
    if width == 0 || height == 0 {
        return Err(SheetError::UnusableImage("image has no pixels".to_string()));
    }

    if quality == PreviewQuality::Low && width.max(height) > LOW_QUALITY_MAX_PX {
        decoded = decoded.thumbnail(LOW_QUALITY_MAX_PX, LOW_QUALITY_MAX_PX);
    } else if format == ImageFormat::Jpeg {
        if let Some(color_space) = jpeg_color_space(decoded.color()) {
            let stream = image_stream(width, height, color_space, "DCTDecode", bytes.to_vec());
            return Ok(output.add_object(stream));
        }
    }

    embed_decoded(output, &decoded)
}

fn jpeg_color_space(color: ColorType) -> Option<&'static str> {
    match color {
        ColorType::L8 => Some("DeviceGray"),
        ColorType::Rgb8 => Some("DeviceRGB"),
        _ => None,
    }
}

fn embed_decoded(output: &mut Document, decoded: &DynamicImage) -> Result<ObjectId> {
    let (width, height) = (decoded.width(), decoded.height());

    if !decoded.color().has_alpha() {
        let rgb = decoded.to_rgb8().into_raw();
        let stream = image_stream(width, height, "DeviceRGB", "FlateDecode", deflate(&rgb)?);
        return Ok(output.add_object(stream));
    }

    let rgba = decoded.to_rgba8();
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
    }

    let mask = image_stream(width, height, "DeviceGray", "FlateDecode", deflate(&alpha)?);
    let mask_id = output.add_object(mask);

    let mut stream = image_stream(width, height, "DeviceRGB", "FlateDecode", deflate(&rgb)?);
    stream.dict.set("SMask", Object::Reference(mask_id));
    Ok(output.add_object(stream))
}

fn image_stream(
    width: u32,
    height: u32,
    color_space: &str,
    filter: &str,
    data: Vec<u8>,
) -> Stream {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(width as i64));
    dict.set("Height", Object::Integer(height as i64));
    dict.set("ColorSpace", Object::Name(color_space.as_bytes().to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict.set("Filter", Object::Name(filter.as_bytes().to_vec()));
    Stream::new(dict, data).with_compression(false)
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

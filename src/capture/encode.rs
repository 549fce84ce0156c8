//! Image encoding for thumbnails, clipboard and downloads.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};

use crate::config::ImageFormat;
use crate::error::{PageSnapError, PageSnapResult};

/// Encoded image bytes plus their format.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl EncodedImage {
    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime(), STANDARD.encode(&self.bytes))
    }
}

/// Encode `image` as `format`. `quality` (1-100) only applies to JPEG;
/// WebP is written lossless.
pub fn encode_image(image: &RgbaImage, format: ImageFormat, quality: u8) -> PageSnapResult<EncodedImage> {
    let mut buffer = Cursor::new(Vec::new());
    let dynamic = DynamicImage::ImageRgba8(image.clone());

    match format {
        ImageFormat::Png => dynamic
            .write_to(&mut buffer, image::ImageFormat::Png)
            .map_err(|e| PageSnapError::Encoding(format!("PNG: {}", e)))?,
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = dynamic.to_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
            rgb.write_with_encoder(encoder)
                .map_err(|e| PageSnapError::Encoding(format!("JPEG: {}", e)))?
        }
        ImageFormat::Webp => dynamic
            .write_to(&mut buffer, image::ImageFormat::WebP)
            .map_err(|e| PageSnapError::Encoding(format!("WebP: {}", e)))?,
    }

    Ok(EncodedImage {
        bytes: buffer.into_inner(),
        format,
    })
}

/// Decode a `data:image/...;base64,` URL (as returned by the browser's
/// screenshot API) into RGBA pixels.
pub fn decode_data_url(url: &str) -> PageSnapResult<RgbaImage> {
    let payload = url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, data)| data)
        .ok_or_else(|| PageSnapError::Image("not a base64 data URL".to_string()))?;

    let bytes = STANDARD.decode(payload)?;
    let image = image::load_from_memory(&bytes)?;
    Ok(image.to_rgba8())
}

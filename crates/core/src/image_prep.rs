//! Best-effort downscaling of photos before upload.
//!
//! Large phone photos are a common cause of rejected uploads, so the
//! registration workflow shrinks them so the longest edge is at most
//! [`MAX_EDGE_PX`] and re-encodes them as JPEG at [`JPEG_QUALITY`]. If the
//! bytes cannot be decoded or encoded the original file is used unchanged.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

/// Longest edge allowed after preparation, in pixels.
pub const MAX_EDGE_PX: u32 = 1024;

/// JPEG quality factor used when re-encoding.
pub const JPEG_QUALITY: u8 = 80;

const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// An image file about to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Result of [`prepare_for_upload`].
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub upload: ImageUpload,
    /// `true` if the bytes were re-encoded, `false` if the original is used.
    pub reencoded: bool,
    /// Why preparation fell back to the original, if it did.
    pub fallback_reason: Option<String>,
}

/// Downscale and re-encode `original`, falling back to it on any failure.
pub fn prepare_for_upload(original: &ImageUpload) -> PreparedImage {
    match downscale_to_jpeg(&original.bytes) {
        Ok(bytes) => PreparedImage {
            upload: ImageUpload {
                file_name: jpeg_file_name(&original.file_name),
                content_type: JPEG_CONTENT_TYPE.to_string(),
                bytes,
            },
            reencoded: true,
            fallback_reason: None,
        },
        Err(e) => PreparedImage {
            upload: original.clone(),
            reencoded: false,
            fallback_reason: Some(e.to_string()),
        },
    }
}

/// Decode `bytes`, shrink so the longest edge fits [`MAX_EDGE_PX`], and
/// encode as JPEG.
pub fn downscale_to_jpeg(bytes: &[u8]) -> Result<Vec<u8>, image::ImageError> {
    let img = image::load_from_memory(bytes)?;
    let img = fit_within(img, MAX_EDGE_PX);

    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut out = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)?;
    Ok(out.into_inner())
}

/// Scale `img` down (never up) so both edges are at most `max_edge`,
/// preserving the aspect ratio.
fn fit_within(img: DynamicImage, max_edge: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width.max(height) <= max_edge {
        return img;
    }
    img.resize(max_edge, max_edge, FilterType::Triangle)
}

/// Replace the extension of `file_name` with `.jpg`.
fn jpeg_file_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("photo");
    format!("{stem}.jpg")
}

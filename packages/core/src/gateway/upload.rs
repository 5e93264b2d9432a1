//! Image preparation for upload.
//!
//! Everything here runs before any network I/O, so unreadable or undecodable
//! images fail fast with [`GatewayError::Decode`].

use crate::error::{GatewayError, GatewayResult};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use xray_lens_types::ImageInput;

/// Image bytes ready to go out as the `file` form field
#[derive(Debug, Clone)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Read and validate the image, shrinking it when its longest edge exceeds `max_edge`
pub async fn prepare_upload(image: &ImageInput, max_edge: Option<u32>) -> GatewayResult<Upload> {
    let file_name = image.file_name();
    let mime = image.mime_type();

    let raw = match image {
        ImageInput::Path(path) => tokio::fs::read(path).await.map_err(|e| {
            GatewayError::Decode(format!("Failed to read {}: {}", path.display(), e))
        })?,
        ImageInput::Buffer { bytes, .. } => bytes.to_vec(),
    };

    if raw.is_empty() {
        return Err(GatewayError::Decode(format!("Image '{}' is empty", file_name)));
    }

    tokio::task::spawn_blocking(move || encode_for_upload(raw, file_name, mime, max_edge))
        .await
        .map_err(|e| GatewayError::Decode(format!("Image task join error: {}", e)))?
}

fn encode_for_upload(
    raw: Vec<u8>,
    file_name: String,
    mime: &'static str,
    max_edge: Option<u32>,
) -> GatewayResult<Upload> {
    let decoded = image::load_from_memory(&raw)
        .map_err(|e| GatewayError::Decode(format!("Failed to decode '{}': {}", file_name, e)))?;
    let (width, height) = decoded.dimensions();

    let edge = match max_edge {
        Some(edge) if width.max(height) > edge => edge,
        _ => {
            return Ok(Upload {
                bytes: raw,
                file_name,
                mime,
                width,
                height,
            });
        }
    };

    let resized = decoded.resize(edge, edge, FilterType::Triangle);
    let (format, resized) = if mime == "image/png" {
        (ImageFormat::Png, resized)
    } else {
        // JPEG has no alpha channel
        (ImageFormat::Jpeg, DynamicImage::ImageRgb8(resized.to_rgb8()))
    };

    let mut out = Cursor::new(Vec::new());
    resized
        .write_to(&mut out, format)
        .map_err(|e| GatewayError::Decode(format!("Failed to re-encode '{}': {}", file_name, e)))?;

    let (new_width, new_height) = resized.dimensions();
    tracing::debug!(
        file = %file_name,
        from = %format!("{}x{}", width, height),
        to = %format!("{}x{}", new_width, new_height),
        "Downscaled image for upload"
    );

    Ok(Upload {
        bytes: out.into_inner(),
        file_name,
        mime,
        width: new_width,
        height: new_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 30, 30]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn test_small_image_is_sent_untouched() {
        let raw = png_bytes(32, 16);
        let upload = prepare_upload(&ImageInput::from_bytes(raw.clone(), "red.png"), Some(1024))
            .await
            .unwrap();
        assert_eq!(upload.bytes, raw);
        assert_eq!(upload.mime, "image/png");
        assert_eq!((upload.width, upload.height), (32, 16));
    }

    #[tokio::test]
    async fn test_large_image_is_downscaled_keeping_aspect() {
        let raw = png_bytes(400, 200);
        let upload = prepare_upload(&ImageInput::from_bytes(raw, "wide.jpg"), Some(100))
            .await
            .unwrap();
        assert_eq!((upload.width, upload.height), (100, 50));
        assert_eq!(upload.mime, "image/jpeg");
        assert_eq!(
            image::guess_format(&upload.bytes).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[tokio::test]
    async fn test_garbage_is_a_decode_error() {
        let err = prepare_upload(
            &ImageInput::from_bytes(b"This is not an image".to_vec(), "notes.txt"),
            None,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), "decode");
    }

    #[tokio::test]
    async fn test_missing_file_is_a_decode_error() {
        let err = prepare_upload(&ImageInput::from_uri("file:///does/not/exist.jpg"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Decode(ref m) if m.contains("exist.jpg")));
    }

    #[tokio::test]
    async fn test_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        std::fs::write(&path, png_bytes(8, 8)).unwrap();
        let upload = prepare_upload(&ImageInput::from(path), None).await.unwrap();
        assert_eq!(upload.file_name, "shot.png");
        assert_eq!((upload.width, upload.height), (8, 8));
    }
}

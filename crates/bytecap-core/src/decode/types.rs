//! Core types for source decoding.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for source decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// No bytes were supplied.
    #[error("Empty image data")]
    Empty,

    /// The container format is not recognized or not supported.
    #[error("Invalid or unsupported image format")]
    UnsupportedFormat,

    /// The image header declares more pixels than the configured limit.
    #[error("Image too large: {width}x{height} exceeds the limit of {max_pixels} pixels")]
    TooLarge {
        width: u32,
        height: u32,
        max_pixels: u64,
    },

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    Corrupted(String),
}

/// Container format of a source image or of an encoded output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Jpeg,
    Png,
    Webp,
    Tiff,
    Bmp,
    Gif,
}

impl ImageKind {
    /// Map the `image` crate's detected format onto the formats we handle.
    pub fn from_image_format(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Jpeg => Some(ImageKind::Jpeg),
            image::ImageFormat::Png => Some(ImageKind::Png),
            image::ImageFormat::WebP => Some(ImageKind::Webp),
            image::ImageFormat::Tiff => Some(ImageKind::Tiff),
            image::ImageFormat::Bmp => Some(ImageKind::Bmp),
            image::ImageFormat::Gif => Some(ImageKind::Gif),
            _ => None,
        }
    }

    /// Guess the kind from a file extension (case-insensitive, without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            "png" => Some(ImageKind::Png),
            "webp" => Some(ImageKind::Webp),
            "tif" | "tiff" => Some(ImageKind::Tiff),
            "bmp" => Some(ImageKind::Bmp),
            "gif" => Some(ImageKind::Gif),
            _ => None,
        }
    }

    /// Canonical file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
            ImageKind::Webp => "webp",
            ImageKind::Tiff => "tiff",
            ImageKind::Bmp => "bmp",
            ImageKind::Gif => "gif",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::Webp => "image/webp",
            ImageKind::Tiff => "image/tiff",
            ImageKind::Bmp => "image/bmp",
            ImageKind::Gif => "image/gif",
        }
    }
}

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (flip horizontal + rotate 270 CW).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (flip horizontal + rotate 90 CW).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            1 => Orientation::Normal,
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// A decoded image ready for size-bounded encoding.
///
/// Holds the pixels, the container it came from, and (when decoded from a
/// file) the original encoded bytes so an already-small file can be passed
/// through untouched.
#[derive(Debug, Clone)]
pub struct SourceImage {
    image: DynamicImage,
    kind: ImageKind,
    original: Option<Vec<u8>>,
    orientation: Orientation,
}

impl SourceImage {
    /// Wrap pixels that did not come from an encoded file.
    ///
    /// `kind` selects the fallback chain; there is no original to keep, so
    /// the short-circuit never applies.
    pub fn from_image(image: DynamicImage, kind: ImageKind) -> Self {
        Self {
            image,
            kind,
            original: None,
            orientation: Orientation::Normal,
        }
    }

    pub(crate) fn from_decoded(
        image: DynamicImage,
        kind: ImageKind,
        original: Vec<u8>,
        orientation: Orientation,
    ) -> Self {
        Self {
            image,
            kind,
            original: Some(original),
            orientation,
        }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn kind(&self) -> ImageKind {
        self.kind
    }

    /// The encoded bytes this image was decoded from, if any.
    pub fn original_bytes(&self) -> Option<&[u8]> {
        self.original.as_deref()
    }

    /// The EXIF orientation that was applied to the pixels during decoding.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn has_alpha(&self) -> bool {
        self.image.color().has_alpha()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_from_u32() {
        assert_eq!(Orientation::from(1), Orientation::Normal);
        assert_eq!(Orientation::from(6), Orientation::Rotate90CW);
        assert_eq!(Orientation::from(99), Orientation::Normal); // Invalid defaults to Normal
    }

    #[test]
    fn test_image_kind_from_extension() {
        assert_eq!(ImageKind::from_extension("JPG"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_extension("jpeg"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_extension("tif"), Some(ImageKind::Tiff));
        assert_eq!(ImageKind::from_extension("psd"), None);
    }

    #[test]
    fn test_image_kind_extension_and_mime() {
        assert_eq!(ImageKind::Jpeg.extension(), "jpg");
        assert_eq!(ImageKind::Webp.mime_type(), "image/webp");
        assert_eq!(
            ImageKind::from_image_format(image::ImageFormat::Png),
            Some(ImageKind::Png)
        );
        assert_eq!(ImageKind::from_image_format(image::ImageFormat::Ico), None);
    }

    #[test]
    fn test_source_image_from_image() {
        let img = DynamicImage::new_rgba8(40, 30);
        let source = SourceImage::from_image(img, ImageKind::Png);

        assert_eq!(source.width(), 40);
        assert_eq!(source.height(), 30);
        assert!(source.has_alpha());
        assert!(source.original_bytes().is_none());
        assert_eq!(source.orientation(), Orientation::Normal);
    }

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::TooLarge {
            width: 10,
            height: 10,
            max_pixels: 50,
        };
        assert_eq!(
            err.to_string(),
            "Image too large: 10x10 exceeds the limit of 50 pixels"
        );

        let err = DecodeError::UnsupportedFormat;
        assert_eq!(err.to_string(), "Invalid or unsupported image format");
    }
}

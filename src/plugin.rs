//! Image-format glue: recognising WebP data, and picking the right channel layout
//! when opening or saving an image.

use log::debug;

use crate::{
    ColorLayout, DecodedImage, EncodeOptions, Error, Image, Result,
    bindings::{LibWebp, NativeCodec},
    decode::{decode_with, probe_with},
    encode::encode_with,
};

pub const FORMAT: &str = "WEBP";
pub const FORMAT_DESCRIPTION: &str = "WebP image";
pub const EXTENSION: &str = ".webp";
pub const MIME_TYPE: &str = "image/webp";
pub const DEFAULT_QUALITY: f32 = 80.0;

/// Whether `prefix` starts like a WebP file: a RIFF container of form type `WEBP`.
pub fn accept(prefix: &[u8]) -> bool {
    prefix.len() >= 12 && &prefix[..4] == b"RIFF" && &prefix[8..12] == b"WEBP"
}

/// Decodes `raw` as RGBA when the header advertises alpha, as RGB otherwise.
pub fn open_with<C: NativeCodec + ?Sized>(codec: &C, raw: &[u8]) -> Result<DecodedImage> {
    let features = probe_with(codec, raw)?;
    let layout = if features.has_alpha {
        ColorLayout::Rgba
    } else {
        ColorLayout::Rgb
    };
    debug!(
        "opening {}x{} WebP as {}",
        features.width, features.height, layout
    );

    let decoded = decode_with(codec, raw, layout)?;
    if (decoded.width, decoded.height) != (features.width, features.height) {
        return Err(Error::DimensionMismatch {
            expected: (features.width, features.height),
            actual: (decoded.width, decoded.height),
        });
    }
    Ok(decoded)
}

pub fn open(raw: &[u8]) -> Result<DecodedImage> {
    open_with(&LibWebp, raw)
}

/// Encodes a tightly packed RGB or RGBA buffer.
pub fn save_with<C: NativeCodec + ?Sized>(
    codec: &C,
    pixels: &[u8],
    width: u32,
    height: u32,
    layout: ColorLayout,
    options: &EncodeOptions,
) -> Result<Vec<u8>> {
    let image = Image::packed(pixels, width, height, layout);
    encode_with(codec, &image, options)
}

/// Encodes a packed buffer described by a mode string such as `"RGB"` or `"RGBA"`.
pub fn save(
    pixels: &[u8],
    width: u32,
    height: u32,
    mode: &str,
    options: &EncodeOptions,
) -> Result<Vec<u8>> {
    let layout: ColorLayout = mode.parse()?;
    save_with(&LibWebp, pixels, width, height, layout, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_riff_webp_header() {
        let mut header = b"RIFF".to_vec();
        header.extend_from_slice(&[0x24, 0, 0, 0]);
        header.extend_from_slice(b"WEBPVP8 ");
        assert!(accept(&header));
    }

    #[test]
    fn rejects_other_containers() {
        assert!(!accept(b"RIFF\x24\x00\x00\x00WAVEfmt "));
        assert!(!accept(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR"));
        assert!(!accept(b"RIFF"));
        assert!(!accept(b""));
    }

    #[test]
    fn save_rejects_unknown_modes() {
        let err = save(&[0; 4], 2, 2, "L", &EncodeOptions::default()).unwrap_err();
        assert_eq!(err, Error::UnsupportedMode("L".into()));
    }

    #[test]
    fn default_quality_matches_options() {
        assert_eq!(EncodeOptions::default().quality, DEFAULT_QUALITY);
    }
}

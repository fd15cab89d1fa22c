use crate::{
    BitstreamFeatures, BitstreamFormat, ColorLayout, DecodedImage, Error, MAX_DIMENSION,
    NativeBuffer, Result,
    bindings::{LibWebp, NativeCodec},
};
use log::{debug, warn};
use std::{io::Read, path::Path};

fn checked_dimension(width: i32, height: i32) -> Result<(u32, u32)> {
    let in_range = |v: i32| (1..=MAX_DIMENSION).contains(&v);
    if in_range(width) && in_range(height) {
        Ok((width as u32, height as u32))
    } else {
        Err(Error::DimensionsOutOfRange { width, height })
    }
}

/// Decodes a bitstream with the given native codec.
///
/// The bitstream is not pre-validated: malformed input is left for the native
/// decoder to reject.
pub fn decode_with<C: NativeCodec + ?Sized>(
    codec: &C,
    data: &[u8],
    layout: ColorLayout,
) -> Result<DecodedImage> {
    let (ptr, width, height) = codec.decode(layout, data);
    if ptr.is_null() {
        debug!("native {} decode of {} bytes failed", layout, data.len());
        return Err(Error::NativeDecodeFailed);
    }

    // The length is not reported by the decoder, it follows from the dimensions.
    // The dimensions are checked first so the derived length is one libwebp can
    // actually have allocated.
    let (width, height) = match checked_dimension(width, height) {
        Ok(dims) => dims,
        Err(err) => {
            warn!("native decoder reported {}x{}, discarding output", width, height);
            // SAFETY: the pointer came from the codec and is released without being read.
            drop(unsafe { NativeBuffer::from_raw(codec, ptr, 0) });
            return Err(err);
        }
    };
    let len = width as usize * height as usize * layout.channels();

    // SAFETY: the decoder contract guarantees `width * height * channels` bytes.
    let buffer = unsafe { NativeBuffer::from_raw(codec, ptr, len) }
        .ok_or(Error::NativeDecodeFailed)?;
    debug!("decoded {}x{} {}", width, height, layout);

    Ok(DecodedImage {
        pixels: buffer.into_vec(),
        width,
        height,
        layout,
    })
}

pub fn decode_from_memory(data: &[u8], layout: ColorLayout) -> Result<DecodedImage> {
    decode_with(&LibWebp, data, layout)
}

pub fn decode_rgb(data: &[u8]) -> Result<DecodedImage> {
    decode_from_memory(data, ColorLayout::Rgb)
}

pub fn decode_rgba(data: &[u8]) -> Result<DecodedImage> {
    decode_from_memory(data, ColorLayout::Rgba)
}

pub fn decode_file(path: impl AsRef<Path>, layout: ColorLayout) -> Result<DecodedImage> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|_| Error::FileNotFound)?;
    decode_from_reader(file, layout)
}

pub fn decode_from_reader(reader: impl Read, layout: ColorLayout) -> Result<DecodedImage> {
    let mut data = Vec::new();
    let mut reader = std::io::BufReader::new(reader);
    reader.read_to_end(&mut data).map_err(|_| Error::IoError)?;
    decode_from_memory(&data, layout)
}

/// Reads width, height and alpha presence from the bitstream header without
/// decoding any pixels.
pub fn probe_with<C: NativeCodec + ?Sized>(codec: &C, data: &[u8]) -> Result<BitstreamFeatures> {
    let features = codec.features(data).map_err(|status| {
        debug!("bitstream inspection failed with status {}", status);
        Error::MalformedBitstream(status)
    })?;
    // Animated canvases may exceed the decode limit; the header is reported as is.
    let width = u32::try_from(features.width).unwrap_or(0);
    let height = u32::try_from(features.height).unwrap_or(0);

    Ok(BitstreamFeatures {
        width,
        height,
        has_alpha: features.has_alpha,
        has_animation: features.has_animation,
        format: BitstreamFormat::from(features.format),
    })
}

pub fn get_features(data: &[u8]) -> Result<BitstreamFeatures> {
    probe_with(&LibWebp, data)
}

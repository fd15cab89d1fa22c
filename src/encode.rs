use std::{io::Write, path::Path};

use libc::c_int;
use log::debug;

use crate::{
    ColorLayout, EncodeOptions, Error, Image, NativeBuffer, Result,
    bindings::{LibWebp, NativeCodec},
};

fn to_c_int(value: impl TryInto<c_int>, what: &str) -> Result<c_int> {
    value
        .try_into()
        .map_err(|_| Error::InvalidArgument(format!("{what} does not fit in a C int")))
}

/// Checks the buffer against its declared geometry and returns the byte count the
/// native encoder will read.
fn required_len(image: &Image<'_>) -> Result<usize> {
    let required = image
        .stride_in_bytes
        .checked_mul(image.height as usize)
        .ok_or_else(|| Error::InvalidArgument("buffer size overflow".into()))?;
    if required > image.pixels.len() {
        return Err(Error::BufferTooSmall {
            required,
            actual: image.pixels.len(),
        });
    }
    let row = (image.width as usize)
        .checked_mul(image.layout.channels())
        .ok_or_else(|| Error::InvalidArgument("row size overflow".into()))?;
    if image.height > 0 && image.stride_in_bytes < row {
        return Err(Error::InvalidArgument(format!(
            "stride {} is shorter than a {} row of {} bytes",
            image.stride_in_bytes, image.layout, row
        )));
    }
    Ok(required)
}

/// Encodes `image` with the given native codec.
///
/// The buffer is validated before the codec is touched; a rejected buffer never
/// reaches the native layer.
pub fn encode_with<C: NativeCodec + ?Sized>(
    codec: &C,
    image: &Image<'_>,
    options: &EncodeOptions,
) -> Result<Vec<u8>> {
    required_len(image)?;
    let width = to_c_int(image.width, "width")?;
    let height = to_c_int(image.height, "height")?;
    let stride = to_c_int(image.stride_in_bytes, "stride")?;

    debug!(
        "encoding {}x{} {} (stride {}) at quality {}",
        width, height, image.layout, stride, options.quality
    );
    // SAFETY: `required_len` established `stride * height <= pixels.len()` and
    // `stride >= width * channels`.
    let (ptr, size) = unsafe {
        codec.encode(
            image.layout,
            image.pixels,
            width,
            height,
            stride,
            options.quality,
        )
    };
    // SAFETY: the codec just handed us this pointer and nothing else holds it.
    let output = unsafe { NativeBuffer::from_raw(codec, ptr, size) };
    match output {
        Some(buffer) if size > 0 => {
            debug!("encoded {} bytes", buffer.len());
            Ok(buffer.into_vec())
        }
        _ => Err(Error::NativeEncodeFailed),
    }
}

pub fn encode_to_memory(image: &Image<'_>, options: &EncodeOptions) -> Result<Vec<u8>> {
    encode_with(&LibWebp, image, options)
}

pub fn encode_rgb(
    pixels: &[u8],
    width: u32,
    height: u32,
    stride: usize,
    quality: f32,
) -> Result<Vec<u8>> {
    let image = Image {
        pixels,
        width,
        height,
        layout: ColorLayout::Rgb,
        stride_in_bytes: stride,
    };
    encode_to_memory(&image, &EncodeOptions { quality })
}

pub fn encode_rgba(
    pixels: &[u8],
    width: u32,
    height: u32,
    stride: usize,
    quality: f32,
) -> Result<Vec<u8>> {
    let image = Image {
        pixels,
        width,
        height,
        layout: ColorLayout::Rgba,
        stride_in_bytes: stride,
    };
    encode_to_memory(&image, &EncodeOptions { quality })
}

pub fn encode_to_writer(
    image: &Image<'_>,
    options: &EncodeOptions,
    writer: impl Write,
) -> Result<Vec<u8>> {
    let encoded = encode_to_memory(image, options)?;
    let mut writer = std::io::BufWriter::new(writer);
    writer.write_all(&encoded).map_err(|_| Error::IoError)?;
    writer.flush().map_err(|_| Error::IoError)?;
    Ok(encoded)
}

pub fn encode_to_file(
    image: &Image<'_>,
    options: &EncodeOptions,
    path: impl AsRef<Path>,
) -> Result<Vec<u8>> {
    let file = std::fs::File::create(path).map_err(|_| Error::IoError)?;
    encode_to_writer(image, options, file)
}

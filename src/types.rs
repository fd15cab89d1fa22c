use std::{fmt, ptr::NonNull, str::FromStr};

use crate::bindings::NativeCodec;

/// Largest width or height libwebp will ever report for a still image.
pub const MAX_DIMENSION: i32 = 16383;

/// Represents errors that can occur while crossing into or out of libwebp.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A parameter could not be turned into something the native call accepts.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// The pixel buffer is shorter than `stride * height`.
    #[error("Pixel buffer too small: {required} bytes required, {actual} provided")]
    BufferTooSmall { required: usize, actual: usize },
    /// The native encoder produced no output.
    #[error("Native encode failed")]
    NativeEncodeFailed,
    /// The native decoder returned no pixel buffer.
    #[error("Native decode failed")]
    NativeDecodeFailed,
    /// The bitstream inspector rejected the input. Carries the VP8 status code.
    #[error("Malformed bitstream: status {0}")]
    MalformedBitstream(i32),
    /// The native decoder reported dimensions outside what a WebP image can hold.
    #[error("Decoded dimensions out of range: {width}x{height}")]
    DimensionsOutOfRange { width: i32, height: i32 },
    /// Decoded dimensions disagree with the ones the bitstream header advertised.
    #[error("Dimension mismatch: header says {expected:?}, decoder produced {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    /// Only RGB and RGBA can be written.
    #[error("cannot write mode {0} as WEBP")]
    UnsupportedMode(String),
    /// The specified file could not be found.
    #[error("File not found")]
    FileNotFound,
    /// An I/O error occurred during file reading or writing.
    #[error("I/O error occurred")]
    IoError,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Pixel layout of an uncompressed buffer. Selects which native entry point is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorLayout {
    /// 3 bytes per pixel: R, G, B.
    Rgb,
    /// 4 bytes per pixel: R, G, B, then A (non-premultiplied).
    Rgba,
}

impl ColorLayout {
    pub const fn channels(self) -> usize {
        match self {
            ColorLayout::Rgb => 3,
            ColorLayout::Rgba => 4,
        }
    }

    pub const fn has_alpha(self) -> bool {
        matches!(self, ColorLayout::Rgba)
    }

    pub const fn mode(self) -> &'static str {
        match self {
            ColorLayout::Rgb => "RGB",
            ColorLayout::Rgba => "RGBA",
        }
    }
}

impl fmt::Display for ColorLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mode())
    }
}

impl FromStr for ColorLayout {
    type Err = Error;

    fn from_str(mode: &str) -> Result<Self> {
        if mode.eq_ignore_ascii_case("rgb") {
            Ok(ColorLayout::Rgb)
        } else if mode.eq_ignore_ascii_case("rgba") {
            Ok(ColorLayout::Rgba)
        } else {
            Err(Error::UnsupportedMode(mode.to_string()))
        }
    }
}

/// Represents an uncompressed image borrowed from the caller.
///
/// The lifetime parameter `'data` ensures that this struct does not outlive the
/// data it points to. The buffer is never written to.
#[derive(Debug, Clone)]
pub struct Image<'data> {
    /// Raw pixel data.
    pub pixels: &'data [u8],
    /// Width of the image in pixels.
    pub width: u32,
    /// Height of the image in pixels.
    pub height: u32,
    /// Channel layout of the pixel data.
    pub layout: ColorLayout,
    /// Stride (or row size) in bytes for the pixel data.
    pub stride_in_bytes: usize,
}

impl<'data> Image<'data> {
    /// Describes a tightly packed buffer (`stride == width * channels`).
    pub fn packed(pixels: &'data [u8], width: u32, height: u32, layout: ColorLayout) -> Self {
        Image {
            pixels,
            width,
            height,
            layout,
            // saturates so an oversized row is rejected as BufferTooSmall
            stride_in_bytes: (width as usize).saturating_mul(layout.channels()),
        }
    }
}

/// A decoded image whose pixels are owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Exactly `width * height * layout.channels()` bytes, rows packed.
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub layout: ColorLayout,
}

/// Compression flavour advertised in the bitstream header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitstreamFormat {
    /// Mixed, or not determinable from the header (e.g. animations).
    Undefined,
    Lossy,
    Lossless,
}

impl From<i32> for BitstreamFormat {
    fn from(value: i32) -> Self {
        match value {
            1 => BitstreamFormat::Lossy,
            2 => BitstreamFormat::Lossless,
            _ => BitstreamFormat::Undefined,
        }
    }
}

/// Header-level description of a bitstream, obtained without decoding pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitstreamFeatures {
    pub width: u32,
    pub height: u32,
    pub has_alpha: bool,
    pub has_animation: bool,
    pub format: BitstreamFormat,
}

/// Options for controlling the encoding process.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeOptions {
    /// Quality factor handed straight to libwebp, nominally 0.0 to 100.0.
    /// Out-of-range values are the encoder's business. Defaults to 80.0.
    pub quality: f32,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions { quality: 80.0 }
    }
}

/// A heap buffer allocated by the native codec.
///
/// Holding one means holding the only right to release it; the release happens in
/// `Drop`, so every exit path frees it exactly once.
pub struct NativeBuffer<'c, C: NativeCodec + ?Sized> {
    ptr: NonNull<u8>,
    len: usize,
    codec: &'c C,
}

impl<'c, C: NativeCodec + ?Sized> NativeBuffer<'c, C> {
    /// Takes ownership of `ptr`. Returns `None` for a null pointer.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `codec`, must not be owned by anything
    /// else, and must be valid for reads of `len` bytes.
    pub unsafe fn from_raw(codec: &'c C, ptr: *mut u8, len: usize) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| NativeBuffer { ptr, len, codec })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: validity for `len` bytes is a precondition of `from_raw`.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Copies the bytes into caller-owned storage and releases the native buffer.
    pub fn into_vec(self) -> Vec<u8> {
        self.as_slice().to_vec()
    }
}

impl<C: NativeCodec + ?Sized> Drop for NativeBuffer<'_, C> {
    fn drop(&mut self) {
        unsafe { self.codec.release(self.ptr.as_ptr()) }
    }
}

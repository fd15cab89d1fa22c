use std::mem::MaybeUninit;

use libc::c_int;
use libwebp_sys::{
    WebPBitstreamFeatures, WebPDecodeRGB, WebPDecodeRGBA, WebPEncodeRGB, WebPEncodeRGBA,
    WebPFree, WebPGetFeatures,
};

use crate::ColorLayout;

/// `VP8StatusCode` value for success.
pub const VP8_STATUS_OK: i32 = 0;

/// Feature record as reported by the native bitstream inspector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFeatures {
    pub width: i32,
    pub height: i32,
    pub has_alpha: bool,
    pub has_animation: bool,
    pub format: i32,
}

/// The native codec layer.
///
/// Buffers handed out by `encode` and `decode` belong to the caller until they
/// are given back through `release`.
pub trait NativeCodec {
    /// Encodes `height` rows of `stride` bytes. Returns the output pointer and its
    /// length; a length of zero means the encode failed.
    ///
    /// # Safety
    ///
    /// `pixels` must hold at least `stride * height` bytes and `stride` must cover
    /// `width * layout.channels()` bytes.
    unsafe fn encode(
        &self,
        layout: ColorLayout,
        pixels: &[u8],
        width: c_int,
        height: c_int,
        stride: c_int,
        quality: f32,
    ) -> (*mut u8, usize);

    /// Decodes a bitstream. Returns a null pointer on failure; on success the
    /// buffer holds `width * height * layout.channels()` bytes.
    fn decode(&self, layout: ColorLayout, data: &[u8]) -> (*mut u8, c_int, c_int);

    /// Inspects the bitstream header. `Err` carries the non-OK status code.
    fn features(&self, data: &[u8]) -> Result<RawFeatures, i32>;

    /// # Safety
    ///
    /// `ptr` must come from `encode` or `decode` on this codec and must not have
    /// been released already.
    unsafe fn release(&self, ptr: *mut u8);
}

/// libwebp, statically linked through `libwebp-sys`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LibWebp;

impl NativeCodec for LibWebp {
    unsafe fn encode(
        &self,
        layout: ColorLayout,
        pixels: &[u8],
        width: c_int,
        height: c_int,
        stride: c_int,
        quality: f32,
    ) -> (*mut u8, usize) {
        let mut output: *mut u8 = std::ptr::null_mut();
        let size = unsafe {
            match layout {
                ColorLayout::Rgb => {
                    WebPEncodeRGB(pixels.as_ptr(), width, height, stride, quality, &mut output)
                }
                ColorLayout::Rgba => {
                    WebPEncodeRGBA(pixels.as_ptr(), width, height, stride, quality, &mut output)
                }
            }
        };
        (output, size)
    }

    fn decode(&self, layout: ColorLayout, data: &[u8]) -> (*mut u8, c_int, c_int) {
        let mut width: c_int = 0;
        let mut height: c_int = 0;
        let output = unsafe {
            match layout {
                ColorLayout::Rgb => WebPDecodeRGB(data.as_ptr(), data.len(), &mut width, &mut height),
                ColorLayout::Rgba => {
                    WebPDecodeRGBA(data.as_ptr(), data.len(), &mut width, &mut height)
                }
            }
        };
        (output, width, height)
    }

    fn features(&self, data: &[u8]) -> Result<RawFeatures, i32> {
        let mut features = MaybeUninit::<WebPBitstreamFeatures>::uninit();
        let status = unsafe { WebPGetFeatures(data.as_ptr(), data.len(), features.as_mut_ptr()) };
        let status = status as i32;
        if status != VP8_STATUS_OK {
            return Err(status);
        }
        // SAFETY: an OK status means the record was fully written.
        let features = unsafe { features.assume_init() };
        Ok(RawFeatures {
            width: features.width,
            height: features.height,
            has_alpha: features.has_alpha != 0,
            has_animation: features.has_animation != 0,
            format: features.format,
        })
    }

    // Output of WebPEncode* and WebPDecode* must go back through WebPFree.
    unsafe fn release(&self, ptr: *mut u8) {
        unsafe { WebPFree(ptr.cast()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn features_of_short_input_is_not_ok() {
        let status = LibWebp.features(&[0u8; 10]).unwrap_err();
        assert_ne!(status, VP8_STATUS_OK);
    }

    #[test]
    fn native_buffers_go_back_to_libwebp() {
        let pixels = [0u8, 64, 128, 255, 255, 255, 10, 20, 30, 90, 90, 90];
        let (encoded, size) = unsafe { LibWebp.encode(ColorLayout::Rgb, &pixels, 2, 2, 6, 80.0) };
        assert!(!encoded.is_null() && size > 0);

        let bitstream = unsafe { std::slice::from_raw_parts(encoded, size) }.to_vec();
        unsafe { LibWebp.release(encoded) };

        let (decoded, width, height) = LibWebp.decode(ColorLayout::Rgba, &bitstream);
        assert!(!decoded.is_null());
        assert_eq!((width, height), (2, 2));
        unsafe { LibWebp.release(decoded) };
    }

    #[test]
    fn decode_of_garbage_returns_null() {
        let (ptr, _, _) = LibWebp.decode(ColorLayout::Rgb, b"definitely not webp");
        assert!(ptr.is_null());
    }
}

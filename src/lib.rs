//! # webp-bridge
//!
//! A binding layer over libwebp's simple lossy API.
//!
//! Every call crosses the native boundary once: the arguments are validated, a
//! single libwebp function runs, and whatever buffer libwebp allocated is copied
//! into a `Vec<u8>` and released before the call returns. Nothing is cached and
//! no native pointer ever escapes.
//!
//! ## Features
//!
//! - Encode RGB and RGBA buffers (with arbitrary stride) at a given quality.
//! - Decode a WebP bitstream to packed RGB or RGBA.
//! - Read width, height and alpha presence from a bitstream header.
//! - A named-operation [`registry`] reproducing the classic `_webp_wrapper`
//!   surface, where encode/decode failures come back as `None` and only the
//!   feature probe raises.
//! - With the `python` feature, the same surface as a CPython extension module.
//!
//! ## Examples
//!
//! ### Encoding and decoding in memory
//!
//! ```no_run
//! use webp_bridge::{decode_rgb, encode_rgb, Error};
//!
//! fn main() -> Result<(), Error> {
//!     // 2x2 opaque red
//!     let pixels = [255u8, 0, 0].repeat(4);
//!     let webp = encode_rgb(&pixels, 2, 2, 6, 80.0)?;
//!
//!     let decoded = decode_rgb(&webp)?;
//!     assert_eq!((decoded.width, decoded.height), (2, 2));
//!     assert_eq!(decoded.pixels.len(), 12);
//!     Ok(())
//! }
//! ```
//!
//! ### Inspecting a bitstream
//!
//! ```no_run
//! use webp_bridge::{get_features, Error};
//!
//! fn main() -> Result<(), Error> {
//!     let data = std::fs::read("input.webp").map_err(|_| Error::IoError)?;
//!     let features = get_features(&data)?;
//!     println!("{}x{}, alpha: {}", features.width, features.height, features.has_alpha);
//!     Ok(())
//! }
//! ```
//!
//! ### Calling through the registry
//!
//! ```no_run
//! use webp_bridge::host::Value;
//! use webp_bridge::registry::Registry;
//!
//! let registry = Registry::libwebp();
//! let result = registry
//!     .call("WebPDecodeRGB", &[Value::Bytes(b"not webp".to_vec())])
//!     .unwrap();
//! assert!(result.is_none());
//! ```

pub mod bindings;

mod types;
pub use types::*;

mod decode;
pub use decode::*;

mod encode;
pub use encode::*;

pub mod host;
pub mod logging;
pub mod plugin;
pub mod registry;

#[cfg(feature = "python")]
mod python;

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use libc::c_int;
use webp_bridge::ColorLayout;
use webp_bridge::bindings::{LibWebp, NativeCodec, RawFeatures};

/// Allocation bookkeeping shared by the test doubles.
#[derive(Default)]
pub struct Ledger {
    pub native_calls: Cell<usize>,
    pub allocations: Cell<usize>,
    pub releases: Cell<usize>,
    live: RefCell<HashSet<usize>>,
}

impl Ledger {
    fn track(&self, ptr: *mut u8) {
        self.native_calls.set(self.native_calls.get() + 1);
        if !ptr.is_null() {
            self.allocations.set(self.allocations.get() + 1);
            self.live.borrow_mut().insert(ptr as usize);
        }
    }

    fn untrack(&self, ptr: *mut u8) {
        assert!(
            self.live.borrow_mut().remove(&(ptr as usize)),
            "released a pointer that is not live: {ptr:?}"
        );
        self.releases.set(self.releases.get() + 1);
    }

    pub fn live(&self) -> usize {
        self.live.borrow().len()
    }

    pub fn assert_balanced(&self) {
        assert_eq!(self.live(), 0, "native allocation leaked");
        assert_eq!(self.allocations.get(), self.releases.get());
    }
}

/// Real libwebp with every allocation and release counted.
#[derive(Default)]
pub struct CountingCodec {
    pub ledger: Ledger,
}

impl NativeCodec for CountingCodec {
    unsafe fn encode(
        &self,
        layout: ColorLayout,
        pixels: &[u8],
        width: c_int,
        height: c_int,
        stride: c_int,
        quality: f32,
    ) -> (*mut u8, usize) {
        let (ptr, size) = unsafe { LibWebp.encode(layout, pixels, width, height, stride, quality) };
        self.ledger.track(ptr);
        (ptr, size)
    }

    fn decode(&self, layout: ColorLayout, data: &[u8]) -> (*mut u8, c_int, c_int) {
        let result = LibWebp.decode(layout, data);
        self.ledger.track(result.0);
        result
    }

    fn features(&self, data: &[u8]) -> Result<RawFeatures, i32> {
        self.ledger.native_calls.set(self.ledger.native_calls.get() + 1);
        LibWebp.features(data)
    }

    unsafe fn release(&self, ptr: *mut u8) {
        self.ledger.untrack(ptr);
        unsafe { LibWebp.release(ptr) }
    }
}

/// What a `ScriptedCodec` hands back from `encode`.
#[derive(Clone, Copy)]
pub enum EncodeScript {
    /// A buffer of this many bytes.
    Bytes(usize),
    /// Zero length with no buffer.
    Nothing,
    /// Zero length but a live buffer anyway.
    EmptyBuffer,
}

/// What a `ScriptedCodec` hands back from `decode`.
#[derive(Clone, Copy)]
pub enum DecodeScript {
    /// A buffer sized for the given dimensions.
    Pixels(c_int, c_int),
    /// A live buffer paired with dimensions that cannot be right.
    BogusDimensions(c_int, c_int),
    Null,
}

/// A native layer whose results are fixed in advance. Buffers come from `malloc`.
pub struct ScriptedCodec {
    pub encode: EncodeScript,
    pub decode: DecodeScript,
    pub features: Result<RawFeatures, i32>,
    pub ledger: Ledger,
}

impl ScriptedCodec {
    pub fn new() -> Self {
        ScriptedCodec {
            encode: EncodeScript::Nothing,
            decode: DecodeScript::Null,
            features: Err(3),
            ledger: Ledger::default(),
        }
    }

    fn alloc(&self, len: usize) -> *mut u8 {
        let ptr = unsafe { libc::malloc(len.max(1)) } as *mut u8;
        assert!(!ptr.is_null());
        unsafe { std::ptr::write_bytes(ptr, 0xAB, len) };
        ptr
    }
}

impl NativeCodec for ScriptedCodec {
    unsafe fn encode(
        &self,
        _layout: ColorLayout,
        _pixels: &[u8],
        _width: c_int,
        _height: c_int,
        _stride: c_int,
        _quality: f32,
    ) -> (*mut u8, usize) {
        let (ptr, size) = match self.encode {
            EncodeScript::Bytes(n) => (self.alloc(n), n),
            EncodeScript::Nothing => (std::ptr::null_mut(), 0),
            EncodeScript::EmptyBuffer => (self.alloc(0), 0),
        };
        self.ledger.track(ptr);
        (ptr, size)
    }

    fn decode(&self, layout: ColorLayout, _data: &[u8]) -> (*mut u8, c_int, c_int) {
        let (ptr, w, h) = match self.decode {
            DecodeScript::Pixels(w, h) => {
                (self.alloc(w as usize * h as usize * layout.channels()), w, h)
            }
            DecodeScript::BogusDimensions(w, h) => (self.alloc(16), w, h),
            DecodeScript::Null => (std::ptr::null_mut(), 0, 0),
        };
        self.ledger.track(ptr);
        (ptr, w, h)
    }

    fn features(&self, _data: &[u8]) -> Result<RawFeatures, i32> {
        self.ledger.native_calls.set(self.ledger.native_calls.get() + 1);
        self.features
    }

    unsafe fn release(&self, ptr: *mut u8) {
        self.ledger.untrack(ptr);
        unsafe { libc::free(ptr.cast()) }
    }
}

pub fn solid_rgb(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    rgb.repeat((width * height) as usize)
}

/// An RGBA gradient with partially transparent pixels, so the encoder keeps alpha.
pub fn translucent_rgba(width: u32, height: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            pixels.extend_from_slice(&[(x * 16) as u8, (y * 16) as u8, 128, (x * 8 + 64) as u8]);
        }
    }
    pixels
}

mod common;

use common::{CountingCodec, DecodeScript, ScriptedCodec, solid_rgb, translucent_rgba};
use std::fs;
use std::io::Cursor;
use webp_bridge::{
    ColorLayout, Error, decode_file, decode_from_reader, decode_rgb, decode_rgba, decode_with,
    encode_rgb, encode_rgba,
};

#[test]
fn test_round_trip_keeps_dimensions() {
    for (width, height) in [(1, 1), (2, 2), (7, 3), (64, 17)] {
        let pixels = solid_rgb(width, height, [200, 100, 50]);
        let encoded = encode_rgb(&pixels, width, height, width as usize * 3, 80.0).unwrap();
        let decoded = decode_rgb(&encoded).unwrap();
        assert_eq!((decoded.width, decoded.height), (width, height));
        assert_eq!(decoded.layout, ColorLayout::Rgb);
        assert_eq!(decoded.pixels.len(), (width * height * 3) as usize);

        let encoded = encode_rgba(
            &translucent_rgba(width, height),
            width,
            height,
            width as usize * 4,
            80.0,
        )
        .unwrap();
        let decoded = decode_rgba(&encoded).unwrap();
        assert_eq!((decoded.width, decoded.height), (width, height));
        assert_eq!(decoded.pixels.len(), (width * height * 4) as usize);
    }
}

#[test]
fn test_decode_rgb_stream_as_rgba() {
    let encoded = encode_rgb(&solid_rgb(5, 5, [0, 255, 0]), 5, 5, 15, 90.0).unwrap();
    let decoded = decode_rgba(&encoded).unwrap();
    assert_eq!(decoded.pixels.len(), 5 * 5 * 4);
    // no alpha in the stream decodes as opaque
    assert!(decoded.pixels.chunks(4).all(|px| px[3] == 255));
}

#[test]
fn test_lossy_colour_stays_close() {
    let encoded = encode_rgb(&solid_rgb(16, 16, [255, 0, 0]), 16, 16, 48, 95.0).unwrap();
    let decoded = decode_rgb(&encoded).unwrap();
    for px in decoded.pixels.chunks(3) {
        assert!(px[0] > 200 && px[1] < 60 && px[2] < 60, "pixel drifted: {px:?}");
    }
}

#[test]
fn test_decode_invalid_data() {
    let codec = CountingCodec::default();
    for data in [&b""[..], &[0u8; 10][..], &b"RIFF\0\0\0\0WEBPVP8 garbage"[..]] {
        let result = decode_with(&codec, data, ColorLayout::Rgba);
        assert_eq!(result, Err(Error::NativeDecodeFailed));
    }
    assert_eq!(codec.ledger.native_calls.get(), 3);
    codec.ledger.assert_balanced();
}

#[test]
fn test_decode_releases_native_buffer() {
    let codec = CountingCodec::default();
    let encoded = encode_rgb(&solid_rgb(9, 9, [1, 1, 1]), 9, 9, 27, 80.0).unwrap();
    for layout in [ColorLayout::Rgb, ColorLayout::Rgba] {
        decode_with(&codec, &encoded, layout).unwrap();
    }
    assert_eq!(codec.ledger.allocations.get(), 2);
    codec.ledger.assert_balanced();
}

#[test]
fn test_decode_length_follows_dimensions() {
    let mut codec = ScriptedCodec::new();
    codec.decode = DecodeScript::Pixels(3, 5);
    let decoded = decode_with(&codec, b"anything", ColorLayout::Rgba).unwrap();
    assert_eq!((decoded.width, decoded.height), (3, 5));
    assert_eq!(decoded.pixels, vec![0xAB; 3 * 5 * 4]);
    codec.ledger.assert_balanced();
}

#[test]
fn test_decode_null_is_reported() {
    let codec = ScriptedCodec::new();
    let result = decode_with(&codec, b"anything", ColorLayout::Rgb);
    assert_eq!(result, Err(Error::NativeDecodeFailed));
    assert_eq!(codec.ledger.allocations.get(), 0);
}

#[test]
fn test_bogus_dimensions_release_buffer() {
    for (w, h) in [(0, 4), (-1, 4), (4, 16384), (i32::MAX, i32::MAX)] {
        let mut codec = ScriptedCodec::new();
        codec.decode = DecodeScript::BogusDimensions(w, h);
        let result = decode_with(&codec, b"anything", ColorLayout::Rgb);
        assert_eq!(
            result,
            Err(Error::DimensionsOutOfRange {
                width: w,
                height: h
            })
        );
        assert_eq!(codec.ledger.allocations.get(), 1);
        codec.ledger.assert_balanced();
    }
}

#[test]
fn test_decode_from_reader_and_file() {
    let encoded = encode_rgb(&solid_rgb(4, 6, [9, 9, 9]), 4, 6, 12, 80.0).unwrap();

    let decoded = decode_from_reader(Cursor::new(encoded.clone()), ColorLayout::Rgb).unwrap();
    assert_eq!((decoded.width, decoded.height), (4, 6));

    fs::create_dir_all("tests/output").unwrap();
    let path = "tests/output/decode_from_file.webp";
    fs::write(path, &encoded).unwrap();
    let decoded = decode_file(path, ColorLayout::Rgba).unwrap();
    assert_eq!(decoded.pixels.len(), 4 * 6 * 4);
}

#[test]
fn test_decode_missing_file() {
    let result = decode_file("tests/output/does_not_exist.webp", ColorLayout::Rgb);
    assert_eq!(result, Err(Error::FileNotFound));
}

//! The binding's declared external surface.
//!
//! Encode and decode report every failure as [`Value::None`]. The feature probe is
//! the one operation that raises, with the native status code in the message.

use log::debug;

use crate::{
    ColorLayout, EncodeOptions, Error,
    bindings::{LibWebp, NativeCodec},
    decode::{decode_with, probe_with},
    encode::encode_with,
    host::{BitstreamArgs, EncodeArgs, Value},
};

/// Failure raised to the host.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HostError {
    #[error("no such function: {0}")]
    UnknownMethod(String),
    #[error("{0}")]
    Runtime(String),
}

/// One callable of the binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    EncodeRgb,
    EncodeRgba,
    DecodeRgb,
    DecodeRgba,
    GetFeatures,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::EncodeRgb,
        Operation::EncodeRgba,
        Operation::DecodeRgb,
        Operation::DecodeRgba,
        Operation::GetFeatures,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Operation::EncodeRgb => "WebPEncodeRGB",
            Operation::EncodeRgba => "WebPEncodeRGBA",
            Operation::DecodeRgb => "WebPDecodeRGB",
            Operation::DecodeRgba => "WebPDecodeRGBA",
            Operation::GetFeatures => "WebPGetFeatures",
        }
    }

    pub const fn doc(self) -> &'static str {
        match self {
            Operation::EncodeRgb => {
                "Wraps WebPEncodeRGB\nArguments: data, width, height, stride, quality_factor\nReturns encoded image as bytes"
            }
            Operation::EncodeRgba => {
                "Wraps WebPEncodeRGBA\nArguments: data, width, height, stride, quality_factor\nReturns encoded image as bytes"
            }
            Operation::DecodeRgb => {
                "Wraps WebPDecodeRGB\nReturns a (raw_data, width, height) tuple, where raw_data is the image samples in RGB order"
            }
            Operation::DecodeRgba => {
                "Wraps WebPDecodeRGBA\nReturns a (raw_data, width, height) tuple, where raw_data is the image samples in RGBA order"
            }
            Operation::GetFeatures => "Wraps WebPGetFeatures\nReturns a (width, height, has_alpha) tuple",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Operation::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Pixel layout the operation produces or consumes, if any.
    pub const fn layout(self) -> Option<ColorLayout> {
        match self {
            Operation::EncodeRgba | Operation::DecodeRgba => Some(ColorLayout::Rgba),
            Operation::EncodeRgb | Operation::DecodeRgb => Some(ColorLayout::Rgb),
            Operation::GetFeatures => None,
        }
    }
}

/// Routes named calls to the adapters of one native codec.
#[derive(Debug, Clone, Default)]
pub struct Registry<C = LibWebp> {
    codec: C,
}

impl Registry {
    pub fn libwebp() -> Self {
        Registry { codec: LibWebp }
    }
}

impl<C: NativeCodec> Registry<C> {
    pub fn new(codec: C) -> Self {
        Registry { codec }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, HostError> {
        let op =
            Operation::from_name(name).ok_or_else(|| HostError::UnknownMethod(name.to_string()))?;
        self.invoke(op, args)
    }

    pub fn invoke(&self, op: Operation, args: &[Value]) -> Result<Value, HostError> {
        let result = match op {
            Operation::EncodeRgb => self.encode(ColorLayout::Rgb, args),
            Operation::EncodeRgba => self.encode(ColorLayout::Rgba, args),
            Operation::DecodeRgb => self.decode(ColorLayout::Rgb, args),
            Operation::DecodeRgba => self.decode(ColorLayout::Rgba, args),
            Operation::GetFeatures => return self.get_features(args),
        };
        Ok(result.unwrap_or_else(|err| {
            debug!("{} returned no result: {}", op.name(), err);
            Value::None
        }))
    }

    fn encode(&self, layout: ColorLayout, args: &[Value]) -> Result<Value, Error> {
        let args = EncodeArgs::try_from(args)?;
        let image = args.image(layout)?;
        let options = EncodeOptions {
            quality: args.quality,
        };
        encode_with(&self.codec, &image, &options).map(Value::Bytes)
    }

    fn decode(&self, layout: ColorLayout, args: &[Value]) -> Result<Value, Error> {
        let args = BitstreamArgs::try_from(args)?;
        let decoded = decode_with(&self.codec, args.data, layout)?;
        Ok(Value::Tuple(vec![
            Value::Bytes(decoded.pixels),
            Value::Int(decoded.width.into()),
            Value::Int(decoded.height.into()),
        ]))
    }

    fn get_features(&self, args: &[Value]) -> Result<Value, HostError> {
        let args = match BitstreamArgs::try_from(args) {
            Ok(args) => args,
            Err(err) => {
                debug!("{} returned no result: {}", Operation::GetFeatures.name(), err);
                return Ok(Value::None);
            }
        };
        match probe_with(&self.codec, args.data) {
            Ok(features) => Ok(Value::Tuple(vec![
                Value::Int(features.width.into()),
                Value::Int(features.height.into()),
                Value::Bool(features.has_alpha),
            ])),
            Err(Error::MalformedBitstream(status)) => Err(HostError::Runtime(format!(
                "WebPGetFeatures returned error: {status}"
            ))),
            Err(err) => Err(HostError::Runtime(err.to_string())),
        }
    }
}

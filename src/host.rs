//! Host-side values and the positional calling convention.
//!
//! Every registered operation receives its arguments as a slice of [`Value`]s. The
//! slice is parsed into a typed argument struct before anything else happens, so
//! adapters only ever see well-formed input.

use libc::c_int;

use crate::{ColorLayout, Error, Image};

/// A value owned by the host runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Bytes(Vec<u8>),
    Tuple(Vec<Value>),
}

impl Value {
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(items) => Some(items),
            _ => None,
        }
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Value::Bytes(bytes.to_vec())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

/// Why a positional argument tuple was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArgError {
    #[error("expected {expected} arguments, got {got}")]
    Arity { expected: usize, got: usize },
    #[error("argument {index} must be {expected}")]
    Type { index: usize, expected: &'static str },
    #[error("argument {index} does not fit in a C int")]
    Overflow { index: usize },
}

impl From<ArgError> for Error {
    fn from(err: ArgError) -> Self {
        Error::InvalidArgument(err.to_string())
    }
}

fn check_arity(args: &[Value], expected: usize) -> Result<(), ArgError> {
    if args.len() != expected {
        return Err(ArgError::Arity {
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

fn bytes_at(args: &[Value], index: usize) -> Result<&[u8], ArgError> {
    args[index].as_bytes().ok_or(ArgError::Type {
        index,
        expected: "bytes",
    })
}

fn int_at(args: &[Value], index: usize) -> Result<c_int, ArgError> {
    let value = match args[index] {
        Value::Int(v) => v,
        Value::Bool(b) => b as i64,
        _ => {
            return Err(ArgError::Type {
                index,
                expected: "an int",
            });
        }
    };
    c_int::try_from(value).map_err(|_| ArgError::Overflow { index })
}

fn float_at(args: &[Value], index: usize) -> Result<f32, ArgError> {
    match args[index] {
        Value::Float(v) => Ok(v as f32),
        Value::Int(v) => Ok(v as f32),
        Value::Bool(b) => Ok(b as u8 as f32),
        _ => Err(ArgError::Type {
            index,
            expected: "a float",
        }),
    }
}

/// `(pixels, width, height, stride, quality)`
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeArgs<'a> {
    pub pixels: &'a [u8],
    pub width: c_int,
    pub height: c_int,
    pub stride: c_int,
    pub quality: f32,
}

impl<'a> TryFrom<&'a [Value]> for EncodeArgs<'a> {
    type Error = ArgError;

    fn try_from(args: &'a [Value]) -> Result<Self, ArgError> {
        check_arity(args, 5)?;
        Ok(EncodeArgs {
            pixels: bytes_at(args, 0)?,
            width: int_at(args, 1)?,
            height: int_at(args, 2)?,
            stride: int_at(args, 3)?,
            quality: float_at(args, 4)?,
        })
    }
}

impl<'a> EncodeArgs<'a> {
    /// Views the arguments as an image of the given layout. Negative geometry has
    /// no meaning for the encoder and is rejected here.
    pub fn image(&self, layout: ColorLayout) -> Result<Image<'a>, Error> {
        let non_negative = |v: c_int, what: &str| {
            u32::try_from(v).map_err(|_| Error::InvalidArgument(format!("negative {what}: {v}")))
        };
        Ok(Image {
            pixels: self.pixels,
            width: non_negative(self.width, "width")?,
            height: non_negative(self.height, "height")?,
            layout,
            stride_in_bytes: non_negative(self.stride, "stride")? as usize,
        })
    }
}

/// `(bitstream,)`
#[derive(Debug, Clone, PartialEq)]
pub struct BitstreamArgs<'a> {
    pub data: &'a [u8],
}

impl<'a> TryFrom<&'a [Value]> for BitstreamArgs<'a> {
    type Error = ArgError;

    fn try_from(args: &'a [Value]) -> Result<Self, ArgError> {
        check_arity(args, 1)?;
        Ok(BitstreamArgs {
            data: bytes_at(args, 0)?,
        })
    }
}

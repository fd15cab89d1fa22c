//! CPython extension module `_webp_wrapper`.
//!
//! Python objects are converted into host [`Value`]s and handed to the registry,
//! so argument handling and the None-versus-raise split are the same as for any
//! other host.

use std::path::Path;

use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyBytes, PyFloat, PyLong, PyTuple};

use crate::host::Value;
use crate::registry::{HostError, Operation, Registry};

impl From<HostError> for PyErr {
    fn from(err: HostError) -> PyErr {
        PyRuntimeError::new_err(err.to_string())
    }
}

// Objects of any other type become None, which no operation accepts as an argument.
fn to_value(obj: &Bound<'_, PyAny>) -> Value {
    if let Ok(bytes) = obj.downcast::<PyBytes>() {
        return Value::Bytes(bytes.as_bytes().to_vec());
    }
    if obj.is_instance_of::<PyBool>() {
        return obj.extract::<bool>().map_or(Value::None, Value::Bool);
    }
    if obj.is_instance_of::<PyLong>() {
        return obj.extract::<i64>().map_or(Value::None, Value::Int);
    }
    if obj.is_instance_of::<PyFloat>() {
        return obj.extract::<f64>().map_or(Value::None, Value::Float);
    }
    Value::None
}

fn to_object(py: Python<'_>, value: Value) -> PyObject {
    match value {
        Value::None => py.None(),
        Value::Bool(b) => b.into_py(py),
        Value::Int(i) => i.into_py(py),
        Value::Float(f) => f.into_py(py),
        Value::Bytes(bytes) => PyBytes::new_bound(py, &bytes).into_py(py),
        Value::Tuple(items) => {
            let items: Vec<PyObject> = items.into_iter().map(|v| to_object(py, v)).collect();
            PyTuple::new_bound(py, items).into_py(py)
        }
    }
}

fn dispatch(py: Python<'_>, op: Operation, args: &Bound<'_, PyTuple>) -> PyResult<PyObject> {
    let values: Vec<Value> = args.iter().map(|arg| to_value(&arg)).collect();
    let result = py.allow_threads(move || Registry::libwebp().invoke(op, &values))?;
    Ok(to_object(py, result))
}

/// Wraps WebPEncodeRGB
/// Arguments: data, width, height, stride, quality_factor
/// Returns encoded image as bytes
#[pyfunction]
#[pyo3(name = "WebPEncodeRGB", signature = (*args))]
fn webp_encode_rgb(py: Python<'_>, args: &Bound<'_, PyTuple>) -> PyResult<PyObject> {
    dispatch(py, Operation::EncodeRgb, args)
}

/// Wraps WebPEncodeRGBA
/// Arguments: data, width, height, stride, quality_factor
/// Returns encoded image as bytes
#[pyfunction]
#[pyo3(name = "WebPEncodeRGBA", signature = (*args))]
fn webp_encode_rgba(py: Python<'_>, args: &Bound<'_, PyTuple>) -> PyResult<PyObject> {
    dispatch(py, Operation::EncodeRgba, args)
}

/// Wraps WebPDecodeRGB
/// Returns a (raw_data, width, height) tuple, where raw_data is the image samples in RGB order
#[pyfunction]
#[pyo3(name = "WebPDecodeRGB", signature = (*args))]
fn webp_decode_rgb(py: Python<'_>, args: &Bound<'_, PyTuple>) -> PyResult<PyObject> {
    dispatch(py, Operation::DecodeRgb, args)
}

/// Wraps WebPDecodeRGBA
/// Returns a (raw_data, width, height) tuple, where raw_data is the image samples in RGBA order
#[pyfunction]
#[pyo3(name = "WebPDecodeRGBA", signature = (*args))]
fn webp_decode_rgba(py: Python<'_>, args: &Bound<'_, PyTuple>) -> PyResult<PyObject> {
    dispatch(py, Operation::DecodeRgba, args)
}

/// Wraps WebPGetFeatures
/// Returns a (width, height, has_alpha) tuple
#[pyfunction]
#[pyo3(name = "WebPGetFeatures", signature = (*args))]
fn webp_get_features(py: Python<'_>, args: &Bound<'_, PyTuple>) -> PyResult<PyObject> {
    dispatch(py, Operation::GetFeatures, args)
}

/// Routes the binding's log output to stderr, or appended to `log_file`.
#[pyfunction]
#[pyo3(signature = (log_file = None))]
fn enable_verbose_logging(log_file: Option<String>) -> PyResult<()> {
    crate::logging::enable_verbose_logging(log_file.as_deref().map(Path::new))?;
    Ok(())
}

#[pymodule]
#[pyo3(name = "_webp_wrapper")]
fn webp_wrapper(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(webp_encode_rgb, m)?)?;
    m.add_function(wrap_pyfunction!(webp_encode_rgba, m)?)?;
    m.add_function(wrap_pyfunction!(webp_decode_rgb, m)?)?;
    m.add_function(wrap_pyfunction!(webp_decode_rgba, m)?)?;
    m.add_function(wrap_pyfunction!(webp_get_features, m)?)?;
    m.add_function(wrap_pyfunction!(enable_verbose_logging, m)?)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}

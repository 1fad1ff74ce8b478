//! Encoding and decoding between [`Native`] and [`Value`].

use std::collections::BTreeMap;

use crate::error::{ValueError, ValueResult};
use crate::format::ValueFormat;
use crate::native::{Elements, Native, NdArray, Scalar, element_count};
use crate::wire::{Array1d, Array1dOption, Array2dJagged, ArrayNd, HashmapString, Value};

/// Encode a value for the wire.
///
/// Maps always encode as `hashmap_string` (entries are encoded without a
/// tag). `jagged` accepts jagged values and 2-D arrays (each row becomes a
/// column). With no tag, jagged values encode as jagged and everything else
/// as `array_nd` in row-major order.
pub fn encode(value: &Native, format: Option<ValueFormat>) -> ValueResult<Value> {
    match (format, value) {
        (_, Native::Map(map)) => {
            let data = map
                .iter()
                .map(|(k, v)| Ok((k.clone(), encode(v, None)?)))
                .collect::<ValueResult<BTreeMap<_, _>>>()?;
            Ok(Value::HashmapString(HashmapString { data }))
        }
        (Some(ValueFormat::Hashmap), other) => Err(ValueError::format(format!(
            "hashmap format requires a map, got {}",
            other.kind_name()
        ))),
        (Some(ValueFormat::Jagged) | None, Native::Jagged(columns)) => Ok(encode_jagged(
            columns.iter().map(|c| c.as_ref().map(array1d_from)),
        )),
        (Some(ValueFormat::Jagged), Native::Array(array)) => {
            let rows = array.rows().ok_or_else(|| {
                ValueError::format(format!(
                    "jagged format requires a 2-D array, got {} axes",
                    array.ndim()
                ))
            })?;
            Ok(encode_jagged(rows.iter().map(|r| Some(array1d_from(r)))))
        }
        (Some(ValueFormat::Jagged), other) => Err(ValueError::format(format!(
            "jagged format requires columns, got {}",
            other.kind_name()
        ))),
        (_, Native::Jagged(_)) => Err(ValueError::dtype(
            "ragged columns cannot form an array; use the jagged format",
        )),
        (_, Native::Scalar(scalar)) => Ok(Value::ArrayNd(ArrayNd {
            shape: Vec::new(),
            order: Vec::new(),
            flattened: array1d_from_scalar(scalar),
        })),
        (_, Native::Array(array)) => Ok(Value::ArrayNd(ArrayNd {
            shape: array.shape().iter().map(|&d| d as u64).collect(),
            order: (0..array.ndim() as u64).collect(),
            flattened: array1d_from(array.data()),
        })),
        (_, Native::Null) => Err(ValueError::dtype("null has no element kind")),
    }
}

/// Decode a wire value.
///
/// Arrays with an empty shape decode to a bare scalar. Absent jagged
/// columns stay `None`.
pub fn decode(value: &Value) -> ValueResult<Native> {
    match value {
        Value::ArrayNd(array) => decode_array(array),
        Value::HashmapString(map) => map
            .data
            .iter()
            .map(|(k, v)| Ok((k.clone(), decode(v)?)))
            .collect::<ValueResult<BTreeMap<_, _>>>()
            .map(Native::Map),
        Value::Array2dJagged(jagged) => Ok(Native::Jagged(
            jagged
                .data
                .iter()
                .map(|column| column.option.as_ref().map(elements_from))
                .collect(),
        )),
    }
}

/// Decode a value that may be missing entirely; missing is [`Native::Null`].
pub fn decode_optional(value: Option<&Value>) -> ValueResult<Native> {
    value.map_or(Ok(Native::Null), decode)
}

fn encode_jagged(columns: impl Iterator<Item = Option<Array1d>>) -> Value {
    Value::Array2dJagged(Array2dJagged {
        data: columns.map(|option| Array1dOption { option }).collect(),
    })
}

fn decode_array(array: &ArrayNd) -> ValueResult<Native> {
    let data = elements_from(&array.flattened);

    if array.shape.is_empty() {
        if data.len() != 1 {
            return Err(ValueError::shape(format!(
                "scalar must hold exactly one element, found {}",
                data.len()
            )));
        }
        return data
            .get(0)
            .map(Native::Scalar)
            .ok_or_else(|| ValueError::shape("scalar without element"));
    }

    let shape = array
        .shape
        .iter()
        .map(|&d| usize::try_from(d).map_err(|_| ValueError::shape(format!("axis length {d}"))))
        .collect::<ValueResult<Vec<_>>>()?;
    let order = axis_order(&array.order, shape.len())?;

    let expected = element_count(&shape)?;
    if expected != data.len() {
        return Err(ValueError::shape(format!(
            "shape {:?} holds {} elements but buffer has {}",
            shape,
            expected,
            data.len()
        )));
    }

    let data = if order.iter().enumerate().all(|(i, &a)| i == a) {
        data
    } else {
        data.gather(&row_major_gather(&shape, &order))
    };
    NdArray::new(shape, data).map(Native::Array)
}

/// Validate `order` as a permutation of `0..ndim`; empty means row-major.
fn axis_order(order: &[u64], ndim: usize) -> ValueResult<Vec<usize>> {
    if order.is_empty() {
        return Ok((0..ndim).collect());
    }
    let order: Vec<usize> = order.iter().map(|&a| a as usize).collect();
    let mut seen = vec![false; ndim];
    if order.len() != ndim {
        return Err(ValueError::shape(format!(
            "order {order:?} does not match {ndim} axes"
        )));
    }
    for &axis in &order {
        if axis >= ndim || std::mem::replace(&mut seen[axis], true) {
            return Err(ValueError::shape(format!(
                "order {order:?} is not a permutation of the axes"
            )));
        }
    }
    Ok(order)
}

/// Buffer offsets of every row-major position, for a buffer laid out in `order`.
///
/// `shape` must already be known to fit the buffer.
fn row_major_gather(shape: &[usize], order: &[usize]) -> Vec<usize> {
    let ndim = shape.len();
    let mut strides = vec![0; ndim];
    let mut stride = 1;
    for &axis in order.iter().rev() {
        strides[axis] = stride;
        stride *= shape[axis];
    }

    let total: usize = shape.iter().product();
    let mut offsets = Vec::with_capacity(total);
    let mut index = vec![0; ndim];
    for _ in 0..total {
        offsets.push(index.iter().zip(&strides).map(|(i, s)| i * s).sum());
        for axis in (0..ndim).rev() {
            index[axis] += 1;
            if index[axis] < shape[axis] {
                break;
            }
            index[axis] = 0;
        }
    }
    offsets
}

fn array1d_from(elements: &Elements) -> Array1d {
    match elements {
        Elements::Bool(v) => Array1d::Bool(v.clone().into()),
        Elements::I64(v) => Array1d::I64(v.clone().into()),
        Elements::F64(v) => Array1d::F64(v.clone().into()),
        Elements::Str(v) => Array1d::String(v.clone().into()),
    }
}

fn array1d_from_scalar(scalar: &Scalar) -> Array1d {
    match scalar {
        Scalar::Bool(b) => Array1d::Bool(vec![*b].into()),
        Scalar::I64(i) => Array1d::I64(vec![*i].into()),
        Scalar::F64(f) => Array1d::F64(vec![*f].into()),
        Scalar::Str(s) => Array1d::String(vec![s.clone()].into()),
    }
}

fn elements_from(array: &Array1d) -> Elements {
    match array {
        Array1d::Bool(r) => Elements::Bool(r.data.clone()),
        Array1d::I64(r) => Elements::I64(r.data.clone()),
        Array1d::F64(r) => Elements::F64(r.data.clone()),
        Array1d::String(r) => Elements::Str(r.data.clone()),
    }
}

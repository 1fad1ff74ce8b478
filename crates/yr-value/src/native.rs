//! In-process typed values.
//!
//! Every variant is chosen when the value is built; nothing is inferred from
//! runtime inspection except in [`Native::from_json`], which mirrors the
//! inference rules of the engine's array ingestion.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ValueError, ValueResult};

/// Element kind of an array or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dtype {
    Bool,
    I64,
    F64,
    Str,
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dtype::Bool => "bool",
            Dtype::I64 => "i64",
            Dtype::F64 => "f64",
            Dtype::Str => "string",
        })
    }
}

/// A single element.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    I64(i64),
    F64(f64),
    Str(String),
}

impl Scalar {
    pub fn dtype(&self) -> Dtype {
        match self {
            Scalar::Bool(_) => Dtype::Bool,
            Scalar::I64(_) => Dtype::I64,
            Scalar::F64(_) => Dtype::F64,
            Scalar::Str(_) => Dtype::Str,
        }
    }
}

/// Homogeneous 1-D buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum Elements {
    Bool(Vec<bool>),
    I64(Vec<i64>),
    F64(Vec<f64>),
    Str(Vec<String>),
}

impl Elements {
    pub fn len(&self) -> usize {
        match self {
            Elements::Bool(v) => v.len(),
            Elements::I64(v) => v.len(),
            Elements::F64(v) => v.len(),
            Elements::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> Dtype {
        match self {
            Elements::Bool(_) => Dtype::Bool,
            Elements::I64(_) => Dtype::I64,
            Elements::F64(_) => Dtype::F64,
            Elements::Str(_) => Dtype::Str,
        }
    }

    /// Element at `index`, if in bounds.
    pub fn get(&self, index: usize) -> Option<Scalar> {
        match self {
            Elements::Bool(v) => v.get(index).copied().map(Scalar::Bool),
            Elements::I64(v) => v.get(index).copied().map(Scalar::I64),
            Elements::F64(v) => v.get(index).copied().map(Scalar::F64),
            Elements::Str(v) => v.get(index).cloned().map(Scalar::Str),
        }
    }

    /// Collect scalars into one buffer.
    ///
    /// Integers mixed with floats are promoted to `f64`; any other mixture is
    /// unsupported. An empty input yields an empty `f64` buffer.
    pub fn from_scalars(scalars: Vec<Scalar>) -> ValueResult<Self> {
        let mut dtype: Option<Dtype> = None;
        for scalar in &scalars {
            dtype = Some(match (dtype, scalar.dtype()) {
                (None, d) => d,
                (Some(a), b) if a == b => a,
                (Some(Dtype::I64), Dtype::F64) | (Some(Dtype::F64), Dtype::I64) => Dtype::F64,
                (Some(a), b) => {
                    return Err(ValueError::dtype(format!(
                        "mixed element kinds {a} and {b}"
                    )));
                }
            });
        }

        let elements = match dtype.unwrap_or(Dtype::F64) {
            Dtype::Bool => Elements::Bool(
                scalars
                    .into_iter()
                    .filter_map(|s| match s {
                        Scalar::Bool(b) => Some(b),
                        _ => None,
                    })
                    .collect(),
            ),
            Dtype::I64 => Elements::I64(
                scalars
                    .into_iter()
                    .filter_map(|s| match s {
                        Scalar::I64(i) => Some(i),
                        _ => None,
                    })
                    .collect(),
            ),
            Dtype::F64 => Elements::F64(
                scalars
                    .into_iter()
                    .filter_map(|s| match s {
                        Scalar::F64(f) => Some(f),
                        Scalar::I64(i) => Some(i as f64),
                        _ => None,
                    })
                    .collect(),
            ),
            Dtype::Str => Elements::Str(
                scalars
                    .into_iter()
                    .filter_map(|s| match s {
                        Scalar::Str(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
        };
        Ok(elements)
    }

    /// New buffer holding `self[indices[0]], self[indices[1]], ...`.
    pub(crate) fn gather(&self, indices: &[usize]) -> Elements {
        match self {
            Elements::Bool(v) => Elements::Bool(indices.iter().map(|&i| v[i]).collect()),
            Elements::I64(v) => Elements::I64(indices.iter().map(|&i| v[i]).collect()),
            Elements::F64(v) => Elements::F64(indices.iter().map(|&i| v[i]).collect()),
            Elements::Str(v) => Elements::Str(indices.iter().map(|&i| v[i].clone()).collect()),
        }
    }

    fn slice(&self, start: usize, end: usize) -> Elements {
        match self {
            Elements::Bool(v) => Elements::Bool(v[start..end].to_vec()),
            Elements::I64(v) => Elements::I64(v[start..end].to_vec()),
            Elements::F64(v) => Elements::F64(v[start..end].to_vec()),
            Elements::Str(v) => Elements::Str(v[start..end].to_vec()),
        }
    }

    fn concat(parts: Vec<Elements>) -> ValueResult<Elements> {
        let mut iter = parts.into_iter();
        let Some(mut acc) = iter.next() else {
            return Ok(Elements::F64(Vec::new()));
        };
        for part in iter {
            match (&mut acc, part) {
                (Elements::Bool(a), Elements::Bool(b)) => a.extend(b),
                (Elements::I64(a), Elements::I64(b)) => a.extend(b),
                (Elements::F64(a), Elements::F64(b)) => a.extend(b),
                (Elements::Str(a), Elements::Str(b)) => a.extend(b),
                (a, b) => {
                    return Err(ValueError::dtype(format!(
                        "rows of different kinds {} and {}",
                        a.dtype(),
                        b.dtype()
                    )));
                }
            }
        }
        Ok(acc)
    }
}

impl From<Vec<bool>> for Elements {
    fn from(v: Vec<bool>) -> Self {
        Elements::Bool(v)
    }
}

impl From<Vec<i64>> for Elements {
    fn from(v: Vec<i64>) -> Self {
        Elements::I64(v)
    }
}

impl From<Vec<f64>> for Elements {
    fn from(v: Vec<f64>) -> Self {
        Elements::F64(v)
    }
}

impl From<Vec<String>> for Elements {
    fn from(v: Vec<String>) -> Self {
        Elements::Str(v)
    }
}

impl From<Vec<&str>> for Elements {
    fn from(v: Vec<&str>) -> Self {
        Elements::Str(v.into_iter().map(str::to_owned).collect())
    }
}

/// Homogeneous n-dimensional array stored in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct NdArray {
    shape: Vec<usize>,
    data: Elements,
}

impl NdArray {
    /// Build an array from a shape and a row-major buffer.
    ///
    /// The shape must have at least one axis (zero-dimensional values are
    /// [`Native::Scalar`]) and its product must equal the buffer length.
    pub fn new(shape: Vec<usize>, data: Elements) -> ValueResult<Self> {
        if shape.is_empty() {
            return Err(ValueError::shape(
                "arrays need at least one axis; use a scalar instead",
            ));
        }
        let expected = element_count(&shape)?;
        if expected != data.len() {
            return Err(ValueError::shape(format!(
                "shape {:?} holds {} elements but buffer has {}",
                shape,
                expected,
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// 1-D array over `data`.
    pub fn vector(data: impl Into<Elements>) -> Self {
        let data = data.into();
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    /// 2-D array from equally sized rows.
    pub fn from_rows<T>(rows: Vec<Vec<T>>) -> ValueResult<Self>
    where
        Vec<T>: Into<Elements>,
    {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|r| r.len() != n_cols) {
            return Err(ValueError::shape(format!(
                "row {bad} has {} elements, expected {n_cols}",
                rows[bad].len()
            )));
        }
        let data = Elements::concat(rows.into_iter().map(Into::into).collect())?;
        Self::new(vec![n_rows, n_cols], data)
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn data(&self) -> &Elements {
        &self.data
    }

    pub fn dtype(&self) -> Dtype {
        self.data.dtype()
    }

    /// Rows of a 2-D array; `None` for other ranks.
    pub fn rows(&self) -> Option<Vec<Elements>> {
        let [n_rows, n_cols] = self.shape[..] else {
            return None;
        };
        Some(
            (0..n_rows)
                .map(|r| self.data.slice(r * n_cols, (r + 1) * n_cols))
                .collect(),
        )
    }
}

/// A value as the caller sees it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Native {
    /// No value present.
    #[default]
    Null,
    Scalar(Scalar),
    Array(NdArray),
    /// Independent columns; `None` marks an absent column.
    Jagged(Vec<Option<Elements>>),
    Map(BTreeMap<String, Native>),
}

impl Native {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Native::Null => "null",
            Native::Scalar(_) => "scalar",
            Native::Array(_) => "array",
            Native::Jagged(_) => "jagged",
            Native::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Native::Null)
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Native::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&NdArray> {
        match self {
            Native::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Native>> {
        match self {
            Native::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Jagged value from columns, all present.
    pub fn jagged<T>(columns: Vec<T>) -> Self
    where
        T: Into<Elements>,
    {
        Native::Jagged(columns.into_iter().map(|c| Some(c.into())).collect())
    }

    /// Infer a value from JSON.
    ///
    /// - objects become maps (recursively)
    /// - nested arrays must be rectangular and become n-d arrays
    /// - `null` at the top level is [`Native::Null`]; inside an array it is
    ///   an unsupported element kind
    pub fn from_json(value: serde_json::Value) -> ValueResult<Self> {
        match value {
            serde_json::Value::Null => Ok(Native::Null),
            serde_json::Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| Ok((k, Native::from_json(v)?)))
                .collect::<ValueResult<BTreeMap<_, _>>>()
                .map(Native::Map),
            serde_json::Value::Array(items) => {
                let mut shape = Vec::new();
                let mut leaves = Vec::new();
                collect_nested(serde_json::Value::Array(items), 0, &mut shape, &mut leaves)?;
                NdArray::new(shape, Elements::from_scalars(leaves)?).map(Native::Array)
            }
            leaf => json_scalar(leaf).map(Native::Scalar),
        }
    }
}

fn json_scalar(value: serde_json::Value) -> ValueResult<Scalar> {
    match value {
        serde_json::Value::Bool(b) => Ok(Scalar::Bool(b)),
        serde_json::Value::String(s) => Ok(Scalar::Str(s)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Scalar::I64(i))
            } else if n.is_u64() {
                Err(ValueError::dtype(format!("{n} does not fit in i64")))
            } else {
                n.as_f64()
                    .map(Scalar::F64)
                    .ok_or_else(|| ValueError::dtype(format!("number {n}")))
            }
        }
        serde_json::Value::Null => Err(ValueError::dtype("null element")),
        other => Err(ValueError::dtype(format!("element {other}"))),
    }
}

fn collect_nested(
    value: serde_json::Value,
    depth: usize,
    shape: &mut Vec<usize>,
    leaves: &mut Vec<Scalar>,
) -> ValueResult<()> {
    match value {
        serde_json::Value::Array(items) => {
            if depth == shape.len() {
                if depth > 0 && !leaves.is_empty() {
                    return Err(ValueError::shape("nested lists of unequal depth"));
                }
                shape.push(items.len());
            } else if shape[depth] != items.len() {
                return Err(ValueError::shape(format!(
                    "ragged nesting at axis {depth}: {} vs {}",
                    shape[depth],
                    items.len()
                )));
            }
            for item in items {
                collect_nested(item, depth + 1, shape, leaves)?;
            }
            Ok(())
        }
        serde_json::Value::Object(_) => Err(ValueError::dtype("map inside an array")),
        leaf => {
            if depth != shape.len() {
                return Err(ValueError::shape("nested lists of unequal depth"));
            }
            leaves.push(json_scalar(leaf)?);
            Ok(())
        }
    }
}

impl From<Scalar> for Native {
    fn from(s: Scalar) -> Self {
        Native::Scalar(s)
    }
}

impl From<bool> for Native {
    fn from(v: bool) -> Self {
        Native::Scalar(Scalar::Bool(v))
    }
}

impl From<i64> for Native {
    fn from(v: i64) -> Self {
        Native::Scalar(Scalar::I64(v))
    }
}

impl From<i32> for Native {
    fn from(v: i32) -> Self {
        Native::Scalar(Scalar::I64(v.into()))
    }
}

impl From<f64> for Native {
    fn from(v: f64) -> Self {
        Native::Scalar(Scalar::F64(v))
    }
}

impl From<&str> for Native {
    fn from(v: &str) -> Self {
        Native::Scalar(Scalar::Str(v.to_owned()))
    }
}

impl From<String> for Native {
    fn from(v: String) -> Self {
        Native::Scalar(Scalar::Str(v))
    }
}

impl From<Elements> for Native {
    fn from(e: Elements) -> Self {
        Native::Array(NdArray::vector(e))
    }
}

impl From<NdArray> for Native {
    fn from(a: NdArray) -> Self {
        Native::Array(a)
    }
}

impl From<Vec<bool>> for Native {
    fn from(v: Vec<bool>) -> Self {
        Native::Array(NdArray::vector(v))
    }
}

impl From<Vec<i64>> for Native {
    fn from(v: Vec<i64>) -> Self {
        Native::Array(NdArray::vector(v))
    }
}

impl From<Vec<f64>> for Native {
    fn from(v: Vec<f64>) -> Self {
        Native::Array(NdArray::vector(v))
    }
}

impl From<Vec<String>> for Native {
    fn from(v: Vec<String>) -> Self {
        Native::Array(NdArray::vector(v))
    }
}

impl From<Vec<&str>> for Native {
    fn from(v: Vec<&str>) -> Self {
        Native::Array(NdArray::vector(v))
    }
}

impl From<BTreeMap<String, Native>> for Native {
    fn from(m: BTreeMap<String, Native>) -> Self {
        Native::Map(m)
    }
}

/// Product of the axis lengths; an overflowing product is a shape error.
pub(crate) fn element_count(shape: &[usize]) -> ValueResult<usize> {
    shape
        .iter()
        .try_fold(1_usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| ValueError::shape(format!("shape {shape:?} overflows the element count")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ndarray_checks_buffer_length() {
        assert!(NdArray::new(vec![2, 3], Elements::I64(vec![0; 6])).is_ok());
        let err = NdArray::new(vec![2, 3], Elements::I64(vec![0; 5])).unwrap_err();
        assert!(matches!(err, ValueError::Shape { .. }));
        assert!(NdArray::new(vec![], Elements::I64(vec![1])).is_err());
    }

    #[test]
    fn ndarray_rejects_overflowing_shape() {
        let err = NdArray::new(vec![usize::MAX, 2], Elements::I64(vec![1, 2])).unwrap_err();
        assert!(matches!(err, ValueError::Shape { .. }));
        assert_eq!(element_count(&[3, 0, 4]).unwrap(), 0);
    }

    #[test]
    fn from_rows_rejects_ragged() {
        let ok = NdArray::from_rows(vec![vec![1_i64, 2], vec![3, 4]]).unwrap();
        assert_eq!(ok.shape(), &[2, 2]);
        assert_eq!(ok.data(), &Elements::I64(vec![1, 2, 3, 4]));

        let err = NdArray::from_rows(vec![vec![1_i64, 2], vec![3]]).unwrap_err();
        assert!(matches!(err, ValueError::Shape { .. }));
    }

    #[test]
    fn rows_of_matrix() {
        let m = NdArray::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        let rows = m.rows().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], Elements::F64(vec![5.0, 6.0]));
        assert!(NdArray::vector(vec![1.0]).rows().is_none());
    }

    #[test]
    fn from_scalars_promotes_ints_to_floats() {
        let e = Elements::from_scalars(vec![Scalar::I64(1), Scalar::F64(2.5)]).unwrap();
        assert_eq!(e, Elements::F64(vec![1.0, 2.5]));
    }

    #[test]
    fn from_scalars_rejects_mixtures() {
        let err = Elements::from_scalars(vec![Scalar::Bool(true), Scalar::Str("a".into())])
            .unwrap_err();
        assert!(matches!(err, ValueError::UnsupportedDtype { .. }));
    }

    #[test]
    fn json_inference() {
        assert_eq!(Native::from_json(json!(3)).unwrap(), Native::from(3_i64));
        assert_eq!(Native::from_json(json!(null)).unwrap(), Native::Null);

        let matrix = Native::from_json(json!([[1, 2, 3], [4, 5, 6]])).unwrap();
        let array = matrix.as_array().unwrap();
        assert_eq!(array.shape(), &[2, 3]);
        assert_eq!(array.dtype(), Dtype::I64);

        let map = Native::from_json(json!({"a": [true, false], "b": {"c": "x"}})).unwrap();
        let map = map.as_map().unwrap();
        assert_eq!(map["a"], Native::from(vec![true, false]));
        assert_eq!(map["b"].as_map().unwrap()["c"], Native::from("x"));
    }

    #[test]
    fn json_inference_errors() {
        let err = Native::from_json(json!([[1, 2], [3]])).unwrap_err();
        assert!(matches!(err, ValueError::Shape { .. }));

        let err = Native::from_json(json!([[1, 2], 3])).unwrap_err();
        assert!(matches!(err, ValueError::Shape { .. }));

        let err = Native::from_json(json!([1, null])).unwrap_err();
        assert!(matches!(err, ValueError::UnsupportedDtype { .. }));

        let err = Native::from_json(json!([{"a": 1}])).unwrap_err();
        assert!(matches!(err, ValueError::UnsupportedDtype { .. }));

        let err = Native::from_json(json!([u64::MAX])).unwrap_err();
        assert!(matches!(err, ValueError::UnsupportedDtype { .. }));
    }
}

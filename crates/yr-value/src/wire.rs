//! Wire representation of values.
//!
//! Field names follow the engine's value schema: a value is exactly one of
//! `array_nd`, `hashmap_string`, `array_2d_jagged`; 1-D buffers are one of
//! `bool`, `i64`, `f64`, `string`, each wrapping a repeated `data` field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    #[serde(rename = "array_nd")]
    ArrayNd(ArrayNd),
    #[serde(rename = "hashmap_string")]
    HashmapString(HashmapString),
    #[serde(rename = "array_2d_jagged")]
    Array2dJagged(Array2dJagged),
}

/// N-dimensional array: a flat buffer plus shape and axis order.
///
/// `order` lists the axes from slowest to fastest varying in `flattened`;
/// `[0, 1, .., n-1]` is row-major. An empty `shape` marks a bare scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayNd {
    #[serde(default)]
    pub shape: Vec<u64>,
    #[serde(default)]
    pub order: Vec<u64>,
    pub flattened: Array1d,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Array1d {
    #[serde(rename = "bool")]
    Bool(Repeated<bool>),
    #[serde(rename = "i64")]
    I64(Repeated<i64>),
    #[serde(rename = "f64")]
    F64(Repeated<f64>),
    #[serde(rename = "string")]
    String(Repeated<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repeated<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

impl<T> From<Vec<T>> for Repeated<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HashmapString {
    #[serde(default)]
    pub data: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Array2dJagged {
    #[serde(default)]
    pub data: Vec<Array1dOption>,
}

/// One jagged column; `option` is unset for an absent column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Array1dOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<Array1d>,
}

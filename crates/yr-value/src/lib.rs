//! yr-value: typed values exchanged with the engine.
//!
//! Provides:
//! - [`Native`]: the in-process representation (scalars, n-d arrays, jagged
//!   columns, string-keyed maps), built explicitly per element kind
//! - [`Value`]: the wire representation (`array_nd`, `array_2d_jagged`,
//!   `hashmap_string`)
//! - [`encode`] / [`decode`]: the codec between the two
//!
//! # Example
//!
//! ```
//! use yr_value::{Native, decode, encode};
//!
//! let wire = encode(&Native::from(vec![1.0, 2.5]), None).unwrap();
//! assert_eq!(decode(&wire).unwrap(), Native::from(vec![1.0, 2.5]));
//!
//! // bare scalars come back as scalars, not one-element arrays
//! let wire = encode(&Native::from(3_i64), None).unwrap();
//! assert_eq!(decode(&wire).unwrap(), Native::from(3_i64));
//! ```

pub mod codec;
pub mod error;
pub mod format;
pub mod native;
pub mod wire;

pub use codec::{decode, decode_optional, encode};
pub use error::{ValueError, ValueResult};
pub use format::ValueFormat;
pub use native::{Dtype, Elements, Native, NdArray, Scalar};
pub use wire::{Array1d, Array1dOption, Array2dJagged, ArrayNd, HashmapString, Repeated, Value};

//! yr-graph: the analysis graph.
//!
//! Provides:
//! - The analysis, which owns components and the released-value table
//! - Components, their typed operations and their arguments
//! - Constraint expansion into Clamp/Impute/RowMin/RowMax/Resize wrappers
//! - The active-analysis scope that components register into
//! - Serializable graph and release descriptions
//!
//! # Example
//!
//! ```
//! use yr_graph::{Analysis, Component, Constraints, Dataset, DatasetSource, stats};
//!
//! let analysis = Analysis::default();
//! let mean = analysis.scope(|_| {
//!     let data = Dataset::new(DatasetSource::Path("data.csv".into()), true)?;
//!     let age = data.column("age")?;
//!     let constraints = Constraints::new()
//!         .with("data_min", 0.0)
//!         .with("data_max", 100.0)
//!         .with("data_n", 1000_i64);
//!     stats::mean(&age, &constraints)
//! })?;
//!
//! assert_eq!(mean.id().map(|id| id.index()), Some(9));
//! assert_eq!(analysis.describe().computation_graph.value.len(), 10);
//! # Ok::<(), yr_core::YrError>(())
//! ```

pub mod analysis;
pub mod component;
pub mod constraints;
pub mod context;
pub mod dataset;
pub mod describe;
pub mod export;
mod lower;
pub mod operation;
pub mod stats;

// Re-exports for ergonomics
pub use analysis::{Analysis, Literal, Released};
pub use component::{Arguments, Component, Operand};
pub use constraints::{Constraints, expand_constraints};
pub use context::ContextGuard;
pub use dataset::{Dataset, DatasetSource};
pub use describe::{
    AnalysisDescription, ComponentDescription, ComputationGraph, ReleaseDescription, ReleaseNode,
};
pub use operation::{
    MaterializeOptions, MechanismOptions, NoOptions, Operation, OperationKind, QuantileOptions,
};

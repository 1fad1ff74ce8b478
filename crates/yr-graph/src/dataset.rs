//! Dataset entry points.

use yr_core::{YrError, YrResult};
use yr_value::{Native, ValueFormat};

use crate::component::{Arguments, Component, Operand};
use crate::constraints::Constraints;
use crate::context;
use crate::operation::{MaterializeOptions, NoOptions, Operation};

/// Where a dataset comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetSource {
    /// Loaded by the engine from storage.
    Path(String),
    /// Supplied inline.
    Value {
        value: Native,
        format: Option<ValueFormat>,
    },
}

/// A `Materialize` component plus column access.
#[derive(Debug, Clone)]
pub struct Dataset {
    component: Component,
}

impl Dataset {
    pub fn new(source: DatasetSource, private: bool) -> YrResult<Self> {
        context::current()?;

        let options = match source {
            DatasetSource::Path(path) => MaterializeOptions {
                private,
                file_path: Some(path),
                literal: None,
            },
            DatasetSource::Value { value, format } => MaterializeOptions {
                private,
                file_path: None,
                literal: Some(yr_value::encode(&value, format)?),
            },
        };
        let component = Component::new(Operation::Materialize(options), Arguments::new())?;
        Ok(Self { component })
    }

    /// Exactly one of `path` and `value` must be given.
    pub fn from_parts(
        path: Option<String>,
        value: Option<Native>,
        format: Option<ValueFormat>,
        private: bool,
    ) -> YrResult<Self> {
        context::current()?;
        let source = match (path, value) {
            (Some(path), None) => DatasetSource::Path(path),
            (None, Some(value)) => DatasetSource::Value { value, format },
            _ => {
                return Err(YrError::configuration(
                    "either path or value must be set, not both",
                ));
            }
        };
        Self::new(source, private)
    }

    pub fn component(&self) -> &Component {
        &self.component
    }

    /// `Index` component selecting `identifier` from this dataset.
    pub fn column(&self, identifier: impl Into<Operand>) -> YrResult<Component> {
        Component::from_operands(
            Operation::Index(NoOptions {}),
            vec![
                ("columns", identifier.into()),
                ("data", Operand::from(&self.component)),
            ],
            &Constraints::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analysis;
    use crate::operation::OperationKind;

    #[test]
    fn path_dataset() {
        let analysis = Analysis::default();
        let _scope = analysis.enter();

        let ds = Dataset::new(DatasetSource::Path("data/people.csv".into()), true).unwrap();
        let Operation::Materialize(options) = ds.component().operation() else {
            panic!("expected Materialize");
        };
        assert_eq!(options.file_path.as_deref(), Some("data/people.csv"));
        assert!(options.private);
        assert!(options.literal.is_none());
    }

    #[test]
    fn literal_dataset_is_encoded() {
        let analysis = Analysis::default();
        let _scope = analysis.enter();

        let ds = Dataset::from_parts(None, Some(Native::from(vec![1.0, 2.0])), None, false).unwrap();
        let Operation::Materialize(options) = ds.component().operation() else {
            panic!("expected Materialize");
        };
        assert!(options.literal.is_some());
        assert!(!options.private);
    }

    #[test]
    fn both_or_neither_is_configuration_error() {
        let analysis = Analysis::default();
        let _scope = analysis.enter();

        let both = Dataset::from_parts(Some("a.csv".into()), Some(Native::from(1_i64)), None, true);
        assert!(both.unwrap_err().is_configuration());
        let neither = Dataset::from_parts(None, None, None, true);
        assert!(neither.unwrap_err().is_configuration());
        assert!(analysis.is_empty());
    }

    #[test]
    fn needs_active_context() {
        let err = Dataset::new(DatasetSource::Path("a.csv".into()), true).unwrap_err();
        assert_eq!(err, YrError::NoActiveContext);
    }

    #[test]
    fn column_indexes_into_materialize() {
        let analysis = Analysis::default();
        let _scope = analysis.enter();

        let ds = Dataset::new(DatasetSource::Path("a.csv".into()), true).unwrap();
        let age = ds.column("age").unwrap();
        assert_eq!(age.kind(), OperationKind::Index);
        assert_eq!(age.arguments().get("data"), Some(ds.component()));
        assert_eq!(
            age.arguments().get("columns").unwrap().value(),
            Some(Native::from("age"))
        );
    }

    #[test]
    fn column_of_a_foreign_dataset_adds_nothing() {
        let first = Analysis::default();
        let ds = first
            .scope(|_| Dataset::new(DatasetSource::Path("a.csv".into()), true))
            .unwrap();

        let second = Analysis::default();
        let _scope = second.enter();
        let err = ds.column("age").unwrap_err();
        assert_eq!(
            err,
            YrError::ForeignArgument {
                argument: "data".into()
            }
        );
        assert!(second.is_empty());
        assert_eq!(first.len(), 1);
    }
}

//! Operation vocabulary and per-operation parameter records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use yr_core::{PrivacyUsage, YrError, YrResult};
use yr_value::Value;

/// Operation tag without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperationKind {
    Materialize,
    Index,
    Constant,
    Clamp,
    Impute,
    Resize,
    RowMin,
    RowMax,
    Negative,
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Or,
    And,
    GreaterThan,
    LessThan,
    Equal,
    Mean,
    Sum,
    Count,
    Variance,
    Quantile,
    LaplaceMechanism,
    GaussianMechanism,
}

const DATA: &[&str] = &["data"];
const LEFT_RIGHT: &[&str] = &["left", "right"];

impl OperationKind {
    pub const ALL: [OperationKind; 26] = [
        OperationKind::Materialize,
        OperationKind::Index,
        OperationKind::Constant,
        OperationKind::Clamp,
        OperationKind::Impute,
        OperationKind::Resize,
        OperationKind::RowMin,
        OperationKind::RowMax,
        OperationKind::Negative,
        OperationKind::Add,
        OperationKind::Subtract,
        OperationKind::Multiply,
        OperationKind::Divide,
        OperationKind::Power,
        OperationKind::Or,
        OperationKind::And,
        OperationKind::GreaterThan,
        OperationKind::LessThan,
        OperationKind::Equal,
        OperationKind::Mean,
        OperationKind::Sum,
        OperationKind::Count,
        OperationKind::Variance,
        OperationKind::Quantile,
        OperationKind::LaplaceMechanism,
        OperationKind::GaussianMechanism,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OperationKind::Materialize => "Materialize",
            OperationKind::Index => "Index",
            OperationKind::Constant => "Constant",
            OperationKind::Clamp => "Clamp",
            OperationKind::Impute => "Impute",
            OperationKind::Resize => "Resize",
            OperationKind::RowMin => "RowMin",
            OperationKind::RowMax => "RowMax",
            OperationKind::Negative => "Negative",
            OperationKind::Add => "Add",
            OperationKind::Subtract => "Subtract",
            OperationKind::Multiply => "Multiply",
            OperationKind::Divide => "Divide",
            OperationKind::Power => "Power",
            OperationKind::Or => "Or",
            OperationKind::And => "And",
            OperationKind::GreaterThan => "GreaterThan",
            OperationKind::LessThan => "LessThan",
            OperationKind::Equal => "Equal",
            OperationKind::Mean => "Mean",
            OperationKind::Sum => "Sum",
            OperationKind::Count => "Count",
            OperationKind::Variance => "Variance",
            OperationKind::Quantile => "Quantile",
            OperationKind::LaplaceMechanism => "LaplaceMechanism",
            OperationKind::GaussianMechanism => "GaussianMechanism",
        }
    }

    /// Argument names this operation accepts. Every argument is optional.
    pub fn arguments(self) -> &'static [&'static str] {
        match self {
            OperationKind::Materialize | OperationKind::Constant => &[],
            OperationKind::Index => &["data", "columns"],
            OperationKind::Clamp => &["data", "min", "max", "categories"],
            OperationKind::Impute => &["data", "min", "max", "categories"],
            OperationKind::Resize => &["data", "n"],
            OperationKind::RowMin
            | OperationKind::RowMax
            | OperationKind::Add
            | OperationKind::Subtract
            | OperationKind::Multiply
            | OperationKind::Divide
            | OperationKind::Power
            | OperationKind::Or
            | OperationKind::And
            | OperationKind::GreaterThan
            | OperationKind::LessThan
            | OperationKind::Equal => LEFT_RIGHT,
            OperationKind::Negative
            | OperationKind::Mean
            | OperationKind::Sum
            | OperationKind::Count
            | OperationKind::Variance
            | OperationKind::Quantile
            | OperationKind::LaplaceMechanism
            | OperationKind::GaussianMechanism => DATA,
        }
    }

    pub fn accepts_argument(self, name: &str) -> bool {
        self.arguments().contains(&name)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OperationKind {
    type Err = YrError;

    fn from_str(s: &str) -> YrResult<Self> {
        OperationKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| YrError::configuration(format!("unknown operation '{s}'")))
    }
}

/// Parameter record for operations without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NoOptions {}

/// Load a dataset either from storage or from an inline literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterializeOptions {
    #[serde(default)]
    pub private: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantileOptions {
    pub quantile: f64,
}

/// Privacy usage requested from a noise mechanism.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MechanismOptions {
    #[serde(default)]
    pub privacy_usage: Vec<PrivacyUsage>,
}

/// An operation together with its parameters.
///
/// Serializes keyed by the lower-cased operation name, e.g. `{"clamp": {}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Materialize(MaterializeOptions),
    Index(NoOptions),
    Constant(NoOptions),
    Clamp(NoOptions),
    Impute(NoOptions),
    Resize(NoOptions),
    RowMin(NoOptions),
    RowMax(NoOptions),
    Negative(NoOptions),
    Add(NoOptions),
    Subtract(NoOptions),
    Multiply(NoOptions),
    Divide(NoOptions),
    Power(NoOptions),
    Or(NoOptions),
    And(NoOptions),
    GreaterThan(NoOptions),
    LessThan(NoOptions),
    Equal(NoOptions),
    Mean(NoOptions),
    Sum(NoOptions),
    Count(NoOptions),
    Variance(NoOptions),
    Quantile(QuantileOptions),
    LaplaceMechanism(MechanismOptions),
    GaussianMechanism(MechanismOptions),
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Materialize(_) => OperationKind::Materialize,
            Operation::Index(_) => OperationKind::Index,
            Operation::Constant(_) => OperationKind::Constant,
            Operation::Clamp(_) => OperationKind::Clamp,
            Operation::Impute(_) => OperationKind::Impute,
            Operation::Resize(_) => OperationKind::Resize,
            Operation::RowMin(_) => OperationKind::RowMin,
            Operation::RowMax(_) => OperationKind::RowMax,
            Operation::Negative(_) => OperationKind::Negative,
            Operation::Add(_) => OperationKind::Add,
            Operation::Subtract(_) => OperationKind::Subtract,
            Operation::Multiply(_) => OperationKind::Multiply,
            Operation::Divide(_) => OperationKind::Divide,
            Operation::Power(_) => OperationKind::Power,
            Operation::Or(_) => OperationKind::Or,
            Operation::And(_) => OperationKind::And,
            Operation::GreaterThan(_) => OperationKind::GreaterThan,
            Operation::LessThan(_) => OperationKind::LessThan,
            Operation::Equal(_) => OperationKind::Equal,
            Operation::Mean(_) => OperationKind::Mean,
            Operation::Sum(_) => OperationKind::Sum,
            Operation::Count(_) => OperationKind::Count,
            Operation::Variance(_) => OperationKind::Variance,
            Operation::Quantile(_) => OperationKind::Quantile,
            Operation::LaplaceMechanism(_) => OperationKind::LaplaceMechanism,
            Operation::GaussianMechanism(_) => OperationKind::GaussianMechanism,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Check the parameter record of this operation.
    pub fn validate(&self) -> YrResult<()> {
        let invalid = |what: String| YrError::InvalidOptions {
            operation: self.name(),
            what,
        };
        match self {
            Operation::Materialize(options) => {
                if options.file_path.is_some() == options.literal.is_some() {
                    return Err(invalid(
                        "exactly one of file_path or literal must be set".into(),
                    ));
                }
            }
            Operation::Quantile(options) => {
                if !(0.0..=1.0).contains(&options.quantile) {
                    return Err(invalid(format!(
                        "quantile {} outside [0, 1]",
                        options.quantile
                    )));
                }
            }
            Operation::LaplaceMechanism(options) | Operation::GaussianMechanism(options) => {
                if options.privacy_usage.is_empty() {
                    return Err(invalid("privacy_usage must not be empty".into()));
                }
                for usage in &options.privacy_usage {
                    let epsilon = usage.epsilon();
                    if !(epsilon.is_finite() && epsilon > 0.0) {
                        return Err(invalid(format!("epsilon {epsilon} must be positive")));
                    }
                    if let Some(delta) = usage.delta() {
                        if !(0.0..1.0).contains(&delta) {
                            return Err(invalid(format!("delta {delta} outside [0, 1)")));
                        }
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }
}

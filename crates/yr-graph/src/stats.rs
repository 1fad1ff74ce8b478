//! Builders for statistics and noise mechanisms.

use yr_core::{PrivacyUsage, YrResult};

use crate::component::{Component, Operand};
use crate::constraints::Constraints;
use crate::operation::{MechanismOptions, NoOptions, Operation, QuantileOptions};

fn over_data(
    operation: Operation,
    data: impl Into<Operand>,
    constraints: &Constraints,
) -> YrResult<Component> {
    Component::from_operands(operation, vec![("data", data.into())], constraints)
}

pub fn mean(data: impl Into<Operand>, constraints: &Constraints) -> YrResult<Component> {
    over_data(Operation::Mean(NoOptions {}), data, constraints)
}

pub fn sum(data: impl Into<Operand>, constraints: &Constraints) -> YrResult<Component> {
    over_data(Operation::Sum(NoOptions {}), data, constraints)
}

pub fn count(data: impl Into<Operand>, constraints: &Constraints) -> YrResult<Component> {
    over_data(Operation::Count(NoOptions {}), data, constraints)
}

pub fn variance(data: impl Into<Operand>, constraints: &Constraints) -> YrResult<Component> {
    over_data(Operation::Variance(NoOptions {}), data, constraints)
}

pub fn quantile(
    data: impl Into<Operand>,
    quantile: f64,
    constraints: &Constraints,
) -> YrResult<Component> {
    over_data(
        Operation::Quantile(QuantileOptions { quantile }),
        data,
        constraints,
    )
}

pub fn laplace_mechanism(
    data: impl Into<Operand>,
    privacy_usage: Vec<PrivacyUsage>,
) -> YrResult<Component> {
    over_data(
        Operation::LaplaceMechanism(MechanismOptions { privacy_usage }),
        data,
        &Constraints::default(),
    )
}

pub fn gaussian_mechanism(
    data: impl Into<Operand>,
    privacy_usage: Vec<PrivacyUsage>,
) -> YrResult<Component> {
    over_data(
        Operation::GaussianMechanism(MechanismOptions { privacy_usage }),
        data,
        &Constraints::default(),
    )
}

//! Arithmetic, boolean and comparison builders on components.
//!
//! Each builder creates one new component in the active analysis. The right
//! operand is coerced with [`Component::of`] once both operands have been
//! checked, so a rejected call adds nothing.

use yr_core::YrResult;

use crate::component::{Arguments, Component, Operand};
use crate::constraints::Constraints;
use crate::operation::{NoOptions, Operation};

impl Component {
    /// Unary plus: the component itself.
    pub fn positive(&self) -> Component {
        self.clone()
    }

    pub fn negative(&self) -> YrResult<Component> {
        Component::new(
            Operation::Negative(NoOptions {}),
            Arguments::new().with("data", self.clone()),
        )
    }

    pub fn add(&self, other: impl Into<Operand>) -> YrResult<Component> {
        self.binary(Operation::Add(NoOptions {}), other)
    }

    pub fn subtract(&self, other: impl Into<Operand>) -> YrResult<Component> {
        self.binary(Operation::Subtract(NoOptions {}), other)
    }

    pub fn multiply(&self, other: impl Into<Operand>) -> YrResult<Component> {
        self.binary(Operation::Multiply(NoOptions {}), other)
    }

    pub fn divide(&self, other: impl Into<Operand>) -> YrResult<Component> {
        self.binary(Operation::Divide(NoOptions {}), other)
    }

    pub fn power(&self, exponent: impl Into<Operand>) -> YrResult<Component> {
        self.binary(Operation::Power(NoOptions {}), exponent)
    }

    pub fn or(&self, other: impl Into<Operand>) -> YrResult<Component> {
        self.binary(Operation::Or(NoOptions {}), other)
    }

    pub fn and(&self, other: impl Into<Operand>) -> YrResult<Component> {
        self.binary(Operation::And(NoOptions {}), other)
    }

    pub fn greater_than(&self, other: impl Into<Operand>) -> YrResult<Component> {
        self.binary(Operation::GreaterThan(NoOptions {}), other)
    }

    pub fn less_than(&self, other: impl Into<Operand>) -> YrResult<Component> {
        self.binary(Operation::LessThan(NoOptions {}), other)
    }

    /// `Equal` node. Component identity is `==`, not this.
    pub fn equals_node(&self, other: impl Into<Operand>) -> YrResult<Component> {
        self.binary(Operation::Equal(NoOptions {}), other)
    }

    /// `GreaterThan(self, other) Or Equal(self, other)`.
    pub fn greater_equal(&self, other: impl Into<Operand>) -> YrResult<Component> {
        let other = self.checked_right(other)?;
        let greater = self.greater_than(&other)?;
        let equal = self.equals_node(&other)?;
        greater.or(&equal)
    }

    /// `LessThan(self, other) Or Equal(self, other)`.
    pub fn less_equal(&self, other: impl Into<Operand>) -> YrResult<Component> {
        let other = self.checked_right(other)?;
        let less = self.less_than(&other)?;
        let equal = self.equals_node(&other)?;
        less.or(&equal)
    }

    fn binary(&self, operation: Operation, right: impl Into<Operand>) -> YrResult<Component> {
        Component::from_operands(
            operation,
            vec![("left", Operand::from(self)), ("right", right.into())],
            &Constraints::default(),
        )
    }

    /// Right operand of a two-node comparison, coerced after both sides pass.
    fn checked_right(&self, right: impl Into<Operand>) -> YrResult<Component> {
        let right = right.into();
        Component::check_operands([("left", &Operand::from(self)), ("right", &right)])?;
        Component::of(right)
    }
}

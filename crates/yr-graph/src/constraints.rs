//! Constraint expansion.
//!
//! A caller may attach constraints to the arguments of a new component with
//! keys of the form `<argument>_min`, `<argument>_max`,
//! `<argument>_categories` and `<argument>_n`. Each constrained argument is
//! wrapped, in this order:
//!
//! 1. `min` and `max`: `Clamp(data, min, max)` then `Impute(data)`;
//!    otherwise `RowMax(left, right=max)` and/or `RowMin(left, right=min)`
//! 2. `categories`: `Clamp(data, categories)`
//! 3. `n`: `Resize(data, n)`
//!
//! Every step wraps the result of the previous one.

use std::collections::BTreeMap;

use tracing::debug;
use yr_core::{YrError, YrResult};

use crate::analysis::Analysis;
use crate::component::{Arguments, Component, Operand};
use crate::context;
use crate::operation::{NoOptions, Operation};

/// Flat constraint table keyed by `<argument>_<suffix>`.
#[derive(Debug, Clone, Default)]
pub struct Constraints(BTreeMap<String, Operand>);

impl Constraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Operand>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Operand>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Operand> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Constraints that apply to `argument`.
    fn for_argument(&self, argument: &str) -> ArgumentConstraints<'_> {
        let mut found = ArgumentConstraints::default();
        for (key, operand) in &self.0 {
            let Some(suffix) = key
                .strip_prefix(argument)
                .and_then(|rest| rest.strip_prefix('_'))
            else {
                continue;
            };
            match suffix {
                "min" => found.min = Some(operand),
                "max" => found.max = Some(operand),
                "categories" => found.categories = Some(operand),
                "n" => found.n = Some(operand),
                _ => {}
            }
        }
        found
    }
}

#[derive(Default)]
struct ArgumentConstraints<'a> {
    min: Option<&'a Operand>,
    max: Option<&'a Operand>,
    categories: Option<&'a Operand>,
    n: Option<&'a Operand>,
}

impl<'a> ArgumentConstraints<'a> {
    fn operands(&self) -> impl Iterator<Item = &'a Operand> {
        [self.min, self.max, self.categories, self.n].into_iter().flatten()
    }

    fn is_empty(&self) -> bool {
        self.operands().next().is_none()
    }
}

/// Rewrite `arguments`, wrapping every constrained argument.
///
/// Requires an active analysis. All constraint operands are checked before
/// any wrapper is created.
pub fn expand_constraints(arguments: Arguments, constraints: &Constraints) -> YrResult<Arguments> {
    if constraints.is_empty() {
        return Ok(arguments);
    }
    let analysis = context::current()?;
    check_constraints(&analysis, arguments.names(), constraints)?;

    arguments
        .into_iter()
        .map(|(name, component)| {
            let found = constraints.for_argument(&name);
            if found.is_empty() {
                return Ok((name, component));
            }
            let wrapped = wrap(&name, component, &found)?;
            Ok((name, wrapped))
        })
        .collect()
}

/// Check every constraint operand that applies to `names` without creating
/// anything.
pub(crate) fn check_constraints<'a>(
    analysis: &Analysis,
    names: impl IntoIterator<Item = &'a str>,
    constraints: &Constraints,
) -> YrResult<()> {
    if constraints.is_empty() {
        return Ok(());
    }
    for name in names {
        for operand in constraints.for_argument(name).operands() {
            check_operand(analysis, name, operand)?;
        }
    }
    Ok(())
}

/// A node operand must belong to `analysis`; a literal must be encodable.
pub(crate) fn check_operand(analysis: &Analysis, name: &str, operand: &Operand) -> YrResult<()> {
    match operand {
        Operand::Node(component) if !analysis.owns(component) => Err(YrError::ForeignArgument {
            argument: name.to_owned(),
        }),
        Operand::Node(_) => Ok(()),
        Operand::Literal(literal) => {
            yr_value::encode(&literal.value, literal.format)?;
            Ok(())
        }
    }
}

fn wrap(name: &str, mut current: Component, found: &ArgumentConstraints<'_>) -> YrResult<Component> {
    let node = |operand: &Operand| Component::of(operand.clone());

    if let (Some(min), Some(max)) = (found.min, found.max) {
        let min = node(min)?;
        let max = node(max)?;
        current = Component::new(
            Operation::Clamp(NoOptions {}),
            Arguments::new()
                .with("data", current)
                .with("min", min)
                .with("max", max),
        )?;
        current = Component::new(
            Operation::Impute(NoOptions {}),
            Arguments::new().with("data", current),
        )?;
        debug!(argument = name, "wrapped in Clamp and Impute");
    } else {
        if let Some(max) = found.max {
            current = Component::new(
                Operation::RowMax(NoOptions {}),
                Arguments::new().with("left", current).with("right", node(max)?),
            )?;
            debug!(argument = name, "wrapped in RowMax");
        }
        if let Some(min) = found.min {
            current = Component::new(
                Operation::RowMin(NoOptions {}),
                Arguments::new().with("left", current).with("right", node(min)?),
            )?;
            debug!(argument = name, "wrapped in RowMin");
        }
    }

    if let Some(categories) = found.categories {
        current = Component::new(
            Operation::Clamp(NoOptions {}),
            Arguments::new()
                .with("data", current)
                .with("categories", node(categories)?),
        )?;
        debug!(argument = name, "wrapped in categorical Clamp");
    }

    if let Some(n) = found.n {
        current = Component::new(
            Operation::Resize(NoOptions {}),
            Arguments::new().with("data", current).with("n", node(n)?),
        )?;
        debug!(argument = name, "wrapped in Resize");
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::OperationKind;
    use yr_value::Native;

    fn kinds(analysis: &Analysis) -> Vec<OperationKind> {
        analysis.components().iter().map(Component::kind).collect()
    }

    #[test]
    fn key_matching() {
        let constraints = Constraints::new()
            .with("data_min", 0.0)
            .with("data_n", 10_i64)
            .with("data_mean", 1.0)
            .with("database_max", 3.0)
            .with("other_max", 5.0);
        let found = constraints.for_argument("data");
        assert!(found.min.is_some());
        assert!(found.n.is_some());
        assert!(found.max.is_none());
        assert!(found.categories.is_none());
        assert_eq!(found.operands().count(), 2);
    }

    #[test]
    fn min_and_max_clamp_then_impute() {
        let analysis = Analysis::default();
        let _scope = analysis.enter();

        let x = Component::constant(vec![1.0, 20.0]).unwrap();
        let constraints = Constraints::new().with("x_min", 0.0).with("x_max", 10.0);
        let args = expand_constraints(Arguments::new().with("x", x.clone()), &constraints).unwrap();

        let impute = args.get("x").unwrap();
        assert_eq!(impute.kind(), OperationKind::Impute);
        assert_eq!(impute.arguments().len(), 1);

        let clamp = impute.arguments().get("data").unwrap();
        assert_eq!(clamp.kind(), OperationKind::Clamp);
        assert_eq!(clamp.arguments().get("data"), Some(&x));
        assert_eq!(clamp.arguments().get("min").unwrap().value(), Some(Native::from(0.0)));
        assert_eq!(clamp.arguments().get("max").unwrap().value(), Some(Native::from(10.0)));

        assert_eq!(
            kinds(&analysis),
            vec![
                OperationKind::Constant,
                OperationKind::Constant,
                OperationKind::Constant,
                OperationKind::Clamp,
                OperationKind::Impute,
            ]
        );
    }

    #[test]
    fn max_only_is_row_max() {
        let analysis = Analysis::default();
        let _scope = analysis.enter();

        let x = Component::constant(vec![1_i64, 2]).unwrap();
        let constraints = Constraints::new().with("x_max", 1_i64);
        let args = expand_constraints(Arguments::new().with("x", x.clone()), &constraints).unwrap();

        let wrapper = args.get("x").unwrap();
        assert_eq!(wrapper.kind(), OperationKind::RowMax);
        assert_eq!(wrapper.arguments().get("left"), Some(&x));
        assert_eq!(
            wrapper.arguments().get("right").unwrap().value(),
            Some(Native::from(1_i64))
        );
    }

    #[test]
    fn min_only_is_row_min() {
        let analysis = Analysis::default();
        let _scope = analysis.enter();

        let x = Component::constant(vec![1_i64, 2]).unwrap();
        let constraints = Constraints::new().with("x_min", 0_i64);
        let args = expand_constraints(Arguments::new().with("x", x), &constraints).unwrap();
        assert_eq!(args.get("x").unwrap().kind(), OperationKind::RowMin);
        assert!(!kinds(&analysis).contains(&OperationKind::RowMax));
    }

    #[test]
    fn n_only_is_single_resize() {
        let analysis = Analysis::default();
        let _scope = analysis.enter();

        let x = Component::constant(vec![1.0, 2.0]).unwrap();
        let constraints = Constraints::new().with("x_n", 5_i64);
        let args = expand_constraints(Arguments::new().with("x", x.clone()), &constraints).unwrap();

        let resize = args.get("x").unwrap();
        assert_eq!(resize.kind(), OperationKind::Resize);
        assert_eq!(resize.arguments().get("data"), Some(&x));
        assert_eq!(resize.arguments().get("n").unwrap().value(), Some(Native::from(5_i64)));
        assert_eq!(
            kinds(&analysis),
            vec![OperationKind::Constant, OperationKind::Constant, OperationKind::Resize]
        );
    }

    #[test]
    fn all_constraints_compose_in_fixed_order() {
        let analysis = Analysis::default();
        let _scope = analysis.enter();

        let x = Component::constant(vec!["a", "b"]).unwrap();
        let constraints = Constraints::new()
            .with("x_n", 4_i64)
            .with("x_categories", vec!["a", "b", "c"])
            .with("x_min", "a")
            .with("x_max", "c");
        let args = expand_constraints(Arguments::new().with("x", x), &constraints).unwrap();

        let resize = args.get("x").unwrap();
        assert_eq!(resize.kind(), OperationKind::Resize);
        let categorical = resize.arguments().get("data").unwrap();
        assert_eq!(categorical.kind(), OperationKind::Clamp);
        assert!(categorical.arguments().get("categories").is_some());
        let impute = categorical.arguments().get("data").unwrap();
        assert_eq!(impute.kind(), OperationKind::Impute);
    }

    #[test]
    fn unconstrained_arguments_untouched() {
        let analysis = Analysis::default();
        let _scope = analysis.enter();

        let x = Component::constant(1.0).unwrap();
        let y = Component::constant(2.0).unwrap();
        let constraints = Constraints::new().with("y_n", 3_i64);
        let args = expand_constraints(
            Arguments::new().with("x", x.clone()).with("y", y.clone()),
            &constraints,
        )
        .unwrap();
        assert_eq!(args.get("x"), Some(&x));
        assert_ne!(args.get("y"), Some(&y));
    }

    #[test]
    fn component_operand_is_used_directly() {
        let analysis = Analysis::default();
        let _scope = analysis.enter();

        let x = Component::constant(vec![1.0]).unwrap();
        let n = Component::constant(7_i64).unwrap();
        let constraints = Constraints::new().with("x_n", &n);
        let args = expand_constraints(Arguments::new().with("x", x), &constraints).unwrap();
        assert_eq!(args.get("x").unwrap().arguments().get("n"), Some(&n));
        assert_eq!(analysis.len(), 3);
    }

    #[test]
    fn bad_literal_creates_nothing() {
        let analysis = Analysis::default();
        let _scope = analysis.enter();

        let x = Component::constant(vec![1.0]).unwrap();
        let constraints = Constraints::new()
            .with("x_min", 0.0)
            .with("x_max", Native::Null);
        let err = expand_constraints(Arguments::new().with("x", x), &constraints).unwrap_err();
        assert!(matches!(err, YrError::UnsupportedDtype { .. }));
        assert_eq!(analysis.len(), 1);
    }
}

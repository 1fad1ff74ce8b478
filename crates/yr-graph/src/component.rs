//! Components: the nodes of an analysis.
//!
//! A component is created inside an active analysis scope and registers
//! itself there on construction. The handle is cheap to clone; equality and
//! hashing are by identity, never by content.

use std::cell::{OnceCell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use yr_core::{NodeId, PrivacyUsage, YrError, YrResult};
use yr_value::{Elements, Native, NdArray, ValueFormat};

use crate::analysis::{Analysis, AnalysisState, Literal};
use crate::constraints::{self, Constraints};
use crate::context;
use crate::operation::{NoOptions, Operation, OperationKind};

/// Set once, when the owning analysis registers the component.
pub(crate) struct Owner {
    pub(crate) id: NodeId,
    pub(crate) analysis: Weak<RefCell<AnalysisState>>,
}

struct ComponentInner {
    operation: Operation,
    arguments: Arguments,
    owner: OnceCell<Owner>,
}

#[derive(Clone)]
pub struct Component {
    inner: Rc<ComponentInner>,
}

/// Named references to other components. Missing arguments are simply absent.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Arguments(BTreeMap<String, Component>);

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, component: Component) -> Self {
        self.insert(name, component);
        self
    }

    /// Add the argument only when present.
    pub fn with_optional(mut self, name: impl Into<String>, component: Option<Component>) -> Self {
        if let Some(component) = component {
            self.insert(name, component);
        }
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, component: Component) -> Option<Component> {
        self.0.insert(name.into(), component)
    }

    pub fn get(&self, name: &str) -> Option<&Component> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Component)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Component)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (String, Component)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Arguments {
    type Item = (String, Component);
    type IntoIter = std::collections::btree_map::IntoIter<String, Component>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.iter().map(|(k, v)| (k, v.id())))
            .finish()
    }
}

/// Something that can stand in for a component: an existing component, or a
/// literal that becomes a `Constant` component.
#[derive(Debug, Clone)]
pub enum Operand {
    Node(Component),
    Literal(Literal),
}

impl Operand {
    pub fn literal(value: impl Into<Native>, format: Option<ValueFormat>) -> Self {
        Operand::Literal(Literal {
            value: value.into(),
            format,
        })
    }
}

impl From<Component> for Operand {
    fn from(c: Component) -> Self {
        Operand::Node(c)
    }
}

impl From<&Component> for Operand {
    fn from(c: &Component) -> Self {
        Operand::Node(c.clone())
    }
}

impl From<Literal> for Operand {
    fn from(l: Literal) -> Self {
        Operand::Literal(l)
    }
}

macro_rules! literal_operand {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Operand {
                fn from(v: $t) -> Self {
                    Operand::literal(v, None)
                }
            }
        )*
    };
}

literal_operand!(
    Native,
    NdArray,
    Elements,
    bool,
    i32,
    i64,
    f64,
    &str,
    String,
    Vec<bool>,
    Vec<i64>,
    Vec<f64>,
    Vec<String>,
    Vec<&str>,
);

impl Component {
    /// Create a component in the active analysis.
    pub fn new(operation: Operation, arguments: Arguments) -> YrResult<Component> {
        Self::build(operation, arguments, &Constraints::default(), None)
    }

    /// Create a component, first wrapping constrained arguments
    /// (see [`constraints::expand_constraints`]).
    pub fn with_constraints(
        operation: Operation,
        arguments: Arguments,
        constraints: &Constraints,
    ) -> YrResult<Component> {
        Self::build(operation, arguments, constraints, None)
    }

    /// `Constant` component whose value is released up front.
    pub fn constant(value: impl Into<Native>) -> YrResult<Component> {
        Self::constant_with_format(value, None)
    }

    pub fn constant_with_format(
        value: impl Into<Native>,
        format: Option<ValueFormat>,
    ) -> YrResult<Component> {
        let literal = Literal {
            value: value.into(),
            format,
        };
        Self::build(
            Operation::Constant(NoOptions {}),
            Arguments::new(),
            &Constraints::default(),
            Some(literal),
        )
    }

    /// Coerce to a component: components pass through, literals become constants.
    pub fn of(operand: impl Into<Operand>) -> YrResult<Component> {
        match operand.into() {
            Operand::Node(component) => Ok(component),
            Operand::Literal(literal) => Self::constant_with_format(literal.value, literal.format),
        }
    }

    /// Like [`Component::of`], but a missing operand stays missing.
    pub fn of_optional<T: Into<Operand>>(operand: Option<T>) -> YrResult<Option<Component>> {
        operand.map(Self::of).transpose()
    }

    /// Create a component from operands, coercing literals only once every
    /// check has passed. A rejected call leaves the analysis unchanged.
    pub(crate) fn from_operands(
        operation: Operation,
        operands: Vec<(&'static str, Operand)>,
        constraints: &Constraints,
    ) -> YrResult<Component> {
        let analysis = context::current()?;

        operation.validate()?;
        let kind = operation.kind();
        if let Some((name, _)) = operands.iter().find(|(n, _)| !kind.accepts_argument(n)) {
            return Err(YrError::configuration(format!(
                "{kind} does not take an argument named '{name}'"
            )));
        }
        for (name, operand) in &operands {
            constraints::check_operand(&analysis, name, operand)?;
        }
        constraints::check_constraints(&analysis, operands.iter().map(|(n, _)| *n), constraints)?;

        let mut arguments = Arguments::new();
        for (name, operand) in operands {
            arguments.insert(name, Self::of(operand)?);
        }
        Self::build(operation, arguments, constraints, None)
    }

    /// Check operands against the active analysis without creating anything.
    pub(crate) fn check_operands<'a>(
        operands: impl IntoIterator<Item = (&'a str, &'a Operand)>,
    ) -> YrResult<()> {
        let analysis = context::current()?;
        for (name, operand) in operands {
            constraints::check_operand(&analysis, name, operand)?;
        }
        Ok(())
    }

    fn build(
        operation: Operation,
        arguments: Arguments,
        constraints: &Constraints,
        literal: Option<Literal>,
    ) -> YrResult<Component> {
        let analysis = context::current()?;

        operation.validate()?;
        let kind = operation.kind();
        if let Some(name) = arguments.names().find(|n| !kind.accepts_argument(n)) {
            return Err(YrError::configuration(format!(
                "{kind} does not take an argument named '{name}'"
            )));
        }
        for (name, argument) in arguments.iter() {
            if !analysis.owns(argument) {
                return Err(YrError::ForeignArgument {
                    argument: name.to_owned(),
                });
            }
        }
        if let Some(literal) = &literal {
            yr_value::encode(&literal.value, literal.format)?;
        }

        let arguments = constraints::expand_constraints(arguments, constraints)?;

        let component = Component {
            inner: Rc::new(ComponentInner {
                operation,
                arguments,
                owner: OnceCell::new(),
            }),
        };
        analysis.add_component(&component, literal)?;
        Ok(component)
    }

    /// Id assigned by the owning analysis.
    pub fn id(&self) -> Option<NodeId> {
        self.owner().map(|o| o.id)
    }

    pub fn operation(&self) -> &Operation {
        &self.inner.operation
    }

    pub fn kind(&self) -> OperationKind {
        self.inner.operation.kind()
    }

    pub fn arguments(&self) -> &Arguments {
        &self.inner.arguments
    }

    /// Owning analysis, if it is still alive.
    pub fn analysis(&self) -> Option<Analysis> {
        self.owner()
            .and_then(|o| o.analysis.upgrade())
            .map(Analysis::from_state)
    }

    /// Released value, if the owning analysis holds one for this component.
    pub fn value(&self) -> Option<Native> {
        let id = self.id()?;
        self.analysis()?.released(id).map(|r| r.value)
    }

    /// Privacy usage reported with the released value.
    pub fn actual_privacy_usage(&self) -> Option<Vec<PrivacyUsage>> {
        let id = self.id()?;
        self.analysis()?.released(id).and_then(|r| r.privacy_usage)
    }

    pub(crate) fn owner(&self) -> Option<&Owner> {
        self.inner.owner.get()
    }

    pub(crate) fn set_owner(&self, owner: Owner) -> Result<(), Owner> {
        self.inner.owner.set(owner)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Component {}

impl Hash for Component {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Rc::as_ptr(&self.inner), state);
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.id())
            .field("operation", &self.kind())
            .field("arguments", self.arguments())
            .finish()
    }
}

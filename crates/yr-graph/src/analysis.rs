//! The analysis: owner of all components and their released values.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;
use yr_core::{NodeId, PrivacyDefinition, PrivacyUsage, YrError, YrResult};
use yr_value::{Native, ValueFormat};

use crate::component::{Component, Owner};

/// A literal value supplied at construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: Native,
    pub format: Option<ValueFormat>,
}

/// A value held in the released-value table.
#[derive(Debug, Clone, PartialEq)]
pub struct Released {
    pub value: Native,
    pub format: Option<ValueFormat>,
    pub privacy_usage: Option<Vec<PrivacyUsage>>,
}

impl From<Literal> for Released {
    fn from(literal: Literal) -> Self {
        Self {
            value: literal.value,
            format: literal.format,
            privacy_usage: None,
        }
    }
}

pub(crate) struct AnalysisState {
    pub(crate) definition: PrivacyDefinition,
    pub(crate) components: BTreeMap<NodeId, Component>,
    pub(crate) release: BTreeMap<NodeId, Released>,
    next_index: u32,
}

/// Handle to an analysis. Clones refer to the same analysis.
///
/// The analysis is the only writer of component ids and of the
/// released-value table. Ids start at 0, increase by one per registered
/// component and are never reused.
#[derive(Clone)]
pub struct Analysis {
    state: Rc<RefCell<AnalysisState>>,
}

impl Analysis {
    pub fn new(definition: PrivacyDefinition) -> Self {
        Self {
            state: Rc::new(RefCell::new(AnalysisState {
                definition,
                components: BTreeMap::new(),
                release: BTreeMap::new(),
                next_index: 0,
            })),
        }
    }

    pub(crate) fn from_state(state: Rc<RefCell<AnalysisState>>) -> Self {
        Self { state }
    }

    pub(crate) fn state(&self) -> &RefCell<AnalysisState> {
        &self.state
    }

    pub fn definition(&self) -> PrivacyDefinition {
        self.state.borrow().definition
    }

    /// Number of registered components.
    pub fn len(&self) -> usize {
        self.state.borrow().components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn component(&self, id: NodeId) -> Option<Component> {
        self.state.borrow().components.get(&id).cloned()
    }

    /// All components in id order.
    pub fn components(&self) -> Vec<Component> {
        self.state.borrow().components.values().cloned().collect()
    }

    pub fn released(&self, id: NodeId) -> Option<Released> {
        self.state.borrow().release.get(&id).cloned()
    }

    /// Ids with an entry in the released-value table.
    pub fn released_ids(&self) -> Vec<NodeId> {
        self.state.borrow().release.keys().copied().collect()
    }

    /// True if both handles refer to the same analysis.
    pub fn ptr_eq(&self, other: &Analysis) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// True if `component` is registered in this analysis.
    pub fn owns(&self, component: &Component) -> bool {
        component
            .owner()
            .is_some_and(|o| Weak::ptr_eq(&o.analysis, &Rc::downgrade(&self.state)))
    }

    /// Register a component and assign it the next id.
    ///
    /// A literal is stored in the released-value table under the same id.
    /// Fails without touching the analysis if the component already has an
    /// owner or references a component owned elsewhere.
    pub fn add_component(&self, component: &Component, literal: Option<Literal>) -> YrResult<NodeId> {
        if let Some(owner) = component.owner() {
            return Err(YrError::AlreadyOwned { id: owner.id });
        }
        for (name, argument) in component.arguments().iter() {
            if !self.owns(argument) {
                return Err(YrError::ForeignArgument {
                    argument: name.to_owned(),
                });
            }
        }

        let mut state = self.state.borrow_mut();
        let index = state.next_index;
        if index > NodeId::MAX_INDEX {
            return Err(YrError::configuration("analysis has run out of component ids"));
        }
        let id = NodeId::from_index(index);

        if component
            .set_owner(Owner {
                id,
                analysis: Rc::downgrade(&self.state),
            })
            .is_err()
        {
            return Err(YrError::AlreadyOwned { id });
        }

        state.next_index = index + 1;
        state.components.insert(id, component.clone());
        if let Some(literal) = literal {
            state.release.insert(id, literal.into());
        }

        debug!(id = %id, operation = component.kind().name(), "component registered");
        Ok(id)
    }

    /// Attach privacy usage to a component's released value.
    pub fn set_privacy_usage(&self, component: &Component, usage: Vec<PrivacyUsage>) -> YrResult<()> {
        let id = component
            .id()
            .filter(|_| self.owns(component))
            .ok_or_else(|| YrError::configuration("component is not part of this analysis"))?;
        let mut state = self.state.borrow_mut();
        let released = state.release.get_mut(&id).ok_or_else(|| {
            YrError::configuration(format!("component {id} has no released value"))
        })?;
        released.privacy_usage = Some(usage);
        Ok(())
    }

    /// Replace the released-value table wholesale.
    pub(crate) fn replace_release(&self, release: BTreeMap<NodeId, Released>) {
        self.state.borrow_mut().release = release;
    }
}

impl Default for Analysis {
    fn default() -> Self {
        Self::new(PrivacyDefinition::default())
    }
}

impl fmt::Debug for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Analysis")
            .field("definition", &state.definition)
            .field("components", &state.components.len())
            .field("released", &state.release.len())
            .finish()
    }
}

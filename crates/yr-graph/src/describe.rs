//! Serializable descriptions of an analysis, as sent to the engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use yr_core::{NodeId, PrivacyDefinition, PrivacyUsage, YrError, YrResult};
use yr_value::{Native, Value};

use crate::analysis::{Analysis, Released};
use crate::operation::Operation;

/// One component: its arguments by id, plus its operation keyed by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDescription {
    #[serde(default)]
    pub arguments: BTreeMap<String, NodeId>,
    #[serde(flatten)]
    pub variant: Operation,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComputationGraph {
    #[serde(default)]
    pub value: BTreeMap<NodeId, ComponentDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDescription {
    pub computation_graph: ComputationGraph,
    pub privacy_definition: PrivacyDefinition,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReleaseNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub privacy_usage: Vec<PrivacyUsage>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReleaseDescription {
    #[serde(default)]
    pub values: BTreeMap<NodeId, ReleaseNode>,
}

impl Analysis {
    /// Flatten the graph into its node table.
    pub fn describe(&self) -> AnalysisDescription {
        let state = self.state().borrow();
        let value = state
            .components
            .iter()
            .map(|(&id, component)| {
                let arguments = component
                    .arguments()
                    .iter()
                    .filter_map(|(name, argument)| Some((name.to_owned(), argument.id()?)))
                    .collect();
                let description = ComponentDescription {
                    arguments,
                    variant: component.operation().clone(),
                };
                (id, description)
            })
            .collect();

        AnalysisDescription {
            computation_graph: ComputationGraph { value },
            privacy_definition: state.definition,
        }
    }

    /// Encode the released-value table.
    pub fn describe_release(&self) -> YrResult<ReleaseDescription> {
        let state = self.state().borrow();
        let values = state
            .release
            .iter()
            .map(|(&id, released)| {
                let value = match &released.value {
                    Native::Null => None,
                    native => Some(yr_value::encode(native, released.format)?),
                };
                let node = ReleaseNode {
                    value,
                    privacy_usage: released.privacy_usage.clone().unwrap_or_default(),
                };
                Ok((id, node))
            })
            .collect::<YrResult<_>>()?;
        Ok(ReleaseDescription { values })
    }

    /// Replace the released-value table with a decoded engine release.
    ///
    /// Nothing changes if any value fails to decode.
    pub fn apply_release(&self, release: &ReleaseDescription) -> YrResult<()> {
        let decoded = release
            .values
            .iter()
            .map(|(&id, node)| {
                let value = yr_value::decode_optional(node.value.as_ref())
                    .map_err(YrError::from)?;
                let privacy_usage =
                    (!node.privacy_usage.is_empty()).then(|| node.privacy_usage.clone());
                Ok((
                    id,
                    Released {
                        value,
                        format: None,
                        privacy_usage,
                    },
                ))
            })
            .collect::<YrResult<BTreeMap<_, _>>>()?;

        debug!(values = decoded.len(), "release applied");
        self.replace_release(decoded);
        Ok(())
    }
}

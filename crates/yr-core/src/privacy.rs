//! Privacy-usage records attached to released values.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{YrError, YrResult};

/// Privacy cost of one release.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PrivacyUsage {
    #[serde(rename = "distance_pure")]
    Pure { epsilon: f64 },
    #[serde(rename = "distance_approximate")]
    Approximate { epsilon: f64, delta: f64 },
}

impl PrivacyUsage {
    pub fn epsilon(&self) -> f64 {
        match *self {
            PrivacyUsage::Pure { epsilon } | PrivacyUsage::Approximate { epsilon, .. } => epsilon,
        }
    }

    /// Delta of an approximate record; pure records have none.
    pub fn delta(&self) -> Option<f64> {
        match *self {
            PrivacyUsage::Pure { .. } => None,
            PrivacyUsage::Approximate { delta, .. } => Some(delta),
        }
    }
}

/// Epsilon or delta as supplied by a caller: one number or a sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Budget {
    Single(f64),
    Many(Vec<f64>),
}

impl Budget {
    /// Number of entries; a single number counts as one.
    pub fn len(&self) -> usize {
        match self {
            Budget::Single(_) => 1,
            Budget::Many(vs) => vs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn into_vec(self) -> Vec<f64> {
        match self {
            Budget::Single(v) => vec![v],
            Budget::Many(vs) => vs,
        }
    }
}

impl From<f64> for Budget {
    fn from(v: f64) -> Self {
        Budget::Single(v)
    }
}

impl From<Vec<f64>> for Budget {
    fn from(vs: Vec<f64>) -> Self {
        Budget::Many(vs)
    }
}

impl From<&[f64]> for Budget {
    fn from(vs: &[f64]) -> Self {
        Budget::Many(vs.to_vec())
    }
}

/// Build privacy-usage records from an epsilon and an optional delta.
///
/// - epsilon and delta: approximate records paired element-wise; pairing stops
///   at the shorter sequence
/// - epsilon only: pure records
/// - anything else: `None`
pub fn privacy_usage(epsilon: Option<Budget>, delta: Option<Budget>) -> Option<Vec<PrivacyUsage>> {
    match (epsilon, delta) {
        (Some(epsilon), Some(delta)) => {
            let epsilon = epsilon.into_vec();
            let delta = delta.into_vec();
            if epsilon.len() != delta.len() {
                warn!(
                    epsilon_len = epsilon.len(),
                    delta_len = delta.len(),
                    "epsilon/delta lengths differ; pairing truncated to the shorter"
                );
            }
            Some(
                epsilon
                    .into_iter()
                    .zip(delta)
                    .map(|(epsilon, delta)| PrivacyUsage::Approximate { epsilon, delta })
                    .collect(),
            )
        }
        (Some(epsilon), None) => Some(
            epsilon
                .into_vec()
                .into_iter()
                .map(|epsilon| PrivacyUsage::Pure { epsilon })
                .collect(),
        ),
        _ => None,
    }
}

/// Like [`privacy_usage`], but mismatched lengths are an error. A single
/// number counts as a sequence of one.
pub fn privacy_usage_strict(
    epsilon: Option<Budget>,
    delta: Option<Budget>,
) -> YrResult<Option<Vec<PrivacyUsage>>> {
    if let (Some(e), Some(d)) = (&epsilon, &delta) {
        if e.len() != d.len() {
            return Err(YrError::configuration(format!(
                "epsilon has {} entries but delta has {}",
                e.len(),
                d.len()
            )));
        }
    }
    Ok(privacy_usage(epsilon, delta))
}

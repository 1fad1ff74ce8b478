//! Privacy definition attached to every analysis.
//!
//! The tags serialize exactly as the engine expects them (`PURE`,
//! `APPROXIMATE`, `SUBSTITUTE`, `ADD_REMOVE`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{YrError, YrResult};

/// Distance metric used when accounting privacy usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Distance {
    Pure,
    #[default]
    Approximate,
}

/// Definition of neighboring datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Neighboring {
    #[default]
    Substitute,
    AddRemove,
}

impl Distance {
    pub fn as_str(self) -> &'static str {
        match self {
            Distance::Pure => "PURE",
            Distance::Approximate => "APPROXIMATE",
        }
    }
}

impl Neighboring {
    pub fn as_str(self) -> &'static str {
        match self {
            Neighboring::Substitute => "SUBSTITUTE",
            Neighboring::AddRemove => "ADD_REMOVE",
        }
    }
}

impl FromStr for Distance {
    type Err = YrError;

    fn from_str(s: &str) -> YrResult<Self> {
        match s {
            "PURE" => Ok(Distance::Pure),
            "APPROXIMATE" => Ok(Distance::Approximate),
            other => Err(YrError::configuration(format!(
                "unknown distance '{other}' (expected PURE or APPROXIMATE)"
            ))),
        }
    }
}

impl FromStr for Neighboring {
    type Err = YrError;

    fn from_str(s: &str) -> YrResult<Self> {
        match s {
            "SUBSTITUTE" => Ok(Neighboring::Substitute),
            "ADD_REMOVE" => Ok(Neighboring::AddRemove),
            other => Err(YrError::configuration(format!(
                "unknown neighboring '{other}' (expected SUBSTITUTE or ADD_REMOVE)"
            ))),
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Neighboring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distance + neighboring pair sent alongside every graph description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrivacyDefinition {
    #[serde(default)]
    pub distance: Distance,
    #[serde(default)]
    pub neighboring: Neighboring,
}

impl PrivacyDefinition {
    pub fn new(distance: Distance, neighboring: Neighboring) -> Self {
        Self {
            distance,
            neighboring,
        }
    }

    /// Parse both tags from their wire names.
    pub fn parse(distance: &str, neighboring: &str) -> YrResult<Self> {
        Ok(Self::new(distance.parse()?, neighboring.parse()?))
    }

    pub fn from_yaml_str(content: &str) -> YrResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| YrError::configuration(format!("privacy definition: {e}")))
    }

    pub fn from_json_str(content: &str) -> YrResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| YrError::configuration(format!("privacy definition: {e}")))
    }
}

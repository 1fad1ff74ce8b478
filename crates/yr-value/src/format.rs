use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Format tag a caller may attach to a literal.
///
/// No tag means "infer from the value": maps become `hashmap`, jagged columns
/// become `jagged`, everything else becomes `array`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueFormat {
    Array,
    Jagged,
    Hashmap,
}

impl ValueFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueFormat::Array => "array",
            ValueFormat::Jagged => "jagged",
            ValueFormat::Hashmap => "hashmap",
        }
    }
}

impl fmt::Display for ValueFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueFormat {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "array" => Ok(ValueFormat::Array),
            "jagged" => Ok(ValueFormat::Jagged),
            "hashmap" => Ok(ValueFormat::Hashmap),
            other => Err(ValueError::format(format!(
                "format must be either \"array\", \"jagged\" or \"hashmap\", got \"{other}\""
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_tags() {
        for tag in [ValueFormat::Array, ValueFormat::Jagged, ValueFormat::Hashmap] {
            assert_eq!(tag.as_str().parse::<ValueFormat>().unwrap(), tag);
        }
    }

    #[test]
    fn unknown_tag_maps_to_configuration() {
        let err = "table".parse::<ValueFormat>().unwrap_err();
        let core: yr_core::YrError = err.into();
        assert!(core.is_configuration());
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CardError;

/// Host whose limits a card is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetPlatform {
    #[default]
    Teams,
    Generic,
}

impl TargetPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetPlatform::Teams => "teams",
            TargetPlatform::Generic => "generic",
        }
    }

    /// Maximum serialized payload, in kilobytes.
    pub fn size_limit_kb(&self) -> f64 {
        match self {
            TargetPlatform::Teams => 28.0,
            TargetPlatform::Generic => 40.0,
        }
    }

    /// Deepest allowed nesting of containers and columns; top-level body elements are depth 1.
    pub fn max_depth(&self) -> usize {
        match self {
            TargetPlatform::Teams => 8,
            TargetPlatform::Generic => 10,
        }
    }

    /// Newest schema version the host renders.
    pub fn max_version(&self) -> &'static str {
        match self {
            TargetPlatform::Teams => "1.5",
            TargetPlatform::Generic => "1.6",
        }
    }
}

impl fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetPlatform {
    type Err = CardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "teams" | "msteams" => Ok(TargetPlatform::Teams),
            "generic" | "default" => Ok(TargetPlatform::Generic),
            _ => Err(CardError::invalid(format!(
                "unknown target platform '{value}' (expected teams or generic)"
            ))),
        }
    }
}

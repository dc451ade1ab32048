use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Where a series is fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Federal Reserve Economic Data (St. Louis Fed).
    Fred,
    /// U.S. Bureau of Labor Statistics public data API.
    Bls,
    /// Local two-column CSV/TSV file; the identifier is the path.
    File,
}

impl SourceKind {
    pub const ALL: [Self; 3] = [Self::Fred, Self::Bls, Self::File];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fred => "fred",
            Self::Bls => "bls",
            Self::File => "file",
        }
    }

    /// Publisher name used in chart footers.
    pub const fn publisher(self) -> &'static str {
        match self {
            Self::Fred => "Federal Reserve Economic Data",
            Self::Bls => "U.S. Bureau of Labor Statistics",
            Self::File => "local file",
        }
    }

    pub const fn is_remote(self) -> bool {
        matches!(self, Self::Fred | Self::Bls)
    }
}

impl Display for SourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fred" => Ok(Self::Fred),
            "bls" => Ok(Self::Bls),
            "file" => Ok(Self::File),
            other => Err(ValidationError::UnknownSourceTag {
                value: other.to_owned(),
            }),
        }
    }
}

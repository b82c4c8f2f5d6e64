//! Wire versions
//!
//! Exactly two versions exist. A session picks one up front and every
//! version-dependent encoding is checked against it:
//! - indexer access nodes (`[.]`) only exist from `0.9` on;
//! - a conditional may only carry an explicit result type from `0.9` on.
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::error::{WireError, WireResult};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
pub enum Version {
    #[serde(rename = "0.8")]
    #[strum(serialize = "0.8")]
    V0_8,

    #[default]
    #[serde(rename = "0.9")]
    #[strum(serialize = "0.9")]
    V0_9,
}

impl Version {
    pub const LATEST: Version = Version::V0_9;

    pub fn supports_indexer(self) -> bool {
        self >= Version::V0_9
    }

    pub fn supports_conditional_type(self) -> bool {
        self >= Version::V0_9
    }

    /// Fail with [`WireError::UnsupportedByVersion`] unless `supported`.
    pub(crate) fn require(self, supported: bool, construct: &'static str) -> WireResult<()> {
        if supported {
            Ok(())
        } else {
            Err(WireError::UnsupportedByVersion {
                construct,
                version: self,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gates() {
        assert!(!Version::V0_8.supports_indexer());
        assert!(!Version::V0_8.supports_conditional_type());
        assert!(Version::V0_9.supports_indexer());
        assert!(Version::LATEST.supports_conditional_type());
        assert_eq!(Version::default(), Version::V0_9);
        assert!(Version::V0_8.require(false, "Indexer access").is_err());
    }
}

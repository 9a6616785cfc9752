//! Protocol version model and the shared upgrade gate.
//!
//! Deployed OSx contracts report their protocol version as `uint8[3]`.
//! Both the skip pre-check and the decision procedure go through
//! [`ProtocolVersion::upgrade_step`], so the downgrade comparison lives in
//! exactly one place.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::UpgradeError;

/// `(major, minor, patch)` reported by a deployed contract.
///
/// The derived `Ord` compares fields in declaration order, which is the
/// lexicographic order on the triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProtocolVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl ProtocolVersion {
    /// Version assumed for deployments that predate the `protocolVersion()` getter.
    pub const LEGACY: ProtocolVersion = ProtocolVersion::new(1, 0, 0);

    pub const fn new(major: u8, minor: u8, patch: u8) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub const fn as_array(&self) -> [u8; 3] {
        [self.major, self.minor, self.patch]
    }

    /// Gate an upgrade from `self` (currently deployed) to `target`.
    ///
    /// # Errors
    /// `UpgradeError::DowngradeRejected` when `self > target`.
    pub fn upgrade_step(self, target: ProtocolVersion) -> Result<UpgradeStep, UpgradeError> {
        match self.cmp(&target) {
            std::cmp::Ordering::Greater => Err(UpgradeError::DowngradeRejected {
                current: self,
                target,
            }),
            std::cmp::Ordering::Equal => Ok(UpgradeStep::UpToDate),
            std::cmp::Ordering::Less => Ok(UpgradeStep::Upgrade {
                from: self,
                to: target,
            }),
        }
    }
}

impl From<[u8; 3]> for ProtocolVersion {
    fn from([major, minor, patch]: [u8; 3]) -> Self {
        Self::new(major, minor, patch)
    }
}

impl From<ProtocolVersion> for [u8; 3] {
    fn from(version: ProtocolVersion) -> Self {
        version.as_array()
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid protocol version '{0}': expected MAJOR.MINOR.PATCH with components in 0..=255")]
pub struct ParseVersionError(String);

impl FromStr for ProtocolVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let parts: Vec<&str> = digits.split('.').collect();
        let [major, minor, patch] = parts.as_slice() else {
            return Err(ParseVersionError(s.to_string()));
        };
        let parse = |part: &str| part.parse::<u8>().map_err(|_| ParseVersionError(s.to_string()));
        Ok(Self::new(parse(*major)?, parse(*minor)?, parse(*patch)?))
    }
}

/// Result of a `protocolVersion()` read.
///
/// Older deployments do not expose the getter at all; chain adapters report
/// that as `Unversioned` instead of an error, and every other failure stays
/// an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionReading {
    Reported(ProtocolVersion),
    Unversioned,
}

impl VersionReading {
    /// Map an unversioned deployment to [`ProtocolVersion::LEGACY`].
    pub fn or_legacy(self) -> ProtocolVersion {
        match self {
            VersionReading::Reported(version) => version,
            VersionReading::Unversioned => ProtocolVersion::LEGACY,
        }
    }

    pub fn reported(self) -> Option<ProtocolVersion> {
        match self {
            VersionReading::Reported(version) => Some(version),
            VersionReading::Unversioned => None,
        }
    }
}

/// Outcome of the version gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeStep {
    UpToDate,
    Upgrade {
        from: ProtocolVersion,
        to: ProtocolVersion,
    },
}

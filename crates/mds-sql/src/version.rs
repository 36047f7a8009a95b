//! MDS release versions.
//!
//! [`Version`] is a numeric `MAJOR.MINOR.PATCH` triple. Ordering compares the
//! components as integers, so `0.10.0 > 0.9.0` even though the strings sort the
//! other way around.
//!
//! # Example
//! ```
//! use mds_sql::Version;
//!
//! let v = Version::parse("0.3.1")?;
//! assert!(v >= Version::new(0, 3, 0));
//! assert!(v.is_supported());
//! assert!(Version::parse("0.1.0")?.is_unsupported());
//! # Ok::<(), mds_sql::SqlGenError>(())
//! ```

use crate::error::{SqlGenError, SqlGenResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Published MDS provider releases, oldest first.
const MDS_RELEASES: &[Version] = &[
    Version::new(0, 2, 0),
    Version::new(0, 2, 1),
    Version::new(0, 3, 0),
    Version::new(0, 3, 1),
    Version::new(0, 3, 2),
    Version::new(0, 4, 0),
    Version::new(0, 4, 1),
];

/// A semantic version of the MDS provider schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// First release whose timestamps are milliseconds and whose status changes
    /// carry a single `associated_trip`.
    pub const V0_3_0: Version = Version::new(0, 3, 0);

    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse `MAJOR.MINOR` or `MAJOR.MINOR.PATCH`, with an optional leading `v`.
    pub fn parse(s: &str) -> SqlGenResult<Self> {
        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        let mut nums = [0u64; 3];
        let mut count = 0;
        for part in body.split('.') {
            if count == nums.len() || part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit())
            {
                return Err(SqlGenError::invalid_version(s));
            }
            nums[count] = part
                .parse::<u64>()
                .map_err(|_| SqlGenError::invalid_version(s))?;
            count += 1;
        }
        if count < 2 {
            return Err(SqlGenError::invalid_version(s));
        }

        Ok(Self::new(nums[0], nums[1], nums[2]))
    }

    /// All known MDS releases, oldest first.
    pub fn mds() -> &'static [Version] {
        MDS_RELEASES
    }

    /// Lowest supported release; the default target when none is given.
    pub fn mds_lower() -> Version {
        MDS_RELEASES[0]
    }

    /// Highest supported release.
    pub fn mds_upper() -> Version {
        MDS_RELEASES[MDS_RELEASES.len() - 1]
    }

    pub fn is_supported(&self) -> bool {
        *self >= Self::mds_lower() && *self <= Self::mds_upper()
    }

    pub fn is_unsupported(&self) -> bool {
        !self.is_supported()
    }

    /// Whether this release predates the millisecond-timestamp schema.
    pub fn uses_unix_seconds(&self) -> bool {
        *self < Self::V0_3_0
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::mds_lower()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = SqlGenError;

    fn from_str(s: &str) -> SqlGenResult<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = SqlGenError;

    fn try_from(s: String) -> SqlGenResult<Self> {
        Self::parse(&s)
    }
}

impl From<Version> for String {
    fn from(v: Version) -> Self {
        v.to_string()
    }
}

/// Convert an input into a [`Version`].
///
/// This is mainly for ergonomics in builder APIs.
pub trait IntoVersion {
    fn into_version(self) -> SqlGenResult<Version>;
}

impl IntoVersion for Version {
    fn into_version(self) -> SqlGenResult<Version> {
        Ok(self)
    }
}

impl IntoVersion for &Version {
    fn into_version(self) -> SqlGenResult<Version> {
        Ok(*self)
    }
}

impl IntoVersion for &str {
    fn into_version(self) -> SqlGenResult<Version> {
        Version::parse(self)
    }
}

impl IntoVersion for String {
    fn into_version(self) -> SqlGenResult<Version> {
        Version::parse(&self)
    }
}

impl IntoVersion for &String {
    fn into_version(self) -> SqlGenResult<Version> {
        Version::parse(self)
    }
}

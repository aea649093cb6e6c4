//! Version bands for settings overrides
//!
//! A `VersionBand` is a minimum-version threshold at which a settings
//! override becomes active. When several bands qualify for a connection
//! (band <= reported version) the highest one wins.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A (major, minor) version pair attached to a connection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct VersionBand {
    pub major: u32,
    pub minor: u32,
}

impl VersionBand {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse a version band from text such as "9.1", "16" or "10.2.3".
    /// Anything past major.minor is ignored; a missing minor is 0.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.trim().split(['.', '_']);
        let major = parts.next()?.trim().parse().ok()?;
        let minor = parts
            .next()
            .and_then(|m| m.trim().parse().ok())
            .unwrap_or(0);
        Some(Self { major, minor })
    }

    /// Extract a version band from a driver-reported product version
    /// string, which is frequently decorated ("PostgreSQL 14.2 on
    /// x86_64-pc-linux-gnu", "5.7.33-log"). The first run of digits is
    /// taken as the major version, the run after the next dot as minor.
    pub fn from_product_version(raw: &str) -> Option<Self> {
        let start = raw.find(|c: char| c.is_ascii_digit())?;
        let tail = &raw[start..];
        let end = tail
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(tail.len());
        Self::parse(&tail[..end])
    }

    /// Whether this band applies to a connection reporting `actual`.
    pub fn qualifies_for(&self, actual: VersionBand) -> bool {
        *self <= actual
    }

    /// The `maj_min` form used in banded settings keys.
    pub fn key_suffix(&self) -> String {
        format!("{}_{}", self.major, self.minor)
    }
}

impl fmt::Display for VersionBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

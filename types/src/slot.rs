//! Registry slot keys: the names collaborators resolve to find the live rule contracts.

use crate::error::PermitError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named registry pointer.
///
/// Keys are 1..=32 bytes of printable ASCII, mirroring the fixed-width
/// names the ingress layer uses.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SlotKey(String);

impl SlotKey {
    pub const MAX_LEN: usize = 32;

    /// Slot holding the active allow-list rules contract.
    pub const RULES: &'static str = "rules";

    /// Slot holding the administration contract.
    pub const ADMINISTRATION: &'static str = "administration";

    pub fn new(raw: impl Into<String>) -> Result<Self, PermitError> {
        let raw = raw.into();
        if raw.is_empty() || raw.len() > Self::MAX_LEN {
            return Err(PermitError::InvalidSlotKey(format!(
                "{raw:?}: length must be 1..={}",
                Self::MAX_LEN
            )));
        }
        if !raw.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(PermitError::InvalidSlotKey(format!(
                "{raw:?}: only printable ASCII without spaces is allowed"
            )));
        }
        Ok(Self(raw))
    }

    pub fn rules() -> Self {
        Self(Self::RULES.to_string())
    }

    pub fn administration() -> Self {
        Self(Self::ADMINISTRATION.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SlotKey {
    type Err = PermitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for SlotKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

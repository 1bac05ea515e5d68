//! Code addresses

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// An address in the analysed binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub u64);

impl Address {
    /// Raw value hosts use for "no address" (`BADADDR`)
    pub const UNDEFINED_RAW: u64 = u64::MAX;

    /// Convert a raw host address, mapping the undefined marker to `None`
    pub fn from_raw(raw: u64) -> Option<Address> {
        (raw != Self::UNDEFINED_RAW).then_some(Address(raw))
    }

    /// Serde helper: accept `null`, a missing field, or the raw undefined
    /// marker as "no address"
    pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<Address>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<u64>::deserialize(deserializer)?;
        Ok(raw.and_then(Address::from_raw))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<u64> for Address {
    fn from(raw: u64) -> Self {
        Address(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_marker() {
        assert_eq!(Address::from_raw(u64::MAX), None);
        assert_eq!(Address::from_raw(0x401000), Some(Address(0x401000)));
    }

    #[test]
    fn test_display_is_hex() {
        assert_eq!(Address(0x40).to_string(), "0x40");
    }
}

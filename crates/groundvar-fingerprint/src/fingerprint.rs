//! Canonical address sets

use groundvar_ast::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The set of addresses at which one variable is referenced.
///
/// Stored as a strictly ascending sequence, so equal sets compare and hash
/// equal no matter in which order their addresses were collected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Vec<Address>", into = "Vec<Address>")]
pub struct Fingerprint(Vec<Address>);

impl Fingerprint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an address; returns `false` if it was already present
    pub fn insert(&mut self, address: Address) -> bool {
        match self.0.binary_search(&address) {
            Ok(_) => false,
            Err(pos) => {
                self.0.insert(pos, address);
                true
            }
        }
    }

    pub fn contains(&self, address: Address) -> bool {
        self.0.binary_search(&address).is_ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Address> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[Address] {
        &self.0
    }
}

impl From<Vec<Address>> for Fingerprint {
    fn from(mut addresses: Vec<Address>) -> Self {
        addresses.sort_unstable();
        addresses.dedup();
        Fingerprint(addresses)
    }
}

impl From<Fingerprint> for Vec<Address> {
    fn from(fingerprint: Fingerprint) -> Self {
        fingerprint.0
    }
}

impl FromIterator<Address> for Fingerprint {
    fn from_iter<I: IntoIterator<Item = Address>>(iter: I) -> Self {
        Fingerprint::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, address) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", address)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_independent() {
        let a: Fingerprint = [0x14, 0x10, 0x14].into_iter().map(Address).collect();
        let mut b = Fingerprint::new();
        assert!(b.insert(Address(0x10)));
        assert!(b.insert(Address(0x14)));
        assert!(!b.insert(Address(0x10)));

        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.to_string(), "{0x10, 0x14}");
    }

    #[test]
    fn test_deserialize_canonicalizes() {
        let fp: Fingerprint = serde_json::from_str("[20, 16, 20]").unwrap();
        assert_eq!(fp.as_slice(), &[Address(16), Address(20)]);
        assert!(fp.contains(Address(20)));
    }
}

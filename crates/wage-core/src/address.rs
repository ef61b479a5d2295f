use serde::{Deserialize, Serialize};
use std::fmt;

/// A 20-byte account address.
///
/// Addresses key every registry in the protocol, so the type is `Ord` and
/// iteration over address-keyed maps is deterministic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The all-zero address. Never granted capabilities and never a holder.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Build an address from a small integer, big-endian in the low bytes.
    ///
    /// Intended for fixtures and examples where the address value itself
    /// carries no meaning.
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&value.to_be_bytes());
        Address(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_low_u64_orders_like_integers() {
        let a = Address::from_low_u64(1);
        let b = Address::from_low_u64(2);
        assert!(a < b);
        assert_ne!(a, b);
    }

    #[test]
    fn test_display_is_prefixed_hex() {
        let addr = Address::from_low_u64(0xabcd);
        let rendered = addr.to_string();
        assert!(rendered.starts_with("0x"));
        assert_eq!(rendered.len(), 2 + 40);
        assert!(rendered.ends_with("abcd"));
    }

    #[test]
    fn test_zero_address() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::from_low_u64(1).is_zero());
    }
}

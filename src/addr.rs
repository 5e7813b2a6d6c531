//! Link-layer peer addresses.
//!
//! A `LinkAddress` is the 6-byte hardware address of an ESP-NOW peer.
//! Configuration carries addresses as text ("AA:BB:CC:DD:EE:FF", colon or
//! hyphen separated, any case); parsing normalises them once at startup and
//! the binary form is immutable from then on.

use core::fmt;
use core::str::FromStr;

use crate::error::AddrError;

/// A 6-byte link-layer (MAC) address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkAddress([u8; 6]);

impl LinkAddress {
    /// The ESP-NOW broadcast address (`FF:FF:FF:FF:FF:FF`).
    pub const BROADCAST: Self = Self([0xFF; 6]);

    /// Construct from raw octets.
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// The raw octets, most-significant first.
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Whether this is the link-layer broadcast address.
    pub fn is_broadcast(&self) -> bool {
        self.0 == [0xFF; 6]
    }
}

impl FromStr for LinkAddress {
    type Err = AddrError;

    /// Parse a 6-group hex string. Groups may be separated by `:` or `-`
    /// and hex digits may be any case; the stored form is always binary,
    /// and [`fmt::Display`] re-serialises to uppercase colon form.
    fn from_str(s: &str) -> Result<Self, AddrError> {
        let mut octets = [0u8; 6];
        let mut groups = 0usize;

        for group in s.split(|c| c == ':' || c == '-') {
            if groups == 6 {
                return Err(AddrError::WrongGroupCount);
            }
            if group.len() != 2 {
                return Err(AddrError::WrongGroupLength);
            }
            // `from_str_radix` tolerates a leading '+'; a MAC group must not.
            if !group.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(AddrError::NonHexDigit);
            }
            octets[groups] =
                u8::from_str_radix(group, 16).map_err(|_| AddrError::NonHexDigit)?;
            groups += 1;
        }

        if groups != 6 {
            return Err(AddrError::WrongGroupCount);
        }
        Ok(Self(octets))
    }
}

impl fmt::Display for LinkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

use core::fmt;
use core::str::FromStr;

use crate::addr::Ipv4Address;
use crate::error::CrunchNatError;
use crate::parser;

/// An IPv4 network: a network address paired with a prefix length.
///
/// Construction always masks off the host bits of the supplied address, so
/// `Ipv4Network::new(addr, len).network_address()` is always the all-zeros
/// address of the block regardless of what host bits `addr` carried.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct Ipv4Network {
    network_address: Ipv4Address,
    prefix: u8,
}

impl Ipv4Network {
    /// Construct a network from an address and prefix length.
    ///
    /// # Panics
    ///
    /// Panics if `prefix > 32`. Callers that parse `prefix` from untrusted
    /// text should use [`FromStr`] instead, which reports an error.
    pub fn new(address: Ipv4Address, prefix: u8) -> Self {
        assert!(prefix <= 32, "prefix length {prefix} out of range 0..=32");
        let mask = netmask(prefix);
        Self {
            network_address: Ipv4Address::new(address.into_u32() & mask),
            prefix,
        }
    }

    /// The zero-host address of this block.
    pub const fn network_address(&self) -> Ipv4Address {
        self.network_address
    }

    /// The prefix length, in `[0, 32]`.
    pub const fn prefix(&self) -> u8 {
        self.prefix
    }

    /// The number of addresses in this block: `2^(32 - prefix)`.
    ///
    /// Returned as `u64` because a `/0` network holds `2^32` addresses,
    /// which does not fit in a `u32`.
    pub const fn num_addresses(&self) -> u64 {
        1u64 << (32 - self.prefix as u32)
    }

    /// Get the `k`-th address in this block (`network_address + k`).
    ///
    /// Returns `None` if `k >= num_addresses()`.
    pub fn get(&self, k: u64) -> Option<Ipv4Address> {
        (k < self.num_addresses())
            .then(|| Ipv4Address::new(self.network_address.into_u32().wrapping_add(k as u32)))
    }

    /// Whether `address` lies within this network.
    pub fn contains(&self, address: Ipv4Address) -> bool {
        self.offset_of(address).is_some()
    }

    /// The offset of `address` within this network, i.e. the `k` such that
    /// `self.get(k) == Some(address)`. Returns `None` if `address` is not in
    /// this network.
    pub fn offset_of(&self, address: Ipv4Address) -> Option<u64> {
        let offset = u64::from(address.into_u32().wrapping_sub(self.network_address.into_u32()));
        (offset < self.num_addresses()).then_some(offset)
    }
}

const fn netmask(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - prefix as u32)
    }
}

impl fmt::Display for Ipv4Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network_address, self.prefix)
    }
}

impl FromStr for Ipv4Network {
    type Err = CrunchNatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (address, prefix) = parser::parse_network(s).ok_or_else(|| CrunchNatError::ParseError {
            kind: "network",
            input: s.to_owned(),
        })?;
        Ok(Self::new(address, prefix))
    }
}

//! CrunchNAT: a purely functional, stateless, bijective mapping between a
//! block of internal IPv4 host addresses and a smaller block of external
//! IPv4 addresses paired with disjoint port ranges.
//!
//! Given an internal address, [`facade::CrunchNat::forward`] derives its
//! external address and the exact port range it may use. Given an external
//! `(address, port)` pair, [`facade::CrunchNat::reverse`] recovers the
//! originating internal address by pure computation. No state is kept
//! across calls and nothing here performs I/O, so source NAT built on this
//! crate never needs to log a per-flow table.

/// Modular arithmetic (extended GCD, modular inverse, modular
/// exponentiation) underlying the `secure` algorithm's RSA permutation.
pub mod arith;
/// Dispatch over the three port-mapping algorithms (`simple`, `stripe`,
/// `secure`).
pub mod algorithm;
/// `Ipv4Address`, a 32-bit host address.
pub mod addr;
/// The error type returned throughout this crate.
pub mod error;
/// The top-level facade: [`facade::CrunchNat`].
pub mod facade;
/// `Ipv4Network`, a CIDR block with indexed host access.
pub mod network;
/// Derivation of allocation parameters (`hosts_per_external`,
/// `ports_per_host`) from the external/internal network prefixes.
pub mod params;
/// Lightweight port-sequence representations returned by `forward`.
pub mod ports;
/// The RSA-style permutation used by the `secure` algorithm.
pub mod rsa;
/// Exhaustive collision and bijection self-checks.
pub mod validator;

mod parser;

pub use addr::Ipv4Address;
pub use algorithm::Algorithm;
pub use error::{CrunchNatError, Result};
pub use facade::CrunchNat;
pub use network::Ipv4Network;
pub use params::NatParameters;
pub use ports::PortSequence;
pub use rsa::RsaPermutation;

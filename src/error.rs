use thiserror::Error;

use crate::addr::Ipv4Address;
use crate::network::Ipv4Network;

/// Errors raised by the CrunchNAT core.
///
/// Every construction or lookup that can fail returns one of these variants;
/// nothing in this crate panics in response to caller-supplied input.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CrunchNatError {
    /// `external.prefix - internal.prefix` fell outside `[0, 8]`.
    #[error("excessive crunch factor: {crunch_factor} (must be in 0..=8)")]
    ExcessiveCrunchFactor {
        /// The (possibly negative) prefix-length difference that was rejected.
        crunch_factor: i16,
    },

    /// The `secure` algorithm's `(p, q, e)` triple does not yield a usable
    /// permutation: either `p * q` exceeds the usable port space, or `e` has
    /// no inverse modulo `(p - 1) * (q - 1)`.
    #[error("invalid secure-algorithm keys: {reason}")]
    InvalidKeys {
        /// Human-readable reason, e.g. `"p*q exceeds usable port space"`.
        reason: &'static str,
    },

    /// `ports_per_host` would be zero: the port space does not divide evenly
    /// enough across `hosts_per_external` buckets to give every host at
    /// least one port.
    #[error("degenerate parameters: {num_ports} ports / {hosts_per_external} hosts per external leaves zero ports per host")]
    DegenerateParameters {
        /// Total usable ports for the selected algorithm.
        num_ports: u32,
        /// Number of internal hosts sharing one external address.
        hosts_per_external: u32,
    },

    /// An address supplied to `forward` or `reverse` does not lie within the
    /// network it was expected to belong to.
    #[error("address {address} is not within network {network}")]
    OutOfRange {
        /// The address that was rejected.
        address: Ipv4Address,
        /// The network it was expected to fall within.
        network: Ipv4Network,
    },

    /// A port supplied to `reverse` cannot be mapped back to an internal
    /// host: either it is below `RESERVED_PORTS`, or (for `secure`) it falls
    /// outside the RSA permutation's range.
    #[error("port {port} is not a valid mapped port")]
    UnmappedPort {
        /// The port that was rejected.
        port: u16,
    },

    /// `algo` named something other than `"simple"`, `"stripe"`, or `"secure"`.
    #[error("unknown algorithm: {name:?}")]
    UnknownAlgorithm {
        /// The unrecognised algorithm name.
        name: String,
    },

    /// Failed to parse an IPv4 address or CIDR network from text.
    #[error("failed to parse {kind} from {input:?}")]
    ParseError {
        /// What was being parsed (`"address"` or `"network"`).
        kind: &'static str,
        /// The offending input text.
        input: String,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, CrunchNatError>;

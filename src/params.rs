//! Derivation of NAT allocation parameters from the external/internal
//! network prefixes.

use crate::error::CrunchNatError;
use crate::network::Ipv4Network;
use crate::rsa::RsaPermutation;

/// Total addresses in a full IPv4 port space.
pub const PORTS_PER_IP: u32 = 65536;
/// Ports below this number (well-known/system ports) are never assigned.
pub const RESERVED_PORTS: u32 = 1024;
/// `PORTS_PER_IP - RESERVED_PORTS`: the usable port space for `simple` and
/// `stripe`.
pub const USABLE_PORTS: u32 = PORTS_PER_IP - RESERVED_PORTS;
/// The largest permitted crunch factor (prefix-length difference between
/// the external and internal networks).
pub const MAX_CRUNCH_FACTOR: u8 = 8;

/// Derived, immutable allocation parameters for one CrunchNAT facade.
///
/// Everything here is computed once, at construction, from
/// `external_network` and `internal_network` (and, for `secure`, the RSA
/// permutation's `n`); nothing is ever recomputed or mutated afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NatParameters {
    external_network: Ipv4Network,
    internal_network: Ipv4Network,
    crunch_factor: u8,
    hosts_per_external: u32,
    num_ports: u32,
    ports_per_host: u32,
}

impl NatParameters {
    /// Derive parameters for the `simple`/`stripe` algorithms, which share
    /// the fixed `USABLE_PORTS` port space.
    pub fn new(
        external_network: Ipv4Network,
        internal_network: Ipv4Network,
    ) -> Result<Self, CrunchNatError> {
        Self::with_num_ports(external_network, internal_network, USABLE_PORTS)
    }

    /// Derive parameters for the `secure` algorithm, whose port space is
    /// `permutation.n()` rather than the fixed `USABLE_PORTS`.
    pub fn new_secure(
        external_network: Ipv4Network,
        internal_network: Ipv4Network,
        permutation: &RsaPermutation,
    ) -> Result<Self, CrunchNatError> {
        Self::with_num_ports(external_network, internal_network, permutation.n())
    }

    fn with_num_ports(
        external_network: Ipv4Network,
        internal_network: Ipv4Network,
        num_ports: u32,
    ) -> Result<Self, CrunchNatError> {
        let crunch_factor =
            i16::from(external_network.prefix()) - i16::from(internal_network.prefix());
        if !(0..=i16::from(MAX_CRUNCH_FACTOR)).contains(&crunch_factor) {
            return Err(CrunchNatError::ExcessiveCrunchFactor { crunch_factor });
        }
        let crunch_factor = crunch_factor as u8;

        let hosts_per_external = (internal_network.num_addresses()
            / external_network.num_addresses()) as u32;

        let ports_per_host = num_ports / hosts_per_external;
        if ports_per_host == 0 {
            return Err(CrunchNatError::DegenerateParameters {
                num_ports,
                hosts_per_external,
            });
        }

        Ok(Self {
            external_network,
            internal_network,
            crunch_factor,
            hosts_per_external,
            num_ports,
            ports_per_host,
        })
    }

    pub const fn external_network(&self) -> Ipv4Network {
        self.external_network
    }

    pub const fn internal_network(&self) -> Ipv4Network {
        self.internal_network
    }

    pub const fn crunch_factor(&self) -> u8 {
        self.crunch_factor
    }

    /// Number of internal hosts sharing a single external address:
    /// `2^crunch_factor`.
    pub const fn hosts_per_external(&self) -> u32 {
        self.hosts_per_external
    }

    /// Total usable ports for the selected algorithm.
    pub const fn num_ports(&self) -> u32 {
        self.num_ports
    }

    /// Number of ports assigned to each internal host.
    pub const fn ports_per_host(&self) -> u32 {
        self.ports_per_host
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn networks() -> (Ipv4Network, Ipv4Network) {
        (
            "192.0.2.0/24".parse().unwrap(),
            "10.0.0.0/16".parse().unwrap(),
        )
    }

    #[test]
    fn derives_seed_scenario_parameters() {
        let (external, internal) = networks();
        let params = NatParameters::new(external, internal).unwrap();
        assert_eq!(params.crunch_factor(), 8);
        assert_eq!(params.hosts_per_external(), 256);
        assert_eq!(params.ports_per_host(), 252);
    }

    #[test]
    fn secure_parameters_use_rsa_n() {
        let (external, internal) = networks();
        let rsa = RsaPermutation::default_keys();
        let params = NatParameters::new_secure(external, internal, &rsa).unwrap();
        assert_eq!(params.ports_per_host(), 251 * 257 / 256);
    }

    #[test]
    fn rejects_excessive_crunch_factor() {
        let external: Ipv4Network = "192.0.2.0/24".parse().unwrap();
        let internal: Ipv4Network = "10.0.0.0/8".parse().unwrap();
        assert_eq!(
            NatParameters::new(external, internal),
            Err(CrunchNatError::ExcessiveCrunchFactor { crunch_factor: 16 })
        );
    }

    #[test]
    fn rejects_negative_crunch_factor() {
        let external: Ipv4Network = "192.0.2.0/24".parse().unwrap();
        let internal: Ipv4Network = "10.0.0.0/25".parse().unwrap();
        assert_eq!(
            NatParameters::new(external, internal),
            Err(CrunchNatError::ExcessiveCrunchFactor { crunch_factor: -1 })
        );
    }
}

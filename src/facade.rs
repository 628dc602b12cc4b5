//! [`CrunchNat`], the top-level facade: selects an algorithm, derives its
//! parameters once, and dispatches `forward`/`reverse` for the lifetime of
//! the value. Deeply immutable after construction and so freely `Send +
//! Sync`-shareable across threads without synchronisation.

use crate::addr::Ipv4Address;
use crate::algorithm::Algorithm;
use crate::error::CrunchNatError;
use crate::network::Ipv4Network;
use crate::params::NatParameters;
use crate::ports::PortSequence;

/// A constructed CrunchNAT mapping: one set of derived parameters plus the
/// selected algorithm.
#[derive(Clone, Debug)]
pub struct CrunchNat {
    params: NatParameters,
    algorithm: Algorithm,
}

impl CrunchNat {
    /// Construct a facade from CIDR-notation network strings, an algorithm
    /// name (`"simple"`, `"stripe"`, `"secure"`), and, for `"secure"`, an
    /// optional `(p, q, e)` override (defaults to `(251, 257, 19)`).
    pub fn new(
        external_network: &str,
        internal_network: &str,
        algo: &str,
        secure_keys: Option<(u32, u32, u32)>,
    ) -> Result<Self, CrunchNatError> {
        let external_network: Ipv4Network = external_network
            .parse()
            .map_err(|_| CrunchNatError::ParseError {
                kind: "network",
                input: external_network.to_owned(),
            })?;
        let internal_network: Ipv4Network = internal_network
            .parse()
            .map_err(|_| CrunchNatError::ParseError {
                kind: "network",
                input: internal_network.to_owned(),
            })?;
        Self::from_networks(external_network, internal_network, algo, secure_keys)
    }

    /// As [`Self::new`], but taking already-parsed networks.
    pub fn from_networks(
        external_network: Ipv4Network,
        internal_network: Ipv4Network,
        algo: &str,
        secure_keys: Option<(u32, u32, u32)>,
    ) -> Result<Self, CrunchNatError> {
        let keys = secure_keys.unwrap_or((
            crate::rsa::DEFAULT_P,
            crate::rsa::DEFAULT_Q,
            crate::rsa::DEFAULT_E,
        ));
        let algorithm = Algorithm::from_name(algo, keys)?;

        let params = match &algorithm {
            Algorithm::Secure(secure) => {
                NatParameters::new_secure(external_network, internal_network, &secure.0)?
            }
            _ => NatParameters::new(external_network, internal_network)?,
        };

        tracing::debug!(
            algo = algorithm.name(),
            external = %external_network,
            internal = %internal_network,
            hosts_per_external = params.hosts_per_external(),
            ports_per_host = params.ports_per_host(),
            "derived CrunchNAT parameters",
        );

        Ok(Self { params, algorithm })
    }

    /// The derived allocation parameters.
    pub fn params(&self) -> &NatParameters {
        &self.params
    }

    /// Name of the selected algorithm.
    pub fn algo(&self) -> &'static str {
        self.algorithm.name()
    }

    /// `hosts_per_external`: the number of internal hosts sharing one
    /// external address.
    pub const fn hosts_per_external(&self) -> u32 {
        self.params.hosts_per_external()
    }

    /// `ports_per_host`: the number of ports assigned to each internal host.
    pub const fn ports_per_host(&self) -> u32 {
        self.params.ports_per_host()
    }

    /// Map an internal address to its external (address, port-sequence)
    /// pair.
    ///
    /// Fails with [`CrunchNatError::OutOfRange`] if `internal_address` is
    /// not within the internal network.
    pub fn forward(
        &self,
        internal_address: Ipv4Address,
    ) -> Result<(Ipv4Address, PortSequence), CrunchNatError> {
        let internal_offset = self
            .params
            .internal_network()
            .offset_of(internal_address)
            .ok_or(CrunchNatError::OutOfRange {
                address: internal_address,
                network: self.params.internal_network(),
            })?;

        let hosts_per_external = u64::from(self.params.hosts_per_external());
        let external_offset = internal_offset / hosts_per_external;
        let bucket = (internal_offset % hosts_per_external) as u32;

        let external_address = self
            .params
            .external_network()
            .get(external_offset)
            .expect("external_offset bounded by external network size");

        let ports = self.algorithm.forward_ports(&self.params, bucket);

        tracing::trace!(
            %internal_address,
            %external_address,
            bucket,
            "forward mapped",
        );

        Ok((external_address, ports))
    }

    /// Recover the internal address that was assigned `(external_address,
    /// port)` by [`Self::forward`].
    ///
    /// Fails with [`CrunchNatError::OutOfRange`] if `external_address` is
    /// not within the external network, or with
    /// [`CrunchNatError::UnmappedPort`] if `port` cannot be mapped back to
    /// a bucket.
    pub fn reverse(
        &self,
        external_address: Ipv4Address,
        port: u16,
    ) -> Result<Ipv4Address, CrunchNatError> {
        let external_offset = self
            .params
            .external_network()
            .offset_of(external_address)
            .ok_or(CrunchNatError::OutOfRange {
                address: external_address,
                network: self.params.external_network(),
            })?;

        let bucket = self.algorithm.reverse_bucket(&self.params, port)?;
        let hosts_per_external = u64::from(self.params.hosts_per_external());
        let internal_offset = external_offset * hosts_per_external + u64::from(bucket);

        let internal_address = self
            .params
            .internal_network()
            .get(internal_offset)
            .expect("internal_offset bounded by internal network size");

        tracing::trace!(
            %external_address,
            port,
            %internal_address,
            "reverse mapped",
        );

        Ok(internal_address)
    }

    /// See [`crate::validator::check_forward_collisions`].
    pub fn check_forward_collisions(&self) -> Vec<Ipv4Address> {
        crate::validator::check_forward_collisions(self)
    }

    /// See [`crate::validator::check_bijection`]. `count` defaults to
    /// `hosts_per_external` when `None`.
    pub fn check_bijection(&self, count: Option<u32>) -> bool {
        crate::validator::check_bijection(self, count.unwrap_or(self.hosts_per_external()))
    }

    /// See [`crate::algorithm::Algorithm::stride_histogram`], applied to
    /// the bucket that `internal_address` falls into.
    pub fn stride_histogram(
        &self,
        internal_address: Ipv4Address,
    ) -> Result<std::collections::HashMap<u16, u32>, CrunchNatError> {
        let internal_offset = self
            .params
            .internal_network()
            .offset_of(internal_address)
            .ok_or(CrunchNatError::OutOfRange {
                address: internal_address,
                network: self.params.internal_network(),
            })?;
        let bucket = (internal_offset % u64::from(self.params.hosts_per_external())) as u32;
        Ok(self.algorithm.stride_histogram(&self.params, bucket))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_scenario_simple() {
        let crunch = CrunchNat::new("192.0.2.0/24", "10.0.0.0/16", "simple", None).unwrap();
        assert_eq!(crunch.hosts_per_external(), 256);
        assert_eq!(crunch.ports_per_host(), 252);

        let addr: Ipv4Address = "10.0.0.10".parse().unwrap();
        let (external, ports) = crunch.forward(addr).unwrap();
        assert_eq!(external.to_string(), "192.0.2.0");
        assert_eq!(ports.to_vec().first(), Some(&3544));

        assert_eq!(
            crunch.reverse(external, 3600).unwrap().to_string(),
            "10.0.0.10"
        );
    }

    #[test]
    fn seed_scenario_excessive_crunch_factor() {
        let err = CrunchNat::new("192.0.2.0/24", "10.0.0.0/8", "simple", None).unwrap_err();
        assert_eq!(
            err,
            CrunchNatError::ExcessiveCrunchFactor { crunch_factor: 16 }
        );
    }

    #[test]
    fn forward_rejects_address_outside_internal_network() {
        let crunch = CrunchNat::new("192.0.2.0/24", "10.0.0.0/16", "simple", None).unwrap();
        let outside: Ipv4Address = "10.1.0.0".parse().unwrap();
        assert!(matches!(
            crunch.forward(outside),
            Err(CrunchNatError::OutOfRange { .. })
        ));
    }

    #[test]
    fn reverse_rejects_address_outside_external_network() {
        let crunch = CrunchNat::new("192.0.2.0/24", "10.0.0.0/16", "simple", None).unwrap();
        let outside: Ipv4Address = "203.0.113.1".parse().unwrap();
        assert!(matches!(
            crunch.reverse(outside, 2000),
            Err(CrunchNatError::OutOfRange { .. })
        ));
    }

    #[test]
    fn secure_keys_are_ignored_for_non_secure_algorithms() {
        let bad_keys = Some((300, 300, 19));
        assert!(CrunchNat::new("192.0.2.0/24", "10.0.0.0/16", "simple", bad_keys).is_ok());
        assert!(CrunchNat::new("192.0.2.0/24", "10.0.0.0/16", "stripe", bad_keys).is_ok());
        assert!(matches!(
            CrunchNat::new("192.0.2.0/24", "10.0.0.0/16", "secure", bad_keys),
            Err(CrunchNatError::InvalidKeys { .. })
        ));
    }

    #[test]
    fn unknown_algorithm_wins_over_bad_secure_keys() {
        let bad_keys = Some((300, 300, 19));
        assert!(matches!(
            CrunchNat::new("192.0.2.0/24", "10.0.0.0/16", "magic", bad_keys),
            Err(CrunchNatError::UnknownAlgorithm { .. })
        ));
    }
}

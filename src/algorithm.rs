//! The three CrunchNAT port-mapping algorithms: `simple`, `stripe`, and
//! `secure`. All three share the same address mapping (see
//! [`crate::facade::CrunchNat`]) and differ only in how a bucket index is
//! turned into a port sequence, and back.

use std::collections::HashMap;

use crate::error::CrunchNatError;
use crate::params::{NatParameters, RESERVED_PORTS};
use crate::ports::PortSequence;
use crate::rsa::RsaPermutation;

/// Operations shared by all three port-mapping algorithms.
///
/// Implemented once per algorithm variant rather than generically, since
/// each variant's port arithmetic is genuinely distinct (contiguous run,
/// strided run, or a sorted permutation).
pub trait CrunchAlgorithm {
    /// Stable, lowercase name used in CLI flags and error messages.
    fn name(&self) -> &'static str;

    /// The port sequence assigned to `bucket` (`bucket < hosts_per_external`).
    fn forward_ports(&self, params: &NatParameters, bucket: u32) -> PortSequence;

    /// Recover the bucket index that `port` was assigned from.
    ///
    /// Fails with [`CrunchNatError::UnmappedPort`] if `port` is below
    /// `RESERVED_PORTS`, outside the algorithm's port space, or in the
    /// truncated remainder left over when `num_ports` does not divide
    /// evenly by `hosts_per_external`.
    fn reverse_bucket(&self, params: &NatParameters, port: u16) -> Result<u32, CrunchNatError>;
}

/// The `simple` algorithm: bucket `b` gets the contiguous range
/// `[RESERVED_PORTS + b*ports_per_host, RESERVED_PORTS + (b+1)*ports_per_host)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Simple;

impl CrunchAlgorithm for Simple {
    fn name(&self) -> &'static str {
        "simple"
    }

    fn forward_ports(&self, params: &NatParameters, bucket: u32) -> PortSequence {
        let start = RESERVED_PORTS + bucket * params.ports_per_host();
        PortSequence::Run {
            start: start as u16,
            step: 1,
            count: params.ports_per_host(),
        }
    }

    fn reverse_bucket(&self, params: &NatParameters, port: u16) -> Result<u32, CrunchNatError> {
        let port = u32::from(port);
        if port < RESERVED_PORTS {
            return Err(CrunchNatError::UnmappedPort { port: port as u16 });
        }
        let bucket = (port - RESERVED_PORTS) / params.ports_per_host();
        if bucket >= params.hosts_per_external() {
            return Err(CrunchNatError::UnmappedPort { port: port as u16 });
        }
        Ok(bucket)
    }
}

/// The `stripe` algorithm: bucket `b`'s k-th port (`0 <= k < ports_per_host`)
/// is `RESERVED_PORTS + b + k*hosts_per_external`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Stripe;

impl CrunchAlgorithm for Stripe {
    fn name(&self) -> &'static str {
        "stripe"
    }

    fn forward_ports(&self, params: &NatParameters, bucket: u32) -> PortSequence {
        PortSequence::Run {
            start: (RESERVED_PORTS + bucket) as u16,
            step: params.hosts_per_external() as u16,
            count: params.ports_per_host(),
        }
    }

    fn reverse_bucket(&self, params: &NatParameters, port: u16) -> Result<u32, CrunchNatError> {
        let port = u32::from(port);
        if port < RESERVED_PORTS {
            return Err(CrunchNatError::UnmappedPort { port: port as u16 });
        }
        Ok((port - RESERVED_PORTS) % params.hosts_per_external())
    }
}

/// The `secure` algorithm: bucket `b` gets
/// `{ RESERVED_PORTS + encrypt(i) : i in [b*ports_per_host, (b+1)*ports_per_host) }`,
/// sorted ascending.
#[derive(Clone, Debug)]
pub struct Secure(pub RsaPermutation);

impl CrunchAlgorithm for Secure {
    fn name(&self) -> &'static str {
        "secure"
    }

    fn forward_ports(&self, params: &NatParameters, bucket: u32) -> PortSequence {
        let pph = params.ports_per_host();
        let mut ports: Vec<u16> = (bucket * pph..(bucket + 1) * pph)
            .map(|i| (RESERVED_PORTS + self.0.encrypt(i)) as u16)
            .collect();
        ports.sort_unstable();
        PortSequence::Sorted(ports)
    }

    fn reverse_bucket(&self, params: &NatParameters, port: u16) -> Result<u32, CrunchNatError> {
        let port = u32::from(port);
        if port < RESERVED_PORTS {
            return Err(CrunchNatError::UnmappedPort { port: port as u16 });
        }
        let index = port - RESERVED_PORTS;
        if index >= self.0.n() {
            return Err(CrunchNatError::UnmappedPort { port: port as u16 });
        }
        let bucket = self.0.decrypt(index) / params.ports_per_host();
        if bucket >= params.hosts_per_external() {
            return Err(CrunchNatError::UnmappedPort { port: port as u16 });
        }
        Ok(bucket)
    }
}

/// A tagged union over the three algorithm implementations, selected once
/// at facade construction time and held for the lifetime of the facade.
#[derive(Clone, Debug)]
pub enum Algorithm {
    Simple(Simple),
    Stripe(Stripe),
    Secure(Secure),
}

impl Algorithm {
    /// Resolve an algorithm by name (`"simple"`, `"stripe"`, or `"secure"`).
    ///
    /// `keys` is a `(p, q, e)` triple and is only consulted, and only
    /// validated, for `"secure"`: `"simple"`/`"stripe"` never construct an
    /// `RsaPermutation`, so bad keys paired with those names are ignored
    /// rather than rejected.
    pub fn from_name(name: &str, keys: (u32, u32, u32)) -> Result<Self, CrunchNatError> {
        match name {
            "simple" => Ok(Self::Simple(Simple)),
            "stripe" => Ok(Self::Stripe(Stripe)),
            "secure" => {
                let (p, q, e) = keys;
                Ok(Self::Secure(Secure(RsaPermutation::new(p, q, e)?)))
            }
            other => Err(CrunchNatError::UnknownAlgorithm {
                name: other.to_owned(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Simple(a) => a.name(),
            Self::Stripe(a) => a.name(),
            Self::Secure(a) => a.name(),
        }
    }

    pub fn forward_ports(&self, params: &NatParameters, bucket: u32) -> PortSequence {
        match self {
            Self::Simple(a) => a.forward_ports(params, bucket),
            Self::Stripe(a) => a.forward_ports(params, bucket),
            Self::Secure(a) => a.forward_ports(params, bucket),
        }
    }

    pub fn reverse_bucket(&self, params: &NatParameters, port: u16) -> Result<u32, CrunchNatError> {
        match self {
            Self::Simple(a) => a.reverse_bucket(params, port),
            Self::Stripe(a) => a.reverse_bucket(params, port),
            Self::Secure(a) => a.reverse_bucket(params, port),
        }
    }

    /// Count, for the port sequence assigned to `bucket`, how many times
    /// each gap length between consecutive ports occurs.
    ///
    /// A diagnostic over the obfuscation quality of `stripe` (always one
    /// gap length, `hosts_per_external`) and `secure` (many gap lengths);
    /// ported from the original implementation's `count_strides`.
    pub fn stride_histogram(&self, params: &NatParameters, bucket: u32) -> HashMap<u16, u32> {
        let ports = self.forward_ports(params, bucket).to_vec();
        let mut strides = HashMap::new();
        for window in ports.windows(2) {
            let gap = window[1] - window[0];
            *strides.entry(gap).or_insert(0) += 1;
        }
        strides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> NatParameters {
        NatParameters::new(
            "192.0.2.0/24".parse().unwrap(),
            "10.0.0.0/16".parse().unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn simple_forward_matches_seed_scenario() {
        let params = params();
        let ports = Simple.forward_ports(&params, 10).to_vec();
        assert_eq!(ports.first(), Some(&3544));
        assert_eq!(ports.last(), Some(&3795));
        assert_eq!(ports.len(), 252);
    }

    #[test]
    fn simple_reverse_matches_seed_scenario() {
        let params = params();
        assert_eq!(Simple.reverse_bucket(&params, 3600).unwrap(), 10);
    }

    #[test]
    fn stripe_forward_matches_seed_scenario() {
        let params = params();
        let ports = Stripe.forward_ports(&params, 10).to_vec();
        assert_eq!(&ports[..3], &[1034, 1290, 1546]);
        assert_eq!(ports.len(), 252);
    }

    #[test]
    fn stripe_reverse_matches_seed_scenario() {
        let params = params();
        assert_eq!(Stripe.reverse_bucket(&params, 1290).unwrap(), 10);
    }

    #[test]
    fn secure_forward_is_sorted_and_reverses() {
        let rsa = RsaPermutation::default_keys();
        let params = NatParameters::new_secure(
            "192.0.2.0/24".parse().unwrap(),
            "10.0.0.0/16".parse().unwrap(),
            &rsa,
        )
        .unwrap();
        let secure = Secure(rsa);
        let ports = secure.forward_ports(&params, 10).to_vec();
        assert_eq!(ports.len(), 251);
        assert!(ports.windows(2).all(|w| w[0] < w[1]));
        for &port in &ports {
            assert_eq!(secure.reverse_bucket(&params, port).unwrap(), 10);
        }
    }

    #[test]
    fn rejects_unmapped_port_below_reserved() {
        let params = params();
        assert!(matches!(
            Simple.reverse_bucket(&params, 80),
            Err(CrunchNatError::UnmappedPort { port: 80 })
        ));
    }

    #[test]
    fn unknown_algorithm_name_is_rejected() {
        assert!(matches!(
            Algorithm::from_name("magic", (251, 257, 19)),
            Err(CrunchNatError::UnknownAlgorithm { .. })
        ));
    }

    #[test]
    fn invalid_keys_are_ignored_for_non_secure_algorithms() {
        assert!(Algorithm::from_name("simple", (300, 300, 19)).is_ok());
        assert!(Algorithm::from_name("stripe", (300, 300, 19)).is_ok());
        assert!(matches!(
            Algorithm::from_name("secure", (300, 300, 19)),
            Err(CrunchNatError::InvalidKeys { .. })
        ));
    }
}

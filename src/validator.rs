//! Offline self-checks used to validate a set of NAT parameters:
//! collision-freedom and bijectivity. `O(hosts_per_external * ports_per_host)`,
//! intended for construction-time validation and test suites, not the data
//! path.

use std::collections::HashSet;

use crate::addr::Ipv4Address;
use crate::facade::CrunchNat;

/// Check that no two of the first `hosts_per_external` internal hosts
/// sharing an external address were assigned overlapping ports, and that
/// every host got exactly `ports_per_host` ports.
///
/// Returns the internal addresses whose port sets collided with an
/// already-seen port. Empty for well-formed parameters.
pub fn check_forward_collisions(crunch: &CrunchNat) -> Vec<Ipv4Address> {
    let mut collisions = Vec::new();
    let mut seen_ports = HashSet::new();

    for offset in 0..crunch.params().hosts_per_external() {
        let internal_address = crunch
            .params()
            .internal_network()
            .get(u64::from(offset))
            .expect("offset < hosts_per_external <= num_addresses");
        let (_, ports) = crunch
            .forward(internal_address)
            .expect("representative addresses are always within the internal network");

        debug_assert_eq!(
            ports.len(),
            crunch.params().ports_per_host(),
            "port sequence for {internal_address} has the wrong length"
        );

        let mut collided = false;
        for port in &ports {
            if !seen_ports.insert(port) {
                collided = true;
            }
        }
        if collided {
            collisions.push(internal_address);
        }
    }

    collisions
}

/// Check that `forward`/`reverse` round-trip correctly for the first
/// `count` internal addresses (every port in each forward result reverses
/// back to the address it came from).
pub fn check_bijection(crunch: &CrunchNat, count: u32) -> bool {
    let count = u64::from(count);
    for offset in 0..count.min(crunch.params().internal_network().num_addresses()) {
        let internal_address = crunch
            .params()
            .internal_network()
            .get(offset)
            .expect("offset bounded by internal network size");
        let Ok((external_address, ports)) = crunch.forward(internal_address) else {
            return false;
        };
        for port in &ports {
            match crunch.reverse(external_address, port) {
                Ok(recovered) if recovered == internal_address => {}
                _ => return false,
            }
        }
    }
    true
}

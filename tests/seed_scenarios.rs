//! Exact-value assertions for the concrete seed scenarios in `SPEC_FULL.md`
//! §8 (external `192.0.2.0/24`, internal `10.0.0.0/16`), ported directly
//! from `examples/original_source/test.py`.

use crunchnat::{CrunchNat, CrunchNatError};

const EXTERNAL: &str = "192.0.2.0/24";
const INTERNAL: &str = "10.0.0.0/16";

#[test]
fn simple_algorithm_seed_scenario() {
    let crunch = CrunchNat::new(EXTERNAL, INTERNAL, "simple", None).unwrap();
    assert_eq!(crunch.hosts_per_external(), 256);
    assert_eq!(crunch.ports_per_host(), 252);

    let (external, ports) = crunch.forward("10.0.0.10".parse().unwrap()).unwrap();
    assert_eq!(external.to_string(), "192.0.2.0");
    assert_eq!(ports.to_vec(), (3544..3796).collect::<Vec<u16>>());

    assert_eq!(
        crunch.reverse(external, 3600).unwrap().to_string(),
        "10.0.0.10"
    );

    assert!(crunch.check_forward_collisions().is_empty());
    assert!(crunch.check_bijection(Some(512)));
}

#[test]
fn stripe_algorithm_seed_scenario() {
    let crunch = CrunchNat::new(EXTERNAL, INTERNAL, "stripe", None).unwrap();
    assert_eq!(crunch.hosts_per_external(), 256);
    assert_eq!(crunch.ports_per_host(), 252);

    let (external, ports) = crunch.forward("10.0.0.10".parse().unwrap()).unwrap();
    assert_eq!(external.to_string(), "192.0.2.0");
    let expected: Vec<u16> = (0..252).map(|k| 1034 + k * 256).collect();
    assert_eq!(ports.to_vec(), expected);

    assert_eq!(
        crunch.reverse(external, 1290).unwrap().to_string(),
        "10.0.0.10"
    );

    assert!(crunch.check_forward_collisions().is_empty());
    assert!(crunch.check_bijection(Some(512)));
}

#[test]
fn secure_algorithm_seed_scenario() {
    let crunch = CrunchNat::new(EXTERNAL, INTERNAL, "secure", None).unwrap();
    assert_eq!(crunch.hosts_per_external(), 256);
    assert_eq!(crunch.ports_per_host(), 251 * 257 / 256);

    let (external, ports) = crunch.forward("10.0.0.10".parse().unwrap()).unwrap();
    assert_eq!(external.to_string(), "192.0.2.0");
    assert_eq!(ports.to_vec().len(), 251);

    assert_eq!(
        crunch.reverse(external, 2318).unwrap().to_string(),
        "10.0.0.10"
    );

    assert!(crunch.check_forward_collisions().is_empty());
    assert!(crunch.check_bijection(Some(512)));
}

#[test]
fn excessive_crunch_factor_is_rejected() {
    let err = CrunchNat::new(EXTERNAL, "10.0.0.0/8", "simple", None).unwrap_err();
    assert_eq!(err, CrunchNatError::ExcessiveCrunchFactor { crunch_factor: 16 });
}

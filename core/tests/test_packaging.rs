use resource_exchange_core_rs::models::{Composition, Resource};
use resource_exchange_core_rs::packaging::{FillStrategy, LoadStrategy, Package, TransportUnit};
use resource_exchange_core_rs::rng::RngManager;

#[test]
fn test_first_strategy_fill_masses() {
    let pkg = Package::new("cask", 5.0, 20.0, FillStrategy::First).unwrap();
    let mut rng = RngManager::new(1);
    assert_eq!(pkg.fill_mass(50.0, &mut rng), vec![20.0, 20.0, 10.0]);
    // a 4 kg tail is below fill_min and is dropped
    assert_eq!(pkg.fill_mass(44.0, &mut rng), vec![20.0, 20.0]);
}

#[test]
fn test_equal_strategy_balances() {
    let pkg = Package::new("cask", 8.0, 10.0, FillStrategy::Equal).unwrap();
    let mut rng = RngManager::new(1);
    // 27 kg: three units of 9 instead of 10 + 10 + dropped 7
    let masses = pkg.fill_mass(27.0, &mut rng);
    assert_eq!(masses.len(), 3);
    for m in &masses {
        assert!((m - 9.0).abs() < 1e-9);
    }
}

#[test]
fn test_stochastic_fills_stay_in_bounds() {
    let mut rng = RngManager::new(33);
    for strategy in [FillStrategy::Uniform, FillStrategy::Normal] {
        let pkg = Package::new("cask", 4.0, 8.0, strategy).unwrap();
        for mass in pkg.fill_mass(100.0, &mut rng) {
            assert!(
                mass >= 4.0 - 1e-9 && mass <= 8.0 + 1e-9,
                "fill {} out of bounds for {:?}",
                mass,
                strategy
            );
        }
    }
}

#[test]
fn test_unpackaged_passes_mass_through() {
    let pkg = Package::unpackaged();
    let mut rng = RngManager::new(1);
    assert_eq!(pkg.fill_mass(123.45, &mut rng), vec![123.45]);
}

#[test]
fn test_repackaging_resource_conserves_mass() {
    let pkg = Package::new("cask", 5.0, 20.0, FillStrategy::First).unwrap();
    let mut rng = RngManager::new(1);
    let mut material = Resource::new(53.0, Composition::trace());

    let units = material.package_into(&pkg, &mut rng);
    let packaged: f64 = units.iter().map(Resource::quantity).sum();
    // 20 + 20 + 13 packaged, nothing left behind
    assert_eq!(units.len(), 3);
    assert!((packaged - 53.0).abs() < 1e-9);
    assert!(material.quantity() < 1e-9);
    assert!(units.iter().all(|u| u.package_name() == "cask"));
}

#[test]
fn test_repackaging_leaves_sub_minimum_remainder() {
    let pkg = Package::new("cask", 5.0, 20.0, FillStrategy::First).unwrap();
    let mut rng = RngManager::new(1);
    let mut material = Resource::new(43.0, Composition::trace());

    let units = material.package_into(&pkg, &mut rng);
    assert_eq!(units.len(), 2);
    // the 3 kg tail cannot fill a cask and stays unpackaged
    assert!((material.quantity() - 3.0).abs() < 1e-9);
    assert_eq!(material.package_name(), Package::UNPACKAGED_NAME);
}

#[test]
fn test_transport_unit_load_building() {
    let truck = TransportUnit::new("truck", 2, 4, LoadStrategy::First).unwrap();
    assert_eq!(truck.max_shippable_packages(11), 11); // 4 + 4 + 3
    assert_eq!(truck.max_shippable_packages(9), 8); // 4 + 4, leftover 1
    assert_eq!(truck.max_shippable_packages(1), 0);

    let balanced = TransportUnit::new("barge", 2, 4, LoadStrategy::Equal).unwrap();
    // 6 packages: loads of 3 + 3
    assert_eq!(balanced.max_shippable_packages(6), 6);
}

#[test]
fn test_unrestricted_transport_is_transparent() {
    let tu = TransportUnit::unrestricted();
    assert!(tu.is_unrestricted());
    assert_eq!(tu.max_shippable_packages(9999), 9999);
}

use rust_decimal_macros::dec;
use tlp_core::engine::TlpEngine;
use tlp_core::params::NewParameter;
use tlp_core::simulation::NewSimulation;
use tlp_core::snapshot::ParameterSnapshot;

fn parameter(fiscal_year: i32, base_cost: rust_decimal::Decimal) -> NewParameter {
    NewParameter {
        fiscal_year,
        base_cost,
        ..NewParameter::default()
    }
}

#[test]
fn parameter_versions_start_at_one_and_increment() {
    let engine = TlpEngine::in_memory().unwrap();

    let v1 = engine.create_parameter(parameter(2025, dec!(100))).unwrap();
    let v2 = engine.create_parameter(parameter(2025, dec!(200))).unwrap();
    let v3 = engine.create_parameter(parameter(2025, dec!(300))).unwrap();
    assert_eq!((v1.version, v2.version, v3.version), (1, 2, 3));

    // Each fiscal year has its own sequence.
    let other = engine.create_parameter(parameter(2026, dec!(400))).unwrap();
    assert_eq!(other.version, 1);
}

#[test]
fn list_orders_by_year_then_version_descending() {
    let engine = TlpEngine::in_memory().unwrap();
    engine.create_parameter(parameter(2024, dec!(1))).unwrap();
    engine.create_parameter(parameter(2025, dec!(2))).unwrap();
    engine.create_parameter(parameter(2025, dec!(3))).unwrap();
    engine.create_parameter(parameter(2023, dec!(4))).unwrap();

    let listed = engine.list_parameters().unwrap();
    let keys: Vec<_> = listed.iter().map(|p| (p.fiscal_year, p.version)).collect();
    assert_eq!(keys, vec![(2025, 2), (2025, 1), (2024, 1), (2023, 1)]);
}

#[test]
fn optional_fields_round_trip_as_absent() {
    let engine = TlpEngine::in_memory().unwrap();
    engine
        .create_parameter(NewParameter {
            fiscal_year: 2025,
            base_cost: dec!(5000.00),
            ipca_pct: Some(dec!(4.62)),
            ..NewParameter::default()
        })
        .unwrap();

    let listed = engine.list_parameters().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].base_cost, dec!(5000.00));
    assert_eq!(listed[0].ipca_pct, Some(dec!(4.62)));
    assert_eq!(listed[0].limit_min_updated, None);
    assert!(listed[0].active);
}

#[test]
fn lot_versions_are_an_independent_sequence() {
    let mut engine = TlpEngine::in_memory().unwrap();

    // Three parameter versions for the year; the lot sequence must not
    // continue from them.
    for cost in [dec!(10), dec!(20), dec!(30)] {
        engine.create_parameter(parameter(2025, cost)).unwrap();
    }

    let sim_a = engine
        .create_simulation(NewSimulation {
            fiscal_year: 2025,
            description: "a".to_string(),
            snapshot: ParameterSnapshot::from_base_cost(dec!(10)),
        })
        .unwrap();
    let sim_b = engine
        .create_simulation(NewSimulation {
            fiscal_year: 2025,
            description: "b".to_string(),
            snapshot: ParameterSnapshot::from_base_cost(dec!(20)),
        })
        .unwrap();

    let lot_a = engine.promote_simulation(sim_a.id).unwrap();
    let lot_b = engine.promote_simulation(sim_b.id).unwrap();
    assert_eq!(lot_a.version, 1);
    assert_eq!(lot_b.version, 2);
}

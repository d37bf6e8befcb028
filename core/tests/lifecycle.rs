use rust_decimal_macros::dec;
use tlp_core::catalog::PropertyRecord;
use tlp_core::engine::TlpEngine;
use tlp_core::error::TlpError;
use tlp_core::simulation::{NewSimulation, SimulationStatus};
use tlp_core::snapshot::ParameterSnapshot;
use uuid::Uuid;

fn seed_catalog(engine: &TlpEngine, count: usize) {
    for i in 0..count {
        engine
            .store()
            .insert_property(&PropertyRecord {
                property_id: format!("{:06}", i + 1),
                contributor_name: None,
                usage_classification: Some("RESIDENTIAL".to_string()),
                considered_activity: None,
                has_service: false,
                has_commerce: false,
                has_industry: false,
                distinct_companies: 0,
                distinct_cnaes: 0,
            })
            .unwrap();
    }
}

fn new_simulation(engine: &TlpEngine) -> Uuid {
    engine
        .create_simulation(NewSimulation {
            fiscal_year: 2024,
            description: "lifecycle test".to_string(),
            snapshot: ParameterSnapshot::from_base_cost(dec!(100000)),
        })
        .unwrap()
        .id
}

#[test]
fn simulation_starts_as_draft() {
    let engine = TlpEngine::in_memory().unwrap();
    let id = new_simulation(&engine);
    let sim = engine.get_simulation(id).unwrap();
    assert_eq!(sim.status, SimulationStatus::Draft);
}

#[test]
fn processing_completes_and_writes_items() {
    let mut engine = TlpEngine::in_memory().unwrap();
    seed_catalog(&engine, 4);
    let id = new_simulation(&engine);

    let outcome = engine.process_simulation(id).unwrap();
    assert_eq!(outcome.total_properties, 4);
    assert_eq!(outcome.items_written, 4);

    let sim = engine.get_simulation(id).unwrap();
    assert_eq!(sim.status, SimulationStatus::Completed);
    assert_eq!(engine.store().simulation_item_count(id).unwrap(), 4);
}

#[test]
fn completed_simulation_rejects_reprocessing() {
    let mut engine = TlpEngine::in_memory().unwrap();
    seed_catalog(&engine, 2);
    let id = new_simulation(&engine);
    engine.process_simulation(id).unwrap();

    let err = engine.process_simulation(id).unwrap_err();
    assert!(
        matches!(err, TlpError::InvalidState { .. }),
        "expected invalid-state, got {err}"
    );
    // Status and items are untouched by the rejected attempt.
    let sim = engine.get_simulation(id).unwrap();
    assert_eq!(sim.status, SimulationStatus::Completed);
    assert_eq!(engine.store().simulation_item_count(id).unwrap(), 2);
}

#[test]
fn processing_missing_simulation_is_not_found() {
    let mut engine = TlpEngine::in_memory().unwrap();
    let err = engine.process_simulation(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, TlpError::NotFound { .. }));
}

#[test]
fn empty_catalog_fails_before_any_write_and_marks_failed() {
    let mut engine = TlpEngine::in_memory().unwrap();
    let id = new_simulation(&engine);

    let err = engine.process_simulation(id).unwrap_err();
    assert!(matches!(err, TlpError::EmptyCatalog), "got {err}");

    let sim = engine.get_simulation(id).unwrap();
    assert_eq!(sim.status, SimulationStatus::Failed);
    assert_eq!(engine.store().simulation_item_count(id).unwrap(), 0);
}

#[test]
fn failed_simulation_can_be_retried() {
    let mut engine = TlpEngine::in_memory().unwrap();
    let id = new_simulation(&engine);

    // First attempt fails: nothing in the catalog yet.
    engine.process_simulation(id).unwrap_err();
    assert_eq!(
        engine.get_simulation(id).unwrap().status,
        SimulationStatus::Failed
    );

    seed_catalog(&engine, 3);
    let outcome = engine.process_simulation(id).unwrap();
    assert_eq!(outcome.items_written, 3);
    assert_eq!(
        engine.get_simulation(id).unwrap().status,
        SimulationStatus::Completed
    );
}

#[test]
fn reprocessing_replaces_items_without_accumulation() {
    let mut engine = TlpEngine::in_memory().unwrap();
    seed_catalog(&engine, 5);
    let id = new_simulation(&engine);

    engine.process_simulation(id).unwrap();
    let first: Vec<_> = engine
        .simulation_items(id, 0, 100)
        .unwrap()
        .into_iter()
        .map(|i| (i.property_id, i.calculated_value))
        .collect();

    // Push the simulation back to FAILED (the retryable state) and rerun
    // with unchanged inputs.
    engine
        .store()
        .update_simulation_status(id, SimulationStatus::Failed)
        .unwrap();
    engine.process_simulation(id).unwrap();

    assert_eq!(
        engine.store().simulation_item_count(id).unwrap(),
        5,
        "delete-then-insert must not accumulate items"
    );
    let second: Vec<_> = engine
        .simulation_items(id, 0, 100)
        .unwrap()
        .into_iter()
        .map(|i| (i.property_id, i.calculated_value))
        .collect();
    assert_eq!(first, second, "identical inputs must reproduce identical values");
}

#[test]
fn reset_recovers_a_stuck_processing_simulation() {
    let engine = TlpEngine::in_memory().unwrap();
    let id = new_simulation(&engine);

    // Simulate a crash that left the status committed as PROCESSING.
    engine
        .store()
        .update_simulation_status(id, SimulationStatus::Processing)
        .unwrap();

    engine.reset_processing(id).unwrap();
    assert_eq!(
        engine.get_simulation(id).unwrap().status,
        SimulationStatus::Failed
    );

    // Only PROCESSING may be reset.
    let err = engine.reset_processing(id).unwrap_err();
    assert!(matches!(err, TlpError::InvalidState { .. }));
}

#[test]
fn snapshot_is_decoupled_from_later_parameter_edits() {
    use tlp_core::params::NewParameter;

    let engine = TlpEngine::in_memory().unwrap();
    let id = new_simulation(&engine);

    // A new parameter version after simulation creation must not leak into
    // the stored snapshot.
    engine
        .create_parameter(NewParameter {
            fiscal_year: 2024,
            base_cost: dec!(999999),
            ..NewParameter::default()
        })
        .unwrap();

    let sim = engine.get_simulation(id).unwrap();
    assert_eq!(sim.snapshot.base_cost, dec!(100000));
}

//! tlp-runner: headless end-to-end driver for the TLP simulation engine.
//!
//! Usage:
//!   tlp-runner --year 2026 --base-cost 1000000 --properties 1000
//!   tlp-runner --db tlp.db --promote
//!
//! Seeds a demo property catalog when the database has none, creates a
//! parameter version and a simulation from it, processes the simulation and
//! prints the aggregated result. With --promote the simulation is also
//! promoted into a launch lot.

use anyhow::Result;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::env;
use tlp_core::catalog::PropertyRecord;
use tlp_core::engine::TlpEngine;
use tlp_core::params::NewParameter;
use tlp_core::simulation::NewSimulation;
use tlp_core::snapshot::{default_limit_max, default_limit_min, ParameterSnapshot};
use tlp_core::store::TlpStore;
use tlp_core::types::FiscalYear;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let year: FiscalYear = parse_arg(&args, "--year", 2026);
    let base_cost: Decimal = parse_arg(&args, "--base-cost", Decimal::new(1_000_000, 0));
    let seed_count: usize = parse_arg(&args, "--properties", 1000);
    let promote = args.iter().any(|a| a == "--promote");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");

    println!("tlp-runner");
    println!("  year:       {year}");
    println!("  base cost:  {base_cost}");
    println!("  db:         {db}");
    println!();

    log::debug!("opening database at {db}");
    let store = if db == ":memory:" {
        TlpStore::in_memory()?
    } else {
        TlpStore::open(db)?
    };
    store.migrate()?;
    let mut engine = TlpEngine::new(store);

    if engine.store().property_count()? == 0 {
        seed_catalog(&engine, seed_count)?;
        println!("seeded {seed_count} catalog properties");
    }

    let parameter = engine.create_parameter(NewParameter {
        fiscal_year: year,
        base_cost,
        limit_min_updated: Some(default_limit_min()),
        limit_max_updated: Some(default_limit_max()),
        ..NewParameter::default()
    })?;
    println!(
        "parameter v{} created (limits {} .. {})",
        parameter.version,
        default_limit_min(),
        default_limit_max()
    );

    let simulation = engine.create_simulation(NewSimulation {
        fiscal_year: year,
        description: format!("tlp-runner simulation for {year}"),
        snapshot: ParameterSnapshot {
            base_cost: parameter.base_cost,
            ipca_pct: parameter.ipca_pct,
            subsidy_pct: parameter.subsidy_pct,
            limit_min_base: parameter.limit_min_base,
            limit_max_base: parameter.limit_max_base,
            limit_min_updated: parameter.limit_min_updated,
            limit_max_updated: parameter.limit_max_updated,
            final_cost: None,
        },
    })?;

    let outcome = engine.process_simulation(simulation.id)?;
    println!(
        "processed: {} items over {} properties",
        outcome.items_written, outcome.total_properties
    );
    println!();

    print_result(&engine, simulation.id)?;

    if promote {
        let lot = engine.promote_simulation(simulation.id)?;
        println!();
        println!(
            "promoted to lot v{} ({}) for fiscal year {}",
            lot.version,
            lot.status,
            lot.fiscal_year
        );
        if let Some(latest) = engine.latest_lot(year)? {
            println!(
                "latest lot rates: min {} / max {} / ipca {}",
                latest.limit_min_updated, latest.limit_max_updated, latest.ipca_pct
            );
        }
    }

    Ok(())
}

/// Deterministic demo catalog: a fixed classification mix, no randomness.
fn seed_catalog(engine: &TlpEngine, count: usize) -> Result<()> {
    const MIX: [&str; 10] = [
        "RESIDENTIAL",
        "RESIDENTIAL",
        "RESIDENTIAL",
        "RESIDENTIAL",
        "RESIDENTIAL",
        "RESIDENTIAL",
        "SERVICE",
        "SERVICE",
        "COMMERCE",
        "INDUSTRY",
    ];
    for i in 0..count {
        let classification = if i % 97 == 0 {
            "PUBLIC"
        } else {
            MIX[i % MIX.len()]
        };
        engine.store().insert_property(&PropertyRecord {
            property_id: format!("{:08}", i + 1),
            contributor_name: Some(format!("CONTRIBUTOR {:05}", i + 1)),
            usage_classification: Some(classification.to_string()),
            considered_activity: None,
            has_service: classification == "SERVICE",
            has_commerce: classification == "COMMERCE",
            has_industry: classification == "INDUSTRY",
            distinct_companies: 0,
            distinct_cnaes: 0,
        })?;
    }
    Ok(())
}

/// Display boundary: exact decimals become floats only here.
fn print_result(engine: &TlpEngine, simulation_id: uuid::Uuid) -> Result<()> {
    let result = engine.simulation_result(simulation_id)?;
    let stats = &result.stats;
    println!("result for simulation {}", result.simulation.id);
    println!("  properties: {}", stats.total_properties);
    println!("  exempt:     {}", stats.exempt_count);
    println!("  total:      {:.2}", stats.total_value.to_f64().unwrap_or(0.0));
    println!("  average:    {:.2}", stats.average_value.to_f64().unwrap_or(0.0));
    println!("  min:        {:.2}", stats.min_value.to_f64().unwrap_or(0.0));
    println!("  max:        {:.2}", stats.max_value.to_f64().unwrap_or(0.0));
    println!("  by usage:");
    for row in &result.by_usage {
        println!(
            "    {:<22} {:>6}  {:>14.2}",
            row.usage_classification,
            row.count,
            row.total_value.to_f64().unwrap_or(0.0)
        );
    }

    let top = engine.simulation_items(simulation_id, 0, 5)?;
    println!("  top items:");
    for item in top {
        println!(
            "    {}  {:<22} {:>10.2}",
            item.property_id,
            item.usage_classification,
            item.calculated_value.to_f64().unwrap_or(0.0)
        );
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr>(args: &[String], name: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == name)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

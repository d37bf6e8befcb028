use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tlp_core::calc::{self, ExemptionMap};
use tlp_core::catalog::PropertyRecord;
use tlp_core::error::TlpError;
use tlp_core::factors::{UsageFactorTable, IMPLICIT_EXEMPTION_REASON};
use tlp_core::snapshot::EffectiveRates;

fn property(id: &str, classification: Option<&str>) -> PropertyRecord {
    PropertyRecord {
        property_id: id.to_string(),
        contributor_name: Some(format!("OWNER {id}")),
        usage_classification: classification.map(str::to_string),
        considered_activity: None,
        has_service: false,
        has_commerce: false,
        has_industry: false,
        distinct_companies: 0,
        distinct_cnaes: 0,
    }
}

fn rates(final_cost: Decimal) -> EffectiveRates {
    EffectiveRates {
        final_cost,
        limit_min: dec!(258.00),
        limit_max: dec!(1600.08),
    }
}

#[test]
fn usage_factor_table_is_exact() {
    let table = UsageFactorTable::default();
    assert_eq!(table.factor("RESIDENTIAL"), dec!(1.0));
    assert_eq!(table.factor("SERVICE"), dec!(1.2));
    assert_eq!(table.factor("COMMERCE"), dec!(1.5));
    assert_eq!(table.factor("INDUSTRY"), dec!(2.0));
    assert_eq!(table.factor("PUBLIC"), Decimal::ZERO);
    assert_eq!(table.factor("PHILANTHROPIC"), Decimal::ZERO);
    assert_eq!(table.factor("PUBLIC/PHILANTHROPIC"), Decimal::ZERO);

    // Unknown classifications get the default factor and are NOT exempt.
    assert_eq!(table.factor("WAREHOUSE"), dec!(1.0));
    assert!(!table.implicitly_exempt("WAREHOUSE"));

    assert!(table.implicitly_exempt("PUBLIC"));
    assert!(table.implicitly_exempt("PHILANTHROPIC"));
    assert!(table.implicitly_exempt("PUBLIC/PHILANTHROPIC"));
    assert!(!table.implicitly_exempt("RESIDENTIAL"));
}

#[test]
fn scenario_million_over_thousand_properties() {
    // 1,000,000 over 1000 properties → uniform base of 1000 each.
    let mut catalog = Vec::new();
    for i in 0..998 {
        catalog.push(property(&format!("R{i:04}"), Some("RESIDENTIAL")));
    }
    catalog.push(property("IND001", Some("INDUSTRY")));
    catalog.push(property("PUB001", Some("PUBLIC")));

    let items = calc::run(
        &rates(dec!(1000000)),
        &UsageFactorTable::default(),
        &ExemptionMap::new(),
        &catalog,
    )
    .unwrap();
    assert_eq!(items.len(), 1000);

    let residential = &items[0];
    assert_eq!(residential.gross_value, dec!(1000));
    assert_eq!(residential.calculated_value, dec!(1000), "within limits, unclamped");
    assert!(!residential.is_exempt);

    let industry = items.iter().find(|i| i.property_id == "IND001").unwrap();
    assert_eq!(industry.gross_value, dec!(2000));
    assert_eq!(industry.calculated_value, dec!(1600.08), "clamped to the maximum");

    let public = items.iter().find(|i| i.property_id == "PUB001").unwrap();
    assert!(public.is_exempt);
    assert_eq!(public.calculated_value, Decimal::ZERO);
    assert_eq!(
        public.exemption_reason.as_deref(),
        Some(IMPLICIT_EXEMPTION_REASON)
    );
}

#[test]
fn gross_below_minimum_is_raised() {
    let catalog = vec![
        property("A", Some("RESIDENTIAL")),
        property("B", Some("RESIDENTIAL")),
    ];
    // 100 over 2 properties → gross 50, below the 258 floor.
    let items = calc::run(
        &rates(dec!(100)),
        &UsageFactorTable::default(),
        &ExemptionMap::new(),
        &catalog,
    )
    .unwrap();
    assert_eq!(items[0].gross_value, dec!(50));
    assert_eq!(items[0].calculated_value, dec!(258.00));
}

#[test]
fn explicit_exemption_reason_wins_over_implicit() {
    let catalog = vec![
        property("PUB", Some("PUBLIC")),
        property("RES", Some("RESIDENTIAL")),
    ];
    let mut exemptions = ExemptionMap::new();
    exemptions.insert("PUB".to_string(), Some("COURT ORDER 123".to_string()));
    exemptions.insert("RES".to_string(), None);

    let items = calc::run(
        &rates(dec!(10000)),
        &UsageFactorTable::default(),
        &exemptions,
        &catalog,
    )
    .unwrap();

    let public = &items[0];
    assert!(public.is_exempt);
    assert_eq!(public.exemption_reason.as_deref(), Some("COURT ORDER 123"));

    // Explicitly exempt without a reason and not public: reason stays empty.
    let residential = &items[1];
    assert!(residential.is_exempt);
    assert_eq!(residential.calculated_value, Decimal::ZERO);
    assert_eq!(residential.exemption_reason, None);
}

#[test]
fn implicit_reason_fills_in_when_explicit_has_none() {
    let catalog = vec![property("PUB", Some("PHILANTHROPIC"))];
    let mut exemptions = ExemptionMap::new();
    exemptions.insert("PUB".to_string(), None);

    let items = calc::run(
        &rates(dec!(1000)),
        &UsageFactorTable::default(),
        &exemptions,
        &catalog,
    )
    .unwrap();
    assert_eq!(
        items[0].exemption_reason.as_deref(),
        Some(IMPLICIT_EXEMPTION_REASON)
    );
}

#[test]
fn unknown_classification_uses_default_factor_and_pays() {
    let catalog = vec![property("X", Some("warehouse district"))];
    let items = calc::run(
        &rates(dec!(1000)),
        &UsageFactorTable::default(),
        &ExemptionMap::new(),
        &catalog,
    )
    .unwrap();
    assert_eq!(items[0].usage_classification, "WAREHOUSE DISTRICT");
    assert_eq!(items[0].usage_factor, dec!(1.0));
    assert!(!items[0].is_exempt);
    assert_eq!(items[0].calculated_value, dec!(1000));
}

#[test]
fn missing_classification_defaults_to_residential() {
    let catalog = vec![property("X", None), property("Y", Some("  "))];
    let items = calc::run(
        &rates(dec!(2000)),
        &UsageFactorTable::default(),
        &ExemptionMap::new(),
        &catalog,
    )
    .unwrap();
    assert_eq!(items[0].usage_classification, "RESIDENTIAL");
    assert_eq!(items[1].usage_classification, "RESIDENTIAL");
    assert_eq!(items[0].usage_factor, dec!(1.0));
}

#[test]
fn empty_catalog_is_rejected_before_any_output() {
    let err = calc::run(
        &rates(dec!(1000)),
        &UsageFactorTable::default(),
        &ExemptionMap::new(),
        &[],
    )
    .unwrap_err();
    assert!(matches!(err, TlpError::EmptyCatalog));
}

#[test]
fn identical_inputs_produce_identical_items() {
    let catalog: Vec<_> = (0..50)
        .map(|i| {
            let class = match i % 4 {
                0 => "RESIDENTIAL",
                1 => "SERVICE",
                2 => "COMMERCE",
                _ => "INDUSTRY",
            };
            property(&format!("P{i:03}"), Some(class))
        })
        .collect();
    let mut exemptions = ExemptionMap::new();
    exemptions.insert("P007".to_string(), Some("DECREE".to_string()));

    let table = UsageFactorTable::default();
    let first = calc::run(&rates(dec!(123456.78)), &table, &exemptions, &catalog).unwrap();
    let second = calc::run(&rates(dec!(123456.78)), &table, &exemptions, &catalog).unwrap();
    assert_eq!(first, second, "same inputs must reproduce the same item set");

    // Output follows catalog iteration order.
    let ids: Vec<_> = first.iter().map(|i| i.property_id.as_str()).collect();
    let expected: Vec<_> = catalog.iter().map(|p| p.property_id.as_str()).collect();
    assert_eq!(ids, expected);
}

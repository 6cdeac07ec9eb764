use crate::db::run_metrics;
use crate::domain::channel::ChannelLabel;
use crate::domain::{DateRange, MetricScope, MetricsReport};
use crate::query::{FilterPolicy, MetricKind, QueryBuilder, ScopeFilters, Segment};
use crate::tests::utils::{body_string, delhi_june, init_test_db, seed, test_app, Booking, FakeGenerator};
use chrono::NaiveDate;

fn june() -> Option<DateRange> {
    Some(DateRange::new(
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
    ))
}

#[test]
fn sold_revenue_counts_by_booking_date() {
    let (db, _dir) = init_test_db();
    seed(&db, &delhi_june());

    let spec = QueryBuilder::default()
        .build_query(MetricKind::SoldRevenue, june(), &ScopeFilters::default(), None)
        .unwrap();
    let MetricsReport::Summary(record) = run_metrics(&db, &spec).unwrap() else {
        panic!("expected a summary");
    };
    // Delhi 3500 + Mumbai 1000 + the late-June sale staying in July.
    assert!((record.revenue - 5500.0).abs() < 1e-6);
    assert_eq!(record.room_nights, 5);
}

#[test]
fn b2b_segment_only_sees_b2b_sources() {
    let (db, _dir) = init_test_db();
    seed(
        &db,
        &[
            Booking::new(1, "Delhi", "2025-06-05", 1120.0).sources(Some(21), None),
            Booking::new(2, "Delhi", "2025-06-06", 2240.0),
        ],
    );

    let spec = QueryBuilder::default()
        .build_query(MetricKind::B2bRevenue, june(), &ScopeFilters::default(), Some(Segment::B2c))
        .unwrap();
    let MetricsReport::Summary(record) = run_metrics(&db, &spec).unwrap() else {
        panic!("expected a summary");
    };
    assert!((record.revenue - 1000.0).abs() < 1e-6);
    assert_eq!(record.room_nights, 1);
}

#[test]
fn owner_segment_is_limited_to_allow_listed_properties() {
    let (db, _dir) = init_test_db();
    seed(
        &db,
        &[
            Booking::new(1, "Delhi", "2025-06-05", 1120.0)
                .sources(Some(13), None)
                .property(980831, "Fab Owner One"),
            Booking::new(2, "Delhi", "2025-06-06", 2240.0)
                .sources(Some(19), None)
                .property(555, "Fab Not Listed"),
        ],
    );

    let spec = QueryBuilder::default()
        .build_query(MetricKind::CitySummary, june(), &ScopeFilters::city("Delhi"), Some(Segment::Owner))
        .unwrap();
    let MetricsReport::Summary(record) = run_metrics(&db, &spec).unwrap() else {
        panic!("expected a summary");
    };
    assert_eq!(record.room_nights, 1);
}

#[test]
fn brand_prefix_match_is_case_sensitive() {
    let (db, _dir) = init_test_db();
    seed(
        &db,
        &[
            Booking::new(1, "Delhi", "2025-06-05", 1120.0),
            Booking::new(2, "Delhi", "2025-06-06", 2240.0).property(101, "fabric Lodge"),
            Booking::new(3, "Delhi", "2025-06-07", 560.0).property(102, "ORIVA_x"),
        ],
    );

    let spec = QueryBuilder::default()
        .build_query(MetricKind::CitySummary, june(), &ScopeFilters::city("Delhi"), None)
        .unwrap();
    let MetricsReport::Summary(record) = run_metrics(&db, &spec).unwrap() else {
        panic!("expected a summary");
    };
    assert_eq!(record.room_nights, 1);
    assert!((record.revenue - 1000.0).abs() < 1e-6);
}

#[test]
fn underscore_in_prefix_matches_literally() {
    let (db, _dir) = init_test_db();
    seed(
        &db,
        &[
            Booking::new(1, "Delhi", "2025-06-05", 1120.0).property(201, "Oriva_One"),
            Booking::new(2, "Delhi", "2025-06-06", 2240.0).property(202, "OrivaXOne"),
        ],
    );

    let builder = QueryBuilder::new(FilterPolicy {
        property_prefixes: vec!["Oriva_".into()],
        ..FilterPolicy::default()
    });
    let spec = builder
        .build_query(MetricKind::CitySummary, june(), &ScopeFilters::city("Delhi"), None)
        .unwrap();
    let MetricsReport::Summary(record) = run_metrics(&db, &spec).unwrap() else {
        panic!("expected a summary");
    };
    assert_eq!(record.room_nights, 1);
    assert!((record.revenue - 1000.0).abs() < 1e-6);
}

#[test]
fn property_breakdown_orders_by_revenue() {
    let (db, _dir) = init_test_db();
    seed(&db, &delhi_june());

    let spec = QueryBuilder::default()
        .build_query(MetricKind::PropertyBreakdown, june(), &ScopeFilters::city("Delhi"), None)
        .unwrap();
    let records = run_metrics(&db, &spec).unwrap().into_records();

    assert_eq!(records.len(), 2);
    // Fab Karol Bagh 2000 beats Fab Central 1000 + 500.
    assert_eq!(
        records[0].scope,
        MetricScope::Property { id: 101, name: "Fab Karol Bagh".into() }
    );
    assert_eq!(records[1].room_nights, 2);
}

#[test]
fn channel_mix_folds_sources_into_labels() {
    let (db, _dir) = init_test_db();
    seed(&db, &delhi_june());

    let spec = QueryBuilder::default()
        .build_query(MetricKind::ChannelMix, june(), &ScopeFilters::city("Delhi"), None)
        .unwrap();
    let records = run_metrics(&db, &spec).unwrap().into_records();
    let labels: Vec<_> = records.iter().map(|r| r.scope.clone()).collect();

    assert_eq!(
        labels,
        vec![
            MetricScope::Channel(ChannelLabel::Is),
            MetricScope::Channel(ChannelLabel::Bdc),
        ]
    );
}

#[test]
fn metrics_page_renders_kind_and_sql() {
    let app = test_app(FakeGenerator::replying("unused"), &delhi_june());

    let resp = app
        .get("/metrics?kind=monthly_trend&start=2025-06-01&end=2025-06-30")
        .expect("Handler failed");
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("monthly_trend"));
    assert!(body.contains("2025-06"));
    assert!(body.contains("TO_CHAR"));
    assert!(app.prompts().is_empty());
}

#[test]
fn unknown_metric_kind_is_a_bad_request() {
    let app = test_app(FakeGenerator::replying("unused"), &[]);
    let err = app.get_err("/metrics?kind=occupancy");
    assert_eq!(err.status(), 400);
    assert!(err.to_string().contains("occupancy"));
}

#[test]
fn scoped_kind_without_scope_is_a_bad_request() {
    let app = test_app(FakeGenerator::replying("unused"), &[]);
    let err = app.get_err("/metrics?kind=city_summary");
    assert_eq!(err.status(), 400);
}

use crate::responses::xlsx::XLSX_CONTENT_TYPE;
use crate::tests::utils::{body_string, delhi_june, test_app, FakeGenerator};
use std::io::Read;

const DELHI_JUNE: &str = "/city?start=2025-06-01&end=2025-06-30&city=Delhi";

#[test]
fn home_lists_selectable_cities() {
    let app = test_app(FakeGenerator::replying("unused"), &delhi_june());

    let resp = app.get("/").expect("Handler failed");
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains(r#"<option value="Delhi" selected>"#));
    assert!(body.contains(r#"<option value="Mumbai">"#));
    assert!(!body.contains("Gotham"));
    assert!(body.contains(r#"value="2025-06-01""#));
    assert!(body.contains(r#"value="2025-06-30""#));
    assert!(app.prompts().is_empty(), "no insight before a city is loaded");
}

#[test]
fn city_report_shows_delhi_kpis_and_insight() {
    let app = test_app(FakeGenerator::replying("Revenue is steady.\nADR is healthy."), &delhi_june());

    let resp = app.get(DELHI_JUNE).expect("Handler failed");
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("₹3,500.00"));
    assert!(body.contains("₹1,166.67"));
    assert!(body.contains("<p>Revenue is steady.</p>"));
    assert!(body.contains("Fab Karol Bagh"));
    assert!(body.contains("2025-06"));
    assert!(body.contains("BDC"));
    assert!(body.contains("grand_total"));
    assert!(body.contains("/city/export.xlsx?start=2025-06-01&amp;end=2025-06-30&amp;city=Delhi"));

    let prompts = app.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("city Delhi"));
    assert!(prompts[0].contains("Revenue: ₹3,500.00\n"));
    assert!(prompts[0].contains("Room Nights: 3\n"));
    assert!(prompts[0].contains("ADR: ₹1,166.67\n"));
}

#[test]
fn city_without_bookings_reports_zero_and_no_adr() {
    let app = test_app(FakeGenerator::replying("Nothing to report."), &delhi_june());

    let body = body_string(
        app.get("/city?start=2025-06-01&end=2025-06-30&city=Pune")
            .expect("Handler failed"),
    );
    assert!(body.contains("₹0.00"));
    assert!(body.contains("n/a"));
    assert!(body.contains("No data for the selected filters."));
    assert!(app.prompts()[0].contains("ADR: n/a\n"));
}

#[test]
fn insight_failure_keeps_the_page() {
    let app = test_app(FakeGenerator::failing("HTTP 429"), &delhi_june());

    let resp = app.get(DELHI_JUNE).expect("Handler failed");
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("₹3,500.00"));
    assert!(body.contains("Insight unavailable"));
    assert!(body.contains("HTTP 429"));
}

#[test]
fn reversed_range_keeps_the_form_with_an_error() {
    let app = test_app(FakeGenerator::replying("unused"), &delhi_june());

    let resp = app
        .get("/city?start=2025-06-30&end=2025-06-01&city=Delhi")
        .expect("Handler failed");
    assert_eq!(resp.status(), 400);
    let body = body_string(resp);
    assert!(body.contains("invalid date range"), "{body}");
    assert!(body.contains(r#"name="start""#));
    assert!(body.contains(r#"value="2025-06-30""#));
    assert!(app.prompts().is_empty());
}

#[test]
fn malformed_date_keeps_the_form_with_an_error() {
    let app = test_app(FakeGenerator::replying("unused"), &[]);

    let resp = app
        .get("/city?start=June&end=2025-06-30&city=Delhi")
        .expect("Handler failed");
    assert_eq!(resp.status(), 400);
    let body = body_string(resp);
    assert!(body.contains("YYYY-MM-DD"), "{body}");
    assert!(body.contains(r#"name="start""#));
    assert!(app.prompts().is_empty());
}

#[test]
fn loading_without_any_city_keeps_the_form_with_an_error() {
    let app = test_app(FakeGenerator::replying("unused"), &[]);

    let resp = app.get("/city?start=2025-06-01&end=2025-06-30").expect("Handler failed");
    assert_eq!(resp.status(), 400);
    let body = body_string(resp);
    assert!(body.contains("needs a city or property"), "{body}");
    assert!(body.contains(r#"name="start""#));
    assert!(app.prompts().is_empty());
}

#[test]
fn property_export_is_an_xlsx_attachment() {
    let app = test_app(FakeGenerator::replying("unused"), &delhi_june());

    let resp = app
        .get("/city/export.xlsx?start=2025-06-01&end=2025-06-30&city=Delhi")
        .expect("Handler failed");
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["Content-Type"], XLSX_CONTENT_TYPE);
    assert_eq!(
        resp.headers()["Content-Disposition"],
        r#"attachment; filename="properties_delhi_2025-06-01_2025-06-30.xlsx""#
    );

    let mut bytes = Vec::new();
    resp.into_body().reader().read_to_end(&mut bytes).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn export_needs_a_range() {
    let app = test_app(FakeGenerator::replying("unused"), &delhi_june());
    let err = app.get_err("/city/export.xlsx?city=Delhi");
    assert_eq!(err.status(), 400);
}

#[test]
fn unknown_route_is_not_found() {
    let app = test_app(FakeGenerator::replying("unused"), &[]);
    assert_eq!(app.get_err("/admin").status(), 404);
}

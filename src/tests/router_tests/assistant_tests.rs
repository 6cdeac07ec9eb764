use crate::tests::utils::{body_string, test_app, FakeGenerator};

#[test]
fn fenced_sql_is_extracted_and_not_executed() {
    let reply = "Here you go:\n```sql\nSELECT property_city, SUM(grand_total / 1.12) FROM mtd GROUP BY 1;\n```\nEnjoy.";
    let app = test_app(FakeGenerator::replying(reply), &[]);

    let resp = app
        .get("/assistant?question=Revenue+by+city+for+June+2025")
        .expect("Handler failed");
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("SELECT property_city, SUM(grand_total / 1.12) FROM mtd GROUP BY 1;"));
    assert!(!body.contains("Enjoy."));
    assert!(body.contains("Query execution is disabled"));

    let prompts = app.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Revenue by city for June 2025"));
    assert!(prompts[0].contains("mtd"));
}

#[test]
fn unfenced_reply_is_shown_as_is() {
    let app = test_app(FakeGenerator::replying("  SELECT COUNT(*) FROM mtd;  "), &[]);

    let body = body_string(app.get("/assistant?question=how+many").expect("Handler failed"));
    assert!(body.contains("<code>SELECT COUNT(*) FROM mtd;</code>"));
}

#[test]
fn empty_reply_is_reported() {
    let app = test_app(FakeGenerator::replying("I am not sure.\n```sql\n```"), &[]);

    let body = body_string(app.get("/assistant?question=why").expect("Handler failed"));
    assert!(body.contains("The model did not return any SQL."));
    assert!(body.contains("I am not sure."));
}

#[test]
fn generator_failure_is_an_inline_error() {
    let app = test_app(FakeGenerator::failing("HTTP 401: bad key"), &[]);

    let resp = app.get("/assistant?question=revenue").expect("Handler failed");
    assert_eq!(resp.status(), 200);
    assert!(body_string(resp).contains("HTTP 401: bad key"));
}

#[test]
fn blank_question_does_not_call_the_generator() {
    let app = test_app(FakeGenerator::replying("unused"), &[]);

    for uri in ["/assistant", "/assistant?question=+++"] {
        let resp = app.get(uri).expect("Handler failed");
        assert_eq!(resp.status(), 200);
        assert!(body_string(resp).contains("Generate SQL"));
    }
    assert!(app.prompts().is_empty());
}

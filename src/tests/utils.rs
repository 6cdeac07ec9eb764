use crate::app::AppState;
use crate::db::connection::{init_db, Database};
use crate::errors::ServerError;
use crate::insight::client::LlmError;
use crate::insight::TextGenerator;
use crate::query::FilterPolicy;
use crate::router::handle;
use astra::{Body, Response};
use http::{Method, Request};
use rusqlite::params;
use std::io::Read;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// A fresh database in its own temp directory, using the production schema.
/// Keep the `TempDir` alive for as long as the database is used.
pub fn init_test_db() -> (Database, TempDir) {
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
    let db = Database::new(dir.path().join("kpi_test.sqlite3"));

    init_db(&db, "sql/schema.sql")
        .unwrap_or_else(|e| panic!("Database initialization failed: {e}"));

    (db, dir)
}

/// One `mtd` row. `created_at` defaults to noon on the stay date.
#[derive(Debug, Clone)]
pub struct Booking {
    pub id: i64,
    pub stay_date: &'static str,
    pub created_at: Option<&'static str>,
    pub grand_total: f64,
    pub booking_source: Option<i64>,
    pub ota_booking_source: Option<i64>,
    pub guest_status: i64,
    pub property_id: i64,
    pub property_name: &'static str,
    pub city: Option<&'static str>,
}

impl Booking {
    /// A checked-in walk-in stay at a branded property.
    pub fn new(id: i64, city: &'static str, stay_date: &'static str, grand_total: f64) -> Self {
        Self {
            id,
            stay_date,
            created_at: None,
            grand_total,
            booking_source: Some(2),
            ota_booking_source: None,
            guest_status: 1,
            property_id: 100,
            property_name: "Fab Central",
            city: Some(city),
        }
    }

    pub fn property(mut self, id: i64, name: &'static str) -> Self {
        self.property_id = id;
        self.property_name = name;
        self
    }

    pub fn status(mut self, guest_status: i64) -> Self {
        self.guest_status = guest_status;
        self
    }

    pub fn sources(mut self, booking_source: Option<i64>, ota_booking_source: Option<i64>) -> Self {
        self.booking_source = booking_source;
        self.ota_booking_source = ota_booking_source;
        self
    }

    pub fn created(mut self, created_at: &'static str) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

pub fn seed(db: &Database, bookings: &[Booking]) {
    db.with_conn(|conn| {
        for b in bookings {
            let created_at = b
                .created_at
                .map(String::from)
                .unwrap_or_else(|| format!("{} 12:00:00", b.stay_date));
            conn.execute(
                "INSERT INTO mtd (room_night_booking_id, booking_id, stay_date, created_at, grand_total,
                    booking_source, ota_booking_source, guest_status, property_id, property_name, property_city)
                 VALUES (?1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    b.id,
                    b.stay_date,
                    created_at,
                    b.grand_total,
                    b.booking_source,
                    b.ota_booking_source,
                    b.guest_status,
                    b.property_id,
                    b.property_name,
                    b.city,
                ],
            )?;
        }
        Ok::<_, ServerError>(())
    })
    .unwrap_or_else(|e| panic!("seeding failed: {e}"));
}

/// Canned text generator that records every prompt it receives.
pub struct FakeGenerator {
    reply: Result<String, LlmError>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl FakeGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            prompts: Arc::default(),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            reply: Err(LlmError::ServiceUnavailable(reason.to_string())),
            prompts: Arc::default(),
        }
    }
}

impl TextGenerator for FakeGenerator {
    fn complete(&self, prompt: &str, _model_id: &str) -> Result<String, LlmError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.reply.clone()
    }
}

pub struct TestApp {
    pub state: AppState,
    pub prompts: Arc<Mutex<Vec<String>>>,
    _dir: TempDir,
}

pub fn test_app(generator: FakeGenerator, bookings: &[Booking]) -> TestApp {
    let (db, dir) = init_test_db();
    seed(&db, bookings);
    let prompts = Arc::clone(&generator.prompts);
    let state = AppState::new(
        db,
        FilterPolicy::default(),
        Duration::from_secs(300),
        Box::new(generator),
        "test-model",
    );
    TestApp {
        state,
        prompts,
        _dir: dir,
    }
}

impl TestApp {
    pub fn get(&self, uri: &str) -> Result<Response, ServerError> {
        let req = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        handle(req, &self.state)
    }

    pub fn get_err(&self, uri: &str) -> ServerError {
        match self.get(uri) {
            Ok(resp) => panic!("expected an error for {uri}, got status {}", resp.status()),
            Err(err) => err,
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

pub fn body_string(resp: Response) -> String {
    let mut body = String::new();
    resp.into_body().reader().read_to_string(&mut body).unwrap();
    body
}

/// The Delhi June 2025 fixture: three realized stays netting 1000, 2000 and 500.
pub fn delhi_june() -> Vec<Booking> {
    vec![
        Booking::new(1, "Delhi", "2025-06-05", 1120.0),
        Booking::new(2, "Delhi", "2025-06-12", 2240.0).property(101, "Fab Karol Bagh"),
        Booking::new(3, "Delhi", "2025-06-20", 560.0).sources(Some(1), Some(5)),
        // Excluded by status, brand, blocklist and date respectively.
        Booking::new(4, "Delhi", "2025-06-07", 9999.0).status(5),
        Booking::new(5, "Delhi", "2025-06-07", 9999.0).property(200, "Other Inn"),
        Booking::new(6, "Gotham", "2025-06-07", 9999.0),
        Booking::new(7, "Delhi", "2025-07-02", 9999.0),
        Booking::new(8, "Mumbai", "2025-06-08", 1120.0).property(300, "Oriva Bay"),
        // Sold on the last day of June, stays in July.
        Booking::new(9, "Delhi", "2025-07-03", 1120.0).created("2025-06-30 23:30:00"),
    ]
}

//! Screen-level tests against an in-memory backend
//!
//! These drive the library the way the CLI does (load, filter, mutate,
//! refresh) with a mock transport in place of HTTP.

use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use mao::core::api::{ApiClient, ApiError, ApiRequest, ApiResponse, Method, Transport};
use mao::core::entity::{ReviewStatus, VerificationStatus};
use mao::core::export::to_csv;
use mao::core::fetch::{FetchState, Screen};
use mao::core::identity::RecordId;
use mao::core::mutation::{Action, AssumeYes, Confirm, MutationDispatcher, RefreshPolicy};
use mao::core::view::{FilterState, PageSize};
use mao::entities::farmer::{self, Farmer, FarmerSummary};
use mao::entities::report::DashboardReport;
use mao::entities::sales::{self, set_status, SalesReport};

/// Backend holding one collection per path
struct MockBackend {
    collections: Mutex<HashMap<String, Vec<Value>>>,
    /// Fixed responses for non-collection paths
    fixed: HashMap<String, ApiResponse>,
    fail_writes: AtomicBool,
    log: Mutex<Vec<ApiRequest>>,
}

impl MockBackend {
    fn new() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            fixed: HashMap::new(),
            fail_writes: AtomicBool::new(false),
            log: Mutex::new(Vec::new()),
        }
    }

    fn with_collection(self, path: &str, items: Value) -> Self {
        let items = items.as_array().cloned().unwrap_or_default();
        self.collections
            .lock()
            .unwrap()
            .insert(path.to_string(), items);
        self
    }

    fn with_fixed(mut self, path: &str, response: ApiResponse) -> Self {
        self.fixed.insert(path.to_string(), response);
        self
    }

    fn requests(&self) -> Vec<(Method, String)> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .map(|r| (r.method, r.path.clone()))
            .collect()
    }
}

impl Transport for MockBackend {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.log.lock().unwrap().push(request.clone());

        if let Some(response) = self.fixed.get(&request.path) {
            return Ok(response.clone());
        }

        if request.method != Method::Get && self.fail_writes.load(Ordering::SeqCst) {
            return Ok(ApiResponse::json(500, &json!({"message": "Database unavailable"})));
        }

        let mut collections = self.collections.lock().unwrap();
        match request.method {
            Method::Get => match collections.get(&request.path) {
                Some(items) => Ok(ApiResponse::json(200, &json!({ "farmers": items, "reports": items }))),
                None => Ok(ApiResponse::json(404, &json!({"error": "Not found"}))),
            },
            Method::Delete => {
                let (base, id) = request
                    .path
                    .rsplit_once('/')
                    .ok_or_else(|| ApiError::Transport("bad path".into()))?;
                let items = collections
                    .get_mut(base)
                    .ok_or_else(|| ApiError::Transport("unknown collection".into()))?;
                items.retain(|item| item["id"].to_string().trim_matches('"') != id);
                Ok(ApiResponse::json(200, &json!({"message": "Deleted"})))
            }
            Method::Put => {
                let mut parts: Vec<&str> = request.path.rsplitn(3, '/').collect();
                parts.reverse();
                let (base, id, action) = (parts[0], parts[1], parts[2]);
                let status = match action {
                    "verify" => "verified",
                    "approve" => "approved",
                    "reject" => "rejected",
                    _ => return Ok(ApiResponse::json(400, &json!({"error": "bad action"}))),
                };
                if let Some(items) = collections.get_mut(base) {
                    for item in items.iter_mut() {
                        if item["id"].to_string().trim_matches('"') == id {
                            item["status"] = json!(status);
                        }
                    }
                }
                Ok(ApiResponse::json(200, &json!({"message": "Updated"})))
            }
            Method::Post => Ok(ApiResponse::json(201, &json!({"message": "Created"}))),
        }
    }
}

fn farmers_backend() -> MockBackend {
    MockBackend::new().with_collection(
        "/mao/farmers",
        json!([
            {"id": 1, "full_name": "Ana Reyes", "association_name": "CUSAFA",
             "barangay": "San Isidro", "municipality": "Catarman",
             "farm_area_hectares": 2.5, "status": "verified"},
            {"id": 2, "full_name": "Ben Cruz", "barangay": "Poblacion",
             "municipality": "Catarman", "farm_area_hectares": 1.0, "status": "pending"},
            {"id": 3, "full_name": "Carla Santos", "association_name": "CUSAFA",
             "farm_area_hectares": 0.5, "status": "pending"}
        ]),
    )
}

fn load_farmers(client: &ApiClient<MockBackend>) -> Screen<Farmer> {
    let mut screen = Screen::new(farmer::source());
    screen.load(client).unwrap();
    screen
}

struct Decline;

impl Confirm for Decline {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

#[test]
fn test_load_then_filter_and_summarize() {
    let client = ApiClient::new(farmers_backend(), Some("tok".into()));
    let mut screen = load_farmers(&client);
    assert_eq!(screen.state(), &FetchState::Loaded);
    assert_eq!(screen.records().len(), 3);

    screen
        .view
        .set_filter(FilterState::new().with_category("status", "pending"));
    let summary = FarmerSummary::compute(screen.view.filtered());
    assert_eq!(summary.total, 2);
    assert_eq!(summary.pending, 2);
    assert!((summary.total_hectares - 1.5).abs() < 1e-9);

    // Raw data is untouched by filtering
    assert_eq!(screen.records().len(), 3);
}

#[test]
fn test_delete_then_refetch_removes_record() {
    let client = ApiClient::new(farmers_backend(), Some("tok".into()));
    let mut screen = load_farmers(&client);
    let dispatcher = MutationDispatcher::new(&client, &AssumeYes);

    dispatcher
        .dispatch(
            &mut screen,
            farmer::ENDPOINT,
            Some("2"),
            Action::Delete,
            RefreshPolicy::Refetch,
        )
        .unwrap();

    let ids: Vec<&str> = screen.records().iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
    assert_eq!(
        client.transport().requests(),
        vec![
            (Method::Get, "/mao/farmers".to_string()),
            (Method::Delete, "/mao/farmers/2".to_string()),
            (Method::Get, "/mao/farmers".to_string()),
        ]
    );
}

#[test]
fn test_declined_delete_sends_nothing() {
    let client = ApiClient::new(farmers_backend(), Some("tok".into()));
    let mut screen = load_farmers(&client);
    let dispatcher = MutationDispatcher::new(&client, &Decline);

    let result = dispatcher.dispatch(
        &mut screen,
        farmer::ENDPOINT,
        Some("2"),
        Action::Delete,
        RefreshPolicy::Refetch,
    );

    assert!(matches!(result, Err(ApiError::Cancelled)));
    assert_eq!(screen.records().len(), 3);
    assert_eq!(screen.state(), &FetchState::Loaded);
    assert_eq!(client.transport().requests().len(), 1);
}

#[test]
fn test_declined_delete_keeps_unloaded_screen_idle() {
    let client = ApiClient::new(farmers_backend(), Some("tok".into()));
    let mut screen: Screen<Farmer> = Screen::new(farmer::source());

    let result = MutationDispatcher::new(&client, &Decline).dispatch(
        &mut screen,
        farmer::ENDPOINT,
        Some("2"),
        Action::Delete,
        RefreshPolicy::Refetch,
    );

    assert!(matches!(result, Err(ApiError::Cancelled)));
    assert_eq!(screen.state(), &FetchState::Idle);
    assert!(client.transport().requests().is_empty());
}

#[test]
fn test_failed_delete_keeps_record() {
    let backend = farmers_backend();
    backend.fail_writes.store(true, Ordering::SeqCst);
    let client = ApiClient::new(backend, Some("tok".into()));
    let mut screen = load_farmers(&client);
    let before = screen.records().to_vec();

    let err = MutationDispatcher::new(&client, &AssumeYes)
        .dispatch(
            &mut screen,
            farmer::ENDPOINT,
            Some("2"),
            Action::Delete,
            RefreshPolicy::Refetch,
        )
        .unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 500, .. }));
    assert_eq!(err.user_message(), "Database unavailable");
    assert!(screen.records().iter().any(|f| f.id.as_str() == "2"));
    assert_eq!(screen.records(), before.as_slice());
    assert!(matches!(screen.state(), FetchState::Error(_)));
    assert_eq!(
        client.transport().requests(),
        vec![
            (Method::Get, "/mao/farmers".to_string()),
            (Method::Delete, "/mao/farmers/2".to_string()),
        ]
    );
}

#[test]
fn test_failed_mutation_leaves_collection_unchanged() {
    let backend = farmers_backend();
    backend.fail_writes.store(true, Ordering::SeqCst);
    let client = ApiClient::new(backend, Some("tok".into()));
    let mut screen = load_farmers(&client);
    let before = screen.records().to_vec();

    let err = MutationDispatcher::new(&client, &AssumeYes)
        .dispatch(
            &mut screen,
            farmer::ENDPOINT,
            Some("2"),
            Action::Verify,
            RefreshPolicy::Refetch,
        )
        .unwrap_err();

    assert_eq!(err.user_message(), "Database unavailable");
    assert_eq!(screen.records(), before.as_slice());
    assert_eq!(
        screen.state(),
        &FetchState::Error("Database unavailable".to_string())
    );
    // No refetch after a failed write
    assert_eq!(client.transport().requests().len(), 2);
}

#[test]
fn test_verify_then_refetch_shows_new_status() {
    let client = ApiClient::new(farmers_backend(), Some("tok".into()));
    let mut screen = load_farmers(&client);

    MutationDispatcher::new(&client, &AssumeYes)
        .dispatch(
            &mut screen,
            farmer::ENDPOINT,
            Some("3"),
            Action::Verify,
            RefreshPolicy::Refetch,
        )
        .unwrap();

    let carla = screen
        .records()
        .iter()
        .find(|f| f.id.as_str() == "3")
        .unwrap();
    assert_eq!(carla.verification_status, VerificationStatus::Verified);
}

#[test]
fn test_optimistic_approve_skips_refetch() {
    let backend = MockBackend::new().with_collection(
        "/sales/reports",
        json!([
            {"id": 10, "farmer_name": "Ana Reyes", "buyer_name": "Catarman Fiber",
             "quantity_kg": 100, "price_per_kg": 85.5, "status": "pending"},
            {"id": 11, "farmer_name": "Ben Cruz", "buyer_name": "Laoang Hemp",
             "quantity_kg": 40, "price_per_kg": 90, "status": "pending"}
        ]),
    );
    let client = ApiClient::new(backend, Some("tok".into()));
    let mut screen: Screen<SalesReport> = Screen::new(sales::source());
    screen.load(&client).unwrap();

    let target = RecordId::from("10");
    MutationDispatcher::new(&client, &AssumeYes)
        .dispatch(
            &mut screen,
            sales::ENDPOINT,
            Some("10"),
            Action::Approve,
            RefreshPolicy::optimistic(move |reports| {
                set_status(reports, &target, ReviewStatus::Approved)
            }),
        )
        .unwrap();

    let statuses: Vec<ReviewStatus> = screen.records().iter().map(|r| r.status).collect();
    assert_eq!(statuses, vec![ReviewStatus::Approved, ReviewStatus::Pending]);
    assert_eq!(screen.state(), &FetchState::Loaded);
    assert_eq!(
        client.transport().requests(),
        vec![
            (Method::Get, "/sales/reports".to_string()),
            (Method::Put, "/sales/reports/10/approve".to_string()),
        ]
    );
}

#[test]
fn test_stale_response_is_discarded() {
    let client = ApiClient::new(farmers_backend(), Some("tok".into()));
    let mut screen: Screen<Farmer> = Screen::new(farmer::source());

    let first = screen.begin();
    let second = screen.begin();
    let fresh = client.list::<Farmer>("/mao/farmers", "farmers", &[]);
    screen.complete(second, fresh).unwrap();
    assert_eq!(screen.records().len(), 3);

    let stale = Ok(mao::core::api::Listing {
        items: Vec::new(),
        pagination: None,
    });
    assert!(matches!(
        screen.complete(first, stale),
        Err(ApiError::Superseded)
    ));
    assert_eq!(screen.records().len(), 3);
}

#[test]
fn test_pagination_over_loaded_collection() {
    let items: Vec<Value> = (1..=23)
        .map(|i| json!({"id": i, "full_name": format!("Farmer {:02}", i)}))
        .collect();
    let backend = MockBackend::new().with_collection("/mao/farmers", Value::Array(items));
    let client = ApiClient::new(backend, Some("tok".into()));
    let mut screen = load_farmers(&client);

    screen.view.set_page_size(PageSize::Ten);
    assert_eq!(screen.view.total_pages(), 3);
    screen.view.go_to_page(3);
    let page = screen.view.page();
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.items[0].full_name, "Farmer 21");

    // A narrower search clamps back into range
    screen.view.set_search("farmer 1");
    assert_eq!(screen.view.page().page, 1);
    assert_eq!(screen.view.filtered().len(), 10);
}

#[test]
fn test_export_uses_filtered_rows() {
    let client = ApiClient::new(farmers_backend(), Some("tok".into()));
    let mut screen = load_farmers(&client);
    screen.view.set_search("cusafa");

    let csv = to_csv(screen.view.filtered(), &farmer::export_fields());
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("ID,Name,"));
    assert!(lines[1].starts_with("\"1\",\"Ana Reyes\""));
    assert!(lines[2].starts_with("\"3\",\"Carla Santos\""));
}

#[test]
fn test_dashboard_partial_failure() {
    let backend = MockBackend::new()
        .with_fixed(
            "/admin/production-report",
            ApiResponse::json(
                200,
                &json!({"statistics": {"total_harvests": 12, "total_kg": "1500.5",
                                       "previous_total_kg": 1000}}),
            ),
        )
        .with_fixed(
            "/admin/sales-report",
            ApiResponse::json(500, &json!({"message": "Report service down"})),
        )
        .with_fixed(
            "/admin/users-report",
            ApiResponse::json(200, &json!({"total_farmers": 40, "total_buyers": 6})),
        );
    let client = ApiClient::new(backend, Some("tok".into()));

    let report = DashboardReport::fetch(&client);
    assert!(!report.is_complete());
    assert_eq!(
        report.failures,
        vec![("sales".to_string(), "Report service down".to_string())]
    );
    assert_eq!(report.production.total_harvests, 12);
    assert_eq!(report.sales.total_sales, 0);
    assert_eq!(report.users.total_farmers, 40);

    let cards = report.cards();
    let produced = cards
        .iter()
        .find(|c| c.label == "Fiber produced (kg)")
        .unwrap();
    assert!(produced.trend.is_some());
    let revenue = cards.iter().find(|c| c.label == "Revenue (PHP)").unwrap();
    assert!(revenue.trend.is_none());
}

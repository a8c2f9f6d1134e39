//! Shared test utilities.
//!
//! In-memory storage, sample models, a scripted [`MarketApi`] and a minimal HTTP
//! server that replays canned responses for the reqwest client tests.

#![allow(clippy::unwrap_used)]

use crate::{
    client::MarketApi,
    errors::{Error, Result},
    models::{
        CardDetails, Category, CreateOrderRequest, CreatedOrder, FeedbackRequest, OrderStatus,
        PaymentMethod, PaymentReceipt, PaymentRequest, PaymentStatus, Pickup, Product,
        ProductQuery, ScheduledPickup, SchedulePickupRequest, UserSession,
    },
};
use sea_orm::{ConnectionTrait, DatabaseConnection};
use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

/// Creates an in-memory `SQLite` database with the storage table initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    crate::config::database::open("sqlite::memory:").await
}

/// Drops the storage table so every later read or write fails.
pub async fn break_storage(db: &DatabaseConnection) -> Result<()> {
    db.execute_unprepared("DROP TABLE storage_entries").await?;
    Ok(())
}

/// Installs a test-writer subscriber once; later calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("farm_market_client=debug")
        .with_test_writer()
        .try_init();
}

pub fn test_product(id: i64, price: f64) -> Product {
    let mut product = Product::new(id, format!("Product {id}"), price);
    product.unit = "kg".to_string();
    product.quantity_available = Some(100);
    product
}

pub fn test_session() -> UserSession {
    UserSession::consumer(7, "Wanjiru")
}

pub fn test_card() -> CardDetails {
    CardDetails {
        card_number: "4111 1111 1111 1111".to_string(),
        card_holder: "Wanjiru Kamau".to_string(),
        expiry: "12/29".to_string(),
        cvv: "123".to_string(),
    }
}

// ----------------------------------------------------------------------------
// Scripted MarketApi
// ----------------------------------------------------------------------------

#[derive(Default)]
struct MockState {
    calls: HashMap<&'static str, usize>,
    orders: VecDeque<Result<CreatedOrder>>,
    payments: VecDeque<Result<PaymentReceipt>>,
    pickups: VecDeque<Result<ScheduledPickup>>,
    status_results: VecDeque<Result<()>>,
    order_requests: Vec<CreateOrderRequest>,
    payment_requests: Vec<PaymentRequest>,
    pickup_requests: Vec<SchedulePickupRequest>,
    status_updates: Vec<(i64, OrderStatus)>,
    feedback_requests: Vec<FeedbackRequest>,
}

/// Replays queued results per operation, then falls back to a success.
///
/// Defaults: order id 1, payment id "1" (pending for cash on pickup, completed
/// otherwise), and an empty scheduled pickup.
#[derive(Default)]
pub struct MockMarketApi {
    state: Mutex<MockState>,
}

impl MockMarketApi {
    pub fn push_order(&self, result: Result<CreatedOrder>) {
        self.state.lock().unwrap().orders.push_back(result);
    }

    pub fn push_payment(&self, result: Result<PaymentReceipt>) {
        self.state.lock().unwrap().payments.push_back(result);
    }

    pub fn push_pickup(&self, result: Result<ScheduledPickup>) {
        self.state.lock().unwrap().pickups.push_back(result);
    }

    pub fn push_status_update(&self, result: Result<()>) {
        self.state.lock().unwrap().status_results.push_back(result);
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    pub fn order_requests(&self) -> Vec<CreateOrderRequest> {
        self.state.lock().unwrap().order_requests.clone()
    }

    pub fn payment_requests(&self) -> Vec<PaymentRequest> {
        self.state.lock().unwrap().payment_requests.clone()
    }

    pub fn pickup_requests(&self) -> Vec<SchedulePickupRequest> {
        self.state.lock().unwrap().pickup_requests.clone()
    }

    pub fn status_updates(&self) -> Vec<(i64, OrderStatus)> {
        self.state.lock().unwrap().status_updates.clone()
    }

    pub fn feedback_requests(&self) -> Vec<FeedbackRequest> {
        self.state.lock().unwrap().feedback_requests.clone()
    }

    fn record(&self, operation: &'static str) -> std::sync::MutexGuard<'_, MockState> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(operation).or_default() += 1;
        state
    }
}

impl MarketApi for MockMarketApi {
    async fn get_products(&self, _query: &ProductQuery) -> Result<Vec<Product>> {
        drop(self.record("get_products"));
        Ok(vec![test_product(1, 50.0), test_product(2, 30.0)])
    }

    async fn get_categories(&self) -> Result<Vec<Category>> {
        drop(self.record("get_categories"));
        Ok(Vec::new())
    }

    async fn create_order(&self, request: &CreateOrderRequest) -> Result<CreatedOrder> {
        let mut state = self.record("create_order");
        state.order_requests.push(request.clone());
        state
            .orders
            .pop_front()
            .unwrap_or(Ok(CreatedOrder { order_id: 1 }))
    }

    async fn process_payment(&self, request: &PaymentRequest) -> Result<PaymentReceipt> {
        let mut state = self.record("process_payment");
        state.payment_requests.push(request.clone());
        let payment_status = if request.payment_method == PaymentMethod::CashOnPickup {
            PaymentStatus::Pending
        } else {
            PaymentStatus::Completed
        };
        state.payments.pop_front().unwrap_or(Ok(PaymentReceipt {
            payment_id: "1".to_string(),
            payment_status,
        }))
    }

    async fn update_order_status(&self, order_id: i64, status: OrderStatus) -> Result<()> {
        let mut state = self.record("update_order_status");
        state.status_updates.push((order_id, status));
        state.status_results.pop_front().unwrap_or(Ok(()))
    }

    async fn schedule_pickup(&self, request: &SchedulePickupRequest) -> Result<ScheduledPickup> {
        let mut state = self.record("schedule_pickup");
        state.pickup_requests.push(request.clone());
        state
            .pickups
            .pop_front()
            .unwrap_or_else(|| Ok(ScheduledPickup::default()))
    }

    async fn get_user_pickups(&self, _user_id: i64) -> Result<Vec<Pickup>> {
        drop(self.record("get_user_pickups"));
        Ok(Vec::new())
    }

    async fn submit_feedback(&self, request: &FeedbackRequest) -> Result<()> {
        let mut state = self.record("submit_feedback");
        state.feedback_requests.push(request.clone());
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Stub HTTP server
// ----------------------------------------------------------------------------

/// A canned reply for one request.
pub enum StubReply {
    Respond {
        status: u16,
        content_type: &'static str,
        body: String,
    },
    /// Accept the request and never answer.
    Hang,
}

impl StubReply {
    pub fn json(status: u16, body: &str) -> Self {
        Self::Respond {
            status,
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self::Respond {
            status,
            content_type: "text/html",
            body: body.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Request target including the query string
    pub path: String,
    /// Header names are lower-cased
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}

pub struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Serves `replies` in order, one per connection. Once exhausted every request gets a 404.
pub async fn spawn_stub_server(replies: Vec<StubReply>) -> StubServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);
    let replies = Arc::new(Mutex::new(VecDeque::from(replies)));

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let recorded = Arc::clone(&recorded);
            let replies = Arc::clone(&replies);
            tokio::spawn(async move {
                handle_connection(stream, recorded, replies).await;
            });
        }
    });

    StubServer {
        base_url: format!("http://{addr}"),
        requests,
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
    replies: Arc<Mutex<VecDeque<StubReply>>>,
) {
    let Some(request) = read_request(&mut stream).await else {
        return;
    };
    recorded.lock().unwrap().push(request);
    let reply = replies.lock().unwrap().pop_front();

    let (status, content_type, body) = match reply {
        Some(StubReply::Respond {
            status,
            content_type,
            body,
        }) => (status, content_type, body),
        Some(StubReply::Hang) => {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            return;
        }
        None => (404, "text/plain", "no stub reply left".to_string()),
    };

    let response = format!(
        "HTTP/1.1 {status} Stub\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

async fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 4096];

    let header_end = loop {
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos;
        }
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();
    let header = |name: &str| {
        headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    };

    let mut body = buf[header_end + 4..].to_vec();
    if let Some(length) = header("content-length").and_then(|v| v.parse::<usize>().ok()) {
        while body.len() < length {
            let n = stream.read(&mut chunk).await.ok()?;
            if n == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..n]);
        }
    } else if header("transfer-encoding").is_some_and(|v| v.eq_ignore_ascii_case("chunked")) {
        while find(&body, b"0\r\n\r\n").is_none() {
            let n = stream.read(&mut chunk).await.ok()?;
            if n == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..n]);
        }
        body = decode_chunked(&body);
    }

    Some(RecordedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).to_string(),
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn decode_chunked(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut rest = raw;
    while let Some(line_end) = find(rest, b"\r\n") {
        let size_line = String::from_utf8_lossy(&rest[..line_end]).to_string();
        let Ok(size) = usize::from_str_radix(size_line.trim(), 16) else {
            break;
        };
        rest = &rest[line_end + 2..];
        if size == 0 || rest.len() < size {
            break;
        }
        out.extend_from_slice(&rest[..size]);
        rest = rest.get(size + 2..).unwrap_or_default();
    }
    out
}

/// Convenience for tests asserting a server-classified failure.
pub fn server_error(message: &str) -> Error {
    Error::Server {
        status: 200,
        message: message.to_string(),
    }
}

// system-tests/tests/helpers/storefront_stub.rs
// ============================================================================
// Module: Storefront Stub
// Description: In-process storefront API served over loopback HTTP.
// Purpose: Give the suite a conforming target plus switchable contract breaks.
// Dependencies: axum, tokio, serde_json
// ============================================================================

//! ## Overview
//! [`StubStorefront`] serves every endpoint of the storefront catalog through
//! an axum router on a background thread with its own tokio runtime. State is
//! in memory and private to one stub, so each test starts from an empty store
//! with fresh rate-limit windows.
//!
//! [`Faults`] switches individual behaviors off so tests can prove the suite
//! notices each kind of contract break.

use std::collections::BTreeMap;
use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::FromRequest;
use axum::extract::Multipart;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::Request;
use axum::extract::State;
use axum::extract::multipart::MultipartError;
use axum::http::HeaderMap;
use axum::http::HeaderName;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::header::CONTENT_TYPE;
use axum::middleware;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::routing::post;
use serde_json::Value;
use serde_json::json;
use tokio::runtime::Builder;
use tokio::sync::oneshot;
use tokio::time::sleep;

// ============================================================================
// SECTION: Accounts
// ============================================================================

/// A storefront account the stub accepts.
#[derive(Debug, Clone, Copy)]
pub struct Account {
    /// User id.
    pub id: u64,
    /// Display name.
    pub name: &'static str,
    /// Login email.
    pub email: &'static str,
    /// Login password.
    pub password: &'static str,
    /// Bearer token issued on login.
    pub token: &'static str,
    /// Role name.
    pub role: &'static str,
}

/// Administrator account.
pub const ADMIN: Account = Account {
    id: 1,
    name: "Store Admin",
    email: "admin@example.com",
    password: "secret",
    token: "admin-token",
    role: "admin",
};

/// Regular customer account.
pub const CUSTOMER: Account = Account {
    id: 2,
    name: "Store Customer",
    email: "user@example.com",
    password: "secret",
    token: "user-token",
    role: "user",
};

const ACCOUNTS: [Account; 2] = [ADMIN, CUSTOMER];

/// Timestamp stamped on every record.
const STAMP: &str = "2026-01-01T00:00:00Z";

/// Store that carries products created without a store list.
const DEFAULT_STORE: &str = "Main Street Store";

/// Fixed rate-limit window.
const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Per-minute limit advertised by the search endpoint.
const SEARCH_ADVERTISED_LIMIT: u32 = 60;

/// Longest accepted search term.
const MAX_SEARCH_TERM: usize = 255;

/// Longest accepted analysis text.
const MAX_ANALYSIS_CHARS: usize = 10_000;

// ============================================================================
// SECTION: Faults
// ============================================================================

/// Contract breaks the stub can be told to exhibit.
#[derive(Debug, Clone, Copy, Default)]
pub struct Faults {
    /// Never answer `429`.
    pub ignore_rate_limits: bool,
    /// Serve the user and admin endpoints to anyone.
    pub bypass_auth: bool,
    /// Accept deletes without flagging or hiding the product.
    pub forget_soft_delete: bool,
    /// Return the most expensive offer as the best one.
    pub wrong_best_offer: bool,
    /// Accept any analysis payload.
    pub accept_invalid_analysis: bool,
    /// Sleep this long before every reply.
    pub response_delay: Duration,
}

// ============================================================================
// SECTION: Server Handle
// ============================================================================

/// Running stub; shuts the server down and joins its thread on drop.
pub struct StubStorefront {
    base_url: String,
    shared: Arc<Shared>,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<thread::JoinHandle<()>>,
}

impl StubStorefront {
    /// Binds a loopback port and starts serving.
    pub fn start(faults: Faults) -> Result<Self, String> {
        let listener = StdTcpListener::bind("127.0.0.1:0")
            .map_err(|err| format!("stub storefront bind failed: {err}"))?;
        listener
            .set_nonblocking(true)
            .map_err(|err| format!("stub storefront listener nonblocking failed: {err}"))?;
        let addr = listener.local_addr().map_err(|err| format!("stub storefront local addr failed: {err}"))?;

        let shared = Arc::new(Shared {
            store: Mutex::new(Storefront::new(faults)),
            served: AtomicUsize::new(0),
            response_delay: faults.response_delay,
        });
        let app = router(Arc::clone(&shared));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let join = thread::spawn(move || {
            let Ok(runtime) = Builder::new_current_thread().enable_all().build() else {
                return;
            };
            runtime.block_on(async move {
                let Ok(listener) = tokio::net::TcpListener::from_std(listener) else {
                    return;
                };
                let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                });
                let _ = server.await;
            });
        });
        Ok(Self {
            base_url: format!("http://{addr}"),
            shared,
            shutdown: Some(shutdown_tx),
            join: Some(join),
        })
    }

    /// Base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Requests served so far.
    pub fn request_count(&self) -> usize {
        self.shared.served.load(Ordering::Relaxed)
    }
}

impl Drop for StubStorefront {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// State shared by every handler.
struct Shared {
    store: Mutex<Storefront>,
    served: AtomicUsize,
    response_delay: Duration,
}

impl Shared {
    fn store(&self) -> MutexGuard<'_, Storefront> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

type AppState = State<Arc<Shared>>;

fn router(shared: Arc<Shared>) -> Router {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/user", get(user))
        .route("/api/admin/stats", get(admin_stats))
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/products/{id}", get(show_product).put(update_product).delete(delete_product))
        .route("/api/price-search", get(search))
        .route("/api/price-search/best-offer", get(best_offer))
        .route("/api/ai/analyze", post(analyze))
        .route("/api/ai/classify-product", post(classify))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(Arc::clone(&shared), track))
        .with_state(shared)
}

/// Counts every request and applies the configured reply delay.
async fn track(State(shared): AppState, request: Request, next: Next) -> axum::response::Response {
    shared.served.fetch_add(1, Ordering::Relaxed);
    let response = next.run(request).await;
    if !shared.response_delay.is_zero() {
        sleep(shared.response_delay).await;
    }
    response
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

type Params = Query<BTreeMap<String, String>>;

async fn login(body: Bytes) -> Reply {
    let Some(body) = parse_json(&body) else {
        return Reply::message(400, "Malformed JSON body.");
    };
    let field = |key: &str| body.get(key).and_then(Value::as_str).unwrap_or_default();
    ACCOUNTS
        .iter()
        .find(|account| account.email == field("email") && account.password == field("password"))
        .map_or_else(
            || Reply::message(401, "Invalid credentials."),
            |account| {
                Reply::json(200, json!({
                    "access_token": account.token,
                    "token_type": "Bearer",
                    "user": account_json(account),
                }))
            },
        )
}

async fn user(State(shared): AppState, headers: HeaderMap) -> Reply {
    shared.store().user(caller(&headers))
}

async fn admin_stats(State(shared): AppState, headers: HeaderMap) -> Reply {
    let caller = caller(&headers);
    shared.store().rate_limited("admin.stats", 200, |store| store.admin_stats(caller))
}

async fn list_products(State(shared): AppState) -> Reply {
    shared.store().rate_limited("products.list", 30, Storefront::list_products)
}

/// Accepts a JSON body or a `multipart/form-data` upload.
async fn create_product(State(shared): AppState, request: Request) -> Reply {
    let multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));
    let input = if multipart {
        match Multipart::from_request(request, &shared).await {
            Ok(form) => read_form(form).await.ok(),
            Err(_) => None,
        }
    } else {
        Bytes::from_request(request, &shared)
            .await
            .ok()
            .and_then(|body| parse_json(&body))
            .map(|body| ProductInput::from_json(&body))
    };
    match input {
        Some(input) => shared.store().create_product(input),
        None => Reply::message(400, "Malformed product body."),
    }
}

async fn show_product(State(shared): AppState, Path(id): Path<String>) -> Reply {
    shared.store().show_product(&id)
}

async fn update_product(State(shared): AppState, Path(id): Path<String>, headers: HeaderMap, body: Bytes) -> Reply {
    if !matches!(caller(&headers), Caller::Known(_)) {
        return Reply::message(401, "Unauthenticated.");
    }
    let Some(body) = parse_json(&body) else {
        return Reply::message(400, "Malformed JSON body.");
    };
    shared.store().update_product(&id, ProductInput::from_json(&body))
}

async fn delete_product(State(shared): AppState, Path(id): Path<String>, headers: HeaderMap) -> Reply {
    if !matches!(caller(&headers), Caller::Known(_)) {
        return Reply::message(401, "Unauthenticated.");
    }
    shared.store().delete_product(&id)
}

async fn search(State(shared): AppState, Query(query): Params) -> Reply {
    shared.store().search(&query)
}

async fn best_offer(State(shared): AppState, Query(query): Params) -> Reply {
    shared.store().best_offer(&query)
}

async fn analyze(State(shared): AppState, body: Bytes) -> Reply {
    let body = parse_json(&body);
    shared.store().rate_limited("ai.analyze", 100, |store| store.analyze(body.as_ref()))
}

async fn classify(State(shared): AppState, body: Bytes) -> Reply {
    let body = parse_json(&body);
    shared.store().rate_limited("ai.classify", 100, |_| classify_product(body.as_ref()))
}

async fn not_found() -> Reply {
    Reply::message(404, "Not Found")
}

fn parse_json(body: &[u8]) -> Option<Value> {
    serde_json::from_slice(body).ok()
}

/// Collects product fields and the uploaded image name from a multipart form.
async fn read_form(mut form: Multipart) -> Result<ProductInput, MultipartError> {
    let mut input = ProductInput::default();
    while let Some(field) = form.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let data = field.bytes().await?;
                if name == "image" && !data.is_empty() {
                    input.image = Some(file_name);
                }
            }
            None => {
                let text = field.text().await?;
                input.set_text(&name, text);
            }
        }
    }
    Ok(input)
}

// ============================================================================
// SECTION: Reply
// ============================================================================

struct Reply {
    status: u16,
    body: Option<Value>,
    headers: Vec<(&'static str, String)>,
}

impl Reply {
    fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
            headers: Vec::new(),
        }
    }

    fn empty(status: u16) -> Self {
        Self {
            status,
            body: None,
            headers: Vec::new(),
        }
    }

    fn message(status: u16, message: &str) -> Self {
        Self::json(status, json!({"message": message}))
    }

    fn with_header(mut self, name: &'static str, value: impl ToString) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = match self.body {
            Some(body) => (status, Json(body)).into_response(),
            None => status.into_response(),
        };
        for (name, value) in self.headers {
            if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(&value)) {
                response.headers_mut().insert(name, value);
            }
        }
        response
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

#[derive(Clone, Copy)]
enum Caller {
    Anonymous,
    Unknown,
    Known(Account),
}

fn caller(headers: &HeaderMap) -> Caller {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    match token {
        None => Caller::Anonymous,
        Some(token) => ACCOUNTS
            .iter()
            .find(|account| account.token == token)
            .map_or(Caller::Unknown, |account| Caller::Known(*account)),
    }
}

#[derive(Default)]
struct Registry {
    ids: BTreeMap<String, u64>,
    names: Vec<String>,
}

impl Registry {
    fn intern(&mut self, name: &str) -> u64 {
        if let Some(id) = self.ids.get(name) {
            return *id;
        }
        self.names.push(name.to_string());
        let id = u64::try_from(self.names.len()).unwrap_or(u64::MAX);
        self.ids.insert(name.to_string(), id);
        id
    }

    fn reference(&self, id: u64) -> Value {
        let name = usize::try_from(id)
            .ok()
            .and_then(|id| id.checked_sub(1))
            .and_then(|index| self.names.get(index))
            .cloned()
            .unwrap_or_default();
        json!({"id": id, "name": name})
    }
}

struct Product {
    id: u64,
    name: String,
    description: Option<String>,
    price: Option<f64>,
    category: Option<String>,
    brand: Option<u64>,
    stores: Vec<u64>,
    image_url: Option<String>,
    views: u64,
    deleted_at: Option<String>,
}

#[derive(Default)]
struct ProductInput {
    name: Option<String>,
    description: Option<String>,
    price: Option<f64>,
    category: Option<String>,
    brand: Option<String>,
    stores: Vec<String>,
    image: Option<String>,
}

impl ProductInput {
    fn from_json(body: &Value) -> Self {
        let text = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            name: text("name"),
            description: text("description"),
            price: body.get("price").and_then(parse_price),
            category: text("category"),
            brand: text("brand"),
            stores: body
                .get("stores")
                .and_then(Value::as_array)
                .map(|stores| stores.iter().filter_map(Value::as_str).map(str::to_string).collect())
                .unwrap_or_default(),
            image: None,
        }
    }

    fn set_text(&mut self, field: &str, text: String) {
        match field {
            "name" => self.name = Some(text),
            "description" => self.description = Some(text),
            "price" => self.price = text.trim().parse().ok(),
            "category" => self.category = Some(text),
            "brand" => self.brand = Some(text),
            _ => {}
        }
    }
}

fn parse_price(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

struct Window {
    started: Instant,
    count: u32,
}

struct Storefront {
    faults: Faults,
    products: BTreeMap<u64, Product>,
    next_id: u64,
    brands: Registry,
    stores: Registry,
    windows: BTreeMap<&'static str, Window>,
}

impl Storefront {
    fn new(faults: Faults) -> Self {
        Self {
            faults,
            products: BTreeMap::new(),
            next_id: 1,
            brands: Registry::default(),
            stores: Registry::default(),
            windows: BTreeMap::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Rate limiting
    // ------------------------------------------------------------------------

    fn rate_limited(&mut self, key: &'static str, limit: u32, handler: impl FnOnce(&Self) -> Reply) -> Reply {
        if self.faults.ignore_rate_limits {
            return handler(self);
        }
        let now = Instant::now();
        let window = self.windows.entry(key).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(window.started) >= RATE_WINDOW {
            window.started = now;
            window.count = 0;
        }
        if window.count >= limit {
            return Reply::message(429, "Too Many Attempts.")
                .with_header("X-RateLimit-Limit", limit)
                .with_header("X-RateLimit-Remaining", 0)
                .with_header("Retry-After", RATE_WINDOW.as_secs());
        }
        window.count += 1;
        let remaining = limit - window.count;
        handler(self).with_header("X-RateLimit-Limit", limit).with_header("X-RateLimit-Remaining", remaining)
    }

    // ------------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------------

    fn user(&self, caller: Caller) -> Reply {
        if self.faults.bypass_auth {
            return Reply::json(200, account_json(&ADMIN));
        }
        match caller {
            Caller::Known(account) => Reply::json(200, account_json(&account)),
            Caller::Anonymous | Caller::Unknown => Reply::message(401, "Unauthenticated."),
        }
    }

    fn admin_stats(&self, caller: Caller) -> Reply {
        let stats = || {
            Reply::json(200, json!({
                "status": "ok",
                "total_users": ACCOUNTS.len(),
                "total_products": self.products.values().filter(|product| product.deleted_at.is_none()).count(),
                "server_time": STAMP,
            }))
        };
        if self.faults.bypass_auth {
            return stats();
        }
        match caller {
            Caller::Known(account) if account.role == "admin" => stats(),
            Caller::Known(_) => Reply::message(403, "This action is unauthorized."),
            Caller::Anonymous | Caller::Unknown => Reply::message(401, "Unauthenticated."),
        }
    }

    // ------------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------------

    fn product_json(&self, product: &Product) -> Value {
        json!({
            "id": product.id,
            "name": product.name,
            "description": product.description,
            "price": product.price,
            "category": product.category,
            "brand": product.brand.map(|id| self.brands.reference(id)),
            "stores": product.stores.iter().map(|id| self.stores.reference(*id)).collect::<Vec<_>>(),
            "image_url": product.image_url,
            "views": product.views,
            "deleted_at": product.deleted_at,
            "created_at": STAMP,
            "updated_at": STAMP,
        })
    }

    /// Paginated listing; brands are nested as a list of one here.
    fn list_products(&self) -> Reply {
        let listed: Vec<Value> = self
            .products
            .values()
            .filter(|product| product.deleted_at.is_none())
            .map(|product| {
                let mut row = self.product_json(product);
                if let Some(brand) = product.brand {
                    row["brand"] = json!([self.brands.reference(brand)]);
                }
                row
            })
            .collect();
        let total = listed.len();
        Reply::json(200, json!({
            "data": listed,
            "current_page": 1,
            "last_page": 1,
            "per_page": total.max(1),
            "total": total,
        }))
    }

    fn create_product(&mut self, input: ProductInput) -> Reply {
        let Some(name) = input.name.filter(|name| !name.trim().is_empty()) else {
            return Reply::json(422, json!({
                "message": "The name field is required.",
                "errors": {"name": ["The name field is required."]},
            }));
        };
        let id = self.next_id;
        self.next_id += 1;
        let product = Product {
            id,
            name,
            description: input.description,
            price: input.price,
            category: input.category,
            brand: input.brand.map(|brand| self.brands.intern(&brand)),
            stores: if input.stores.is_empty() {
                vec![self.stores.intern(DEFAULT_STORE)]
            } else {
                input.stores.iter().map(|store| self.stores.intern(store)).collect()
            },
            image_url: input.image.map(|file| format!("/storage/products/{id}/{file}")),
            views: 0,
            deleted_at: None,
        };
        let body = self.product_json(&product);
        self.products.insert(id, product);
        Reply::json(201, body)
    }

    fn show_product(&mut self, id: &str) -> Reply {
        let Some(product) = id.parse().ok().and_then(|id: u64| self.products.get_mut(&id)) else {
            return Reply::message(404, "Product not found.");
        };
        product.views += 1;
        let id = product.id;
        self.reply_with(id, 200)
    }

    fn reply_with(&self, id: u64, status: u16) -> Reply {
        self.products
            .get(&id)
            .map_or_else(|| Reply::message(404, "Product not found."), |product| Reply::json(status, self.product_json(product)))
    }

    fn update_product(&mut self, id: &str, input: ProductInput) -> Reply {
        let Some(product) = self.live_product(id) else {
            return Reply::message(404, "Product not found.");
        };
        if let Some(name) = input.name.filter(|name| !name.trim().is_empty()) {
            product.name = name;
        }
        if input.description.is_some() {
            product.description = input.description;
        }
        if input.price.is_some() {
            product.price = input.price;
        }
        if input.category.is_some() {
            product.category = input.category;
        }
        let id = product.id;
        self.reply_with(id, 200)
    }

    fn delete_product(&mut self, id: &str) -> Reply {
        let forget = self.faults.forget_soft_delete;
        let Some(product) = self.live_product(id) else {
            return Reply::message(404, "Product not found.");
        };
        if !forget {
            product.deleted_at = Some(STAMP.to_string());
        }
        Reply::empty(204)
    }

    fn live_product(&mut self, id: &str) -> Option<&mut Product> {
        let id: u64 = id.parse().ok()?;
        self.products.get_mut(&id).filter(|product| product.deleted_at.is_none())
    }

    // ------------------------------------------------------------------------
    // Price search
    // ------------------------------------------------------------------------

    fn search(&self, query: &BTreeMap<String, String>) -> Reply {
        let terms: Vec<(&str, String)> = ["name", "description", "category"]
            .into_iter()
            .filter_map(|field| {
                query.get(field).map(|value| value.trim()).filter(|value| !value.is_empty()).map(|value| (field, value.to_lowercase()))
            })
            .collect();
        if terms.is_empty() {
            return Reply::message(400, "At least one search parameter is required.");
        }
        if terms.iter().any(|(_, term)| term.len() > MAX_SEARCH_TERM || term.contains(['<', '>'])) {
            return Reply::message(400, "Invalid search parameter.");
        }
        let results: Vec<Value> = self
            .products
            .values()
            .filter(|product| product.deleted_at.is_none())
            .filter(|product| {
                terms.iter().all(|(field, term)| {
                    let haystack = match *field {
                        "name" => Some(product.name.as_str()),
                        "description" => product.description.as_deref(),
                        _ => product.category.as_deref(),
                    };
                    haystack.is_some_and(|text| text.to_lowercase().contains(term.as_str()))
                })
            })
            .map(|product| {
                let offers: Vec<Value> = product
                    .price
                    .map(|price| product.stores.iter().map(|store| json!({"store_id": store, "price": price})).collect())
                    .unwrap_or_default();
                json!({
                    "product_id": product.id,
                    "name": product.name,
                    "description": product.description,
                    "category": product.category,
                    "offers": offers,
                })
            })
            .collect();
        Reply::json(200, json!({"results": results})).with_header("X-RateLimit-Limit", SEARCH_ADVERTISED_LIMIT)
    }

    fn best_offer(&self, query: &BTreeMap<String, String>) -> Reply {
        let Some(name) = query.get("name").filter(|name| !name.trim().is_empty()) else {
            return Reply::message(400, "The name parameter is required.");
        };
        let offers = self
            .products
            .values()
            .filter(|product| product.deleted_at.is_none() && &product.name == name)
            .filter_map(|product| {
                let price = product.price?;
                let store = *product.stores.first()?;
                Some((price, store, product.id))
            });
        let chosen = if self.faults.wrong_best_offer {
            offers.max_by(|a, b| a.0.total_cmp(&b.0))
        } else {
            offers.min_by(|a, b| a.0.total_cmp(&b.0))
        };
        match chosen {
            Some((price, store, product_id)) => Reply::json(200, json!({
                "price": price,
                "store": self.stores.reference(store),
                "product_id": product_id,
            })),
            None => Reply::message(404, "No offers found."),
        }
    }

    // ------------------------------------------------------------------------
    // AI
    // ------------------------------------------------------------------------

    fn analyze(&self, body: Option<&Value>) -> Reply {
        let Some(body) = body else {
            return Reply::message(400, "Malformed JSON body.");
        };
        let text = body.get("text").and_then(Value::as_str).unwrap_or_default();
        let valid = !text.trim().is_empty() && text.chars().count() <= MAX_ANALYSIS_CHARS;
        if !valid && !self.faults.accept_invalid_analysis {
            return Reply::json(422, json!({
                "message": "The text field is invalid.",
                "errors": {"text": ["The text must be a string of 1 to 10000 characters."]},
            }));
        }
        Reply::json(200, json!({
            "success": true,
            "data": {"sentiment": "neutral", "topics": topics(text)},
        }))
    }
}

fn classify_product(body: Option<&Value>) -> Reply {
    let Some(body) = body else {
        return Reply::message(400, "Malformed JSON body.");
    };
    let name = body.get("product_name").and_then(Value::as_str).unwrap_or_default();
    if name.trim().is_empty() {
        return Reply::message(422, "The product name field is required.");
    }
    let category = body
        .pointer("/attributes/category")
        .and_then(Value::as_str)
        .unwrap_or("General");
    Reply::json(200, json!({
        "classification": {"category": category, "confidence": 0.87, "tags": topics(name)},
    }))
}

fn account_json(account: &Account) -> Value {
    json!({
        "id": account.id,
        "name": account.name,
        "email": account.email,
        "roles": [account.role],
        "created_at": STAMP,
    })
}

/// Up to three distinct long words, lowercased.
fn topics(text: &str) -> Vec<String> {
    let mut topics: Vec<String> = Vec::new();
    for word in text.split(|c: char| !c.is_alphanumeric()).filter(|word| word.len() >= 6) {
        let word = word.to_lowercase();
        if !topics.contains(&word) {
            topics.push(word);
        }
        if topics.len() == 3 {
            break;
        }
    }
    topics
}

//! Step library: one function per API capability
//!
//! Every step makes at most one request and never returns an error. Any
//! mismatch, including a transport failure, comes back as a failed
//! [`StepResult`] carrying a diagnostic message.

use std::fmt;

use reqwest::Method;
use serde_json::{json, Value};

use crate::common::config::{Config, Credentials, ProductFixture};
use crate::common::Error;
use crate::http::{ApiRequest, ApiResponse, Transport};

use super::session::Session;

/// Message the server returns for a newly registered user
pub const USER_CREATED: &str = "User created successfully";

/// Message the server returns for a newly created product
pub const PRODUCT_ADDED: &str = "Product added successfully";

/// The API capabilities exercised by a run, in sequence order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Register,
    Login,
    CreateProduct,
    ListProducts,
    UpdateQuantity,
    Analytics,
}

impl StepKind {
    /// Line printed before the step runs
    pub fn progress(&self) -> &'static str {
        match self {
            StepKind::Register => "Testing user registration...",
            StepKind::Login => "Testing user login...",
            StepKind::CreateProduct => "Testing add product...",
            StepKind::ListProducts => "Testing get products...",
            StepKind::UpdateQuantity => "Testing update product quantity...",
            StepKind::Analytics => "Testing analytics endpoint...",
        }
    }

    fn failure_label(&self) -> &'static str {
        match self {
            StepKind::Register => "User registration",
            StepKind::Login => "User login",
            StepKind::CreateProduct => "Add product",
            StepKind::ListProducts => "Get products",
            StepKind::UpdateQuantity => "Update quantity",
            StepKind::Analytics => "Analytics",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepKind::Register => "register",
            StepKind::Login => "login",
            StepKind::CreateProduct => "create-product",
            StepKind::ListProducts => "list-products",
            StepKind::UpdateQuantity => "update-quantity",
            StepKind::Analytics => "analytics",
        };
        f.write_str(name)
    }
}

/// Payloads the steps send
#[derive(Debug, Clone)]
pub struct Fixtures {
    pub credentials: Credentials,
    pub product: ProductFixture,
    /// Quantity written by update-quantity and expected back
    pub target_quantity: u32,
}

impl Default for Fixtures {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Fixtures {
    pub fn from_config(config: &Config) -> Self {
        Self {
            credentials: config.credentials.clone(),
            product: config.product.clone(),
            target_quantity: config.update.quantity,
        }
    }
}

/// Outcome of a single step
#[derive(Debug, Clone)]
pub struct StepResult {
    pub step: StepKind,
    pub passed: bool,
    /// `None` when no HTTP response was received
    pub status: Option<u16>,
    /// Parsed JSON body, the raw text as a string if it was not JSON, or
    /// null when there was no response
    pub body: Value,
    /// Human readable outcome; on failure holds the status and raw body
    pub message: String,
}

impl StepResult {
    fn pass(
        step: StepKind,
        response: &ApiResponse,
        body: Value,
        message: impl Into<String>,
    ) -> Self {
        Self {
            step,
            passed: true,
            status: Some(response.status),
            body,
            message: message.into(),
        }
    }

    fn fail(step: StepKind, response: &ApiResponse, body: Value) -> Self {
        Self {
            step,
            passed: false,
            status: Some(response.status),
            body,
            message: format!(
                "{} failed: {} - {}",
                step.failure_label(),
                response.status,
                response.text
            ),
        }
    }

    fn no_response(step: StepKind, error: &Error) -> Self {
        Self {
            step,
            passed: false,
            status: None,
            body: Value::Null,
            message: format!("{} failed: {}", step.failure_label(), error),
        }
    }
}

/// Send one request, turning transport errors into a failed result
async fn call<T: Transport + ?Sized>(
    transport: &T,
    step: StepKind,
    request: ApiRequest,
) -> Result<(ApiResponse, Value), StepResult> {
    match transport.send(request).await {
        Ok(response) => {
            let body = response
                .json()
                .unwrap_or_else(|| Value::String(response.text.clone()));
            Ok((response, body))
        }
        Err(e) => {
            if e.is_transport() {
                tracing::warn!(%step, error = %e, "no response");
            } else {
                tracing::error!(%step, error = %e, "request not sent");
            }
            Err(StepResult::no_response(step, &e))
        }
    }
}

fn message_is(body: &Value, expected: &str) -> bool {
    body.get("message").and_then(Value::as_str) == Some(expected)
}

/// Register the test user. A 409 means it already exists and still passes.
pub async fn register<T: Transport + ?Sized>(
    transport: &T,
    session: &Session,
    credentials: &Credentials,
) -> StepResult {
    let step = StepKind::Register;
    let request = ApiRequest::new(Method::POST, session.url("/api/register"))
        .headers(session.current_headers())
        .json(json!({
            "username": credentials.username,
            "password": credentials.password,
        }));

    let (response, body) = match call(transport, step, request).await {
        Ok(r) => r,
        Err(failed) => return failed,
    };

    match response.status {
        201 if message_is(&body, USER_CREATED) => {
            StepResult::pass(step, &response, body, "User registration successful")
        }
        409 => StepResult::pass(
            step,
            &response,
            body,
            "User already exists (expected for repeated tests)",
        ),
        _ => StepResult::fail(step, &response, body),
    }
}

/// Log in and store the returned access token in the session
pub async fn login<T: Transport + ?Sized>(
    transport: &T,
    session: &mut Session,
    credentials: &Credentials,
) -> StepResult {
    let step = StepKind::Login;
    let request = ApiRequest::new(Method::POST, session.url("/api/login"))
        .headers(session.current_headers())
        .json(json!({
            "username": credentials.username,
            "password": credentials.password,
        }));

    let (response, body) = match call(transport, step, request).await {
        Ok(r) => r,
        Err(failed) => return failed,
    };

    let token = body
        .get("access_token")
        .and_then(Value::as_str)
        .map(str::to_owned);

    match (response.status, token) {
        (200, Some(token)) => {
            session.set_credential(token);
            StepResult::pass(step, &response, body, "User login successful")
        }
        _ => StepResult::fail(step, &response, body),
    }
}

/// Create the fixture product; returns its id on success
///
/// The id is handed back rather than written to the session so the caller
/// decides what to keep.
pub async fn create_product<T: Transport + ?Sized>(
    transport: &T,
    session: &Session,
    product: &ProductFixture,
) -> (StepResult, Option<String>) {
    let step = StepKind::CreateProduct;
    let payload = match serde_json::to_value(product) {
        Ok(v) => v,
        Err(e) => return (StepResult::no_response(step, &Error::Json(e)), None),
    };
    let request = ApiRequest::new(Method::POST, session.url("/api/products"))
        .headers(session.current_headers())
        .json(payload);

    let (response, body) = match call(transport, step, request).await {
        Ok(r) => r,
        Err(failed) => return (failed, None),
    };

    let id = body.get("product_id").and_then(product_id);

    match (response.status, id) {
        (201, Some(id)) if message_is(&body, PRODUCT_ADDED) => (
            StepResult::pass(step, &response, body, "Product added successfully"),
            Some(id),
        ),
        _ => (StepResult::fail(step, &response, body), None),
    }
}

/// Accept string or numeric ids; an empty string is no id
fn product_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// List products; the body must carry products and pagination
pub async fn list_products<T: Transport + ?Sized>(
    transport: &T,
    session: &Session,
) -> StepResult {
    let step = StepKind::ListProducts;
    let request = ApiRequest::new(Method::GET, session.url("/api/products"))
        .headers(session.current_headers());

    let (response, body) = match call(transport, step, request).await {
        Ok(r) => r,
        Err(failed) => return failed,
    };

    let has_shape = body.get("products").is_some() && body.get("pagination").is_some();
    if response.status == 200 && has_shape {
        let count = body["products"].as_array().map_or(0, Vec::len);
        StepResult::pass(step, &response, body, format!("Retrieved {count} products"))
    } else {
        StepResult::fail(step, &response, body)
    }
}

/// Set the quantity of `product_id` and check the server echoes it back
pub async fn update_quantity<T: Transport + ?Sized>(
    transport: &T,
    session: &Session,
    product_id: &str,
    quantity: u32,
) -> StepResult {
    let step = StepKind::UpdateQuantity;
    let url = match session.segment_url(&["api", "products", product_id, "quantity"]) {
        Ok(url) => url,
        Err(e) => return StepResult::no_response(step, &e),
    };
    let request = ApiRequest::new(Method::PUT, url)
        .headers(session.current_headers())
        .json(json!({ "quantity": quantity }));

    let (response, body) = match call(transport, step, request).await {
        Ok(r) => r,
        Err(failed) => return failed,
    };

    // 150 and 150.0 both count as a match
    let echoed = body.get("quantity").and_then(Value::as_f64);
    if response.status == 200 && echoed == Some(f64::from(quantity)) {
        StepResult::pass(step, &response, body, "Product quantity updated successfully")
    } else {
        StepResult::fail(step, &response, body)
    }
}

/// Fetch top products; any JSON array passes, empty included
pub async fn analytics<T: Transport + ?Sized>(
    transport: &T,
    session: &Session,
) -> StepResult {
    let step = StepKind::Analytics;
    let request = ApiRequest::new(Method::GET, session.url("/api/analytics/top-products"))
        .headers(session.current_headers());

    let (response, body) = match call(transport, step, request).await {
        Ok(r) => r,
        Err(failed) => return failed,
    };

    match (response.status, body.as_array().map(Vec::len)) {
        (200, Some(count)) => StepResult::pass(
            step,
            &response,
            body,
            format!("Analytics retrieved {count} top products"),
        ),
        _ => StepResult::fail(step, &response, body),
    }
}

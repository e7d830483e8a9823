//! Throwaway HTTP server for end-to-end runs
//!
//! Speaks just enough HTTP/1.1 for reqwest: one request per connection,
//! `Content-Length` bodies, `Connection: close` replies.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A request as seen by the server
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

pub type Handler = Arc<dyn Fn(&Recorded) -> (u16, Value) + Send + Sync>;

pub struct MockServer {
    pub addr: SocketAddr,
    recorded: Arc<Mutex<Vec<Recorded>>>,
}

impl MockServer {
    pub async fn start(handler: Handler) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let recorded = Arc::new(Mutex::new(Vec::new()));

        let log = recorded.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let handler = handler.clone();
                let log = log.clone();
                tokio::spawn(async move {
                    handle(stream, handler, log).await;
                });
            }
        });

        Self { addr, recorded }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.recorded.lock().unwrap().len()
    }
}

async fn handle(mut stream: TcpStream, handler: Handler, log: Arc<Mutex<Vec<Recorded>>>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();

    let mut headers = HashMap::new();
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = serde_json::from_slice(&buf[header_end..header_end + content_length]).ok();

    let request = Recorded {
        method,
        path,
        authorization: headers.get("authorization").cloned(),
        body,
    };
    log.lock().unwrap().push(request.clone());

    let (status, payload) = handler(&request);
    let text = payload.to_string();
    let response = format!(
        "HTTP/1.1 {status} {}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n{text}",
        reason(status),
        text.len()
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        409 => "Conflict",
        _ => "Internal Server Error",
    }
}

#[derive(Default)]
struct InventoryState {
    users: HashMap<String, String>,
    products: HashMap<String, Value>,
    skus: HashSet<String>,
    next_id: u64,
}

/// In-memory imitation of the inventory API routes
///
/// State persists across runs against the same server. A second run hits
/// the duplicate-user branch of registration and, with the same fixture SKU,
/// the duplicate-SKU rejection of product creation.
pub fn inventory_api() -> Handler {
    let state = Arc::new(Mutex::new(InventoryState::default()));
    Arc::new(move |req: &Recorded| {
        let mut state = state.lock().unwrap();
        let body = req.body.clone().unwrap_or(Value::Null);
        let authed = req
            .authorization
            .as_deref()
            .is_some_and(|h| h == "Bearer token-testuser");

        match (req.method.as_str(), req.path.as_str()) {
            ("POST", "/api/register") => {
                let username = body["username"].as_str().unwrap_or_default().to_string();
                let password = body["password"].as_str().unwrap_or_default().to_string();
                if state.users.contains_key(&username) {
                    return (409, json!({"message": "Username already exists"}));
                }
                state.users.insert(username, password);
                (201, json!({"message": "User created successfully"}))
            }
            ("POST", "/api/login") => {
                let username = body["username"].as_str().unwrap_or_default();
                let password = body["password"].as_str().unwrap_or_default();
                match state.users.get(username) {
                    Some(stored) if stored == password => {
                        (200, json!({"access_token": format!("token-{username}")}))
                    }
                    _ => (401, json!({"message": "Invalid credentials"})),
                }
            }
            _ if !authed => (401, json!({"message": "Access denied. No token provided."})),
            ("POST", "/api/products") => {
                let sku = body["sku"].as_str().unwrap_or_default().to_uppercase();
                if !state.skus.insert(sku) {
                    return (409, json!({"message": "SKU already exists"}));
                }
                state.next_id += 1;
                let id = format!("p{}", state.next_id);
                let mut product = body.clone();
                product["_id"] = json!(id);
                state.products.insert(id.clone(), product);
                (
                    201,
                    json!({"message": "Product added successfully", "product_id": id}),
                )
            }
            ("GET", "/api/products") => {
                let products: Vec<Value> = state.products.values().cloned().collect();
                let total = products.len();
                (
                    200,
                    json!({
                        "products": products,
                        "pagination": {
                            "currentPage": 1,
                            "totalPages": 1,
                            "totalProducts": total,
                            "hasNextPage": false,
                            "hasPrevPage": false
                        }
                    }),
                )
            }
            ("GET", "/api/analytics/top-products") => (200, json!([])),
            ("PUT", path) if path.starts_with("/api/products/") && path.ends_with("/quantity") => {
                let id = path
                    .trim_start_matches("/api/products/")
                    .trim_end_matches("/quantity")
                    .to_string();
                match state.products.get_mut(&id) {
                    Some(product) => {
                        product["quantity"] = body["quantity"].clone();
                        (200, product.clone())
                    }
                    None => (404, json!({"message": "Product not found"})),
                }
            }
            _ => (404, json!({"message": "Route not found"})),
        }
    })
}

/// Server that answers every request with the same reply
pub fn always(status: u16, payload: Value) -> Handler {
    Arc::new(move |_: &Recorded| (status, payload.clone()))
}

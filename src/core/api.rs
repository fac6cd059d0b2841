//! REST client for the MAO backend
//!
//! Requests go to `{base}/api/{resource}[/{id}][/{action}]` with a bearer
//! token and JSON bodies. The wire layer sits behind the [`Transport`] trait
//! so screens can be driven against an in-memory backend in tests.

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Message shown when the backend gives no usable error text
pub const GENERIC_FAILURE: &str = "Request failed. Please try again.";

/// Errors from talking to the backend
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Server returned {status} with no readable body")]
    StatusNoBody { status: u16 },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("{0}")]
    Validation(String),

    #[error("Not logged in. Run `mao login` first")]
    NotAuthenticated,

    #[error("Request superseded by a newer one")]
    Superseded,

    #[error("Cancelled")]
    Cancelled,
}

impl ApiError {
    /// Text suitable for an alert: the backend's own message when present
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Validation(message) => message.clone(),
            ApiError::NotAuthenticated => self.to_string(),
            ApiError::Cancelled => self.to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}

/// HTTP method of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// A request relative to `{base}/api`
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below `/api`, always starting with `/`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub token: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            token: None,
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Raw status and body as received
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can carry a request to the backend
///
/// Implementations only report transport failures; status handling is done
/// by [`ApiClient`].
pub trait Transport: Send + Sync {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// Blocking HTTP transport
pub struct HttpTransport {
    base_url: String,
    client: Client,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.url_for(&request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref token) = request.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(ApiResponse { status, body })
    }
}

/// Pagination metadata returned by paginated endpoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub total_pages: u64,
    #[serde(default)]
    pub total: u64,
}

/// A decoded collection plus whatever pagination came with it
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub pagination: Option<Pagination>,
}

/// Decode a collection that is either a bare array or a named field
pub fn decode_listing<T: DeserializeOwned>(value: Value, field: &str) -> Result<Listing<T>, ApiError> {
    let (items, pagination) = match value {
        Value::Array(_) => (value, None),
        Value::Object(mut map) => {
            let pagination = map
                .remove("pagination")
                .map(serde_json::from_value::<Pagination>)
                .transpose()
                .map_err(|e| ApiError::Decode(format!("pagination: {}", e)))?;
            let items = map
                .remove(field)
                .or_else(|| map.remove("data"))
                .ok_or_else(|| ApiError::Decode(format!("missing field '{}'", field)))?;
            (items, pagination)
        }
        Value::Null => (Value::Array(Vec::new()), None),
        other => {
            return Err(ApiError::Decode(format!(
                "expected array or object, got {}",
                other
            )))
        }
    };

    let items = serde_json::from_value(items).map_err(|e| ApiError::Decode(e.to_string()))?;
    Ok(Listing { items, pagination })
}

/// Build `/{resource}[/{id}][/{action}]`
pub fn resource_path(resource: &str, id: Option<&str>, action: Option<&str>) -> String {
    let mut path = format!("/{}", resource.trim_matches('/'));
    if let Some(id) = id {
        path.push('/');
        path.push_str(id);
    }
    if let Some(action) = action {
        path.push('/');
        path.push_str(action.trim_matches('/'));
    }
    path
}

/// Typed access to the backend with the session token attached
pub struct ApiClient<X: Transport = HttpTransport> {
    transport: X,
    token: Option<String>,
}

impl<X: Transport> ApiClient<X> {
    pub fn new(transport: X, token: Option<String>) -> Self {
        Self { transport, token }
    }

    pub fn transport(&self) -> &X {
        &self.transport
    }

    /// Send a request and return the decoded JSON body (Null when empty)
    pub fn execute(&self, mut request: ApiRequest) -> Result<Value, ApiError> {
        if request.token.is_none() {
            request.token = self.token.clone();
        }
        debug!(method = %request.method, path = %request.path, "api request");

        let response = self.transport.send(&request)?;
        debug!(status = response.status, path = %request.path, "api response");
        check_response(response)
    }

    pub fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, ApiError> {
        let mut request = ApiRequest::new(Method::Get, path);
        request.query = query.to_vec();
        self.execute(request)
    }

    pub fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let value = self.get(path, &[])?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        field: &str,
        query: &[(String, String)],
    ) -> Result<Listing<T>, ApiError> {
        decode_listing(self.get(path, query)?, field)
    }

    pub fn post(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.execute(ApiRequest::new(Method::Post, path).body(body))
    }

    pub fn put(&self, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        let mut request = ApiRequest::new(Method::Put, path);
        request.body = body;
        self.execute(request)
    }

    pub fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.execute(ApiRequest::new(Method::Delete, path))
    }
}

/// Map a raw response onto success JSON or the error taxonomy
fn check_response(response: ApiResponse) -> Result<Value, ApiError> {
    let parsed = if response.body.trim().is_empty() {
        None
    } else {
        serde_json::from_str::<Value>(&response.body).ok()
    };

    if response.is_success() {
        return match parsed {
            Some(value) => Ok(value),
            None if response.body.trim().is_empty() => Ok(Value::Null),
            None => Err(ApiError::Decode("response body is not JSON".to_string())),
        };
    }

    let message = parsed.as_ref().and_then(|v| {
        v.get("error")
            .or_else(|| v.get("message"))
            .and_then(Value::as_str)
            .map(String::from)
    });

    match message {
        Some(message) => Err(ApiError::Status {
            status: response.status,
            message,
        }),
        None => Err(ApiError::StatusNoBody {
            status: response.status,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct Canned {
        response: ApiResponse,
        seen: Mutex<Vec<ApiRequest>>,
    }

    impl Transport for Canned {
        fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(self.response.clone())
        }
    }

    fn client(status: u16, body: &str) -> ApiClient<Canned> {
        ApiClient::new(
            Canned {
                response: ApiResponse::new(status, body),
                seen: Mutex::new(Vec::new()),
            },
            Some("tok".to_string()),
        )
    }

    #[test]
    fn test_resource_path() {
        assert_eq!(resource_path("mao/farmers", None, None), "/mao/farmers");
        assert_eq!(resource_path("mao/farmers", Some("7"), Some("verify")), "/mao/farmers/7/verify");
        assert_eq!(resource_path("/team/", Some("3"), None), "/team/3");
    }

    #[test]
    fn test_decode_bare_array() {
        let listing: Listing<u32> = decode_listing(json!([1, 2, 3]), "items").unwrap();
        assert_eq!(listing.items, vec![1, 2, 3]);
        assert!(listing.pagination.is_none());
    }

    #[test]
    fn test_decode_named_field_with_pagination() {
        let value = json!({"logs": [1, 2], "pagination": {"totalPages": 4, "total": 37}});
        let listing: Listing<u32> = decode_listing(value, "logs").unwrap();
        assert_eq!(listing.items, vec![1, 2]);
        assert_eq!(listing.pagination, Some(Pagination { total_pages: 4, total: 37 }));
    }

    #[test]
    fn test_decode_missing_field() {
        let result: Result<Listing<u32>, _> = decode_listing(json!({"other": []}), "logs");
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[test]
    fn test_token_attached() {
        let client = client(200, "[]");
        client.get("/team", &[]).unwrap();
        let seen = client.transport().seen.lock().unwrap();
        assert_eq!(seen[0].token.as_deref(), Some("tok"));
        assert_eq!(seen[0].method, Method::Get);
    }

    #[test]
    fn test_error_body_message_surfaces() {
        let err = client(400, r#"{"error":"Farmer already verified"}"#)
            .put("/mao/farmers/1/verify", None)
            .unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 400, .. }));
        assert_eq!(err.user_message(), "Farmer already verified");
    }

    #[test]
    fn test_error_without_body_is_generic() {
        let err = client(502, "<html>Bad gateway</html>").delete("/team/1").unwrap_err();
        assert!(matches!(err, ApiError::StatusNoBody { status: 502 }));
        assert_eq!(err.user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn test_empty_success_body_is_null() {
        let value = client(204, "").delete("/team/1").unwrap();
        assert!(value.is_null());
    }
}

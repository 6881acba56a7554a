use chrono::{DateTime, Duration, SecondsFormat, Utc};
use http::Method;

use crate::declaration::FunctionDeclaration;
use crate::env::EnvList;

/// Endpoint every local request is addressed to.
pub const LOCAL_TEST_URL: &str = "http://localhost:8080/myapp/hello";

/// Application and route the local endpoint stands for.
pub const LOCAL_APP_NAME: &str = "myapp";
pub const LOCAL_ROUTE_PATH: &str = "/hello";

/// Synthetic call id used for every local invocation.
pub const LOCAL_CALL_ID: &str = "12345678901234567890123456";

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// One incoming request, as the platform would describe it before encoding
/// it for a container.
///
/// Built once per invocation batch: every repetition of a hot run reuses the
/// same call id and deadline.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub content_type: String,
    pub url: String,
    pub call_id: String,
    pub deadline: DateTime<Utc>,
    /// `None` when no input was supplied at all.
    pub body: Option<Vec<u8>>,
    /// Caller-supplied and environment-derived variables.
    pub env: EnvList,
    pub memory_mb: u64,
    pub app_name: String,
    pub route_path: String,
}

impl RequestDescriptor {
    /// Describe a request against the local test endpoint.
    ///
    /// Without an explicit `method` the request is a `POST` when a body is
    /// present and a `GET` otherwise. The deadline is `now` plus the
    /// declaration's timeout.
    pub fn local(
        declaration: &FunctionDeclaration,
        method: Option<Method>,
        body: Option<Vec<u8>>,
        env: EnvList,
        now: DateTime<Utc>,
    ) -> Self {
        let method = method.unwrap_or_else(|| default_method(body.is_some()));
        let deadline = now + Duration::seconds(i64::from(declaration.timeout_secs()));

        Self {
            method,
            content_type: CONTENT_TYPE_JSON.to_string(),
            url: LOCAL_TEST_URL.to_string(),
            call_id: LOCAL_CALL_ID.to_string(),
            deadline,
            body,
            env,
            memory_mb: declaration.memory,
            app_name: LOCAL_APP_NAME.to_string(),
            route_path: LOCAL_ROUTE_PATH.to_string(),
        }
    }

    /// Deadline as RFC 3339 with second precision, e.g. `2026-10-17T09:30:00Z`.
    pub fn deadline_rfc3339(&self) -> String {
        self.deadline.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn body_bytes(&self) -> &[u8] {
        self.body.as_deref().unwrap_or_default()
    }
}

pub fn default_method(has_body: bool) -> Method {
    if has_body { Method::POST } else { Method::GET }
}

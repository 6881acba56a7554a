use std::collections::BTreeMap;
use std::io::Write;

use http::{HeaderValue, Uri};
use serde::{Deserialize, Serialize};

use crate::env::EnvList;
use crate::error::EnvelopeError;
use crate::format::ExecutionFormat;
use crate::output::OutputTransform;
use crate::request::RequestDescriptor;

/// Everything a container receives for one invocation batch.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub stdin: Vec<u8>,
    pub env: EnvList,
    pub output: OutputTransform,
}

/// Structured (`json` format) input record, one per line on stdin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonCall {
    pub call_id: String,
    pub content_type: String,
    pub deadline: String,
    pub body: String,
    pub protocol: JsonProtocol,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonProtocol {
    #[serde(rename = "type")]
    pub kind: String,
    pub method: String,
    pub request_url: String,
    pub headers: BTreeMap<String, Vec<String>>,
}

/// Encode a single call of `request` for a container speaking `format`.
pub fn encode(request: &RequestDescriptor, format: ExecutionFormat) -> Result<Envelope, EnvelopeError> {
    let mut env = platform_env(request, format);

    let envelope = match format {
        ExecutionFormat::Default => {
            env.push("FN_REQUEST_URL", &request.url);
            env.push("FN_CALL_ID", &request.call_id);
            env.push("FN_METHOD", request.method.as_str());
            env.push("FN_DEADLINE", request.deadline_rfc3339());
            Envelope {
                stdin: request.body_bytes().to_vec(),
                env,
                output: OutputTransform::Passthrough,
            }
        }
        ExecutionFormat::Http => Envelope {
            stdin: http_frame(request)?,
            env,
            output: OutputTransform::Passthrough,
        },
        ExecutionFormat::Json => Envelope {
            stdin: json_record(request)?,
            env,
            output: OutputTransform::JsonLines,
        },
    };

    Ok(envelope)
}

/// Variables the platform sets for every format, followed by the caller's.
fn platform_env(request: &RequestDescriptor, format: ExecutionFormat) -> EnvList {
    let mut env = EnvList::new();
    env.push("FN_TYPE", "sync");
    env.push("FN_FORMAT", format.as_str());
    env.push("FN_PATH", &request.route_path);
    env.push("FN_MEMORY", request.memory_mb.to_string());
    env.push("FN_APP_NAME", &request.app_name);
    env.extend(&request.env);
    env
}

/// Serialize `request` as one HTTP/1.1 request frame.
pub fn http_frame(request: &RequestDescriptor) -> Result<Vec<u8>, EnvelopeError> {
    let uri: Uri = request
        .url
        .parse()
        .map_err(|e| EnvelopeError::InvalidRequest(format!("{}: {e}", request.url)))?;
    let host = uri
        .authority()
        .ok_or_else(|| EnvelopeError::InvalidRequest(format!("{}: missing host", request.url)))?;
    let target = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

    let body = request.body_bytes();
    let deadline = request.deadline_rfc3339();
    let user_agent = concat!("fnrun/", env!("CARGO_PKG_VERSION"));
    let content_length = body.len().to_string();
    let headers: [(&str, &str); 8] = [
        ("Host", host.as_str()),
        ("User-Agent", user_agent),
        ("Content-Length", &content_length),
        ("Content-Type", &request.content_type),
        ("FN_REQUEST_URL", &request.url),
        ("FN_CALL_ID", &request.call_id),
        ("FN_METHOD", request.method.as_str()),
        ("FN_DEADLINE", &deadline),
    ];

    let mut frame = Vec::with_capacity(256 + body.len());
    write!(frame, "{} {target} HTTP/1.1\r\n", request.method)?;
    for (name, value) in headers {
        HeaderValue::from_str(value)
            .map_err(|e| EnvelopeError::InvalidRequest(format!("header {name}: {e}")))?;
        write!(frame, "{name}: {value}\r\n")?;
    }
    frame.extend_from_slice(b"\r\n");
    frame.extend_from_slice(body);
    Ok(frame)
}

/// Serialize `request` as one newline-terminated JSON record.
pub fn json_record(request: &RequestDescriptor) -> Result<Vec<u8>, EnvelopeError> {
    let body = std::str::from_utf8(request.body_bytes())
        .map_err(|e| EnvelopeError::InvalidBody(format!("json format requires UTF-8 input: {e}")))?;

    let mut headers = BTreeMap::new();
    headers.insert("Content-Type".to_string(), vec![request.content_type.clone()]);

    let call = JsonCall {
        call_id: request.call_id.clone(),
        content_type: request.content_type.clone(),
        deadline: request.deadline_rfc3339(),
        body: body.to_string(),
        protocol: JsonProtocol {
            kind: "http".into(),
            method: request.method.to_string(),
            request_url: request.url.clone(),
            headers,
        },
    };

    let mut record = serde_json::to_vec(&call)?;
    record.push(b'\n');
    Ok(record)
}

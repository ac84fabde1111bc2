use std::path::PathBuf;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// JSON-RPC 2.0 error codes.
pub const ERR_CODE_INVALID_REQ: i32 = -32600;
pub const ERR_CODE_NO_METHOD: i32 = -32601;
pub const ERR_CODE_INTERNAL: i32 = -32603;

/// The only protocol version tag this server accepts and emits.
pub const JSONRPC_VERSION: &str = "2.0";

/// Method name for the resource listing.
pub const METHOD_RESOURCES_LIST: &str = "resources/list";

/// Fallback MIME type when the extension table has no match.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Which member name carries the protocol version tag.
///
/// Replies use the same key as the request. Bodies with neither key, and
/// bodies that are not objects, get `jsonrpc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionKey {
    #[default]
    Jsonrpc,
    ProtocolVersion,
}

impl VersionKey {
    pub fn as_str(self) -> &'static str {
        match self {
            VersionKey::Jsonrpc => "jsonrpc",
            VersionKey::ProtocolVersion => "protocol-version",
        }
    }
}

// ── Request ──

/// Inbound JSON-RPC 2.0 request, after envelope validation.
///
/// Built by [`parse_request`](crate::envelope::parse_request); every field is
/// guaranteed present and well-typed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(skip)]
    pub version_key: VersionKey,
    pub method: String,
    pub params: Map<String, Value>,
    /// Correlation id: a string, a number or null. Echoed verbatim.
    pub id: Value,
}

// ── Response ──

/// Structured JSON-RPC 2.0 response.
///
/// Exactly one of `result` / `error` is set. `id` is always serialized, even
/// when it is null. The version tag is written under `version_key`.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub version_key: VersionKey,
    pub id: Value,
    pub result: Option<Value>,
    pub error: Option<RpcError>,
}

impl JsonRpcResponse {
    /// Reply under the given version key.
    pub fn keyed(mut self, key: VersionKey) -> Self {
        self.version_key = key;
        self
    }

    /// True when this response carries an error object.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Error code, if this is an error response.
    pub fn error_code(&self) -> Option<i32> {
        self.error.as_ref().map(|e| e.code)
    }

    /// Decode the `resources/list` payload, if this is such a result.
    pub fn resources(&self) -> Option<Vec<Resource>> {
        let result = self.result.clone()?;
        serde_json::from_value::<ListResourcesResult>(result)
            .ok()
            .map(|r| r.resources)
    }
}

impl Serialize for JsonRpcResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 2 + self.result.is_some() as usize + self.error.is_some() as usize;

        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry(self.version_key.as_str(), &self.jsonrpc)?;
        map.serialize_entry("id", &self.id)?;
        if let Some(ref result) = self.result {
            map.serialize_entry("result", result)?;
        }
        if let Some(ref err) = self.error {
            map.serialize_entry("error", err)?;
        }
        map.end()
    }
}

// Either version key on the wire; remembers which one was used.
#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    jsonrpc: Option<String>,
    #[serde(default, rename = "protocol-version")]
    protocol_version: Option<String>,
    #[serde(default)]
    id: Value,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

impl<'de> Deserialize<'de> for JsonRpcResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireResponse::deserialize(deserializer)?;
        let (jsonrpc, version_key) = match (wire.jsonrpc, wire.protocol_version) {
            (Some(v), _) => (v, VersionKey::Jsonrpc),
            (None, Some(v)) => (v, VersionKey::ProtocolVersion),
            (None, None) => return Err(serde::de::Error::missing_field("jsonrpc")),
        };
        Ok(JsonRpcResponse {
            jsonrpc,
            version_key,
            id: wire.id,
            result: wire.result,
            error: wire.error,
        })
    }
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// ── Domain types ──

/// One discoverable file under the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// `file:///` followed by the forward-slash relative path.
    pub uri: String,
    /// File base name.
    pub name: String,
    pub mime_type: String,
}

/// Result body of `resources/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResourcesResult {
    pub resources: Vec<Resource>,
}

// ── Convenience constructors ──

/// Build a JSON-RPC error response.
pub fn new_error_response(id: Value, code: i32, message: impl Into<String>) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: JSONRPC_VERSION.into(),
        version_key: VersionKey::default(),
        id,
        result: None,
        error: Some(RpcError {
            code,
            message: message.into(),
            data: None,
        }),
    }
}

/// Build a JSON-RPC error response carrying a `data` member.
pub fn new_error_response_with_data(
    id: Value,
    code: i32,
    message: impl Into<String>,
    data: impl Into<Value>,
) -> JsonRpcResponse {
    let mut resp = new_error_response(id, code, message);
    if let Some(err) = resp.error.as_mut() {
        err.data = Some(data.into());
    }
    resp
}

/// Build a JSON-RPC success response.
pub fn new_ok_response(id: Value, result: Value) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: JSONRPC_VERSION.into(),
        version_key: VersionKey::default(),
        id,
        result: Some(result),
        error: None,
    }
}

/// `-32603 Internal error` with a human-readable description in `data`.
pub fn internal_error_response(id: Value, detail: impl Into<String>) -> JsonRpcResponse {
    new_error_response_with_data(id, ERR_CODE_INTERNAL, "Internal error", detail.into())
}

// ── Errors ──

/// Failures of a whole listing. Per-file problems never show up here.
#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("directory not found: {}", .0.display())]
    RootNotFound(PathBuf),
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("listing task failed: {0}")]
    Join(String),
}

/// Reasons an inbound body is not a valid JSON-RPC request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    #[error("request must be a JSON object")]
    NotAnObject,
    #[error("missing field \"{0}\"")]
    Missing(&'static str),
    #[error("field \"{0}\" has the wrong type")]
    WrongType(&'static str),
    #[error("unsupported protocol version \"{0}\"")]
    Version(String),
}

/// Crate-level error type.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    List(#[from] ListError),
}

//! `mcpfiles` — expose a directory tree as JSON-RPC resources over HTTP.
//!
//! A single JSON-RPC 2.0 method, `resources/list`, walks the configured root
//! and returns one `{uri, name, mimeType}` descriptor per regular file.
//! Call [`Server::handle_body`] from any HTTP framework, or mount
//! [`http_router`] on an axum listener.
//!
//! # Quick start
//!
//! ```rust
//! use mcpfiles::Server;
//! use serde_json::json;
//!
//! # async fn example() {
//! let dir = std::env::temp_dir();
//! let server = Server::builder(&dir).build();
//!
//! let body = json!({"jsonrpc": "2.0", "method": "resources/list", "params": {}, "id": 1});
//! let resp = server.handle_value(body).await;
//! assert!(resp.error.is_none());
//! // resp implements Serialize — pass it to axum::Json, serde_json, etc.
//! let json = serde_json::to_string(&resp).unwrap();
//! # }
//! ```

pub mod config;
pub mod envelope;
pub mod lister;
pub mod mime;
pub mod server;
pub mod transport_http;
pub mod types;

// Re-export the most commonly used items at the crate root.
pub use config::{Config, ensure_root};
pub use envelope::parse_request;
pub use lister::{list_resources, list_resources_blocking, resource_uri};
pub use mime::guess_mime_type;
pub use server::{ListResourcesHandler, MethodHandler, Server, ServerBuilder};
pub use transport_http::http_router;
pub use types::{
    EnvelopeError, JSONRPC_VERSION, JsonRpcRequest, JsonRpcResponse, ListError, McpError,
    Resource, RpcError, VersionKey, new_error_response, new_ok_response,
};

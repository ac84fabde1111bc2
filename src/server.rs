use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::envelope;
use crate::lister;
use crate::types::*;

/// Handler trait for JSON-RPC methods. One instance per method name.
#[async_trait]
pub trait MethodHandler: Send + Sync {
    /// Produce the `result` member for a validated request.
    ///
    /// An `Err` becomes a `-32603 Internal error` reply whose `data` is the
    /// error's display string.
    async fn call(&self, params: &Map<String, Value>) -> Result<Value, McpError>;
}

/// `resources/list`: walk the configured root.
pub struct ListResourcesHandler {
    root: PathBuf,
}

impl ListResourcesHandler {
    pub fn new(root: impl Into<PathBuf>) -> Arc<dyn MethodHandler> {
        Arc::new(Self { root: root.into() })
    }
}

#[async_trait]
impl MethodHandler for ListResourcesHandler {
    // Params are reserved for future filtering.
    async fn call(&self, _params: &Map<String, Value>) -> Result<Value, McpError> {
        let resources = lister::list_resources_blocking(self.root.clone()).await?;
        tracing::debug!(
            count = resources.len(),
            root = %self.root.display(),
            "listed resources"
        );
        Ok(serde_json::to_value(ListResourcesResult { resources })?)
    }
}

/// The JSON-RPC server. Create with [`ServerBuilder`], then hand it to
/// [`http_router`](crate::http_router) or call [`Server::handle_body`] directly.
pub struct Server {
    pub(crate) root: PathBuf,
    pub(crate) handlers: HashMap<String, Arc<dyn MethodHandler>>,
}

impl Server {
    /// Create a new server builder exposing `root`.
    pub fn builder(root: impl Into<PathBuf>) -> ServerBuilder {
        ServerBuilder::new(root)
    }

    /// Directory this server exposes.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Register (or replace) a method handler.
    pub fn register(&mut self, method: impl Into<String>, handler: Arc<dyn MethodHandler>) {
        self.handlers.insert(method.into(), handler);
    }

    /// Names of all dispatchable methods, sorted.
    pub fn methods(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Handle one raw HTTP body. Always returns a JSON-RPC response.
    ///
    /// Bodies that are not JSON, or not a JSON object, get `-32603` with id 0
    /// under the default `jsonrpc` key.
    pub async fn handle_body(&self, body: &[u8]) -> JsonRpcResponse {
        let value: Value = match serde_json::from_slice(body) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "undecodable request body");
                return internal_error_response(Value::from(0), format!("invalid JSON: {e}"));
            }
        };
        if !value.is_object() {
            tracing::error!("request body is not a JSON object");
            return internal_error_response(
                Value::from(0),
                EnvelopeError::NotAnObject.to_string(),
            );
        }
        self.handle_value(value).await
    }

    /// Validate a decoded JSON body, then dispatch it.
    pub async fn handle_value(&self, body: Value) -> JsonRpcResponse {
        tracing::info!(method = ?body.get("method"), id = ?body.get("id"), "received request");

        match envelope::parse_request(&body) {
            Ok(req) => self.handle(req).await,
            Err(e) => {
                let id = envelope::fallback_id(&body);
                tracing::warn!(error = %e, id = %id, "invalid request");
                new_error_response_with_data(
                    id,
                    ERR_CODE_INVALID_REQ,
                    "Invalid Request",
                    e.to_string(),
                )
                .keyed(envelope::version_key(&body))
            }
        }
    }

    /// Route a validated request through the dispatch table.
    pub async fn handle(&self, req: JsonRpcRequest) -> JsonRpcResponse {
        let key = req.version_key;
        let Some(handler) = self.handlers.get(&req.method) else {
            tracing::warn!(method = %req.method, id = %req.id, "method not found");
            return new_error_response(req.id, ERR_CODE_NO_METHOD, "Method not found")
                .keyed(key);
        };

        let resp = match handler.call(&req.params).await {
            Ok(result) => new_ok_response(req.id, result),
            Err(e) => {
                tracing::error!(method = %req.method, id = %req.id, error = %e, "handler failed");
                internal_error_response(req.id, e.to_string())
            }
        };
        resp.keyed(key)
    }
}

/// Builder for constructing a [`Server`].
pub struct ServerBuilder {
    root: PathBuf,
    handlers: Vec<(String, Arc<dyn MethodHandler>)>,
}

impl ServerBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ServerBuilder {
            root: root.into(),
            handlers: Vec::new(),
        }
    }

    /// Add an extra method handler.
    pub fn handler(mut self, method: impl Into<String>, handler: Arc<dyn MethodHandler>) -> Self {
        self.handlers.push((method.into(), handler));
        self
    }

    /// Build the server. `resources/list` is always registered.
    pub fn build(self) -> Server {
        let mut handlers: HashMap<String, Arc<dyn MethodHandler>> = HashMap::new();
        handlers.insert(
            METHOD_RESOURCES_LIST.to_string(),
            ListResourcesHandler::new(self.root.clone()),
        );
        handlers.extend(self.handlers);

        Server {
            root: self.root,
            handlers,
        }
    }
}

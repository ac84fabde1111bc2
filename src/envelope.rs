use serde_json::{Map, Value};

use crate::types::{EnvelopeError, JSONRPC_VERSION, JsonRpcRequest, VersionKey};

/// Validate a raw JSON body as a JSON-RPC 2.0 request.
///
/// All four members are required: `jsonrpc` (equal to `"2.0"`), `method`
/// (string), `params` (object) and `id` (string, number or null).
pub fn parse_request(body: &Value) -> Result<JsonRpcRequest, EnvelopeError> {
    let obj = body.as_object().ok_or(EnvelopeError::NotAnObject)?;

    let version_key = version_key(body);
    let version = obj
        .get(version_key.as_str())
        .ok_or(EnvelopeError::Missing("jsonrpc"))?
        .as_str()
        .ok_or(EnvelopeError::WrongType("jsonrpc"))?;
    if version != JSONRPC_VERSION {
        return Err(EnvelopeError::Version(version.to_string()));
    }

    let method = required(obj, "method")?
        .as_str()
        .ok_or(EnvelopeError::WrongType("method"))?;

    let params = required(obj, "params")?
        .as_object()
        .ok_or(EnvelopeError::WrongType("params"))?;

    let id = required(obj, "id")?;
    if !(id.is_string() || id.is_number() || id.is_null()) {
        return Err(EnvelopeError::WrongType("id"));
    }

    Ok(JsonRpcRequest {
        jsonrpc: version.to_string(),
        version_key,
        method: method.to_string(),
        params: params.clone(),
        id: id.clone(),
    })
}

/// Best-effort id for an error reply to a body that failed validation.
///
/// Returns the raw `id` member when the body is an object that has one,
/// otherwise `0`.
pub fn fallback_id(body: &Value) -> Value {
    body.get("id").cloned().unwrap_or_else(|| Value::from(0))
}

/// Key the body uses for its version tag.
///
/// `jsonrpc` wins when both are present; a body with neither (or not an
/// object at all) gets the `jsonrpc` default.
pub fn version_key(body: &Value) -> VersionKey {
    let has = |key: VersionKey| body.get(key.as_str()).is_some();
    if !has(VersionKey::Jsonrpc) && has(VersionKey::ProtocolVersion) {
        VersionKey::ProtocolVersion
    } else {
        VersionKey::Jsonrpc
    }
}

fn required<'a>(
    obj: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Value, EnvelopeError> {
    obj.get(field).ok_or(EnvelopeError::Missing(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> Value {
        json!({"jsonrpc": "2.0", "method": "resources/list", "params": {}, "id": 1})
    }

    #[test]
    fn test_parse_valid() {
        let req = parse_request(&valid()).unwrap();
        assert_eq!(req.method, "resources/list");
        assert_eq!(req.id, json!(1));
        assert!(req.params.is_empty());
    }

    #[test]
    fn test_parse_accepts_version_alias() {
        let body = json!({"protocol-version": "2.0", "method": "ping", "params": {}, "id": "x"});
        let req = parse_request(&body).unwrap();
        assert_eq!(req.jsonrpc, "2.0");
        assert_eq!(req.version_key, VersionKey::ProtocolVersion);
        assert_eq!(req.id, json!("x"));
    }

    #[test]
    fn test_version_key_detection() {
        assert_eq!(version_key(&valid()), VersionKey::Jsonrpc);
        assert_eq!(
            version_key(&json!({"protocol-version": "2.0"})),
            VersionKey::ProtocolVersion
        );
        assert_eq!(
            version_key(&json!({"jsonrpc": "2.0", "protocol-version": "2.0"})),
            VersionKey::Jsonrpc
        );
        assert_eq!(version_key(&json!({"method": "x"})), VersionKey::Jsonrpc);
        assert_eq!(version_key(&json!([1])), VersionKey::Jsonrpc);
    }

    #[test]
    fn test_parse_null_id() {
        let mut body = valid();
        body["id"] = Value::Null;
        let req = parse_request(&body).unwrap();
        assert!(req.id.is_null());
    }

    #[test]
    fn test_each_missing_field_is_rejected() {
        for field in ["jsonrpc", "method", "params", "id"] {
            let mut body = valid();
            body.as_object_mut().unwrap().remove(field);
            let err = parse_request(&body).unwrap_err();
            assert_eq!(err, EnvelopeError::Missing(field), "field {field}");
        }
    }

    #[test]
    fn test_wrong_types_are_rejected() {
        let cases = [
            ("jsonrpc", json!(2.0)),
            ("method", json!(5)),
            ("params", json!([])),
            ("id", json!({"nested": true})),
            ("id", json!(true)),
        ];
        for (field, bad) in cases {
            let mut body = valid();
            body[field] = bad;
            assert_eq!(parse_request(&body).unwrap_err(), EnvelopeError::WrongType(field));
        }
    }

    #[test]
    fn test_bad_version() {
        let mut body = valid();
        body["jsonrpc"] = json!("1.0");
        assert_eq!(
            parse_request(&body).unwrap_err(),
            EnvelopeError::Version("1.0".into())
        );
    }

    #[test]
    fn test_not_an_object() {
        assert_eq!(parse_request(&json!([1, 2])).unwrap_err(), EnvelopeError::NotAnObject);
    }

    #[test]
    fn test_fallback_id() {
        assert_eq!(fallback_id(&json!({"id": "abc"})), json!("abc"));
        assert_eq!(fallback_id(&json!({"method": "x"})), json!(0));
        assert_eq!(fallback_id(&json!("scalar")), json!(0));
    }
}

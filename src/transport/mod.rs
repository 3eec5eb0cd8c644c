//! Transport layer: URL layout and wire-format details (serialization/deserialization).

mod endpoint;
mod get_messages;
mod send_message;

pub use endpoint::{endpoint_url, sanitize_url};
pub use get_messages::{encode_get_messages_query, get_messages_segments};
pub use send_message::{encode_send_message_json, send_message_segments};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid api_url: {0}")]
    InvalidApiUrl(#[from] url::ParseError),

    #[error("api_url must be a hierarchical URL: {0}")]
    NotHierarchical(String),

    #[error("api_url must not include query or fragment: {0}")]
    ApiUrlHasQuery(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a successful response body. The document is relayed as-is.
pub fn decode_json_document(body: &str) -> Result<serde_json::Value, TransportError> {
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_relays_any_json_shape() {
        let doc = decode_json_document(r#"[{"id":"1","unknown":{"nested":true}}]"#).unwrap();
        assert_eq!(doc[0]["unknown"]["nested"], serde_json::Value::Bool(true));
    }

    #[test]
    fn decode_rejects_invalid_json() {
        assert!(matches!(
            decode_json_document("{ not json }"),
            Err(TransportError::Json(_))
        ));
    }
}

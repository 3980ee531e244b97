use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::key::SigningAlgorithm;

/// Decoded token header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    pub alg: SigningAlgorithm,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    /// Custom header fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_header_keeps_custom_fields() {
        let header: TokenHeader = serde_json::from_value(json!({
            "typ": "JWT",
            "alg": "ES256",
            "kid": "goodKey",
            "x-tenant": "acme"
        }))
        .unwrap();
        assert_eq!(header.alg, SigningAlgorithm::ES256);
        assert_eq!(header.kid.as_deref(), Some("goodKey"));
        assert_eq!(header.extra.get("x-tenant"), Some(&json!("acme")));
    }

    #[test]
    fn test_unknown_algorithm_is_rejected() {
        let result = serde_json::from_value::<TokenHeader>(json!({"alg": "none"}));
        assert!(result.is_err());
    }
}

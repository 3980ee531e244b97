use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Per-domain option values stored under the `opt` claim
pub type DomainOptions = BTreeMap<String, Map<String, Value>>;

/// `aud` claim: a single audience or a list of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let entries: &[String] = match self {
            Audience::Single(audience) => std::slice::from_ref(audience),
            Audience::Multiple(audiences) => audiences,
        };
        entries.iter().map(String::as_str)
    }

    pub fn contains(&self, audience: &str) -> bool {
        self.iter().any(|entry| entry == audience)
    }
}

impl From<String> for Audience {
    fn from(audience: String) -> Self {
        Audience::Single(audience)
    }
}

impl From<&str> for Audience {
    fn from(audience: &str) -> Self {
        Audience::Single(audience.to_string())
    }
}

impl From<Vec<String>> for Audience {
    fn from(audiences: Vec<String>) -> Self {
        Audience::Multiple(audiences)
    }
}

/// Token payload: the registered claims, the packed scope claim and any
/// application-defined claims
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Audience
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,
    /// Issued at (Unix epoch seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Expiration (Unix epoch seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Not before (Unix epoch seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    /// Token id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    /// Domain options, see [`Claims::set_option`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opt: Option<DomainOptions>,
    /// Packed scope blobs, see `ScopeCodec`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Any other claim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.sub = Some(subject.into());
        self
    }

    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    pub fn get_claim(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    /// Reads a domain-specific option
    pub fn get_option(&self, domain: &str, key: &str) -> Option<&Value> {
        self.opt.as_ref()?.get(domain)?.get(key)
    }

    /// Stores a domain-specific option, creating the domain map as needed.
    ///
    /// Options hold non-boolean settings; boolean switches belong in scopes.
    pub fn set_option(&mut self, domain: &str, key: &str, value: impl Into<Value>) {
        self.opt
            .get_or_insert_with(DomainOptions::new)
            .entry(domain.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unset_option() {
        let claims = Claims::new();
        assert!(claims.get_option("lead", "foo").is_none());
    }

    #[test]
    fn test_set_and_get_options() {
        let mut claims = Claims::new();
        claims.set_option("lead", "foo", 5);
        claims.set_option("lead", "bar", "baz");
        assert_eq!(claims.get_option("lead", "foo"), Some(&json!(5)));
        assert_eq!(claims.get_option("lead", "bar"), Some(&json!("baz")));
    }

    #[test]
    fn test_serializes_only_present_claims() {
        let claims = Claims::new()
            .with_subject("foo")
            .with_claim("email", "foo@bar.com");
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value, json!({"sub": "foo", "email": "foo@bar.com"}));
    }

    #[test]
    fn test_deserializes_extra_claims() {
        let claims: Claims = serde_json::from_value(json!({
            "sub": "bar",
            "iat": 1463889486,
            "scope": "foo:AQ==",
            "opt": {"lead": {"foo": 5}},
            "email": "foo@bar.com"
        }))
        .unwrap();
        assert_eq!(claims.sub.as_deref(), Some("bar"));
        assert_eq!(claims.iat, Some(1463889486));
        assert_eq!(claims.scope.as_deref(), Some("foo:AQ=="));
        assert_eq!(claims.get_option("lead", "foo"), Some(&json!(5)));
        assert_eq!(claims.get_claim("email"), Some(&json!("foo@bar.com")));
    }

    #[test]
    fn test_audience_single_or_list() {
        let single: Claims = serde_json::from_value(json!({"aud": "api"})).unwrap();
        assert_eq!(single.aud, Some(Audience::from("api")));

        let list: Claims = serde_json::from_value(json!({"aud": ["api", "web"]})).unwrap();
        let aud = list.aud.unwrap();
        assert!(aud.contains("web"));
        assert!(!aud.contains("admin"));
        assert_eq!(aud.iter().collect::<Vec<_>>(), vec!["api", "web"]);
        assert_eq!(
            serde_json::to_value(&aud).unwrap(),
            json!(["api", "web"])
        );
    }
}

//! JWT signing, verification and decoding built on `jsonwebtoken`

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, EncodingKey, Validation};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::key::{KeyFamily, PrivateKeyDefinition, SigningAlgorithm};
use crate::domain::token::{
    Audience, Claims, DecodedToken, SignParams, TokenDecoder, TokenHeader, TokenSigner,
    TokenVerifier, VerifyParams,
};
use crate::domain::DomainError;

/// Compact JWS implementation of the token crypto traits
#[derive(Debug, Clone, Default)]
pub struct JwtCrypto;

impl JwtCrypto {
    pub fn new() -> Self {
        Self
    }
}

fn jwt_algorithm(algorithm: SigningAlgorithm) -> Algorithm {
    match algorithm {
        SigningAlgorithm::HS256 => Algorithm::HS256,
        SigningAlgorithm::HS384 => Algorithm::HS384,
        SigningAlgorithm::HS512 => Algorithm::HS512,
        SigningAlgorithm::RS256 => Algorithm::RS256,
        SigningAlgorithm::RS384 => Algorithm::RS384,
        SigningAlgorithm::RS512 => Algorithm::RS512,
        SigningAlgorithm::PS256 => Algorithm::PS256,
        SigningAlgorithm::PS384 => Algorithm::PS384,
        SigningAlgorithm::PS512 => Algorithm::PS512,
        SigningAlgorithm::ES256 => Algorithm::ES256,
        SigningAlgorithm::ES384 => Algorithm::ES384,
        SigningAlgorithm::EdDSA => Algorithm::EdDSA,
    }
}

fn encoding_key(key: &PrivateKeyDefinition) -> Result<EncodingKey, DomainError> {
    let material = key.private_key.as_bytes();
    let encoding_key = match key.algorithm.family() {
        KeyFamily::Hmac => return Ok(EncodingKey::from_secret(material)),
        KeyFamily::Rsa => EncodingKey::from_rsa_pem(material),
        KeyFamily::Ec => EncodingKey::from_ec_pem(material),
        KeyFamily::Ed => EncodingKey::from_ed_pem(material),
    };
    encoding_key.map_err(|e| {
        DomainError::signing(format!("Invalid {} private key: {}", key.algorithm, e))
    })
}

fn decoding_key(algorithm: SigningAlgorithm, key: &str) -> Result<DecodingKey, DomainError> {
    let material = key.as_bytes();
    let decoding_key = match algorithm.family() {
        KeyFamily::Hmac => return Ok(DecodingKey::from_secret(material)),
        KeyFamily::Rsa => DecodingKey::from_rsa_pem(material),
        KeyFamily::Ec => DecodingKey::from_ec_pem(material),
        KeyFamily::Ed => DecodingKey::from_ed_pem(material),
    };
    decoding_key.map_err(|e| {
        DomainError::verification(format!("Invalid {} public key: {}", algorithm, e))
    })
}

fn encode_segment(value: &Value) -> Result<String, DomainError> {
    let json = serde_json::to_vec(value)
        .map_err(|e| DomainError::signing(format!("Failed to serialize token: {}", e)))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_segment<T: DeserializeOwned>(segment: &str, name: &str) -> Result<T, DomainError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|e| DomainError::parse(format!("Invalid base64url in token {}: {}", name, e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| DomainError::parse(format!("Invalid token {}: {}", name, e)))
}

fn verification_error(error: jsonwebtoken::errors::Error) -> DomainError {
    match error.kind() {
        ErrorKind::ExpiredSignature => DomainError::expired("jwt expired"),
        ErrorKind::ImmatureSignature => DomainError::not_yet_valid("jwt not active"),
        _ => DomainError::verification(error.to_string()),
    }
}

impl TokenDecoder for JwtCrypto {
    fn decode(&self, token: &str) -> Result<DecodedToken, DomainError> {
        let segments: Vec<&str> = token.split('.').collect();
        let [header, payload, _signature] = segments.as_slice() else {
            return Err(DomainError::parse("Token must have three segments"));
        };

        Ok(DecodedToken {
            header: decode_segment::<TokenHeader>(header, "header")?,
            claims: decode_segment::<Claims>(payload, "payload")?,
        })
    }
}

impl TokenSigner for JwtCrypto {
    fn sign(
        &self,
        claims: &Claims,
        key: &PrivateKeyDefinition,
        params: &SignParams,
    ) -> Result<String, DomainError> {
        let timestamp = claims.iat.unwrap_or_else(|| Utc::now().timestamp());

        let mut claims = claims.clone();
        claims.iat = (!params.no_timestamp).then_some(timestamp);
        claims.exp = Some(timestamp + params.expires_in_secs as i64);
        if let Some(subject) = &params.subject {
            claims.sub = Some(subject.clone());
        }
        if let Some(audience) = &params.audience {
            claims.aud = Some(Audience::from(audience.as_str()));
        }
        if let Some(issuer) = &params.issuer {
            claims.iss = Some(issuer.clone());
        }

        let mut header = Map::new();
        header.insert("typ".to_string(), Value::from("JWT"));
        header.extend(params.header.clone());
        header.insert("alg".to_string(), Value::from(key.algorithm.as_str()));
        header.insert("kid".to_string(), Value::from(params.kid.as_str()));

        let payload = serde_json::to_value(&claims)
            .map_err(|e| DomainError::signing(format!("Failed to serialize claims: {}", e)))?;
        let message = format!(
            "{}.{}",
            encode_segment(&Value::Object(header))?,
            encode_segment(&payload)?
        );

        let encoding_key = encoding_key(key)?;
        let signature =
            jsonwebtoken::crypto::sign(message.as_bytes(), &encoding_key, jwt_algorithm(key.algorithm))
                .map_err(|e| DomainError::signing(format!("Failed to sign token: {}", e)))?;

        debug!(kid = %params.kid, algorithm = %key.algorithm, "Token signed");
        Ok(format!("{}.{}", message, signature))
    }
}

impl TokenVerifier for JwtCrypto {
    fn verify(&self, token: &str, key: &str, params: &VerifyParams) -> Result<Claims, DomainError> {
        if let Some(allowed) = &params.algorithms {
            if !allowed.contains(&params.algorithm) {
                return Err(DomainError::verification(format!(
                    "Algorithm {} is not allowed",
                    params.algorithm
                )));
            }
        }

        let mut validation = Validation::new(jwt_algorithm(params.algorithm));
        validation.leeway = params.clock_tolerance_secs;
        validation.validate_exp = !params.ignore_expiration;
        validation.validate_nbf = true;
        validation.required_spec_claims.clear();
        match &params.audience {
            Some(audience) => {
                let accepted: Vec<&str> = audience.iter().collect();
                validation.set_audience(&accepted);
                validation.required_spec_claims.insert("aud".to_string());
            }
            None => validation.validate_aud = false,
        }
        if let Some(issuer) = &params.issuer {
            validation.set_issuer(&[issuer]);
            validation.required_spec_claims.insert("iss".to_string());
        }

        let decoding_key = decoding_key(params.algorithm, key)?;
        let claims = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(verification_error)?
            .claims;

        if let Some(expected) = &params.nonce {
            match claims.nonce.as_deref() {
                Some(nonce) if nonce == expected => {}
                Some(_) => return Err(DomainError::verification("jwt nonce invalid")),
                None => return Err(DomainError::verification("jwt nonce missing")),
            }
        }

        if let Some(max_age) = params.max_age_secs {
            let iat = claims.iat.ok_or_else(|| {
                DomainError::verification("iat required when a maximum age is set")
            })?;
            let deadline = iat + max_age as i64 + params.clock_tolerance_secs as i64;
            if deadline <= Utc::now().timestamp() {
                return Err(DomainError::expired("maxAge exceeded"));
            }
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::key::fixtures::{EC_KEY, ED_KEY, OTHER_RSA_KEY, RSA_KEY};
    use serde_json::json;

    fn hmac_key() -> PrivateKeyDefinition {
        PrivateKeyDefinition::new(SigningAlgorithm::HS256, "secret")
    }

    fn sign_params() -> SignParams {
        SignParams {
            kid: "k1".to_string(),
            expires_in_secs: 3600,
            subject: Some("alice".to_string()),
            ..SignParams::default()
        }
    }

    fn verify_params(algorithm: SigningAlgorithm) -> VerifyParams {
        VerifyParams {
            algorithm,
            algorithms: None,
            ignore_expiration: false,
            clock_tolerance_secs: 5,
            max_age_secs: None,
            audience: None,
            issuer: None,
            nonce: None,
        }
    }

    #[test]
    fn test_sign_writes_header() {
        let crypto = JwtCrypto::new();
        let params = SignParams {
            header: Map::from_iter([
                ("x-tenant".to_string(), json!("acme")),
                ("alg".to_string(), json!("none")),
            ]),
            ..sign_params()
        };
        let token = crypto.sign(&Claims::new(), &hmac_key(), &params).unwrap();

        let decoded = crypto.decode(&token).unwrap();
        assert_eq!(decoded.header.typ.as_deref(), Some("JWT"));
        assert_eq!(decoded.header.alg, SigningAlgorithm::HS256);
        assert_eq!(decoded.header.kid.as_deref(), Some("k1"));
        assert_eq!(decoded.header.extra.get("x-tenant"), Some(&json!("acme")));
    }

    #[test]
    fn test_sign_stamps_claims() {
        let crypto = JwtCrypto::new();
        let params = SignParams {
            audience: Some("api".to_string()),
            issuer: Some("auth".to_string()),
            expires_in_secs: 120,
            ..sign_params()
        };
        let token = crypto.sign(&Claims::new(), &hmac_key(), &params).unwrap();
        let claims = crypto.decode(&token).unwrap().claims;

        let iat = claims.iat.unwrap();
        assert!((Utc::now().timestamp() - iat).abs() <= 1);
        assert_eq!(claims.exp, Some(iat + 120));
        assert_eq!(claims.sub.as_deref(), Some("alice"));
        assert_eq!(claims.aud, Some(Audience::from("api")));
        assert_eq!(claims.iss.as_deref(), Some("auth"));
    }

    #[test]
    fn test_sign_keeps_existing_issued_at() {
        let crypto = JwtCrypto::new();
        let claims = Claims {
            iat: Some(1_000),
            ..Claims::default()
        };
        let token = crypto.sign(&claims, &hmac_key(), &sign_params()).unwrap();
        let claims = crypto.decode(&token).unwrap().claims;
        assert_eq!(claims.iat, Some(1_000));
        assert_eq!(claims.exp, Some(4_600));
    }

    #[test]
    fn test_hmac_round_trip() {
        let crypto = JwtCrypto::new();
        let token = crypto.sign(&Claims::new(), &hmac_key(), &sign_params()).unwrap();
        let claims = crypto
            .verify(&token, "secret", &verify_params(SigningAlgorithm::HS256))
            .unwrap();
        assert_eq!(claims.sub.as_deref(), Some("alice"));

        let err = crypto
            .verify(&token, "other", &verify_params(SigningAlgorithm::HS256))
            .unwrap_err();
        assert!(matches!(err, DomainError::Verification { .. }));
    }

    #[test]
    fn test_rsa_round_trip() {
        let crypto = JwtCrypto::new();
        let key = PrivateKeyDefinition::new(SigningAlgorithm::PS256, RSA_KEY.private_pem.as_str());
        let token = crypto.sign(&Claims::new(), &key, &sign_params()).unwrap();

        let params = verify_params(SigningAlgorithm::PS256);
        assert!(crypto.verify(&token, &RSA_KEY.public_pem, &params).is_ok());
        assert!(crypto.verify(&token, &OTHER_RSA_KEY.public_pem, &params).is_err());
    }

    #[test]
    fn test_ec_round_trip() {
        let crypto = JwtCrypto::new();
        let key = PrivateKeyDefinition::new(SigningAlgorithm::ES256, EC_KEY.private_pem.as_str());
        let token = crypto.sign(&Claims::new(), &key, &sign_params()).unwrap();
        assert_eq!(crypto.decode(&token).unwrap().header.alg, SigningAlgorithm::ES256);

        let params = verify_params(SigningAlgorithm::ES256);
        let claims = crypto.verify(&token, &EC_KEY.public_pem, &params).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("alice"));

        let err = crypto
            .verify(&token, &ED_KEY.public_pem, &params)
            .unwrap_err();
        assert!(matches!(err, DomainError::Verification { .. }));
    }

    #[test]
    fn test_eddsa_round_trip() {
        let crypto = JwtCrypto::new();
        let key = PrivateKeyDefinition::new(SigningAlgorithm::EdDSA, ED_KEY.private_pem.as_str());
        let token = crypto.sign(&Claims::new(), &key, &sign_params()).unwrap();

        let params = verify_params(SigningAlgorithm::EdDSA);
        let claims = crypto.verify(&token, &ED_KEY.public_pem, &params).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("alice"));

        assert!(crypto.verify(&token, &EC_KEY.public_pem, &params).is_err());
    }

    #[test]
    fn test_invalid_private_key() {
        let crypto = JwtCrypto::new();
        let key = PrivateKeyDefinition::new(SigningAlgorithm::ES256, "garbage");
        let err = crypto.sign(&Claims::new(), &key, &sign_params()).unwrap_err();
        assert!(matches!(err, DomainError::Signing { .. }));
    }

    #[test]
    fn test_audience_and_issuer_mismatch() {
        let crypto = JwtCrypto::new();
        let params = SignParams {
            audience: Some("api".to_string()),
            issuer: Some("auth".to_string()),
            ..sign_params()
        };
        let token = crypto.sign(&Claims::new(), &hmac_key(), &params).unwrap();

        let mut expected = verify_params(SigningAlgorithm::HS256);
        expected.audience = Some(Audience::from("api"));
        expected.issuer = Some("auth".to_string());
        assert!(crypto.verify(&token, "secret", &expected).is_ok());

        expected.issuer = Some("elsewhere".to_string());
        let err = crypto.verify(&token, "secret", &expected).unwrap_err();
        assert!(matches!(err, DomainError::Verification { .. }));
    }

    #[test]
    fn test_max_age_without_issued_at() {
        let crypto = JwtCrypto::new();
        let params = SignParams {
            no_timestamp: true,
            ..sign_params()
        };
        let token = crypto.sign(&Claims::new(), &hmac_key(), &params).unwrap();

        let mut expected = verify_params(SigningAlgorithm::HS256);
        expected.max_age_secs = Some(60);
        let err = crypto.verify(&token, "secret", &expected).unwrap_err();
        assert!(matches!(err, DomainError::Verification { .. }));
    }

    #[test]
    fn test_max_age_boundary() {
        let crypto = JwtCrypto::new();
        let mut expected = verify_params(SigningAlgorithm::HS256);
        expected.max_age_secs = Some(60);
        let now = Utc::now().timestamp();

        // iat + maxAge + tolerance == now is already too old
        let claims = Claims {
            iat: Some(now - 65),
            ..Claims::default()
        };
        let token = crypto.sign(&claims, &hmac_key(), &sign_params()).unwrap();
        let err = crypto.verify(&token, "secret", &expected).unwrap_err();
        assert!(matches!(err, DomainError::Expired { .. }));

        let claims = Claims {
            iat: Some(now - 30),
            ..Claims::default()
        };
        let token = crypto.sign(&claims, &hmac_key(), &sign_params()).unwrap();
        assert!(crypto.verify(&token, "secret", &expected).is_ok());
    }

    #[test]
    fn test_nonce_missing() {
        let crypto = JwtCrypto::new();
        let token = crypto.sign(&Claims::new(), &hmac_key(), &sign_params()).unwrap();
        let mut expected = verify_params(SigningAlgorithm::HS256);
        expected.nonce = Some("abc".to_string());
        let err = crypto.verify(&token, "secret", &expected).unwrap_err();
        assert!(matches!(err, DomainError::Verification { .. }));
    }

    #[test]
    fn test_decode_rejects_malformed_tokens() {
        let crypto = JwtCrypto::new();
        for token in ["", "a.b", "a.b.c.d", "!!!.e30.sig"] {
            let err = crypto.decode(token).unwrap_err();
            assert!(matches!(err, DomainError::Parse { .. }), "{}", token);
        }

        let unknown_alg = format!(
            "{}.e30.sig",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#)
        );
        assert!(matches!(
            crypto.decode(&unknown_alg).unwrap_err(),
            DomainError::Parse { .. }
        ));
    }
}

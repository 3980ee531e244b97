//! Serialization of domain blobs into the `scope` claim
//!
//! Format: `domain1:base64(bytes1);domain2:base64(bytes2)` using the standard
//! padded base64 alphabet, segments in insertion order, no trailing separator.

use base64::{engine::general_purpose::STANDARD, Engine};

use super::DomainBlobs;
use crate::domain::DomainError;

const DOMAIN_SEPARATOR: char = ':';
const SEGMENT_SEPARATOR: char = ';';

/// Encodes and decodes the packed scope claim
pub struct ScopeCodec;

impl ScopeCodec {
    /// Encodes every domain that has at least one granted bit.
    ///
    /// Returns an empty string when nothing is granted.
    pub fn encode(blobs: &DomainBlobs) -> String {
        blobs
            .iter()
            .map(|(domain, bytes)| {
                format!("{}{}{}", domain, DOMAIN_SEPARATOR, STANDARD.encode(bytes))
            })
            .collect::<Vec<_>>()
            .join(&SEGMENT_SEPARATOR.to_string())
    }

    /// Decodes a scope claim.
    ///
    /// Both separators are treated alike: the claim is split into a flat token
    /// stream and read as alternating domain/value pairs.
    pub fn decode(claim: &str) -> Result<DomainBlobs, DomainError> {
        let mut blobs = DomainBlobs::new();
        if claim.is_empty() {
            return Ok(blobs);
        }

        let tokens: Vec<&str> = claim
            .split([DOMAIN_SEPARATOR, SEGMENT_SEPARATOR])
            .collect();

        for pair in tokens.chunks(2) {
            let [domain, encoded] = pair else {
                return Err(DomainError::parse(format!(
                    "Scope claim has a domain without a value: {}",
                    claim
                )));
            };
            let bytes = STANDARD.decode(encoded).map_err(|e| {
                DomainError::parse(format!("Invalid base64 for scope domain '{}': {}", domain, e))
            })?;
            blobs.insert(*domain, bytes);
        }

        Ok(blobs)
    }
}

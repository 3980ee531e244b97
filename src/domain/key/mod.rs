//! Key domain - signing algorithms, key definitions and their resolution

mod algorithm;
mod definition;
mod resolver;
mod source;

#[cfg(test)]
pub mod fixtures;

pub use algorithm::{KeyFamily, SigningAlgorithm, ASYMMETRIC_ALGORITHMS, SYMMETRIC_ALGORITHMS};
pub use definition::{KeyDefinition, PrivateKeyDefinition};
pub use resolver::KeyResolver;
pub use source::{PrivateKeySource, PublicKeySource};

#[cfg(test)]
pub use source::mock;

//! Infrastructure layer - Crypto backend, sources and logging

pub mod jwt;
pub mod keys;
pub mod logging;
pub mod scopes;

pub use jwt::JwtCrypto;
pub use keys::{EnvKeySource, DEFAULT_KEY_ENV_PREFIX};
pub use scopes::FileScopeSource;

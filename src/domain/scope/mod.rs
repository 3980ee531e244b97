//! Scope domain - packed permission bits and their name resolution

mod blob;
mod codec;
mod name;
mod registry;

pub use blob::{BitPosition, DomainBlobs};
pub use codec::ScopeCodec;
pub use name::{ScopeName, ScopeSet, DEFAULT_DOMAIN};
pub use registry::{
    scope_map, DomainScopeMap, ScopeRegistry, ScopeSource, DEFAULT_REFRESH_COOL_DOWN,
};

#[cfg(test)]
pub use registry::mock;

//! Scope names and bulk scope inputs

use std::collections::HashMap;
use std::fmt;

/// Domain assigned to combined scope strings that carry no `domain|` prefix
pub const DEFAULT_DOMAIN: &str = "app";

/// A scope addressed by its domain and name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeName {
    domain: String,
    scope: String,
}

impl ScopeName {
    pub fn new(domain: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            scope: scope.into(),
        }
    }

    /// Parses the combined `domain|scope` form.
    ///
    /// The domain ends at the first `|`, so `a|b|c` addresses scope `b|c` in
    /// domain `a`. Without a `|` (or with an empty domain or scope around it)
    /// the whole string is the scope name and the domain is [`DEFAULT_DOMAIN`].
    pub fn parse(combined: &str) -> Self {
        match combined.split_once('|') {
            Some((domain, scope)) if !domain.is_empty() && !scope.is_empty() => {
                Self::new(domain, scope)
            }
            _ => Self::new(DEFAULT_DOMAIN, combined),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }
}

impl fmt::Display for ScopeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.domain, self.scope)
    }
}

impl From<&str> for ScopeName {
    fn from(combined: &str) -> Self {
        Self::parse(combined)
    }
}

impl From<(&str, &str)> for ScopeName {
    fn from((domain, scope): (&str, &str)) -> Self {
        Self::new(domain, scope)
    }
}

/// An ordered collection of scopes for the bulk grant/revoke/check operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeSet {
    domains: Vec<(String, Vec<String>)>,
}

impl ScopeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups combined `domain|scope` strings by domain, in first-seen order
    pub fn from_combined<I, S>(combined: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for item in combined {
            let name = ScopeName::parse(item.as_ref());
            set.push(name.domain, name.scope);
        }
        set
    }

    /// Adds the given scopes under a domain
    pub fn with_domain<I, S>(mut self, domain: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let domain = domain.into();
        for scope in scopes {
            self.push(domain.clone(), scope.into());
        }
        self
    }

    fn push(&mut self, domain: String, scope: String) {
        match self.domains.iter_mut().find(|(d, _)| *d == domain) {
            Some((_, scopes)) => scopes.push(scope),
            None => self.domains.push((domain, vec![scope])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.domains.iter().all(|(_, scopes)| scopes.is_empty())
    }

    /// Iterates every scope, domain by domain
    pub fn iter(&self) -> impl Iterator<Item = ScopeName> + '_ {
        self.domains.iter().flat_map(|(domain, scopes)| {
            scopes
                .iter()
                .map(move |scope| ScopeName::new(domain.as_str(), scope.as_str()))
        })
    }
}

impl From<HashMap<String, Vec<String>>> for ScopeSet {
    fn from(map: HashMap<String, Vec<String>>) -> Self {
        map.into_iter()
            .fold(Self::new(), |set, (domain, scopes)| set.with_domain(domain, scopes))
    }
}

impl From<Vec<&str>> for ScopeSet {
    fn from(combined: Vec<&str>) -> Self {
        Self::from_combined(combined)
    }
}

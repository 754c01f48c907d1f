//! Reverse DNS for report output.
//!
//! Reports map client addresses to host names through a [`HostnameCache`]
//! owned by the command. Each address is resolved at most once per cache;
//! failures fall back to the address itself.

use std::collections::HashMap;
use std::net::IpAddr;
use tracing::debug;

/// Address to host name lookup
pub trait Resolver {
    /// Host name for `ip`, or `None` when it cannot be resolved
    fn resolve(&self, ip: &str) -> Option<String>;
}

/// Resolver backed by the operating system (`getnameinfo`)
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    fn resolve(&self, ip: &str) -> Option<String> {
        let addr: IpAddr = ip.parse().ok()?;
        match dns_lookup::lookup_addr(&addr) {
            Ok(name) => Some(name),
            Err(err) => {
                debug!(ip, error = %err, "reverse lookup failed");
                None
            }
        }
    }
}

/// Memoizing wrapper around a [`Resolver`].
pub struct HostnameCache<R = SystemResolver> {
    resolver: R,
    cache: HashMap<String, String>,
}

impl HostnameCache<SystemResolver> {
    pub fn system() -> Self {
        Self::new(SystemResolver)
    }
}

impl<R: Resolver> HostnameCache<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            cache: HashMap::new(),
        }
    }

    /// Host name for `ip`, or `ip` itself when the lookup fails
    pub fn lookup(&mut self, ip: &str) -> String {
        if let Some(name) = self.cache.get(ip) {
            return name.clone();
        }
        let name = self.resolver.resolve(ip).unwrap_or_else(|| ip.to_string());
        self.cache.insert(ip.to_string(), name.clone());
        name
    }

    /// Number of distinct addresses looked up so far
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

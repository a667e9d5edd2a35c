//! Service name to crawler mapping, filled once at startup.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::crawl::Crawler;

/// Registered crawlers by service name.
#[derive(Clone, Default)]
pub struct ServiceRegistry {
    services: HashMap<String, Arc<dyn Crawler>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `crawler` under `name`.
    ///
    /// Blank names are logged and ignored; registration never fails loudly.
    pub fn register(&mut self, name: &str, crawler: Arc<dyn Crawler>) {
        if name.trim().is_empty() {
            tracing::warn!(service = name, "failed to register service: blank name");
            return;
        }
        if self.services.insert(name.to_string(), crawler).is_some() {
            tracing::warn!(service = name, "service registration replaced an existing crawler");
        }
        tracing::info!(service = name, "service successfully registered");
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Crawler>> {
        self.services.get(name).cloned()
    }

    /// Registered service names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.services.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry").field("services", &self.names()).finish()
    }
}

//! User-Agent rotation.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Agents handed out by [`UserAgentPool::default`].
pub const DEFAULT_USER_AGENTS: [&str; 8] = [
    "Mozilla/5.0 (Windows NT 5.2; RW; rv:7.0a1) Gecko/20091211 Niadh/0.1.0a1pre",
    "Mozilla/5.0 (Macintosh; U; Intel Mac OS X; en) AppleWebKit/418.9 (KHTML, like Gecko) Niadh/0.1.0",
    "Mozilla/5.0 Niadh/0.1.0alpha1 (universal-apple-darwin11.0) libcurl/7.21.4 OpenSSL/0.9.8r zlib/1.2.5",
    "Mozilla/5.0 (X11) KHTML/4.9.1 (like Gecko) Niadh/0.1.0",
    "Mozilla/5.0 (Windows NT 10.0; WOW64; rv:38.0) Gecko/20100101 Niadh/0.1.0 Lightning/4.0.2",
    "Mozilla/1.22 (compatible; Niadh 10.0; Windows 3.1)",
    "Mozilla/5.0 (compatible; Niadh Web Downloader/0.1.0alpha1)",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_6_8) AppleWebKit/537.13+ (KHTML, like Gecko) Version/0.1.0alpha Niadh/0.1.0alpha",
];

/// Round-robin pool of User-Agent strings, tracked separately per origin.
#[derive(Debug)]
pub struct UserAgentPool {
    agents: Vec<String>,
    usage: Mutex<HashMap<String, usize>>,
}

impl Default for UserAgentPool {
    fn default() -> Self {
        Self::new(DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect())
    }
}

impl UserAgentPool {
    /// Pool over `agents`. An empty list falls back to [`DEFAULT_USER_AGENTS`].
    pub fn new(agents: Vec<String>) -> Self {
        if agents.is_empty() {
            return Self::default();
        }
        Self { agents, usage: Mutex::new(HashMap::new()) }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Next agent for `origin`, cycling through the pool in order.
    pub fn next(&self, origin: &str) -> &str {
        let mut usage = self.usage.lock().unwrap_or_else(PoisonError::into_inner);
        let counter = usage.entry(origin.to_string()).or_insert(0);
        let index = *counter % self.agents.len();
        *counter = index + 1;
        &self.agents[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_cycles_through_pool() {
        let pool = UserAgentPool::default();
        let origin = "https://api.mercadolibre.com";

        let first_round: Vec<String> = (0..8).map(|_| pool.next(origin).to_string()).collect();
        let distinct: HashSet<&String> = first_round.iter().collect();
        assert_eq!(distinct.len(), 8);
        assert_eq!(first_round[0], DEFAULT_USER_AGENTS[0]);

        assert_eq!(pool.next(origin), first_round[0]);
        assert_eq!(pool.next(origin), first_round[1]);
    }

    #[test]
    fn test_origins_are_independent() {
        let pool = UserAgentPool::default();
        assert_eq!(pool.next("https://a.example"), DEFAULT_USER_AGENTS[0]);
        assert_eq!(pool.next("https://a.example"), DEFAULT_USER_AGENTS[1]);
        assert_eq!(pool.next("https://b.example"), DEFAULT_USER_AGENTS[0]);
    }

    #[test]
    fn test_empty_pool_uses_defaults() {
        let pool = UserAgentPool::new(Vec::new());
        assert_eq!(pool.len(), DEFAULT_USER_AGENTS.len());
        assert!(!pool.is_empty());
    }

    #[test]
    fn test_custom_agents() {
        let pool = UserAgentPool::new(vec!["a".into(), "b".into()]);
        let seen: Vec<&str> = (0..5).map(|_| pool.next("o")).collect();
        assert_eq!(seen, ["a", "b", "a", "b", "a"]);
    }
}

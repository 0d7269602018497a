use std::collections::HashSet;

/// URLs already attempted during this process lifetime. Insert-only and
/// never persisted: a restart sees every listing as new again.
#[derive(Debug, Default)]
pub struct DedupStore {
    seen: HashSet<String>,
}

impl DedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_seen(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn mark_seen(&mut self, url: &str) {
        if !self.seen.contains(url) {
            self.seen.insert(url.to_string());
        }
    }

    /// Check-then-mark in one step. Returns `true` if the URL was new.
    pub fn check_and_mark(&mut self, url: &str) -> bool {
        if self.has_seen(url) {
            return false;
        }
        self.mark_seen(url);
        true
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_seen_is_idempotent() {
        let mut store = DedupStore::new();
        store.mark_seen("https://www.spitogatos.gr/en/property/1");
        store.mark_seen("https://www.spitogatos.gr/en/property/1");
        assert!(store.has_seen("https://www.spitogatos.gr/en/property/1"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_check_and_mark() {
        let mut store = DedupStore::new();
        assert!(store.is_empty());
        assert!(store.check_and_mark("https://www.spitogatos.gr/en/property/1"));
        assert!(!store.check_and_mark("https://www.spitogatos.gr/en/property/1"));
        assert!(store.check_and_mark("https://www.spitogatos.gr/en/property/2"));
    }

    #[test]
    fn test_urls_compare_exactly() {
        let mut store = DedupStore::new();
        store.mark_seen("https://www.spitogatos.gr/en/property/1");
        assert!(!store.has_seen("https://www.spitogatos.gr/en/property/1/"));
        assert!(!store.has_seen("https://www.spitogatos.gr/en/property/1?ref=alert"));
    }
}

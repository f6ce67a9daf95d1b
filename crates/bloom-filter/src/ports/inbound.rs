//! Inbound Ports (Driving Ports)
//!
//! These traits define the API that callers use to interact with a
//! membership filter, so an in-memory filter can be swapped for one
//! backed by external storage.

use crate::domain::BloomFilter;

/// Primary membership filter API (Driving Port)
pub trait MembershipFilter: Send + Sync {
    /// Add an element; `true` if it was not already fully represented
    fn add(&self, element: &str) -> bool;

    /// `false` means definitely absent, `true` means possibly present
    fn contains(&self, element: &str) -> bool;

    /// Remove all elements
    fn clear(&self);

    /// Release any held resources
    fn dispose(&self) {}
}

impl MembershipFilter for BloomFilter {
    fn add(&self, element: &str) -> bool {
        BloomFilter::add(self, element)
    }

    fn contains(&self, element: &str) -> bool {
        BloomFilter::contains(self, element)
    }

    fn clear(&self) {
        BloomFilter::clear(self)
    }

    fn dispose(&self) {
        BloomFilter::dispose(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_bloom_filter_behind_trait_object() {
        let filter: Arc<dyn MembershipFilter> = Arc::new(BloomFilter::new(100, 0.01).unwrap());

        assert!(filter.add("one"));
        assert!(filter.contains("one"));

        filter.clear();
        assert!(!filter.contains("one"));

        filter.dispose();
    }
}

use std::collections::HashSet;

use crate::catalog::normalize::RowRejection;
use crate::domain::types::ProductRef;

/// Tracks primary keys already accepted in the current import run.
///
/// Only the feed itself is consulted: the destination catalog is replaced
/// wholesale, so keys it already holds are irrelevant here.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<ProductRef>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits the first occurrence of `product_ref` and rejects any repeat.
    pub fn admit(&mut self, product_ref: &ProductRef) -> Result<(), RowRejection> {
        if self.seen.insert(product_ref.clone()) {
            Ok(())
        } else {
            Err(RowRejection::DuplicateRefInBatch)
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_occurrence_wins() {
        let mut dedup = Deduplicator::new();
        let a = ProductRef::new("A").unwrap();
        let b = ProductRef::new("B").unwrap();

        assert_eq!(dedup.admit(&a), Ok(()));
        assert_eq!(dedup.admit(&b), Ok(()));
        assert_eq!(dedup.admit(&a), Err(RowRejection::DuplicateRefInBatch));
        assert_eq!(dedup.len(), 2);
    }

    #[test]
    fn keys_are_compared_after_trimming() {
        let mut dedup = Deduplicator::new();

        assert!(dedup.admit(&ProductRef::new("A").unwrap()).is_ok());
        assert!(dedup.admit(&ProductRef::new(" A ").unwrap()).is_err());
    }

    #[test]
    fn keys_are_case_sensitive() {
        let mut dedup = Deduplicator::new();

        assert!(dedup.admit(&ProductRef::new("a").unwrap()).is_ok());
        assert!(dedup.admit(&ProductRef::new("A").unwrap()).is_ok());
    }
}

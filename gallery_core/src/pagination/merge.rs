use crate::pagination::traits::Identified;
use std::collections::HashSet;

/// An append-only list with at most one item per identifier.
///
/// Order is first appearance across every batch ever merged.
#[derive(Debug, Clone)]
pub struct MergedList<T> {
    items: Vec<T>,
    seen: HashSet<String>,
}

impl<T> Default for MergedList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
        }
    }
}

impl<T: Identified> MergedList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the list from already materialized items, dropping repeats.
    pub fn from_items(existing: impl IntoIterator<Item = T>) -> Self {
        let mut list = Self::new();
        list.extend_batch(existing);
        list
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Appends unseen items of one batch; returns how many were accepted.
    pub fn extend_batch(&mut self, batch: impl IntoIterator<Item = T>) -> usize {
        let before = self.items.len();
        for item in batch {
            if self.seen.insert(item.id().to_string()) {
                self.items.push(item);
            }
        }
        self.items.len() - before
    }

    /// Appends several batches in the order given.
    pub fn extend_batches<B>(&mut self, batches: impl IntoIterator<Item = B>) -> usize
    where
        B: IntoIterator<Item = T>,
    {
        batches.into_iter().map(|b| self.extend_batch(b)).sum()
    }
}

/// Merges `batches` after `existing`, keeping each identifier's first position.
pub fn merge_batch<T, B>(existing: Vec<T>, batches: impl IntoIterator<Item = B>) -> Vec<T>
where
    T: Identified,
    B: IntoIterator<Item = T>,
{
    let mut list = MergedList::from_items(existing);
    list.extend_batches(batches);
    list.into_items()
}

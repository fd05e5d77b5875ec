//! Indexed min-priority queue.
//!
//! A binary heap paired with a membership set. The set makes `contains`
//! O(1) and lets `push` ignore items that are already queued: a queued
//! vertex keeps the priority it was first pushed with.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::hash::Hash;

/// Heap entry ordered so that `BinaryHeap` (a max-heap) pops the smallest
/// priority first. Equal priorities pop in insertion order.
#[derive(Debug, Clone)]
struct Entry<T> {
    priority: f64,
    seq: u64,
    item: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: lower priority, then earlier sequence, is "greater".
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-priority queue with O(1) membership and O(1) peek.
#[derive(Debug, Clone)]
pub struct PriorityQueue<T: Eq + Hash + Clone> {
    heap: BinaryHeap<Entry<T>>,
    members: HashSet<T>,
    next_seq: u64,
}

impl<T: Eq + Hash + Clone> PriorityQueue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            members: HashSet::new(),
            next_seq: 0,
        }
    }

    /// Insert `item` with `priority`.
    ///
    /// Returns `false` and leaves the queue untouched if the item is
    /// already queued.
    pub fn push(&mut self, item: T, priority: f64) -> bool {
        if !self.members.insert(item.clone()) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { priority, seq, item });
        true
    }

    /// Remove and return the item with the smallest priority.
    pub fn pop(&mut self) -> Option<(T, f64)> {
        let entry = self.heap.pop()?;
        self.members.remove(&entry.item);
        Some((entry.item, entry.priority))
    }

    /// Smallest queued priority, or `f64::INFINITY` when empty.
    pub fn peek_priority(&self) -> f64 {
        self.heap
            .peek()
            .map(|e| e.priority)
            .unwrap_or(f64::INFINITY)
    }

    /// Whether `item` is currently queued.
    pub fn contains(&self, item: &T) -> bool {
        self.members.contains(item)
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterate over queued items in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.members.iter()
    }

    /// Recompute every queued item's priority and rebuild the heap.
    ///
    /// Relative insertion order is preserved for ties.
    pub fn reprioritize<F>(&mut self, mut priority_of: F)
    where
        F: FnMut(&T) -> f64,
    {
        let entries: Vec<Entry<T>> = std::mem::take(&mut self.heap)
            .into_vec()
            .into_iter()
            .map(|mut e| {
                e.priority = priority_of(&e.item);
                e
            })
            .collect();
        self.heap = BinaryHeap::from(entries);
    }
}

impl<T: Eq + Hash + Clone> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_returns_smallest_priority() {
        let mut q = PriorityQueue::new();
        q.push("c", 3.0);
        q.push("a", 1.0);
        q.push("b", 2.0);

        assert_eq!(q.pop(), Some(("a", 1.0)));
        assert_eq!(q.pop(), Some(("b", 2.0)));
        assert_eq!(q.pop(), Some(("c", 3.0)));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn test_duplicate_push_keeps_original_priority() {
        let mut q = PriorityQueue::new();
        assert!(q.push("x", 5.0));
        assert!(!q.push("x", 0.5));

        assert_eq!(q.len(), 1);
        assert_eq!(q.peek_priority(), 5.0);
    }

    #[test]
    fn test_peek_priority_empty_is_infinity() {
        let q: PriorityQueue<&str> = PriorityQueue::new();
        assert!(q.peek_priority().is_infinite());
        assert!(q.is_empty());
    }

    #[test]
    fn test_membership_tracks_push_and_pop() {
        let mut q = PriorityQueue::new();
        q.push(1u32, 1.0);
        assert!(q.contains(&1));

        q.pop();
        assert!(!q.contains(&1));

        // Re-pushing after pop is allowed.
        assert!(q.push(1, 2.0));
    }

    #[test]
    fn test_ties_pop_in_insertion_order() {
        let mut q = PriorityQueue::new();
        for name in ["first", "second", "third"] {
            q.push(name, 1.0);
        }
        assert_eq!(q.pop().map(|(i, _)| i), Some("first"));
        assert_eq!(q.pop().map(|(i, _)| i), Some("second"));
        assert_eq!(q.pop().map(|(i, _)| i), Some("third"));
    }

    #[test]
    fn test_reprioritize_reorders() {
        let mut q = PriorityQueue::new();
        q.push("a", 1.0);
        q.push("b", 2.0);

        q.reprioritize(|item| if *item == "b" { 0.0 } else { 10.0 });

        assert_eq!(q.pop(), Some(("b", 0.0)));
        assert_eq!(q.pop(), Some(("a", 10.0)));
    }

    #[test]
    fn test_iter_covers_all_members() {
        let mut q = PriorityQueue::new();
        q.push(3, 0.3);
        q.push(1, 0.1);
        q.push(2, 0.2);

        let mut items: Vec<_> = q.iter().copied().collect();
        items.sort();
        assert_eq!(items, vec![1, 2, 3]);
    }
}

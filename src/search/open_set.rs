//! Key-indexed priority queue for best-first search
//!
//! A binary min-heap ordered by estimated total cost, paired with a
//! key-to-heap-position index so membership tests are O(1) and
//! replace-with-same-key (decrease-key) is O(log n).

use std::collections::HashMap;
use std::hash::Hash;

use ordered_float::OrderedFloat;

/// Node types expose the total estimated cost the heap orders by
pub trait EstimatedCost {
    fn estimated_total_cost(&self) -> f64;
}

#[derive(Debug)]
struct Entry<K, N> {
    key: K,
    node: N,
}

/// Open set of a best-first search.
///
/// Ties in estimated cost are broken by heap order, which is deterministic
/// for a given insertion order.
#[derive(Debug)]
pub struct OpenSet<K, N>
where
    K: Eq + Hash + Clone,
    N: EstimatedCost,
{
    entries: Vec<Entry<K, N>>,
    positions: HashMap<K, usize>,
}

impl<K, N> OpenSet<K, N>
where
    K: Eq + Hash + Clone,
    N: EstimatedCost,
{
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.positions.contains_key(key)
    }

    pub fn get(&self, key: &K) -> Option<&N> {
        self.positions.get(key).map(|&i| &self.entries[i].node)
    }

    /// Insert a node under a key not currently present
    pub fn push(&mut self, key: K, node: N) {
        debug_assert!(!self.contains(&key), "push with a key already in the open set");
        let i = self.entries.len();
        self.positions.insert(key.clone(), i);
        self.entries.push(Entry { key, node });
        self.sift_up(i);
    }

    /// Replace the node stored under an existing key and restore heap order
    pub fn replace(&mut self, key: &K, node: N) {
        let i = *self
            .positions
            .get(key)
            .expect("replace with a key not in the open set");
        self.entries[i].node = node;
        self.sift_up(i);
        self.sift_down(i);
    }

    /// Remove and return the entry with the smallest estimated total cost
    pub fn pop_most_promising(&mut self) -> Option<(K, N)> {
        if self.entries.is_empty() {
            return None;
        }
        let last = self.entries.len() - 1;
        self.swap_entries(0, last);
        let entry = self.entries.pop().unwrap();
        self.positions.remove(&entry.key);
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Some((entry.key, entry.node))
    }

    fn cost(&self, i: usize) -> OrderedFloat<f64> {
        OrderedFloat(self.entries[i].node.estimated_total_cost())
    }

    fn swap_entries(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.entries.swap(a, b);
        self.positions.insert(self.entries[a].key.clone(), a);
        self.positions.insert(self.entries[b].key.clone(), b);
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.cost(i) < self.cost(parent) {
                self.swap_entries(i, parent);
                i = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        loop {
            let left = 2 * i + 1;
            let right = 2 * i + 2;
            let mut smallest = i;
            if left < self.entries.len() && self.cost(left) < self.cost(smallest) {
                smallest = left;
            }
            if right < self.entries.len() && self.cost(right) < self.cost(smallest) {
                smallest = right;
            }
            if smallest == i {
                break;
            }
            self.swap_entries(i, smallest);
            i = smallest;
        }
    }
}

impl<K, N> Default for OpenSet<K, N>
where
    K: Eq + Hash + Clone,
    N: EstimatedCost,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct TestNode {
        cost: f64,
        tag: u32,
    }

    impl EstimatedCost for TestNode {
        fn estimated_total_cost(&self) -> f64 {
            self.cost
        }
    }

    fn node(cost: f64, tag: u32) -> TestNode {
        TestNode { cost, tag }
    }

    #[test]
    fn test_pop_in_cost_order() {
        let mut open = OpenSet::new();
        open.push("c", node(3.0, 0));
        open.push("a", node(1.0, 1));
        open.push("d", node(4.0, 2));
        open.push("b", node(2.0, 3));

        let order: Vec<&str> = std::iter::from_fn(|| open.pop_most_promising())
            .map(|(k, _)| k)
            .collect();
        assert_eq!(order, vec!["a", "b", "c", "d"]);
        assert!(open.is_empty());
    }

    #[test]
    fn test_contains_and_get() {
        let mut open = OpenSet::new();
        open.push(7u32, node(5.0, 0));
        assert!(open.contains(&7));
        assert!(!open.contains(&8));
        assert_eq!(open.get(&7).unwrap().cost, 5.0);
        assert!(open.get(&8).is_none());
    }

    #[test]
    fn test_pop_removes_from_index() {
        let mut open = OpenSet::new();
        open.push(1u32, node(1.0, 0));
        let (k, _) = open.pop_most_promising().unwrap();
        assert_eq!(k, 1);
        assert!(!open.contains(&1));
        assert_eq!(open.len(), 0);
    }

    #[test]
    fn test_replace_decrease_key() {
        let mut open = OpenSet::new();
        open.push("x", node(10.0, 0));
        open.push("y", node(5.0, 1));
        open.replace(&"x", node(1.0, 2));

        let (k, n) = open.pop_most_promising().unwrap();
        assert_eq!(k, "x");
        assert_eq!(n.tag, 2);
        assert_eq!(open.len(), 1);
    }

    #[test]
    fn test_replace_increase_key() {
        let mut open = OpenSet::new();
        open.push("x", node(1.0, 0));
        open.push("y", node(5.0, 1));
        open.replace(&"x", node(9.0, 2));

        let (k, _) = open.pop_most_promising().unwrap();
        assert_eq!(k, "y");
        let (k, n) = open.pop_most_promising().unwrap();
        assert_eq!(k, "x");
        assert_eq!(n.tag, 2);
    }

    #[test]
    fn test_deterministic_for_same_insertion_order() {
        let run = || {
            let mut open = OpenSet::new();
            for (i, c) in [3.0, 1.0, 2.0, 1.0, 3.0, 2.0].iter().enumerate() {
                open.push(i, node(*c, i as u32));
            }
            std::iter::from_fn(move || open.pop_most_promising())
                .map(|(k, _)| k)
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_interleaved_push_pop() {
        let mut open = OpenSet::new();
        open.push(0u32, node(4.0, 0));
        open.push(1, node(2.0, 1));
        assert_eq!(open.pop_most_promising().unwrap().0, 1);
        open.push(2, node(1.0, 2));
        open.push(3, node(3.0, 3));
        assert_eq!(open.pop_most_promising().unwrap().0, 2);
        assert_eq!(open.pop_most_promising().unwrap().0, 3);
        assert_eq!(open.pop_most_promising().unwrap().0, 0);
        assert!(open.pop_most_promising().is_none());
    }
}

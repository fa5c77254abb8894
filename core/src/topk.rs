//! Bounded min-heap for top-k selection.
//!
//! Holds at most `k` results. The root is the weakest kept result, so a new
//! result costs one comparison once the heap is full and `O(log k)` when it
//! displaces the root.

use crate::DocId;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub doc_id: DocId,
    pub score: f32,
}

impl ScoredResult {
    pub fn new(doc_id: DocId, score: f32) -> Self { Self { doc_id, score } }

    /// Result order: score descending, then doc id ascending.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        OrderedFloat(other.score)
            .cmp(&OrderedFloat(self.score))
            .then(self.doc_id.cmp(&other.doc_id))
    }

    // Larger key = better result.
    fn key(&self) -> (OrderedFloat<f32>, Reverse<DocId>) { (OrderedFloat(self.score), Reverse(self.doc_id)) }
}

pub struct TopK {
    capacity: usize,
    heap: BinaryHeap<Reverse<(OrderedFloat<f32>, Reverse<DocId>)>>,
}

impl TopK {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, heap: BinaryHeap::with_capacity(capacity.min(1024)) }
    }

    pub fn len(&self) -> usize { self.heap.len() }

    pub fn is_empty(&self) -> bool { self.heap.is_empty() }

    /// Weakest result currently kept.
    pub fn min(&self) -> Option<ScoredResult> {
        self.heap.peek().map(|Reverse((score, Reverse(doc_id)))| ScoredResult::new(*doc_id, score.0))
    }

    /// Pushes while below capacity; once full, replaces the minimum only when
    /// `result` beats it. Returns whether the result was kept.
    pub fn offer(&mut self, result: ScoredResult) -> bool {
        if self.capacity == 0 {
            return false;
        }
        let key = result.key();
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(key));
            return true;
        }
        match self.heap.peek_mut() {
            Some(mut root) if key > root.0 => {
                *root = Reverse(key);
                true
            }
            _ => false,
        }
    }

    /// Drains the heap, best result first.
    pub fn into_sorted_vec(self) -> Vec<ScoredResult> {
        // Ascending order of Reverse(key) is descending order of key.
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse((score, Reverse(doc_id)))| ScoredResult::new(doc_id, score.0))
            .collect()
    }
}

impl Extend<ScoredResult> for TopK {
    fn extend<I: IntoIterator<Item = ScoredResult>>(&mut self, iter: I) {
        for result in iter {
            self.offer(result);
        }
    }
}

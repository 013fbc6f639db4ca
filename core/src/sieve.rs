use crate::DocId;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy)]
struct Candidate {
    score: f64,
    id: DocId,
}

// Higher score is better; on equal scores the lower id is better.
impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score.total_cmp(&other.score).then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

/// Keeps the best `capacity` (score, id) pairs offered to it.
#[derive(Debug)]
pub struct Sieve {
    capacity: Option<usize>,
    heap: BinaryHeap<Reverse<Candidate>>,
}

impl Sieve {
    /// `None` keeps everything.
    pub fn new(capacity: Option<usize>) -> Self {
        Self { capacity, heap: BinaryHeap::new() }
    }

    pub fn sift(&mut self, score: f64, id: DocId) {
        let candidate = Candidate { score, id };
        match self.capacity {
            Some(0) => {}
            Some(k) if self.heap.len() >= k => {
                if let Some(mut worst) = self.heap.peek_mut() {
                    if candidate > worst.0 {
                        *worst = Reverse(candidate);
                    }
                }
            }
            _ => self.heap.push(Reverse(candidate)),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Survivors by descending score, ties by ascending id.
    pub fn winners(self) -> Vec<(f64, DocId)> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(c)| (c.score, c.id))
            .collect()
    }
}

//! The k-nearest-neighbor query engine.

use std::collections::BinaryHeap;

use crate::error::{KdIndexError, Result};
use crate::index::{KDTree, Node, Record};
use crate::r#type::CoordNum;

/// A candidate record and its reduced distance, ordered for use in the
/// bounded max-heap.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate<N: CoordNum> {
    dist: N,
    item: u32,
}

impl<N: CoordNum> Eq for Candidate<N> {}

impl<N: CoordNum> Ord for Candidate<N> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // We don't allow NaN. This should only panic on NaN
        self.dist
            .partial_cmp(&other.dist)
            .unwrap()
            .then_with(|| self.item.cmp(&other.item))
    }
}

impl<N: CoordNum> PartialOrd for Candidate<N> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// The best-k-so-far set: a max-heap capped at `capacity` entries, so the
/// current worst candidate is always at the top. `offer` is `O(log k)`,
/// peeking the worst is `O(1)`.
struct CandidateHeap<N: CoordNum> {
    heap: BinaryHeap<Candidate<N>>,
    capacity: usize,
}

impl<N: CoordNum> CandidateHeap<N> {
    fn new(capacity: usize) -> Self {
        debug_assert!(capacity >= 1);
        Self {
            heap: BinaryHeap::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Whether a subtree whose lower bound is `dist` could still contribute
    /// a candidate.
    #[inline]
    fn admits(&self, dist: N) -> bool {
        self.heap.len() < self.capacity || self.heap.peek().is_some_and(|worst| dist < worst.dist)
    }

    /// Insert a candidate, evicting the current worst if the heap is full
    /// and the newcomer is strictly closer. On an exact distance tie at the
    /// cutoff the incumbent stays.
    #[inline]
    fn offer(&mut self, dist: N, item: u32) {
        if self.heap.len() < self.capacity {
            self.heap.push(Candidate { dist, item });
        } else if self.heap.peek().is_some_and(|worst| dist < worst.dist) {
            self.heap.pop();
            self.heap.push(Candidate { dist, item });
        }
    }

    /// Drain into a list sorted by ascending (distance, record index).
    fn into_sorted_items(self) -> Vec<u32> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|c| c.item)
            .collect()
    }
}

impl<N: CoordNum, P> KDTree<N, P> {
    /// The `k` records closest to `query`, nearest first.
    ///
    /// Returns fewer than `k` records only when the tree holds fewer than
    /// `k`. Results are ordered by ascending distance, with exact distance
    /// ties broken by ascending record index; when more than `k` records
    /// tie at the cutoff distance, which of the tied records are retained
    /// is unspecified (but stable for a given tree).
    ///
    /// Fails with [`KdIndexError::InvalidK`] if `k == 0` and with
    /// [`KdIndexError::DimensionMismatch`] if the query point's length
    /// differs from [`dim`][Self::dim].
    pub fn nearest(&self, query: &[N], k: usize) -> Result<Vec<Record<'_, N, P>>> {
        self.nearest_with(query, k, |_| true)
    }

    /// Like [`nearest`][Self::nearest], restricted to records accepted by
    /// `filter`.
    ///
    /// The filter is consulted only for leaves the traversal actually
    /// visits and never influences which subtrees are pruned, so it cannot
    /// cost correctness — only acceptance. If fewer than `k` records
    /// satisfy the filter, all of them are returned.
    pub fn nearest_with<F>(&self, query: &[N], k: usize, filter: F) -> Result<Vec<Record<'_, N, P>>>
    where
        F: Fn(&Record<'_, N, P>) -> bool,
    {
        if k == 0 {
            return Err(KdIndexError::InvalidK);
        }
        self.check_query(query)?;

        let mut heap = CandidateHeap::new(k);
        self.search_nearest(self.root, query, &filter, &mut heap);

        Ok(heap
            .into_sorted_items()
            .into_iter()
            .map(|item| self.get(item))
            .collect())
    }

    /// Depth-first branch-and-bound descent: visit the nearer child first
    /// so the candidate set tightens early, then enter the farther child
    /// only if its bounding box could still beat the current worst
    /// candidate.
    fn search_nearest<F>(&self, node: u32, query: &[N], filter: &F, heap: &mut CandidateHeap<N>)
    where
        F: Fn(&Record<'_, N, P>) -> bool,
    {
        match self.nodes[node as usize] {
            Node::Leaf { item } => {
                let record = self.get(item);
                if filter(&record) {
                    let dist = self.metric.reduced_dist(query, record.point);
                    heap.offer(dist, item);
                }
            }
            Node::Internal { left, right, .. } => {
                let dist_left = self.min_reduced_dist(left, query);
                let dist_right = self.min_reduced_dist(right, query);

                let (near, near_dist, far, far_dist) = if dist_left <= dist_right {
                    (left, dist_left, right, dist_right)
                } else {
                    (right, dist_right, left, dist_left)
                };

                if heap.admits(near_dist) {
                    self.search_nearest(near, query, filter, heap);
                }
                if heap.admits(far_dist) {
                    self.search_nearest(far, query, filter, heap);
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn heap_fills_then_evicts() {
        let mut heap = CandidateHeap::<f64>::new(3);
        heap.offer(9.0, 0);
        heap.offer(4.0, 1);
        heap.offer(1.0, 2);
        // Full; farther candidates are rejected.
        heap.offer(16.0, 3);
        assert_eq!(heap.into_sorted_items(), vec![2, 1, 0]);

        let mut heap = CandidateHeap::<f64>::new(3);
        heap.offer(9.0, 0);
        heap.offer(4.0, 1);
        heap.offer(1.0, 2);
        // Closer candidate evicts the worst.
        heap.offer(2.0, 3);
        assert_eq!(heap.into_sorted_items(), vec![2, 3, 1]);
    }

    #[test]
    fn heap_keeps_incumbent_on_cutoff_tie() {
        let mut heap = CandidateHeap::<f64>::new(2);
        heap.offer(1.0, 0);
        heap.offer(4.0, 1);
        heap.offer(4.0, 2);
        assert_eq!(heap.into_sorted_items(), vec![0, 1]);
    }

    #[test]
    fn heap_admits_tracks_worst() {
        let mut heap = CandidateHeap::<f64>::new(2);
        assert!(heap.admits(100.0));
        heap.offer(1.0, 0);
        assert!(heap.admits(100.0), "not yet full");
        heap.offer(4.0, 1);
        assert!(heap.admits(3.9));
        assert!(!heap.admits(4.0), "ties cannot improve the set");
        assert!(!heap.admits(5.0));
    }

    #[test]
    fn heap_sorts_equal_distances_by_index() {
        let mut heap = CandidateHeap::<f64>::new(4);
        heap.offer(1.0, 7);
        heap.offer(1.0, 3);
        heap.offer(0.0, 5);
        heap.offer(1.0, 4);
        assert_eq!(heap.into_sorted_items(), vec![5, 3, 4, 7]);
    }
}

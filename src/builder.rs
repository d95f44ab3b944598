use std::cmp;

use crate::error::{KdIndexError, Result};
use crate::index::{KDTree, Node};
use crate::metric::Metric;
use crate::r#type::CoordNum;

/// How the builder chooses the splitting dimension of each internal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitPolicy {
    /// Cycle through the dimensions by tree depth (`depth % dim`).
    #[default]
    RoundRobin,
    /// Split on the dimension with the largest coordinate range in the
    /// current subset. Improves query pruning on skewed data at a small
    /// construction cost.
    MaxSpread,
}

/// A builder to create a [`KDTree`].
///
/// Records are added one at a time and the tree is built eagerly by
/// [`finish`][Self::finish]. A record's identity is the index returned by
/// [`add`][Self::add]; points with duplicate coordinates are kept as
/// distinct records.
///
/// Construction partitions each subset around its median coordinate with a
/// Floyd-Rivest selection (expected linear time), for an expected
/// `O(n log n)` build overall. Records whose coordinate equals the median
/// may land on either side of the split; the placement is deterministic
/// for a given insertion order.
#[derive(Debug, Clone)]
pub struct KDTreeBuilder<N: CoordNum, P> {
    dim: usize,
    coords: Vec<N>,
    payloads: Vec<P>,
    policy: SplitPolicy,
    metric: Metric,
}

impl<N: CoordNum, P> KDTreeBuilder<N, P> {
    /// Create a new builder for points of the provided dimension.
    pub fn new(dim: usize) -> Self {
        assert!(dim >= 1, "dimension must be at least 1");
        assert!(dim <= u16::MAX as usize);

        Self {
            dim,
            coords: Vec::new(),
            payloads: Vec::new(),
            policy: SplitPolicy::default(),
            metric: Metric::default(),
        }
    }

    /// Set the splitting-dimension policy. Defaults to
    /// [`SplitPolicy::RoundRobin`].
    pub fn with_split_policy(mut self, policy: SplitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the distance metric used by all queries against the finished
    /// tree. Defaults to [`Metric::Euclidean`].
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Add a point with its payload. Returns the record's index.
    pub fn add(&mut self, point: &[N], payload: P) -> Result<u32> {
        if point.len() != self.dim {
            return Err(KdIndexError::DimensionMismatch {
                expected: self.dim,
                actual: point.len(),
            });
        }

        let index = self.payloads.len() as u32;
        self.coords.extend_from_slice(point);
        self.payloads.push(payload);
        Ok(index)
    }

    /// Consume this builder, performing the recursive median split and
    /// producing a [`KDTree`] ready for queries.
    pub fn finish(self) -> Result<KDTree<N, P>> {
        let num_items = self.payloads.len();
        if num_items == 0 {
            return Err(KdIndexError::EmptyInput);
        }

        // The coordinate buffer stays in insertion order; construction
        // permutes this scratch id array instead.
        let mut ids: Vec<u32> = (0..num_items as u32).collect();

        let mut nodes = Vec::with_capacity(2 * num_items - 1);
        let mut bounds = Vec::with_capacity(2 * self.dim * num_items.saturating_sub(1));
        let root = build_subtree(
            &self.coords,
            self.dim,
            self.policy,
            &mut ids,
            0,
            num_items - 1,
            0,
            &mut nodes,
            &mut bounds,
        );

        Ok(KDTree {
            dim: self.dim,
            metric: self.metric,
            coords: self.coords,
            payloads: self.payloads,
            nodes,
            bounds,
            root,
        })
    }
}

/// Build the subtree over `ids[left..=right]`, pushing its nodes into the
/// arena (children before parent) and returning the subtree root's index.
#[allow(clippy::too_many_arguments)]
fn build_subtree<N: CoordNum>(
    coords: &[N],
    dim: usize,
    policy: SplitPolicy,
    ids: &mut [u32],
    left: usize,
    right: usize,
    depth: usize,
    nodes: &mut Vec<Node<N>>,
    bounds: &mut Vec<N>,
) -> u32 {
    if left == right {
        nodes.push(Node::Leaf { item: ids[left] });
        return (nodes.len() - 1) as u32;
    }

    // Tight box over the subset; also feeds the MaxSpread policy.
    let offset = subset_bounds(coords, dim, ids, left, right, bounds);

    let axis = match policy {
        SplitPolicy::RoundRobin => depth % dim,
        SplitPolicy::MaxSpread => widest_axis(bounds, offset, dim),
    };

    let m = (left + right) >> 1;
    if right - left == 1 {
        // Two records: order them directly instead of selecting.
        if key(coords, ids, dim, axis, right) < key(coords, ids, dim, axis, left) {
            ids.swap(left, right);
        }
    } else {
        select(ids, coords, dim, m, left, right, axis);
    }
    let split = key(coords, ids, dim, axis, m);

    // The median record goes to the left subtree, so both halves are
    // non-empty and the split divides the subset as evenly as size allows.
    let left_child = build_subtree(coords, dim, policy, ids, left, m, depth + 1, nodes, bounds);
    let right_child = build_subtree(
        coords,
        dim,
        policy,
        ids,
        m + 1,
        right,
        depth + 1,
        nodes,
        bounds,
    );

    nodes.push(Node::Internal {
        axis: axis as u16,
        split,
        left: left_child,
        right: right_child,
        bounds: offset as u32,
    });
    (nodes.len() - 1) as u32
}

/// Append the bounding box of `ids[left..=right]` (`dim` minimums, then
/// `dim` maximums) to the bounds buffer and return its offset.
fn subset_bounds<N: CoordNum>(
    coords: &[N],
    dim: usize,
    ids: &[u32],
    left: usize,
    right: usize,
    bounds: &mut Vec<N>,
) -> usize {
    let offset = bounds.len();
    bounds.resize(offset + dim, N::max_value());
    bounds.resize(offset + 2 * dim, N::min_value());

    for &id in &ids[left..=right] {
        let base = id as usize * dim;
        for d in 0..dim {
            let v = coords[base + d];
            if v < bounds[offset + d] {
                bounds[offset + d] = v;
            }
            if v > bounds[offset + dim + d] {
                bounds[offset + dim + d] = v;
            }
        }
    }

    offset
}

/// The dimension with the largest range in the box at `offset`. Ties go to
/// the lowest dimension.
fn widest_axis<N: CoordNum>(bounds: &[N], offset: usize, dim: usize) -> usize {
    let mut axis = 0;
    let mut spread = bounds[offset + dim] - bounds[offset];
    for d in 1..dim {
        let s = bounds[offset + dim + d] - bounds[offset + d];
        if s > spread {
            axis = d;
            spread = s;
        }
    }
    axis
}

/// The coordinate of the record at position `i` of the id array, along
/// `axis`.
#[inline]
fn key<N: CoordNum>(coords: &[N], ids: &[u32], dim: usize, axis: usize, i: usize) -> N {
    coords[ids[i] as usize * dim + axis]
}

/// Floyd-Rivest selection: permute `ids` so that positions `left..k` hold
/// records no greater than the record at `k` (along `axis`) and positions
/// `k+1..=right` hold records no smaller. Callers guarantee
/// `left < k < right`.
fn select<N: CoordNum>(
    ids: &mut [u32],
    coords: &[N],
    dim: usize,
    k: usize,
    mut left: usize,
    mut right: usize,
    axis: usize,
) {
    while right > left {
        if right - left > 600 {
            let n = (right - left + 1) as f64;
            let m = (k - left + 1) as f64;
            let z = f64::ln(n);
            let s = 0.5 * f64::exp((2.0 * z) / 3.0);
            let sd = 0.5
                * f64::sqrt((z * s * (n - s)) / n)
                * (if m - n / 2.0 < 0.0 { -1.0 } else { 1.0 });
            let new_left = cmp::max(left, f64::floor(k as f64 - (m * s) / n + sd) as usize);
            let new_right = cmp::min(
                right,
                f64::floor(k as f64 + ((n - m) * s) / n + sd) as usize,
            );
            select(ids, coords, dim, k, new_left, new_right, axis);
        }

        let t = key(coords, ids, dim, axis, k);
        let mut i = left;
        let mut j = right;

        ids.swap(left, k);
        if key(coords, ids, dim, axis, right) > t {
            ids.swap(left, right);
        }

        while i < j {
            ids.swap(i, j);
            i += 1;
            j -= 1;
            while key(coords, ids, dim, axis, i) < t {
                i += 1;
            }
            while key(coords, ids, dim, axis, j) > t {
                j -= 1;
            }
        }

        if key(coords, ids, dim, axis, left) == t {
            ids.swap(left, j);
        } else {
            j += 1;
            ids.swap(j, right);
        }

        if j <= k {
            left = j + 1;
        }
        if k <= j {
            right = j - 1;
        }
    }
}

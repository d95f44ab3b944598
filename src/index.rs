use crate::error::{KdIndexError, Result};
use crate::metric::Metric;
use crate::r#type::CoordNum;

/// A node in the tree arena.
///
/// Children and records are addressed by index rather than by owned
/// pointers, which keeps the arena contiguous and the variants `Copy`.
/// Leaves hold exactly one record and need no stored bounding box: the
/// point is its own box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Node<N: CoordNum> {
    Leaf {
        /// Record index, i.e. the position of the point in insertion order.
        item: u32,
    },
    Internal {
        /// The dimension this node splits on.
        axis: u16,
        /// The median coordinate along `axis`. Every record in the left
        /// subtree has `coord[axis] <= split`; every record in the right
        /// subtree has `coord[axis] >= split`.
        split: N,
        /// Arena index of the left child.
        left: u32,
        /// Arena index of the right child.
        right: u32,
        /// Offset into the tree's bounds buffer of this subtree's box:
        /// `dim` minimums followed by `dim` maximums.
        bounds: u32,
    },
}

/// One stored point, viewed by reference out of a tree.
///
/// A record's identity is its insertion index: points with duplicate
/// coordinates are distinct records.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a, N: CoordNum, P> {
    pub(crate) index: u32,
    pub(crate) point: &'a [N],
    pub(crate) payload: &'a P,
}

impl<'a, N: CoordNum, P> Record<'a, N, P> {
    /// The insertion index of this record, as returned by
    /// [`KDTreeBuilder::add`][crate::KDTreeBuilder::add].
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The coordinates of this record.
    pub fn point(&self) -> &'a [N] {
        self.point
    }

    /// The payload stored alongside this record.
    pub fn payload(&self) -> &'a P {
        self.payload
    }
}

/// An immutable k-d tree over points of one fixed dimension.
///
/// Built via [`KDTreeBuilder`][crate::KDTreeBuilder]; always non-empty.
/// Queries never mutate the tree, so a built tree can be shared freely
/// across threads.
#[derive(Debug, Clone)]
pub struct KDTree<N: CoordNum, P> {
    pub(crate) dim: usize,
    pub(crate) metric: Metric,
    /// Flattened coordinates in insertion order, `dim` values per record.
    /// Construction permutes a scratch id array, never this buffer, so
    /// record indices stay stable.
    pub(crate) coords: Vec<N>,
    pub(crate) payloads: Vec<P>,
    pub(crate) nodes: Vec<Node<N>>,
    /// Bounding boxes of internal nodes, `2 * dim` values per box.
    pub(crate) bounds: Vec<N>,
    pub(crate) root: u32,
}

impl<N: CoordNum, P> KDTree<N, P> {
    /// The dimension of every point in this tree.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The distance metric this tree was built with.
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// The number of records in this tree. Always at least one.
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    /// Always `false`: empty trees cannot be built.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Access a record by insertion index.
    ///
    /// Panics if `index >= self.len() as u32`.
    pub fn get(&self, index: u32) -> Record<'_, N, P> {
        let i = index as usize;
        Record {
            index,
            point: &self.coords[i * self.dim..(i + 1) * self.dim],
            payload: &self.payloads[i],
        }
    }

    /// Iterate over all records in insertion order.
    pub fn records(&self) -> impl ExactSizeIterator<Item = Record<'_, N, P>> {
        (0..self.len() as u32).map(move |i| self.get(i))
    }

    /// Validate a query point against the tree dimension.
    pub(crate) fn check_query(&self, query: &[N]) -> Result<()> {
        if query.len() != self.dim {
            return Err(KdIndexError::DimensionMismatch {
                expected: self.dim,
                actual: query.len(),
            });
        }
        Ok(())
    }

    /// The coordinates of record `item`.
    #[inline]
    pub(crate) fn point(&self, item: u32) -> &[N] {
        let i = item as usize;
        &self.coords[i * self.dim..(i + 1) * self.dim]
    }

    /// The bounding box stored at `offset`: (mins, maxs).
    #[inline]
    pub(crate) fn node_bounds(&self, offset: u32) -> (&[N], &[N]) {
        let off = offset as usize;
        (
            &self.bounds[off..off + self.dim],
            &self.bounds[off + self.dim..off + 2 * self.dim],
        )
    }

    /// A lower bound on the reduced distance from `query` to any record in
    /// the subtree rooted at `node`. Exact for leaves.
    #[inline]
    pub(crate) fn min_reduced_dist(&self, node: u32, query: &[N]) -> N {
        match self.nodes[node as usize] {
            Node::Leaf { item } => self.metric.reduced_dist(query, self.point(item)),
            Node::Internal { bounds, .. } => {
                let (mins, maxs) = self.node_bounds(bounds);
                self.metric.reduced_dist_to_box(query, mins, maxs)
            }
        }
    }
}

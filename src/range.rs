//! The radius (range) query engine.

use num_traits::ToPrimitive;
use tinyvec::TinyVec;

use crate::error::{KdIndexError, Result};
use crate::index::{KDTree, Node, Record};
use crate::r#type::CoordNum;

impl<N: CoordNum, P> KDTree<N, P> {
    /// All records within distance `radius` of `query`, in no particular
    /// order (deterministic for a given tree). The result size is
    /// unbounded.
    ///
    /// Fails with [`KdIndexError::InvalidRadius`] if `radius` is negative
    /// (or NaN) and with [`KdIndexError::DimensionMismatch`] if the query
    /// point's length differs from [`dim`][Self::dim].
    pub fn within(&self, query: &[N], radius: N) -> Result<Vec<Record<'_, N, P>>> {
        self.within_with(query, radius, |_| true)
    }

    /// Like [`within`][Self::within], restricted to records accepted by
    /// `filter`. The filter affects acceptance only, never pruning.
    pub fn within_with<F>(&self, query: &[N], radius: N, filter: F) -> Result<Vec<Record<'_, N, P>>>
    where
        F: Fn(&Record<'_, N, P>) -> bool,
    {
        if radius < N::zero() || radius.is_nan() {
            return Err(KdIndexError::InvalidRadius(
                radius.to_f64().unwrap_or(f64::NAN),
            ));
        }
        self.check_query(query)?;

        let r = self.metric.reduced_radius(radius);
        let mut result = Vec::new();

        // Use TinyVec to avoid heap allocations for the traversal stack.
        let mut stack: TinyVec<[u32; 32]> = TinyVec::new();
        stack.push(self.root);

        while let Some(node) = stack.pop() {
            match self.nodes[node as usize] {
                Node::Leaf { item } => {
                    let record = self.get(item);
                    if self.metric.reduced_dist(query, record.point) <= r && filter(&record) {
                        result.push(record);
                    }
                }
                Node::Internal {
                    left,
                    right,
                    bounds,
                    ..
                } => {
                    // Skip the whole subtree when even the closest point of
                    // its box is outside the radius.
                    let (mins, maxs) = self.node_bounds(bounds);
                    if self.metric.reduced_dist_to_box(query, mins, maxs) > r {
                        continue;
                    }
                    stack.push(left);
                    stack.push(right);
                }
            }
        }

        Ok(result)
    }
}

//! Distance metrics for spatial queries.
//!
//! The metric is fixed per tree at build time. All internal comparisons use
//! *reduced* distances: squared distance for Euclidean (so no square root
//! is ever taken on the query path), the raw sum for Manhattan and the raw
//! maximum for Chebyshev. Reduction is strictly order-preserving, so
//! pruning and candidate ranking are unaffected.

use crate::r#type::CoordNum;

/// The distance metric used by a tree's query engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    /// Straight-line (L2) distance. Internally compared as squared
    /// distance.
    #[default]
    Euclidean,
    /// City-block (L1) distance: the sum of per-axis differences.
    Manhattan,
    /// Maximum-norm (L-infinity) distance: the largest per-axis difference.
    Chebyshev,
}

impl Metric {
    /// The reduced distance between two points of equal dimension.
    #[inline]
    pub(crate) fn reduced_dist<N: CoordNum>(&self, a: &[N], b: &[N]) -> N {
        debug_assert_eq!(a.len(), b.len());
        match self {
            Metric::Euclidean => a
                .iter()
                .zip(b)
                .fold(N::zero(), |acc, (&p, &q)| acc + (p - q) * (p - q)),
            Metric::Manhattan => a
                .iter()
                .zip(b)
                .fold(N::zero(), |acc, (&p, &q)| acc + (p - q).abs()),
            Metric::Chebyshev => a
                .iter()
                .zip(b)
                .fold(N::zero(), |acc, (&p, &q)| acc.max((p - q).abs())),
        }
    }

    /// The reduced distance from a query point to the closest point of an
    /// axis-aligned box. Zero when the query lies inside the box. This is a
    /// lower bound on the reduced distance to any record inside the box,
    /// which is what makes subtree pruning sound.
    #[inline]
    pub(crate) fn reduced_dist_to_box<N: CoordNum>(&self, q: &[N], mins: &[N], maxs: &[N]) -> N {
        debug_assert_eq!(q.len(), mins.len());
        debug_assert_eq!(q.len(), maxs.len());
        match self {
            Metric::Euclidean => q.iter().zip(mins.iter().zip(maxs)).fold(
                N::zero(),
                |acc, (&k, (&min, &max))| {
                    let d = axis_dist(k, min, max);
                    acc + d * d
                },
            ),
            Metric::Manhattan => q
                .iter()
                .zip(mins.iter().zip(maxs))
                .fold(N::zero(), |acc, (&k, (&min, &max))| {
                    acc + axis_dist(k, min, max)
                }),
            Metric::Chebyshev => q
                .iter()
                .zip(mins.iter().zip(maxs))
                .fold(N::zero(), |acc, (&k, (&min, &max))| {
                    acc.max(axis_dist(k, min, max))
                }),
        }
    }

    /// Convert a caller-supplied radius into reduced-distance space.
    #[inline]
    pub(crate) fn reduced_radius<N: CoordNum>(&self, r: N) -> N {
        match self {
            Metric::Euclidean => r * r,
            Metric::Manhattan | Metric::Chebyshev => r,
        }
    }
}

/// 1D distance from a value to a range.
#[inline]
fn axis_dist<N: CoordNum>(k: N, min: N, max: N) -> N {
    if k < min {
        min - k
    } else if k <= max {
        N::zero()
    } else {
        k - max
    }
}

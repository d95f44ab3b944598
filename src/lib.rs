#![doc = include_str!("../README.md")]

mod builder;
mod error;
mod index;
mod metric;
mod neighbors;
mod range;
mod r#type;

pub use builder::{KDTreeBuilder, SplitPolicy};
pub use error::{KdIndexError, Result};
pub use index::{KDTree, Record};
pub use metric::Metric;
pub use r#type::CoordNum;

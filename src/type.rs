use std::fmt::Debug;

use num_traits::Float;

/// A trait for types that can be used as tree coordinates.
///
/// This trait is sealed and cannot be implemented for external types:
/// queries compare continuous distances, so coordinates are restricted to
/// the standard float types. The `Send + Sync` bounds let a built tree be
/// queried concurrently from multiple threads.
pub trait CoordNum: private::Sealed + Float + Debug + Send + Sync {}

impl CoordNum for f32 {}
impl CoordNum for f64 {}

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

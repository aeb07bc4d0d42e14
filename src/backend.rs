//! A parallel map from sample points to escape iteration counts.

use crate::{complex::Complex, error::Result};

/**
Anything that can evaluate the horizons kernel over a slice of points.

Implementations must write output slot `i` from input point `i` alone, and
must return only once every slot has been written. Beyond that, the order in
which points are evaluated is unspecified.
*/
pub trait Backend {
    fn name(&self) -> &'static str;

    fn compute_horizons(&self, points: &[Complex], max_iter: u32) -> Result<Vec<u32>>;
}

impl<B: Backend + ?Sized> Backend for &B {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn compute_horizons(&self, points: &[Complex], max_iter: u32) -> Result<Vec<u32>> {
        (**self).compute_horizons(points, max_iter)
    }
}

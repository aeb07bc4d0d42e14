//! Host thread-pool backend.

use log::{debug, trace};
use rayon::prelude::{IndexedParallelIterator, IntoParallelRefMutIterator, ParallelIterator};

use crate::{
    backend::Backend,
    complex::Complex,
    error::{Error, Result},
};

/// Squared escape radius.
pub const ESCAPE_THRESHOLD: f32 = 4.0;

/**
The escape iteration of `point` under `z -> z^2 + point`, starting from `z = 0`.

Returns the zero-based iteration on which `|z|^2` first exceeds
[`ESCAPE_THRESHOLD`]. A point that is still bounded after `max_iter`
iterations also returns 0. This mirrors `horizons.wgsl#point_horizons`
operation for operation.
*/
pub fn point_horizon(point: Complex, max_iter: u32) -> u32 {
    let mut real = 0.0f32;
    let mut imaginary = 0.0f32;
    for i in 0..max_iter {
        let next_real = real * real - imaginary * imaginary + point.real;
        imaginary = 2.0 * real * imaginary + point.imaginary;
        real = next_real;
        if real * real + imaginary * imaginary > ESCAPE_THRESHOLD {
            return i;
        }
    }
    0
}

pub struct CpuBackend {
    pool: rayon::ThreadPool,
}

impl CpuBackend {
    /// A backend with one worker per logical CPU.
    pub fn new() -> Result<Self> {
        Self::with_threads(num_cpus::get())
    }

    pub fn with_threads(threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("horizons-{}", index))
            .build()
            .map_err(|error| Error::DeviceUnavailable(error.to_string()))?;
        debug!("cpu backend using {} threads", pool.current_num_threads());
        Ok(Self { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl Backend for CpuBackend {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn compute_horizons(&self, points: &[Complex], max_iter: u32) -> Result<Vec<u32>> {
        trace!("begin cpu compute_horizons");

        let mut horizons = vec![0; points.len()];
        self.pool.install(|| {
            horizons
                .par_iter_mut()
                .enumerate()
                .for_each(|(index, horizon)| *horizon = point_horizon(points[index], max_iter));
        });

        trace!("end cpu compute_horizons");
        Ok(horizons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_never_escapes() {
        for max_iter in [1, 2, 50, 1000] {
            assert_eq!(point_horizon(Complex::ZERO, max_iter), 0);
        }
    }

    #[test]
    fn far_points_escape_immediately() {
        assert_eq!(point_horizon(Complex::new(3.0, 0.0), 100), 0);
        assert_eq!(point_horizon(Complex::new(-2.5, 2.5), 100), 0);
    }

    #[test]
    fn escape_iteration_is_zero_based() {
        // 1 -> 2 -> 5: |z|^2 first exceeds 4 on the third step.
        assert_eq!(point_horizon(Complex::new(1.0, 0.0), 100), 2);
        // 0.5 -> 0.75 -> 1.0625 -> 1.62890625 -> 3.15...
        assert_eq!(point_horizon(Complex::new(0.5, 0.0), 100), 4);
    }

    #[test]
    fn escape_past_the_cap_reads_as_zero() {
        assert_eq!(point_horizon(Complex::new(0.5, 0.0), 4), 0);
        assert_eq!(point_horizon(Complex::new(0.5, 0.0), 5), 4);
    }

    #[test]
    fn boundary_point_on_the_radius_stays_bounded() {
        // -2 -> 2 -> 2 -> ...: |z|^2 == 4 is not an escape.
        assert_eq!(point_horizon(Complex::new(-2.0, 0.0), 500), 0);
    }

    #[test]
    fn single_iteration_cap_yields_only_zeros() {
        let backend = CpuBackend::with_threads(2).unwrap();
        let points = [
            Complex::ZERO,
            Complex::new(3.0, 0.0),
            Complex::new(1.0, 0.0),
            Complex::new(-0.75, 0.1),
        ];
        let horizons = backend.compute_horizons(&points, 1).unwrap();
        assert_eq!(horizons, vec![0, 0, 0, 0]);
    }

    #[test]
    fn output_order_follows_input_order() {
        let backend = CpuBackend::with_threads(4).unwrap();
        let points: Vec<Complex> = (0..1000)
            .map(|i| Complex::new(-2.0 + i as f32 * 0.003, 0.25))
            .collect();

        let horizons = backend.compute_horizons(&points, 64).unwrap();

        assert_eq!(horizons.len(), points.len());
        for (point, horizon) in points.iter().zip(&horizons) {
            assert_eq!(*horizon, point_horizon(*point, 64));
        }
        assert_eq!(horizons, backend.compute_horizons(&points, 64).unwrap());
    }
}

//! Maps a pixel grid onto sample points in the complex plane.

use std::ops::Deref;

use log::debug;

use crate::{
    complex::Complex,
    error::Result,
    view::{Resolution, ViewWindow},
};

/// One sample per pixel, row-major: the imaginary coordinate selects the row.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleGrid {
    resolution: Resolution,
    points: Vec<Complex>,
}

impl SampleGrid {
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn points(&self) -> &[Complex] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Complex> {
        self.points
    }
}

impl Deref for SampleGrid {
    type Target = [Complex];

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}

/**
Sample `window` on a `resolution.width` by `resolution.height` grid.

Column `c` of row `r` is `x_min + c * (x_max - x_min) / width` plus
`i * (y_min + r * (y_max - y_min) / height)`. Steps and offsets are computed
in `f64`; each point is then narrowed to `f32`, which is what the kernel reads.
*/
pub fn sample(window: ViewWindow, resolution: Resolution) -> Result<SampleGrid> {
    window.validate()?;
    resolution.validate()?;

    let x_step = window.width() / resolution.width as f64;
    let y_step = window.height() / resolution.height as f64;
    debug!(
        "sampling {:?} at {}x{} (step {} x {})",
        window, resolution.width, resolution.height, x_step, y_step
    );

    let reals: Vec<f64> = (0..resolution.width)
        .map(|column| window.x_min + column as f64 * x_step)
        .collect();

    let mut points = Vec::with_capacity(resolution.pixel_count());
    for row in 0..resolution.height {
        let imaginary = window.y_min + row as f64 * y_step;
        points.extend(
            reals
                .iter()
                .map(|&real| Complex::new(real as f32, imaginary as f32)),
        );
    }

    Ok(SampleGrid { resolution, points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn grid_is_row_major_with_imaginary_rows() {
        let window = ViewWindow::new(-2.0, 1.0, -1.0, 1.0).unwrap();
        let resolution = Resolution::new(4, 4).unwrap();
        let grid = sample(window, resolution).unwrap();

        assert_eq!(grid.len(), 16);
        assert_eq!(grid.resolution(), resolution);

        let reals = [-2.0, -1.25, -0.5, 0.25];
        let imaginaries = [-1.0, -0.5, 0.0, 0.5];
        for (row, imaginary) in imaginaries.iter().enumerate() {
            for (column, real) in reals.iter().enumerate() {
                assert_eq!(grid[row * 4 + column], Complex::new(*real, *imaginary));
            }
        }
    }

    #[test]
    fn upper_bounds_are_excluded() {
        let window = ViewWindow::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let grid = sample(window, Resolution::new(3, 7).unwrap()).unwrap();

        assert_eq!(grid.len(), 21);
        assert!(grid.iter().all(|point| point.real < 1.0 && point.imaginary < 1.0));
    }

    #[test]
    fn samples_match_step_formula_for_uneven_windows() {
        let window = ViewWindow::new(-0.743643, -0.743543, 0.131825, 0.131925).unwrap();
        let resolution = Resolution::new(7, 5).unwrap();
        let grid = sample(window, resolution).unwrap();

        let x_step = window.width() / 7.0;
        let y_step = window.height() / 5.0;
        for row in 0..5 {
            for column in 0..7 {
                let point = grid[row * 7 + column];
                let real = window.x_min + column as f64 * x_step;
                let imaginary = window.y_min + row as f64 * y_step;
                assert!((point.real as f64 - real).abs() < 1e-6);
                assert!((point.imaginary as f64 - imaginary).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let inverted = ViewWindow {
            x_min: 1.0,
            x_max: -2.0,
            y_min: -1.0,
            y_max: 1.0,
        };
        assert!(matches!(
            sample(inverted, Resolution { width: 4, height: 4 }),
            Err(Error::InvalidWindow { .. })
        ));

        let window = ViewWindow::new(-2.0, 1.0, -1.0, 1.0).unwrap();
        assert!(matches!(
            sample(window, Resolution { width: 4, height: 0 }),
            Err(Error::InvalidResolution { .. })
        ));
    }
}

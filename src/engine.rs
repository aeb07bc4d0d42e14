//! Sampling, dispatch and normalization, composed.

use log::debug;

use crate::{
    backend::Backend,
    complex::Complex,
    error::{Error, Result},
    gpu::GpuBackend,
    image::{self, GrayscaleImage},
    sampler,
    view::{Resolution, ViewWindow},
};

/**
Escape iteration counts for `points`, in the same order.

A point that never escapes within `max_iter` iterations counts as 0, the same
as a point that escapes on the first. See [`crate::cpu::point_horizon`].
*/
pub fn compute_horizons(
    backend: &impl Backend,
    points: &[Complex],
    max_iter: u32,
) -> Result<Vec<u32>> {
    if max_iter == 0 {
        return Err(Error::InvalidMaxIter);
    }
    if points.is_empty() {
        return Ok(Vec::new());
    }

    let horizons = backend.compute_horizons(points, max_iter)?;
    if horizons.len() != points.len() {
        return Err(Error::DeviceExecution(format!(
            "{} backend returned {} horizons for {} points",
            backend.name(),
            horizons.len(),
            points.len()
        )));
    }
    Ok(horizons)
}

/// Render on the process-wide GPU context.
pub fn render(window: ViewWindow, resolution: Resolution, max_iter: u32) -> Result<GrayscaleImage> {
    validate(window, resolution, max_iter)?;
    render_with(&GpuBackend::shared()?, window, resolution, max_iter)
}

pub fn render_with(
    backend: &impl Backend,
    window: ViewWindow,
    resolution: Resolution,
    max_iter: u32,
) -> Result<GrayscaleImage> {
    validate(window, resolution, max_iter)?;
    debug!(
        "rendering {:?} at {}x{} on {} backend, max_iter {}",
        window,
        resolution.width,
        resolution.height,
        backend.name(),
        max_iter
    );

    let grid = sampler::sample(window, resolution)?;
    let horizons = compute_horizons(backend, &grid, max_iter)?;
    image::normalize(&horizons, grid.resolution())
}

fn validate(window: ViewWindow, resolution: Resolution, max_iter: u32) -> Result<()> {
    window.validate()?;
    resolution.validate()?;
    if max_iter == 0 {
        return Err(Error::InvalidMaxIter);
    }
    Ok(())
}

/// A fixed view of the Mandelbrot set that can be rendered repeatedly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mandelbrot {
    window: ViewWindow,
    resolution: Resolution,
    max_iter: u32,
}

impl Mandelbrot {
    pub fn new(window: ViewWindow, resolution: Resolution, max_iter: u32) -> Result<Self> {
        validate(window, resolution, max_iter)?;
        Ok(Self {
            window,
            resolution,
            max_iter,
        })
    }

    pub fn window(&self) -> ViewWindow {
        self.window
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn max_iter(&self) -> u32 {
        self.max_iter
    }

    pub fn grayscale(&self) -> Result<GrayscaleImage> {
        render(self.window, self.resolution, self.max_iter)
    }

    pub fn grayscale_with(&self, backend: &impl Backend) -> Result<GrayscaleImage> {
        render_with(backend, self.window, self.resolution, self.max_iter)
    }
}

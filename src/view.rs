//! The region of the complex plane to sample, and the pixel grid to sample it with.

use bytemuck::{Pod, Zeroable};

use crate::error::{Error, Result};

/// A rectangle of the complex plane, half-open on the upper bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewWindow {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl ViewWindow {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Result<Self> {
        let window = Self {
            x_min,
            x_max,
            y_min,
            y_max,
        };
        window.validate()?;
        Ok(window)
    }

    /// Fails unless `x_min < x_max` and `y_min < y_max`. NaN bounds fail too.
    pub fn validate(&self) -> Result<()> {
        if self.x_min < self.x_max && self.y_min < self.y_max {
            Ok(())
        } else {
            Err(Error::InvalidWindow {
                x_min: self.x_min,
                x_max: self.x_max,
                y_min: self.y_min,
                y_max: self.y_max,
            })
        }
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }
}

#[repr(C)]
#[derive(Pod, Zeroable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let resolution = Self { width, height };
        resolution.validate()?;
        Ok(resolution)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width > 0 && self.height > 0 {
            Ok(())
        } else {
            Err(Error::InvalidResolution {
                width: self.width,
                height: self.height,
            })
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_rejects_empty_and_inverted_ranges() {
        assert!(ViewWindow::new(-2.0, 1.0, -1.0, 1.0).is_ok());
        assert!(matches!(
            ViewWindow::new(1.0, 1.0, -1.0, 1.0),
            Err(Error::InvalidWindow { .. })
        ));
        assert!(matches!(
            ViewWindow::new(-2.0, 1.0, 1.0, -1.0),
            Err(Error::InvalidWindow { .. })
        ));
        assert!(matches!(
            ViewWindow::new(f64::NAN, 1.0, -1.0, 1.0),
            Err(Error::InvalidWindow { .. })
        ));
    }

    #[test]
    fn resolution_rejects_zero_dimensions() {
        assert_eq!(Resolution::new(4, 3).unwrap().pixel_count(), 12);
        assert!(matches!(
            Resolution::new(0, 3),
            Err(Error::InvalidResolution {
                width: 0,
                height: 3
            })
        ));
        assert!(matches!(
            Resolution::new(3, 0),
            Err(Error::InvalidResolution { .. })
        ));
    }
}

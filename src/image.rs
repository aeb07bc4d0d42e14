//! Grayscale output.

use log::{trace, warn};
use rayon::prelude::{IndexedParallelIterator, IntoParallelRefMutIterator, ParallelIterator};

use crate::{
    error::{Error, Result},
    view::Resolution,
};

/// An 8-bit grayscale raster, `height` rows of `width` pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayscaleImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl GrayscaleImage {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(height, width)`, row count first.
    pub fn shape(&self) -> (usize, usize) {
        (self.height as usize, self.width as usize)
    }

    pub fn get(&self, row: usize, column: usize) -> Option<u8> {
        if row < self.height as usize && column < self.width as usize {
            Some(self.pixels[row * self.width as usize + column])
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> Option<&[u8]> {
        self.rows().nth(row)
    }

    pub fn rows(&self) -> std::slice::Chunks<'_, u8> {
        self.pixels.chunks(self.width as usize)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.pixels
    }
}

/**
Linearly rescale iteration counts to `0..=255` against the largest count.

Each pixel is `round(count * 255 / max)`, rounding halves away from zero. When
every count is zero there is nothing to scale against; the result is an
all-black image rather than a division by zero.
*/
pub fn normalize(counts: &[u32], resolution: Resolution) -> Result<GrayscaleImage> {
    trace!("begin normalize");

    resolution.validate()?;
    if counts.len() != resolution.pixel_count() {
        return Err(Error::InvalidResolution {
            width: resolution.width,
            height: resolution.height,
        });
    }

    let mut pixels = vec![0u8; counts.len()];
    match counts.iter().copied().max() {
        Some(max) if max > 0 => {
            let max = max as f64;
            pixels
                .par_iter_mut()
                .enumerate()
                .for_each(|(index, pixel)| {
                    *pixel = (counts[index] as f64 * 255.0 / max).round() as u8;
                });
        }
        _ => warn!(
            "no sample escaped within the iteration cap, producing a black {}x{} image",
            resolution.width, resolution.height
        ),
    }

    trace!("end normalize");
    Ok(GrayscaleImage {
        width: resolution.width,
        height: resolution.height,
        pixels,
    })
}

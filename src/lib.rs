/*!
Escape-time rendering of the Mandelbrot set into a grayscale raster.

```no_run
use mandelbrot_horizons::{render, Resolution, ViewWindow};

let window = ViewWindow::new(-2.0, 1.0, -1.0, 1.0)?;
let image = render(window, Resolution::new(1200, 800)?, 100)?;
assert_eq!(image.shape(), (800, 1200));
# Ok::<(), mandelbrot_horizons::Error>(())
```

[`render`] samples the window ([`sampler`]), evaluates every sample on the GPU
([`gpu`]), and rescales the counts to `0..=255` ([`image`]). Any other
[`Backend`], such as the [`CpuBackend`] thread pool, can be used through
[`render_with`].
*/

pub mod backend;
pub mod complex;
pub mod compute;
pub mod context;
pub mod cpu;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod image;
pub mod sampler;
pub mod typed_buffer;
pub mod view;

pub use backend::Backend;
pub use complex::Complex;
pub use cpu::CpuBackend;
pub use engine::{compute_horizons, render, render_with, Mandelbrot};
pub use error::{Error, Result};
pub use gpu::GpuBackend;
pub use image::{normalize, GrayscaleImage};
pub use sampler::{sample, SampleGrid};
pub use view::{Resolution, ViewWindow};

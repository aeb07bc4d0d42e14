use bytemuck::{Pod, Zeroable};

/// A single-precision sample point. Laid out as WGSL `vec2<f32>`.
#[repr(C)]
#[derive(Pod, Zeroable, Clone, Copy, Debug, PartialEq, Default)]
pub struct Complex {
    pub real: f32,
    pub imaginary: f32,
}

impl Complex {
    pub const ZERO: Self = Complex {
        real: 0.0,
        imaginary: 0.0,
    };

    pub fn new(real: f32, imaginary: f32) -> Self {
        Self { real, imaginary }
    }
}

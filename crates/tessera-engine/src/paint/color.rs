/// 8-bit RGB triple as produced by a [`ColorResolver`](super::ColorResolver).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Normalizes each channel from `0..=255` into `[0, 1]`.
    #[inline]
    pub fn normalized(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

/// Normalized straight-alpha RGBA color.
///
/// Invariant:
/// - `rgb` is NOT multiplied by `a`; the rect pipeline blends with
///   `src_alpha / one_minus_src_alpha`, which expects straight alpha.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    #[inline]
    pub const fn transparent() -> Self {
        Self { r: 0.0, g: 0.0, b: 0.0, a: 0.0 }
    }

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from resolved 8-bit RGB and an opacity scalar.
    ///
    /// Opacity is passed through unclamped so the serialized attribute stream
    /// carries exactly what the scene declared.
    #[inline]
    pub fn from_rgb8(rgb: Rgb8, opacity: f32) -> Self {
        let [r, g, b] = rgb.normalized();
        Self { r, g, b, a: opacity }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Converts to a `wgpu::Color` (used for attachment clear values).
    #[inline]
    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

/// Axis-aligned bounding region `[x1, x2] × [y1, y2]` in pixels.
///
/// Describes the drawing region of a mark group. Renderers use the top-left
/// corner (`x1`, `y1`) as the offset applied to every item in the group.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Bounds {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Bounds {
    #[inline]
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Builds bounds from a top-left corner and a size.
    #[inline]
    pub fn from_rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    #[inline]
    pub fn width(self) -> f32 {
        self.x2 - self.x1
    }

    #[inline]
    pub fn height(self) -> f32 {
        self.y2 - self.y1
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Top-left corner as `[x1, y1]`.
    #[inline]
    pub fn offset(self) -> [f32; 2] {
        [self.x1, self.y1]
    }
}

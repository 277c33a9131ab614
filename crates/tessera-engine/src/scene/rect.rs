/// One rectangle as declared by the scene.
///
/// Colors are kept as unresolved specifications; the renderer resolves them
/// through a [`ColorResolver`](crate::paint::ColorResolver) every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub fill: Option<String>,
    pub fill_opacity: f32,
    /// `None` (or an unparsable spec) means "no stroke".
    pub stroke: Option<String>,
    pub stroke_opacity: f32,
    pub stroke_width: f32,
}

impl Default for SceneRect {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            fill: None,
            fill_opacity: 1.0,
            stroke: None,
            stroke_opacity: 1.0,
            stroke_width: 1.0,
        }
    }
}

impl SceneRect {
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height, ..Self::default() }
    }

    #[inline]
    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    #[inline]
    pub fn with_fill_opacity(mut self, opacity: f32) -> Self {
        self.fill_opacity = opacity;
        self
    }

    #[inline]
    pub fn with_stroke(mut self, stroke: impl Into<String>) -> Self {
        self.stroke = Some(stroke.into());
        self
    }

    #[inline]
    pub fn with_stroke_opacity(mut self, opacity: f32) -> Self {
        self.stroke_opacity = opacity;
        self
    }

    #[inline]
    pub fn with_stroke_width(mut self, width: f32) -> Self {
        self.stroke_width = width;
        self
    }
}

/// Ordered rectangle list of one render group.
///
/// List order is instance order: item `i` is drawn as instance `i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RectGroup {
    pub items: Vec<SceneRect>,
}

impl RectGroup {
    #[inline]
    pub fn new(items: Vec<SceneRect>) -> Self {
        Self { items }
    }

    #[inline]
    pub fn push(&mut self, rect: SceneRect) {
        self.items.push(rect);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<SceneRect> for RectGroup {
    fn from_iter<I: IntoIterator<Item = SceneRect>>(iter: I) -> Self {
        Self { items: iter.into_iter().collect() }
    }
}

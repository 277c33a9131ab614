use bytemuck::{Pod, Zeroable};

use crate::coords::{Bounds, Viewport};
use crate::paint::{Color, ColorResolver};
use crate::scene::SceneRect;

/// Floats contributed by one rectangle to the instance stream.
pub const RECT_FLOATS: usize = 13;

/// Per-instance attributes, 13 tightly packed floats:
/// `[x, y, w, h, fill rgba, stroke rgba, stroke_width]`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct RectInstance {
    pub position: [f32; 2],
    pub size: [f32; 2],
    pub fill: [f32; 4],
    pub stroke: [f32; 4],
    pub stroke_width: f32,
}

impl RectInstance {
    /// Byte size of one instance record.
    pub const SIZE: u64 = std::mem::size_of::<RectInstance>() as u64;

    pub(super) const ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        1 => Float32x2, // position
        2 => Float32x2, // size
        3 => Float32x4, // fill color + opacity
        4 => Float32x4, // stroke color + opacity
        5 => Float32    // stroke width
    ];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::SIZE,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }

    #[inline]
    pub fn to_floats(self) -> [f32; RECT_FLOATS] {
        bytemuck::cast(self)
    }
}

/// Byte size of `count` packed instance records.
#[inline]
pub(crate) fn instance_bytes(count: usize) -> u64 {
    count as u64 * RectInstance::SIZE
}

/// Viewport uniform: target resolution and group offset (16 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct RectUniforms {
    pub resolution: [f32; 2],
    pub offset: [f32; 2],
}

impl RectUniforms {
    #[inline]
    pub fn new(resolution: Viewport, bounds: Bounds) -> Self {
        Self {
            resolution: resolution.clamped(),
            offset: bounds.offset(),
        }
    }
}

/// Serializes `items` in list order into instance records.
///
/// - A missing or unparsable stroke yields stroke `(0, 0, 0, 0)` whatever the
///   declared stroke width.
/// - A missing or unparsable fill yields a transparent fill `(0, 0, 0, 0)`;
///   `warned_fill` gates a one-time warning.
pub fn encode_instances(
    items: &[SceneRect],
    resolver: &dyn ColorResolver,
    warned_fill: &mut bool,
) -> Vec<RectInstance> {
    let mut out = Vec::with_capacity(items.len());

    for item in items {
        let fill = match item.fill.as_deref().and_then(|spec| resolver.resolve(spec)) {
            Some(rgb) => Color::from_rgb8(rgb, item.fill_opacity),
            None => {
                if !*warned_fill {
                    log::warn!(
                        "rect fill {:?} did not resolve to a color; drawing it transparent",
                        item.fill
                    );
                    *warned_fill = true;
                }
                Color::transparent()
            }
        };

        let stroke = item
            .stroke
            .as_deref()
            .and_then(|spec| resolver.resolve(spec))
            .map_or(Color::transparent(), |rgb| Color::from_rgb8(rgb, item.stroke_opacity));

        out.push(RectInstance {
            position: [item.x, item.y],
            size: [item.width, item.height],
            fill: fill.to_array(),
            stroke: stroke.to_array(),
            stroke_width: item.stroke_width,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::{CssColorResolver, Rgb8};

    fn encode(items: &[SceneRect]) -> Vec<RectInstance> {
        let mut warned = false;
        encode_instances(items, &CssColorResolver, &mut warned)
    }

    fn flat(instances: &[RectInstance]) -> Vec<f32> {
        bytemuck::cast_slice::<RectInstance, f32>(instances).to_vec()
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn record_is_thirteen_packed_floats() {
        assert_eq!(RectInstance::SIZE, 52);
        assert_eq!(RECT_FLOATS * 4, RectInstance::SIZE as usize);
    }

    #[test]
    fn instance_layout_offsets() {
        let l = RectInstance::layout();
        assert_eq!(l.array_stride, 52);
        assert_eq!(l.step_mode, wgpu::VertexStepMode::Instance);

        let offsets: Vec<u64> = l.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 8, 16, 32, 48]);

        let locations: Vec<u32> = l.attributes.iter().map(|a| a.shader_location).collect();
        assert_eq!(locations, vec![1, 2, 3, 4, 5]);
        assert_eq!(l.attributes[4].format, wgpu::VertexFormat::Float32);
    }

    #[test]
    fn uniforms_are_sixteen_bytes() {
        assert_eq!(std::mem::size_of::<RectUniforms>(), 16);
        let u = RectUniforms::new(Viewport::new(800.0, 600.0), Bounds::new(5.0, 6.0, 100.0, 100.0));
        assert_eq!(bytemuck::cast::<RectUniforms, [f32; 4]>(u), [800.0, 600.0, 5.0, 6.0]);
    }

    // ── serialization ─────────────────────────────────────────────────────

    #[test]
    fn red_rect_without_stroke() {
        let rect = SceneRect::new(10.0, 20.0, 30.0, 40.0).with_fill("red");
        assert_eq!(
            flat(&encode(&[rect])),
            vec![10.0, 20.0, 30.0, 40.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0]
        );
    }

    #[test]
    fn stream_length_is_thirteen_per_item() {
        for n in [1, 2, 7, 64] {
            let items: Vec<SceneRect> = (0..n)
                .map(|i| SceneRect::new(i as f32, 0.0, 1.0, 1.0).with_fill("blue"))
                .collect();
            assert_eq!(flat(&encode(&items)).len(), RECT_FLOATS * n);
        }
    }

    #[test]
    fn list_order_is_instance_order() {
        let items = vec![
            SceneRect::new(1.0, 0.0, 1.0, 1.0).with_fill("red"),
            SceneRect::new(2.0, 0.0, 1.0, 1.0).with_fill("red"),
            SceneRect::new(3.0, 0.0, 1.0, 1.0).with_fill("red"),
        ];
        let xs: Vec<f32> = encode(&items).iter().map(|i| i.position[0]).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn missing_stroke_is_zeroed_regardless_of_width() {
        let rect = SceneRect::new(0.0, 0.0, 5.0, 5.0)
            .with_fill("red")
            .with_stroke_width(8.0)
            .with_stroke_opacity(0.7);
        let inst = encode(&[rect])[0];
        assert_eq!(inst.stroke, [0.0, 0.0, 0.0, 0.0]);
        assert_eq!(inst.stroke_width, 8.0);
    }

    #[test]
    fn unparsable_stroke_is_no_stroke() {
        let rect = SceneRect::new(0.0, 0.0, 5.0, 5.0)
            .with_fill("red")
            .with_stroke("definitely not a color");
        assert_eq!(encode(&[rect])[0].stroke, [0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn stroke_uses_declared_opacity() {
        let rect = SceneRect::new(0.0, 0.0, 5.0, 5.0)
            .with_fill("red")
            .with_stroke("#0000ff")
            .with_stroke_opacity(0.5)
            .with_stroke_width(2.0);
        let inst = encode(&[rect])[0];
        assert_eq!(inst.stroke, [0.0, 0.0, 1.0, 0.5]);
        assert_eq!(inst.stroke_width, 2.0);
    }

    #[test]
    fn stroke_opacity_defaults_to_one() {
        let rect = SceneRect::new(0.0, 0.0, 5.0, 5.0).with_fill("red").with_stroke("lime");
        assert_eq!(encode(&[rect])[0].stroke, [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn fill_is_normalized_with_opacity() {
        let rect = SceneRect::new(0.0, 0.0, 1.0, 1.0)
            .with_fill("rgb(51, 102, 255)")
            .with_fill_opacity(0.25);
        let fill = encode(&[rect])[0].fill;
        assert_eq!(fill, [0.2, 0.4, 1.0, 0.25]);
        assert!(fill.iter().all(|c| (0.0..=1.0).contains(c)));
    }

    #[test]
    fn unparsable_or_missing_fill_is_transparent_and_warns_once() {
        let items = vec![
            SceneRect::new(0.0, 0.0, 1.0, 1.0).with_fill("???"),
            SceneRect::new(0.0, 0.0, 1.0, 1.0),
        ];
        let mut warned = false;
        let out = encode_instances(&items, &CssColorResolver, &mut warned);
        assert!(warned);
        assert_eq!(out[0].fill, [0.0, 0.0, 0.0, 0.0]);
        assert_eq!(out[1].fill, [0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn transparent_keyword_draws_nothing() {
        let rect = SceneRect::new(0.0, 0.0, 5.0, 5.0)
            .with_fill("transparent")
            .with_stroke("transparent")
            .with_stroke_width(2.0);
        let floats = encode(&[rect])[0].to_floats();
        assert_eq!(&floats[4..12], &[0.0; 8]);
    }

    #[test]
    fn custom_resolver_is_used() {
        let gray = |_: &str| Some(Rgb8::new(51, 51, 51));
        let mut warned = false;
        let rect = SceneRect::new(0.0, 0.0, 1.0, 1.0).with_fill("anything");
        let out = encode_instances(&[rect], &gray, &mut warned);
        assert_eq!(out[0].fill, [0.2, 0.2, 0.2, 1.0]);
    }

    #[test]
    fn to_floats_matches_field_order() {
        let inst = RectInstance {
            position: [1.0, 2.0],
            size: [3.0, 4.0],
            fill: [5.0, 6.0, 7.0, 8.0],
            stroke: [9.0, 10.0, 11.0, 12.0],
            stroke_width: 13.0,
        };
        let expected: Vec<f32> = (1..=13).map(|i| i as f32).collect();
        assert_eq!(inst.to_floats().to_vec(), expected);
    }
}

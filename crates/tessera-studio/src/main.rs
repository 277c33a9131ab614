use anyhow::{Context, Result, bail, ensure};

use tessera_engine::coords::{Bounds, Viewport};
use tessera_engine::device::{Gpu, GpuInit, OffscreenTarget};
use tessera_engine::logging::{LoggingConfig, init_logging};
use tessera_engine::paint::Color;
use tessera_engine::render::marks::MarkLayers;
use tessera_engine::render::shapes::rect::DrawOutcome;
use tessera_engine::render::{RenderCtx, WgpuBackend};
use tessera_engine::scene::{GroupId, MarkGroup, RectGroup, SceneRect};

const WIDTH: u32 = 512;
const HEIGHT: u32 = 512;
const FRAMES: usize = 4;
const DEFAULT_RECTS: usize = 64;

const PALETTE: [&str; 6] = ["steelblue", "tomato", "#2ca02c", "rgb(148, 103, 189)", "goldenrod", "teal"];

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let count = rect_count()?;
    let gpu = Gpu::new_blocking(GpuInit::default())?;
    log::debug!("adapter: {:?}", gpu.adapter_info());
    let mut backend = WgpuBackend::new(gpu.device(), gpu.queue());

    let offscreen = OffscreenTarget::new(gpu.device(), wgpu::TextureFormat::Rgba8UnormSrgb, WIDTH, HEIGHT)?;
    let target = offscreen.target();
    let (width, height) = offscreen.size();

    let ctx = RenderCtx::new(
        offscreen.format(),
        Viewport::new(width as f32, height as f32),
        Color::new(1.0, 1.0, 1.0, 1.0),
    );
    let bounds = Bounds::new(0.0, 0.0, WIDTH as f32, HEIGHT as f32);
    let group = MarkGroup::from(bar_chart(count));

    let mut layers = MarkLayers::default();
    for frame in 0..FRAMES {
        let outcome = layers.draw(&mut backend, GroupId(0), &ctx, &target, &group, bounds)?;
        log::debug!("frame {frame}: {outcome:?}");
        if outcome == DrawOutcome::Deferred {
            log::debug!("frame {frame} deferred until a staging buffer frees up");
        }
    }
    let submitted = layers.flush_all(&mut backend)?;
    log::info!("flushed {submitted} pending frames");

    let pixels = offscreen.read_pixels(gpu.device(), gpu.queue())?;
    ensure!(
        pixels.len() == (WIDTH * HEIGHT * 4) as usize,
        "unexpected readback size {}",
        pixels.len()
    );

    let covered = pixels
        .chunks_exact(4)
        .filter(|px| px[..3] != [255, 255, 255])
        .count();
    let (cx, cy) = (WIDTH / 2, HEIGHT - 8);
    let i = ((cy * WIDTH + cx) * 4) as usize;
    log::info!(
        "{count} rects on {WIDTH}x{HEIGHT}: {covered} covered pixels, pixel ({cx}, {cy}) = {:?}",
        &pixels[i..i + 4]
    );

    Ok(())
}

fn rect_count() -> Result<usize> {
    match std::env::args().nth(1) {
        None => Ok(DEFAULT_RECTS),
        Some(arg) => {
            let n: usize = arg
                .parse()
                .with_context(|| format!("rect count must be a non-negative integer, got {arg:?}"))?;
            if n > WIDTH as usize {
                bail!("at most {WIDTH} rects fit side by side, got {n}");
            }
            Ok(n)
        }
    }
}

/// One bar per item, spread across the width with heights following a wave.
fn bar_chart(count: usize) -> RectGroup {
    let slot = WIDTH as f32 / count.max(1) as f32;
    let plot_height = HEIGHT as f32 - 32.0;

    (0..count)
        .map(|i| {
            let t = i as f32 / count.max(1) as f32;
            let h = plot_height * (0.15 + 0.85 * (0.5 + 0.5 * (t * std::f32::consts::TAU).sin()));
            SceneRect::new(i as f32 * slot + slot * 0.1, HEIGHT as f32 - h, slot * 0.8, h)
                .with_fill(PALETTE[i % PALETTE.len()])
                .with_fill_opacity(0.85)
                .with_stroke("black")
                .with_stroke_width(1.0)
        })
        .collect()
}

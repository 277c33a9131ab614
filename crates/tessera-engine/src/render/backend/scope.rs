use crate::render::RenderError;

/// Runs `f` inside validation and out-of-memory error scopes.
///
/// wgpu reports creation failures asynchronously to the device's uncaptured
/// error handler, which panics by default. Scoping them turns the first
/// captured error into `RenderError::ResourceCreation`.
pub(crate) fn scoped<T>(
    device: &wgpu::Device,
    what: &'static str,
    f: impl FnOnce() -> T,
) -> Result<T, RenderError> {
    let out_of_memory = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    let validation = device.push_error_scope(wgpu::ErrorFilter::Validation);

    let out = f();

    // Scopes pop innermost first.
    let validation = validation.pop();
    let out_of_memory = out_of_memory.pop();
    let error = pollster::block_on(validation).or(pollster::block_on(out_of_memory));

    match error {
        Some(err) => {
            log::error!("wgpu error while creating {what}: {err}");
            Err(RenderError::creation(what, err.to_string()))
        }
        None => Ok(out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Gpu, GpuInit};

    fn gpu() -> Option<Gpu> {
        match Gpu::new_blocking(GpuInit::default()) {
            Ok(gpu) => Some(gpu),
            Err(e) => {
                eprintln!("no GPU adapter, skipping: {e:#}");
                None
            }
        }
    }

    #[test]
    fn validation_error_is_returned() {
        let Some(gpu) = gpu() else { return };
        let device = gpu.device();

        // MAP_READ | MAP_WRITE on one buffer needs a feature we never request.
        let res = scoped(device, "bad buffer", || {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("bad buffer"),
                size: 16,
                usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::MAP_WRITE,
                mapped_at_creation: false,
            })
        });
        assert!(matches!(
            res,
            Err(RenderError::ResourceCreation { what: "bad buffer", .. })
        ));
    }

    #[test]
    fn clean_creation_passes_through() {
        let Some(gpu) = gpu() else { return };
        let device = gpu.device();

        let res = scoped(device, "buffer", || {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("buffer"),
                size: 16,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });
        assert_eq!(res.map(|b| b.size()), Ok(16));
    }
}

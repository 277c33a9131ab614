/// Failures surfaced by the renderers.
///
/// None of these are retried internally; recovery policy belongs to the caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    /// Pipeline, buffer or bind group could not be created. Fatal for the
    /// render group: nothing from the failed build is retained.
    #[error("failed to create {what}: {reason}")]
    ResourceCreation { what: &'static str, reason: String },

    /// The asynchronous staging-buffer map reported an error.
    #[error("staging buffer mapping failed: {0}")]
    Mapping(String),

    /// The device stopped answering (map callback dropped, poll failure).
    #[error("device lost: {0}")]
    DeviceLost(String),

    /// A built render context was asked to draw into a target of another format.
    #[error("pipeline built for {built:?} cannot draw into {requested:?}")]
    FormatMismatch {
        built: wgpu::TextureFormat,
        requested: wgpu::TextureFormat,
    },
}

impl RenderError {
    #[inline]
    pub(crate) fn creation(what: &'static str, reason: impl Into<String>) -> Self {
        RenderError::ResourceCreation { what, reason: reason.into() }
    }
}

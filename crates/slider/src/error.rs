use thiserror::Error;

/// Failure to fetch, decode, or upload one image of a batch.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("request for {location} failed")]
    Request {
        location: String,
        #[source]
        error: reqwest::Error,
    },
    #[error("{location} responded with HTTP {status}")]
    Status { location: String, status: u16 },
    #[error("failed to read {location}")]
    Io {
        location: String,
        #[source]
        error: std::io::Error,
    },
    #[error("failed to decode {location}")]
    Decode {
        location: String,
        #[source]
        error: image::ImageError,
    },
    #[error("unsupported scheme '{scheme}' in {location}")]
    UnsupportedScheme { location: String, scheme: String },
    #[error("failed to upload texture for {location}: {message}")]
    Upload { location: String, message: String },
    #[error("image loader thread exited before finishing the batch")]
    WorkerLost,
}

/// Error raised while presenting a frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("surface lost")]
    Lost,
    #[error("surface outdated")]
    Outdated,
    #[error("timed out acquiring the next frame")]
    Timeout,
    #[error("GPU out of memory")]
    OutOfMemory,
    #[error("render failed: {0}")]
    Other(String),
}

impl RenderError {
    /// Lost, outdated, and timed out surfaces recover once the host reconfigures
    /// or retries on the next frame.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RenderError::Lost | RenderError::Outdated | RenderError::Timeout)
    }
}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(err: wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Lost => RenderError::Lost,
            wgpu::SurfaceError::Outdated => RenderError::Outdated,
            wgpu::SurfaceError::Timeout => RenderError::Timeout,
            wgpu::SurfaceError::OutOfMemory => RenderError::OutOfMemory,
            other => RenderError::Other(other.to_string()),
        }
    }
}

/// Outcome reported through a [`PendingResult`](crate::PendingResult).
#[derive(Debug, Error)]
pub enum SliderError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("image index {index} is out of range for {len} images")]
    InvalidIndex { index: usize, len: usize },
    #[error("texture for image {index} is not loaded")]
    TextureNotLoaded { index: usize },
    #[error("slider has not been initialised")]
    NotInitialized,
    #[error("slider is already initialised")]
    AlreadyInitialized,
    #[error("a transition is already running")]
    TransitionBusy,
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("slider was disposed before the operation completed")]
    Disposed,
}

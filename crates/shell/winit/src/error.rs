use winit::error::{EventLoopError, OsError};

/// An error raised by the native backend.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The event loop could not be created.
    #[error("the event loop could not be created: {0}")]
    EventLoopCreationFailed(#[from] EventLoopError),

    /// The operating system refused to create a window.
    #[error("the window could not be created: {0}")]
    WindowCreationFailed(#[from] OsError),

    /// A presentation surface failed.
    #[error("the presentation surface failed: {0}")]
    Surface(#[from] softbuffer::SoftBufferError),

    /// The event loop was never resumed, so windows cannot be created yet.
    #[error("the event loop is not active")]
    Inactive,

    /// The display was not opened.
    #[error("the display is not open")]
    NoDisplay,
}

impl From<Error> for flint_runtime::Error {
    fn from(error: Error) -> Self {
        match error {
            Error::EventLoopCreationFailed(_) | Error::NoDisplay => {
                flint_runtime::Error::Display(error.to_string())
            }
            Error::WindowCreationFailed(_) | Error::Surface(_) | Error::Inactive => {
                flint_runtime::Error::WindowCreationFailed(error.to_string())
            }
        }
    }
}

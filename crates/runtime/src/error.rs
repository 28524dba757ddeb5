use crate::core::{Size, settings};

/// An error raised while starting the toolkit or talking to a driver.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The settings describe an unusable configuration.
    #[error("invalid settings: {0}")]
    Settings(#[from] settings::Error),

    /// The native display could not be opened.
    #[error("the display could not be opened: {0}")]
    Display(String),

    /// The backend refused to initialize one of its drivers.
    #[error("the {driver} driver failed to initialize: {reason}")]
    Driver {
        /// The role of the driver.
        driver: &'static str,
        /// What went wrong.
        reason: String,
    },

    /// A native window could not be created.
    #[error("the native window could not be created: {0}")]
    WindowCreationFailed(String),

    /// An offscreen surface could not be allocated.
    #[error("a surface of {}x{} pixels could not be allocated", .0.width, .0.height)]
    Surface(Size),
}

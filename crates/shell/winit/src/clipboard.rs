//! Access the clipboard.
use clipboard_rs::{Clipboard as _, ClipboardContext};

/// MIME types tried when the clipboard has no plain text.
const TEXT_MIME_TYPES: &[&str] = &[
    "text/plain;charset=utf-8",
    "text/plain",
    "UTF8_STRING",
    "STRING",
    "TEXT",
];

/// The system clipboard.
pub struct Clipboard {
    state: State,
}

enum State {
    Connected { clipboard: ClipboardContext },
    Unavailable,
}

impl Clipboard {
    /// Connects to the system clipboard.
    ///
    /// A clipboard that cannot be reached stays empty.
    pub fn connect() -> Clipboard {
        let state = match ClipboardContext::new() {
            Ok(clipboard) => State::Connected { clipboard },
            Err(error) => {
                log::warn!("the clipboard is unavailable: {error}");
                State::Unavailable
            }
        };

        Clipboard { state }
    }

    /// Creates a [`Clipboard`] that never holds anything.
    pub fn unconnected() -> Clipboard {
        Clipboard {
            state: State::Unavailable,
        }
    }

    /// Returns true if the system clipboard was reached.
    pub fn is_connected(&self) -> bool {
        matches!(self.state, State::Connected { .. })
    }

    /// Reads the clipboard as text.
    pub fn read_text(&self) -> Option<String> {
        let State::Connected { clipboard } = &self.state else {
            return None;
        };

        if let Ok(text) = clipboard.get_text() {
            return Some(text);
        }

        TEXT_MIME_TYPES.iter().find_map(|mime| {
            clipboard
                .get_buffer(mime)
                .ok()
                .and_then(|data| String::from_utf8(data).ok())
        })
    }

    /// Writes text to the clipboard.
    pub fn write_text(&mut self, contents: &str) {
        let State::Connected { clipboard } = &mut self.state else {
            log::debug!("dropping {} bytes for an unavailable clipboard", contents.len());
            return;
        };

        if let Err(error) = clipboard.set_text(contents.to_owned()) {
            log::warn!("failed to write to the clipboard: {error}");
        }
    }
}

impl std::fmt::Debug for Clipboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clipboard")
            .field("connected", &self.is_connected())
            .finish()
    }
}

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryErrorKind {
    NotFound,
    Auth,
    Validation,
    Server,
    Transport,
    Serialization,
    Config,
}

#[derive(Debug, Error)]
#[error("{kind:?}: {message}")]
pub struct GalleryError {
    pub kind: GalleryErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl GalleryError {
    pub fn new(kind: GalleryErrorKind, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == GalleryErrorKind::NotFound
    }

    /// Lifts the error into the core error type, keeping the SDK error as source.
    pub fn into_core(self, context: impl Into<String>) -> gallery_core::Error {
        let context = context.into();
        match self.kind {
            GalleryErrorKind::NotFound => {
                gallery_core::Error::NotFound(format!("{context}: {}", self.message))
            }
            GalleryErrorKind::Auth => {
                gallery_core::Error::Unauthorized(format!("{context}: {}", self.message))
            }
            _ => gallery_core::Error::fetch(context, self),
        }
    }
}

impl From<reqwest::Error> for GalleryError {
    fn from(e: reqwest::Error) -> Self {
        GalleryError::new(GalleryErrorKind::Transport, None, e.to_string())
    }
}

impl From<serde_json::Error> for GalleryError {
    fn from(e: serde_json::Error) -> Self {
        GalleryError::new(GalleryErrorKind::Serialization, None, e.to_string())
    }
}

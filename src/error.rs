//! Error types for pagesift library.

use std::io;
use thiserror::Error;

/// Result type alias for pagesift operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during layout classification.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading input or writing output files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Page number is outside the document.
    #[error("Page {0} is out of range (document has {1} pages)")]
    InvalidPage(u32, u32),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// The page input could not be decoded.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error during rendering (JSON, Markdown, text).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::Io(err.into())
        } else {
            Error::InvalidInput(err.to_string())
        }
    }
}

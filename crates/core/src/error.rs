/// Result alias that carries the custom [`SpectralDelayError`] type.
pub type Result<T> = std::result::Result<T, SpectralDelayError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum SpectralDelayError {
    /// A parameter index outside the declared table was used on get or set.
    /// Non-fatal by contract; no stored value is touched.
    #[error("unsupported parameter index {index}")]
    UnsupportedParameter { index: usize },
    /// The gain curve must always carry at least one point.
    #[error("gain curve replacement requires at least one point")]
    EmptyCurve,
    /// Generic message variant for errors that do not warrant their own
    /// taxonomy entry, mainly surfaced by the application layer.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl SpectralDelayError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for SpectralDelayError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for SpectralDelayError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

use thiserror::Error;

/// Failures that can happen while handling a single input line.
///
/// `MalformedToken` is a line-level failure and is reported on the diagnostic stream.
/// Every other variant belongs to the frame being processed and is reported back to
/// the host as an `{"error": ...}` line.
#[derive(Debug, Error)]
pub enum BvrError {
    #[error("invalid literal for a byte value: '{token}'")]
    MalformedToken { token: String },

    #[error("byte value {value} at position {position} is outside 0..=255")]
    ByteOutOfRange { position: usize, value: i64 },

    #[error("cannot identify image data: {0}")]
    Decode(#[from] image::ImageError),

    #[error("failed to resize frame: {0}")]
    Resize(String),

    #[error("tensor shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("inference failed: {0}")]
    Ort(#[from] ort::Error),

    #[error("unexpected model output: {0}")]
    OutputShape(String),

    #[error("class index {class_id} has no label ({labels} labels loaded)")]
    UnknownClass { class_id: i64, labels: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BvrError {
    /// Whether the failure concerns the raw input line rather than the frame it carries.
    pub fn is_line_level(&self) -> bool {
        matches!(self, BvrError::MalformedToken { .. })
    }
}

impl From<fast_image_resize::ResizeError> for BvrError {
    fn from(err: fast_image_resize::ResizeError) -> Self {
        BvrError::Resize(err.to_string())
    }
}

impl From<fast_image_resize::ImageBufferError> for BvrError {
    fn from(err: fast_image_resize::ImageBufferError) -> Self {
        BvrError::Resize(err.to_string())
    }
}

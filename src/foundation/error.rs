/// Convenience result type used across cardreel.
pub type CardreelResult<T> = Result<T, CardreelError>;

/// Top-level error taxonomy for the generation pipeline.
#[derive(thiserror::Error, Debug)]
pub enum CardreelError {
    /// The request cannot be processed as given (for example: no cards).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Temp directory creation/deletion or intermediate file IO failed.
    #[error("workspace error: {0}")]
    Workspace(String),

    /// A slide failed to compose, rasterize or be written.
    #[error("render error: slide {ordinal}: {message}")]
    Render {
        /// Zero-based position of the failing slide.
        ordinal: usize,
        /// Underlying failure description.
        message: String,
    },

    /// The external encoder could not be started, exited abnormally or produced no output.
    #[error("encode error: {0}")]
    Encode(String),

    /// The encoded output could not be read back.
    #[error("read-back error: {0}")]
    ReadBack(String),

    /// Invalid pipeline options.
    #[error("configuration error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Internal-only diagnostic code attached to every error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidRequest,
    Workspace,
    Render,
    Encode,
    ReadBack,
    Config,
    Internal,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Workspace => "workspace",
            Self::Render => "render",
            Self::Encode => "encode",
            Self::ReadBack => "read_back",
            Self::Config => "config",
            Self::Internal => "internal",
        }
    }
}

/// Externally visible failure category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// The caller sent something unusable (HTTP 400).
    BadRequest,
    /// Generation failed after the request was accepted (HTTP 500).
    GenerationFailed,
}

impl ErrorClass {
    pub fn http_status(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::GenerationFailed => 500,
        }
    }
}

impl CardreelError {
    /// Build a [`CardreelError::InvalidRequest`] value.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Build a [`CardreelError::Workspace`] value.
    pub fn workspace(msg: impl Into<String>) -> Self {
        Self::Workspace(msg.into())
    }

    /// Build a [`CardreelError::Render`] value.
    pub fn render(ordinal: usize, msg: impl Into<String>) -> Self {
        Self::Render {
            ordinal,
            message: msg.into(),
        }
    }

    /// Build a [`CardreelError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`CardreelError::ReadBack`] value.
    pub fn read_back(msg: impl Into<String>) -> Self {
        Self::ReadBack(msg.into())
    }

    /// Build a [`CardreelError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidRequest(_) => ErrorCode::InvalidRequest,
            Self::Workspace(_) => ErrorCode::Workspace,
            Self::Render { .. } => ErrorCode::Render,
            Self::Encode(_) => ErrorCode::Encode,
            Self::ReadBack(_) => ErrorCode::ReadBack,
            Self::Config(_) => ErrorCode::Config,
            Self::Other(_) => ErrorCode::Internal,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidRequest(_) => ErrorClass::BadRequest,
            _ => ErrorClass::GenerationFailed,
        }
    }

    /// Message safe to show to the caller. Diagnostic detail stays in logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "Select at least one card to build a video.",
            _ => "Failed to generate the video.",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

//! Transport-neutral response shapes for the generation endpoint.
//!
//! HTTP wiring lives with the caller; these types carry exactly what it needs to write a response.

use crate::{
    foundation::error::{CardreelError, CardreelResult},
    pipeline::orchestrator::GeneratedVideo,
};

/// Successful generation: a downloadable MP4.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub content_length: usize,
    pub content_disposition: String,
    pub body: Vec<u8>,
}

impl VideoResponse {
    /// Header pairs in the order they should be written.
    pub fn headers(&self) -> [(&'static str, String); 3] {
        [
            ("Content-Type", self.content_type.to_string()),
            ("Content-Length", self.content_length.to_string()),
            ("Content-Disposition", self.content_disposition.clone()),
        ]
    }
}

impl From<GeneratedVideo> for VideoResponse {
    fn from(video: GeneratedVideo) -> Self {
        Self {
            status: 200,
            content_type: video.content_type,
            content_length: video.bytes.len(),
            content_disposition: format!(
                "attachment; filename=\"{}\"",
                video.filename.replace(['"', '\\'], "_")
            ),
            body: video.bytes,
        }
    }
}

/// JSON error payload: `{"error": "...", "code": "..."}`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorResponse {
    pub status: u16,
    pub body: ErrorBody,
}

impl ErrorResponse {
    pub fn to_json(&self) -> CardreelResult<String> {
        serde_json::to_string(&self.body)
            .map_err(|e| CardreelError::Other(anyhow::Error::new(e)))
    }
}

impl From<&CardreelError> for ErrorResponse {
    fn from(err: &CardreelError) -> Self {
        Self {
            status: err.class().http_status(),
            body: ErrorBody {
                error: err.public_message().to_string(),
                code: err.code().as_str().to_string(),
            },
        }
    }
}

/// Map a pipeline outcome onto one of the two response shapes.
pub fn respond(result: CardreelResult<GeneratedVideo>) -> Result<VideoResponse, ErrorResponse> {
    match result {
        Ok(video) => Ok(video.into()),
        Err(e) => Err(ErrorResponse::from(&e)),
    }
}

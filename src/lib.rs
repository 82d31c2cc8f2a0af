//! cardreel turns an ordered list of title cards into a short slideshow MP4.
//!
//! # Pipeline overview
//!
//! 1. **Validate**: reject empty card lists before touching the filesystem.
//! 2. **Render**: each card title becomes a 1280×720 PNG (SVG markup rasterized with `resvg`),
//!    in parallel on a rayon pool.
//! 3. **Plan**: the ordered slides become an ffmpeg `concat` script ([`EditPlan`]).
//! 4. **Encode**: the system `ffmpeg` turns the plan into one MP4 ([`FfmpegEncoder`]).
//! 5. **Read back** the file into memory and remove the per-call [`Workspace`].
//!
//! Every intermediate file lives in a workspace that is deleted on every exit path.
//!
//! ```no_run
//! use cardreel::{Card, Pipeline, PipelineOpts};
//!
//! let pipeline = Pipeline::new(PipelineOpts::default())?;
//! let video = pipeline.generate(&[Card::new("Hello"), Card::new("World")])?;
//! std::fs::write(&video.filename, &video.bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![forbid(unsafe_code)]

mod card;
mod encode;
mod foundation;
mod pipeline;
mod plan;
mod render;
mod response;

pub use card::{
    Card, ELLIPSIS, GenerateRequest, MAX_TITLE_CHARS, TRUNCATED_TITLE_CHARS, truncate_title,
};
pub use encode::ffmpeg::{FfmpegEncoder, FfmpegOpts, is_ffmpeg_available};
pub use encode::{EncodeJob, Encoder};
pub use foundation::core::{Canvas, Rgb8};
pub use foundation::error::{CardreelError, CardreelResult, ErrorClass, ErrorCode};
pub use pipeline::orchestrator::{GeneratedVideo, Pipeline, PipelineOpts, Stage, VIDEO_MIME};
pub use pipeline::workspace::Workspace;
pub use plan::{
    DEFAULT_SLIDE_SECS, EditPlan, PLAN_FILE_NAME, PlanEntry, escape_concat_path,
};
pub use render::raster::build_fontdb;
pub use render::slide::{
    Slide, SlideRenderer, SlideStyle, SlideSvg, escape_markup, slide_file_name,
};
pub use response::{ErrorBody, ErrorResponse, VideoResponse, respond};

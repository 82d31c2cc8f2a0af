use std::path::Path;

use crate::{foundation::error::CardreelResult, plan::EditPlan};

pub(crate) mod ffmpeg;

/// Everything one encode needs: the ordered plan, where its script was written, and where the
/// video goes.
#[derive(Clone, Copy, Debug)]
pub struct EncodeJob<'a> {
    pub plan: &'a EditPlan,
    pub plan_file: &'a Path,
    pub output: &'a Path,
}

/// Turns a written edit plan into a single video file.
///
/// Implementations block until the output is complete (or failed). They must report process
/// failures as [`CardreelError::Encode`](crate::CardreelError::Encode), never as workspace errors.
pub trait Encoder: Send + Sync {
    fn encode(&self, job: &EncodeJob<'_>) -> CardreelResult<()>;
}

impl<E: Encoder + ?Sized> Encoder for std::sync::Arc<E> {
    fn encode(&self, job: &EncodeJob<'_>) -> CardreelResult<()> {
        (**self).encode(job)
    }
}

impl<E: Encoder + ?Sized> Encoder for Box<E> {
    fn encode(&self, job: &EncodeJob<'_>) -> CardreelResult<()> {
        (**self).encode(job)
    }
}

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    time::Instant,
};

use crate::{
    encode::{EncodeJob, Encoder},
    foundation::{
        core::Canvas,
        error::{CardreelError, CardreelResult},
    },
};

/// Options for [`FfmpegEncoder`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FfmpegOpts {
    /// Executable to run. A bare name is resolved through `PATH`.
    pub binary: PathBuf,
    /// Frame every slide is scaled and padded into.
    pub canvas: Canvas,
    pub fps: u32,
    pub video_codec: String,
    /// Upper bound on the stderr excerpt kept in [`CardreelError::Encode`].
    pub stderr_limit: usize,
    /// Passed verbatim right before the output path, e.g. `["-crf", "20"]`.
    pub extra_output_args: Vec<String>,
}

impl Default for FfmpegOpts {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("ffmpeg"),
            canvas: Canvas::HD,
            fps: 30,
            video_codec: "libx264".to_string(),
            stderr_limit: 4096,
            extra_output_args: Vec::new(),
        }
    }
}

impl FfmpegOpts {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> CardreelResult<()> {
        self.canvas.validate()?;
        if self.fps == 0 {
            return Err(CardreelError::config("encode fps must be non-zero"));
        }
        if self.binary.as_os_str().is_empty() {
            return Err(CardreelError::config("ffmpeg binary path is empty"));
        }
        if self.video_codec.trim().is_empty() {
            return Err(CardreelError::config("video codec must be set"));
        }
        if self.extra_output_args.iter().any(|a| a.is_empty()) {
            return Err(CardreelError::config("extra output args must not be empty strings"));
        }
        Ok(())
    }
}

/// Probe whether `binary -version` runs successfully.
pub fn is_ffmpeg_available(binary: &Path) -> bool {
    Command::new(binary)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Runs the system `ffmpeg` once per job against a concat edit plan.
#[derive(Clone, Debug)]
pub struct FfmpegEncoder {
    opts: FfmpegOpts,
}

impl FfmpegEncoder {
    pub fn new(opts: FfmpegOpts) -> CardreelResult<Self> {
        opts.validate()?;
        Ok(Self { opts })
    }

    pub fn opts(&self) -> &FfmpegOpts {
        &self.opts
    }

    /// Full argument list (without the program name) for one encode.
    pub fn args(&self, plan_file: &Path, output: &Path) -> Vec<OsString> {
        let Canvas { width, height } = self.opts.canvas;
        let filter = format!(
            "scale={width}:{height}:force_original_aspect_ratio=decrease,\
             pad={width}:{height}:(ow-iw)/2:(oh-ih)/2,format=yuv420p"
        );

        let mut args: Vec<OsString> = [
            "-hide_banner",
            "-loglevel",
            "error",
            "-y",
            // Input: concat plan, local files only.
            "-f",
            "concat",
            "-safe",
            "0",
            "-protocol_whitelist",
            "file",
            "-i",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(plan_file.as_os_str().to_owned());

        let fps = self.opts.fps.to_string();
        args.extend(
            [
                "-vf",
                filter.as_str(),
                "-r",
                fps.as_str(),
                "-c:v",
                self.opts.video_codec.as_str(),
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "+faststart",
                "-an",
            ]
            .into_iter()
            .map(OsString::from),
        );
        args.extend(self.opts.extra_output_args.iter().map(OsString::from));
        args.push(output.as_os_str().to_owned());
        args
    }
}

impl Encoder for FfmpegEncoder {
    #[tracing::instrument(level = "debug", skip(self, job), fields(plan = %job.plan_file.display()))]
    fn encode(&self, job: &EncodeJob<'_>) -> CardreelResult<()> {
        if job.plan.entries().is_empty() {
            return Err(CardreelError::encode("edit plan has no entries"));
        }

        let started = Instant::now();
        let output = Command::new(&self.opts.binary)
            .args(self.args(job.plan_file, job.output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                CardreelError::encode(format!(
                    "failed to spawn '{}' (is it installed and on PATH?): {e}",
                    self.opts.binary.display()
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CardreelError::encode(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                tail_chars(stderr.trim(), self.opts.stderr_limit)
            )));
        }

        let bytes = match std::fs::metadata(job.output) {
            Ok(m) if m.len() > 0 => m.len(),
            Ok(_) => {
                return Err(CardreelError::encode(format!(
                    "ffmpeg produced an empty file at '{}'",
                    job.output.display()
                )));
            }
            Err(e) => {
                return Err(CardreelError::encode(format!(
                    "ffmpeg reported success but '{}' is missing: {e}",
                    job.output.display()
                )));
            }
        };

        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            bytes,
            slides = job.plan.slide_paths().count(),
            "ffmpeg encode finished"
        );
        Ok(())
    }
}

/// Last `max` chars of `s`.
fn tail_chars(s: &str, max: usize) -> &str {
    let count = s.chars().count();
    if count <= max {
        return s;
    }
    let skip = count - max;
    match s.char_indices().nth(skip) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;

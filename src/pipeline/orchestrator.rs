use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::{
    card::{Card, GenerateRequest},
    encode::{
        EncodeJob, Encoder,
        ffmpeg::{FfmpegEncoder, FfmpegOpts},
    },
    foundation::{
        core::Canvas,
        error::{CardreelError, CardreelResult},
    },
    pipeline::workspace::Workspace,
    plan::{DEFAULT_SLIDE_SECS, EditPlan, PLAN_FILE_NAME},
    render::slide::{Slide, SlideRenderer, SlideStyle},
};

/// MIME type of every generated video.
pub const VIDEO_MIME: &str = "video/mp4";

/// Pipeline configuration. Passed in at construction; nothing is read from globals.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineOpts {
    pub canvas: Canvas,
    pub fps: u32,
    pub slide_duration_secs: f64,
    /// Parent directory for workspaces. `None` uses the OS temp dir.
    pub temp_root: Option<PathBuf>,
    /// Render worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Extra directories scanned for `.ttf`/`.otf`/`.ttc` fonts.
    pub font_dirs: Vec<PathBuf>,
    pub style: SlideStyle,
    pub ffmpeg_binary: PathBuf,
    pub video_codec: String,
    /// Extra ffmpeg output options, placed just before the output path.
    pub extra_output_args: Vec<String>,
}

impl Default for PipelineOpts {
    fn default() -> Self {
        let ffmpeg = FfmpegOpts::default();
        Self {
            canvas: Canvas::HD,
            fps: ffmpeg.fps,
            slide_duration_secs: DEFAULT_SLIDE_SECS,
            temp_root: None,
            threads: None,
            font_dirs: Vec::new(),
            style: SlideStyle::default(),
            ffmpeg_binary: ffmpeg.binary,
            video_codec: ffmpeg.video_codec,
            extra_output_args: ffmpeg.extra_output_args,
        }
    }
}

impl PipelineOpts {
    /// Load options from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> CardreelResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            CardreelError::config(format!("read options '{}': {e}", path.display()))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            CardreelError::config(format!("parse options '{}': {e}", path.display()))
        })
    }

    pub fn validate(&self) -> CardreelResult<()> {
        self.canvas.validate()?;
        if !self.slide_duration_secs.is_finite() || self.slide_duration_secs <= 0.0 {
            return Err(CardreelError::config(
                "slide duration must be a positive number of seconds",
            ));
        }
        if let Some(root) = &self.temp_root
            && root.to_str().is_none()
        {
            return Err(CardreelError::config(format!(
                "temp root '{}' is not valid UTF-8",
                root.display()
            )));
        }
        if let Some(0) = self.threads {
            return Err(CardreelError::config(
                "render 'threads' must be >= 1 when set",
            ));
        }
        if !(self.style.min_font_size > 0.0 && self.style.min_font_size <= self.style.font_size) {
            return Err(CardreelError::config(
                "style font sizes must satisfy 0 < min_font_size <= font_size",
            ));
        }
        self.ffmpeg_opts().validate()
    }

    pub fn ffmpeg_opts(&self) -> FfmpegOpts {
        FfmpegOpts {
            binary: self.ffmpeg_binary.clone(),
            canvas: self.canvas,
            fps: self.fps,
            video_codec: self.video_codec.clone(),
            extra_output_args: self.extra_output_args.clone(),
            ..FfmpegOpts::default()
        }
    }

    pub fn with_ffmpeg_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.ffmpeg_binary = binary.into();
        self
    }

    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_font_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.font_dirs.push(dir.into());
        self
    }
}

/// Progress of one generation. Any failure jumps straight to [`Stage::Cleaned`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Idle,
    WorkspaceCreated,
    SlidesRendered,
    PlanWritten,
    Encoded,
    OutputRead,
    Cleaned,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::WorkspaceCreated => "workspace_created",
            Self::SlidesRendered => "slides_rendered",
            Self::PlanWritten => "plan_written",
            Self::Encoded => "encoded",
            Self::OutputRead => "output_read",
            Self::Cleaned => "cleaned",
        }
    }
}

/// A finished video held in memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedVideo {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    /// Suggested download name, `cards-<unix millis>.mp4`.
    pub filename: String,
    pub slides: usize,
}

impl GeneratedVideo {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Cards in, MP4 bytes out.
///
/// A `Pipeline` holds only immutable state (renderer fonts, encoder settings, render pool) and can
/// serve any number of concurrent [`generate`](Self::generate) calls; each call owns its own
/// [`Workspace`].
pub struct Pipeline<E = FfmpegEncoder> {
    opts: PipelineOpts,
    renderer: SlideRenderer,
    encoder: E,
    pool: rayon::ThreadPool,
}

impl Pipeline<FfmpegEncoder> {
    /// Pipeline backed by the system `ffmpeg` named in `opts`.
    pub fn new(opts: PipelineOpts) -> CardreelResult<Self> {
        let encoder = FfmpegEncoder::new(opts.ffmpeg_opts())?;
        Self::with_encoder(opts, encoder)
    }
}

impl<E: Encoder> Pipeline<E> {
    pub fn with_encoder(opts: PipelineOpts, encoder: E) -> CardreelResult<Self> {
        opts.validate()?;
        let renderer =
            SlideRenderer::with_system_fonts(opts.canvas, opts.style.clone(), &opts.font_dirs);
        Self::from_parts(opts, renderer, encoder)
    }

    /// Assemble from an existing renderer, e.g. to share one font database between pipelines.
    pub fn from_parts(
        opts: PipelineOpts,
        renderer: SlideRenderer,
        encoder: E,
    ) -> CardreelResult<Self> {
        opts.validate()?;
        if renderer.canvas() != opts.canvas {
            return Err(CardreelError::config(
                "renderer canvas does not match pipeline canvas",
            ));
        }
        let pool = build_thread_pool(opts.threads)?;
        Ok(Self {
            opts,
            renderer,
            encoder,
            pool,
        })
    }

    pub fn opts(&self) -> &PipelineOpts {
        &self.opts
    }

    pub fn renderer(&self) -> &SlideRenderer {
        &self.renderer
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Validate a boundary request and generate.
    pub fn generate_request(&self, req: &GenerateRequest) -> CardreelResult<GeneratedVideo> {
        self.generate(req.cards()?)
    }

    pub fn generate(&self, cards: &[Card]) -> CardreelResult<GeneratedVideo> {
        self.generate_observed(cards, |_| {})
    }

    /// [`generate`](Self::generate), reporting every stage reached to `on_stage`.
    #[tracing::instrument(level = "info", skip_all, fields(cards = cards.len()))]
    pub fn generate_observed(
        &self,
        cards: &[Card],
        mut on_stage: impl FnMut(Stage),
    ) -> CardreelResult<GeneratedVideo> {
        on_stage(Stage::Idle);
        if cards.is_empty() {
            return Err(CardreelError::invalid_request("no cards supplied"));
        }
        let titles: Vec<String> = cards
            .iter()
            .enumerate()
            .map(|(i, c)| c.display_title(i))
            .collect();

        let workspace = Workspace::create(self.opts.temp_root.as_deref())?;
        let mut reached = Stage::WorkspaceCreated;
        on_stage(reached);

        let result = self.run_stages(&workspace, &titles, |stage| {
            tracing::debug!(stage = stage.as_str(), "stage reached");
            reached = stage;
            on_stage(stage);
        });

        // Cleanup outcome is logged inside `close` and never changes `result`.
        workspace.close();
        on_stage(Stage::Cleaned);

        match &result {
            Ok(video) => tracing::info!(
                slides = video.slides,
                bytes = video.len(),
                filename = %video.filename,
                "video generated"
            ),
            Err(e) => tracing::warn!(
                last_stage = reached.as_str(),
                code = e.code().as_str(),
                error = %e,
                "video generation failed"
            ),
        }
        result
    }

    fn run_stages(
        &self,
        workspace: &Workspace,
        titles: &[String],
        mut advance: impl FnMut(Stage),
    ) -> CardreelResult<GeneratedVideo> {
        let slides = self.render_slides(workspace.path(), titles)?;
        advance(Stage::SlidesRendered);

        let plan = EditPlan::from_slides(&slides, self.opts.slide_duration_secs)?;
        let plan_file = workspace.join(PLAN_FILE_NAME);
        plan.write_to(&plan_file)?;
        advance(Stage::PlanWritten);

        let stamp = chrono::Utc::now().timestamp_millis();
        let output = workspace.join(format!("output-{stamp}.mp4"));
        self.encoder.encode(&EncodeJob {
            plan: &plan,
            plan_file: &plan_file,
            output: &output,
        })?;
        advance(Stage::Encoded);

        let bytes = std::fs::read(&output).map_err(|e| {
            CardreelError::read_back(format!("read encoded video '{}': {e}", output.display()))
        })?;
        advance(Stage::OutputRead);

        Ok(GeneratedVideo {
            bytes,
            content_type: VIDEO_MIME,
            filename: format!("cards-{stamp}.mp4"),
            slides: slides.len(),
        })
    }

    /// Fan out one render per title, wait for all of them, then surface the first failure in
    /// card order.
    fn render_slides(&self, dir: &Path, titles: &[String]) -> CardreelResult<Vec<Slide>> {
        let renderer = &self.renderer;
        let results: Vec<CardreelResult<Slide>> = self.pool.install(|| {
            titles
                .par_iter()
                .enumerate()
                .map(|(ordinal, title)| renderer.render(title, ordinal, dir))
                .collect()
        });

        let mut slides = Vec::with_capacity(results.len());
        for result in results {
            slides.push(result?);
        }
        if slides.iter().enumerate().any(|(i, s)| s.ordinal != i) {
            return Err(CardreelError::Other(anyhow::anyhow!(
                "internal error: slide ordinals out of order"
            )));
        }
        tracing::debug!(slides = slides.len(), "slides rendered");
        Ok(slides)
    }
}

fn build_thread_pool(threads: Option<usize>) -> CardreelResult<rayon::ThreadPool> {
    let mut builder =
        rayon::ThreadPoolBuilder::new().thread_name(|i| format!("cardreel-render-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| CardreelError::config(format!("failed to build render thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/orchestrator.rs"]
mod tests;

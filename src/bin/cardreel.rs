use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "cardreel", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a slideshow MP4 from a cards JSON file (requires `ffmpeg`).
    Generate(GenerateArgs),
    /// Render a single slide as a PNG.
    Slide(SlideArgs),
    /// Print the concat plan the pipeline would hand to ffmpeg.
    Plan(PlanArgs),
}

#[derive(Parser, Debug)]
struct PipelineArgs {
    /// Pipeline options JSON (fields not given keep their defaults).
    #[arg(long)]
    options: Option<PathBuf>,

    /// ffmpeg executable.
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Directory under which per-run workspaces are created.
    #[arg(long)]
    temp_root: Option<PathBuf>,

    /// Render worker threads.
    #[arg(long)]
    threads: Option<usize>,

    /// Extra font directory (repeatable).
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Cards JSON: `{"cards": [...]}` or a bare array of cards.
    #[arg(long)]
    cards: PathBuf,

    /// Output MP4 path. Defaults to the suggested `cards-<millis>.mp4` name.
    #[arg(long)]
    out: Option<PathBuf>,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

#[derive(Parser, Debug)]
struct SlideArgs {
    /// Card title.
    #[arg(long)]
    title: String,

    /// Slide position used for the placeholder title and gradient id.
    #[arg(long, default_value_t = 0)]
    ordinal: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Also write the SVG markup next to the PNG.
    #[arg(long)]
    dump_svg: bool,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Cards JSON: `{"cards": [...]}` or a bare array of cards.
    #[arg(long)]
    cards: PathBuf,

    /// Directory the slide paths are shown under.
    #[arg(long, default_value = "/tmp/cardreel-XXXXXX")]
    workspace: PathBuf,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Slide(args) => cmd_slide(args),
        Command::Plan(args) => cmd_plan(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_opts(args: &PipelineArgs) -> anyhow::Result<cardreel::PipelineOpts> {
    let mut opts = match &args.options {
        Some(path) => cardreel::PipelineOpts::from_json_file(path)?,
        None => cardreel::PipelineOpts::default(),
    };
    if let Some(bin) = &args.ffmpeg {
        opts = opts.with_ffmpeg_binary(bin);
    }
    if let Some(root) = &args.temp_root {
        opts = opts.with_temp_root(root);
    }
    if let Some(n) = args.threads {
        opts = opts.with_threads(n);
    }
    for dir in &args.font_dirs {
        opts = opts.with_font_dir(dir);
    }
    opts.validate()?;
    Ok(opts)
}

fn read_cards(path: &Path) -> anyhow::Result<Vec<cardreel::Card>> {
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum CardsFile {
        Request(cardreel::GenerateRequest),
        Bare(Vec<cardreel::Card>),
    }

    let f = File::open(path).with_context(|| format!("open cards '{}'", path.display()))?;
    let parsed: CardsFile = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse cards JSON '{}'", path.display()))?;
    let req = match parsed {
        CardsFile::Request(req) => req,
        CardsFile::Bare(cards) => cardreel::GenerateRequest::new(cards),
    };
    Ok(req.cards()?.to_vec())
}

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let opts = load_opts(&args.pipeline)?;
    if !cardreel::is_ffmpeg_available(&opts.ffmpeg_binary) {
        tracing::warn!(
            ffmpeg = %opts.ffmpeg_binary.display(),
            "ffmpeg probe failed; encoding will likely fail"
        );
    }
    let cards = read_cards(&args.cards)?;
    let pipeline = cardreel::Pipeline::new(opts)?;

    let video = match pipeline.generate(&cards) {
        Ok(v) => v,
        Err(e) => {
            let resp = cardreel::ErrorResponse::from(&e);
            anyhow::bail!("{} [{}]: {e}", resp.body.error, resp.body.code);
        }
    };

    let out = args.out.unwrap_or_else(|| PathBuf::from(&video.filename));
    ensure_parent_dir(&out)?;
    std::fs::write(&out, &video.bytes).with_context(|| format!("write '{}'", out.display()))?;

    eprintln!(
        "wrote {} ({} slides, {} bytes)",
        out.display(),
        video.slides,
        video.len()
    );
    Ok(())
}

fn cmd_slide(args: SlideArgs) -> anyhow::Result<()> {
    let opts = load_opts(&args.pipeline)?;
    let renderer =
        cardreel::SlideRenderer::with_system_fonts(opts.canvas, opts.style, &opts.font_dirs);

    let title = cardreel::Card::new(args.title).display_title(args.ordinal);
    ensure_parent_dir(&args.out)?;
    let svg = renderer.render_to(&title, args.ordinal, &args.out)?;
    if args.dump_svg {
        let svg_path = args.out.with_extension("svg");
        std::fs::write(&svg_path, &svg.markup)
            .with_context(|| format!("write '{}'", svg_path.display()))?;
    }

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let opts = load_opts(&args.pipeline)?;
    let cards = read_cards(&args.cards)?;
    let slides: Vec<cardreel::Slide> = (0..cards.len())
        .map(|ordinal| cardreel::Slide {
            ordinal,
            path: args.workspace.join(cardreel::slide_file_name(ordinal)),
        })
        .collect();
    let plan = cardreel::EditPlan::from_slides(&slides, opts.slide_duration_secs)?;
    print!("{}", plan.to_concat_script());
    Ok(())
}

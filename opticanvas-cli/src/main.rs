use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand};
use opticanvas::{
    AnamorphicParams, Canvas, EngineConfig, LensParams, PlanarMirrorParams, RenderJob,
    RenderPipeline, RenderResult, RenderThreading, SourceImage, SphericalMirrorParams,
    TaskParameters,
};

/// Side of the built-in source used when no `--image` is given.
const DEFAULT_SOURCE_SIDE: u32 = 100;

#[derive(Parser, Debug)]
#[command(name = "opticanvas", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Engine config JSON; missing fields take their defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a diagram described by a parameters JSON file.
    Render(RenderArgs),
    /// Thin lens diagram.
    Lens(LensArgs),
    /// Planar mirror diagram.
    Planar(PlanarArgs),
    /// Concave spherical mirror diagram.
    Concave(MirrorArgs),
    /// Convex spherical mirror diagram.
    Convex(MirrorArgs),
    /// Cylindrical anamorphic projection.
    Anamorphic(AnamorphicArgs),
    /// Render one PNG per step while sweeping a numeric parameter.
    Sweep(SweepArgs),
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Source image; a built-in test pattern when omitted.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Parameters JSON (`{"kind": "lens", ...}`).
    #[arg(long)]
    params: PathBuf,

    /// Task key to register under; defaults to the diagram kind.
    #[arg(long)]
    task_key: Option<String>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug)]
struct LensArgs {
    #[arg(long, allow_negative_numbers = true)]
    start_x: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    start_y: Option<f64>,
    #[arg(long)]
    scale: Option<f64>,
    /// Negative for a diverging lens.
    #[arg(long, allow_negative_numbers = true)]
    focal_length: Option<f64>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug)]
struct PlanarArgs {
    #[arg(long, allow_negative_numbers = true)]
    offset_x: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    offset_y: Option<i64>,
    #[arg(long)]
    canvas_size: Option<u32>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug)]
struct MirrorArgs {
    #[arg(long)]
    radius: Option<f64>,
    /// World x of the object's left edge.
    #[arg(long, allow_negative_numbers = true)]
    object_x: Option<f64>,
    /// World y of the object's centre.
    #[arg(long, allow_negative_numbers = true)]
    object_y: Option<f64>,
    #[arg(long)]
    object_height: Option<f64>,
    #[arg(long)]
    zoom: Option<f64>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug)]
struct AnamorphicArgs {
    #[arg(long)]
    radius_factor: Option<f64>,
    /// Degrees.
    #[arg(long)]
    arc_angle: Option<f64>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug)]
struct SweepArgs {
    /// Base parameters JSON.
    #[arg(long)]
    params: PathBuf,

    /// Source image; a built-in test pattern when omitted.
    #[arg(long)]
    image: Option<PathBuf>,

    /// JSON name of the numeric field to sweep.
    #[arg(long)]
    field: String,

    #[arg(long, allow_negative_numbers = true)]
    from: f64,

    #[arg(long, allow_negative_numbers = true)]
    to: f64,

    /// Number of frames, endpoints included.
    #[arg(long, default_value_t = 10)]
    steps: usize,

    /// Directory receiving `step_NNNN.png` files and `sweep.json`.
    #[arg(long)]
    out_dir: PathBuf,

    /// Render steps concurrently.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };
    let pipeline = RenderPipeline::new(config)?;

    match cli.cmd {
        Command::Render(args) => {
            let params = TaskParameters::from_path(&args.params)?;
            cmd_single(&pipeline, params, args.task_key, &args.output)
        }
        Command::Lens(args) => {
            let d = LensParams::default();
            let params = TaskParameters::Lens(LensParams {
                start_x: args.start_x.unwrap_or(d.start_x),
                start_y: args.start_y.unwrap_or(d.start_y),
                scale: args.scale.unwrap_or(d.scale),
                focal_length: args.focal_length.unwrap_or(d.focal_length),
            });
            cmd_single(&pipeline, params, None, &args.output)
        }
        Command::Planar(args) => {
            let d = PlanarMirrorParams::default();
            let params = TaskParameters::PlanarMirror(PlanarMirrorParams {
                offset_x: args.offset_x.unwrap_or(d.offset_x),
                offset_y: args.offset_y.unwrap_or(d.offset_y),
                canvas_size: args.canvas_size.unwrap_or(d.canvas_size),
            });
            cmd_single(&pipeline, params, None, &args.output)
        }
        Command::Concave(args) => {
            let params = args.params(SphericalMirrorParams::concave_default());
            cmd_single(&pipeline, TaskParameters::ConcaveMirror(params), None, &args.output)
        }
        Command::Convex(args) => {
            let params = args.params(SphericalMirrorParams::convex_default());
            cmd_single(&pipeline, TaskParameters::ConvexMirror(params), None, &args.output)
        }
        Command::Anamorphic(args) => {
            let d = AnamorphicParams::default();
            let params = TaskParameters::Anamorphic(AnamorphicParams {
                radius_factor: args.radius_factor.unwrap_or(d.radius_factor),
                arc_angle: args.arc_angle.unwrap_or(d.arc_angle),
            });
            cmd_single(&pipeline, params, None, &args.output)
        }
        Command::Sweep(args) => cmd_sweep(&pipeline, args),
    }
}

impl MirrorArgs {
    fn params(&self, d: SphericalMirrorParams) -> SphericalMirrorParams {
        SphericalMirrorParams {
            radius: self.radius.unwrap_or(d.radius),
            object_x: self.object_x.unwrap_or(d.object_x),
            object_y: self.object_y.unwrap_or(d.object_y),
            object_height: self.object_height.unwrap_or(d.object_height),
            zoom: self.zoom.unwrap_or(d.zoom),
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn load_image(path: Option<&Path>, cfg: &EngineConfig) -> anyhow::Result<SourceImage> {
    match path {
        Some(p) => Ok(opticanvas::load_source(p, cfg.max_source_side)?),
        None => Ok(SourceImage::placeholder(DEFAULT_SOURCE_SIDE)),
    }
}

fn cmd_single(
    pipeline: &RenderPipeline,
    params: TaskParameters,
    task_key: Option<String>,
    output: &OutputArgs,
) -> anyhow::Result<()> {
    let source = load_image(output.image.as_deref(), pipeline.config())?;
    let task_key = task_key.unwrap_or_else(|| params.kind().to_owned());
    tracing::info!(task_key = %task_key, params = %params.to_json_string()?, "rendering");

    let id = pipeline.issue(&task_key);
    let result = pipeline.render(&task_key, &params, &source, id);
    let failure = match &result {
        RenderResult::Error(e) => Some(e.to_string()),
        _ => None,
    };
    write_png(&output.out, &result.into_canvas_or_placeholder(pipeline.config()))?;
    eprintln!("wrote {}", output.out.display());

    if let Some(reason) = failure {
        anyhow::bail!("render failed: {reason}");
    }
    Ok(())
}

fn cmd_sweep(pipeline: &RenderPipeline, args: SweepArgs) -> anyhow::Result<()> {
    if args.steps == 0 {
        anyhow::bail!("--steps must be at least 1");
    }
    let base = TaskParameters::from_path(&args.params)?;
    let source = load_image(args.image.as_deref(), pipeline.config())?;

    let values: Vec<f64> = (0..args.steps)
        .map(|i| {
            if args.steps == 1 {
                args.from
            } else {
                args.from + (args.to - args.from) * i as f64 / (args.steps - 1) as f64
            }
        })
        .collect();
    let jobs = values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let mut job = RenderJob::new(base.with_field(&args.field, v)?, source.clone());
            job.task_key = format!("{}#{i}", job.task_key);
            Ok(job)
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let threading = RenderThreading {
        parallel: args.parallel,
        threads: args.threads,
    };
    let results = pipeline.render_batch(&jobs, &threading)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    let mut manifest = Vec::with_capacity(results.len());
    let mut failures = 0usize;
    for (i, (result, value)) in results.into_iter().zip(&values).enumerate() {
        let file = format!("step_{i:04}.png");
        let status = result.status();
        let error = match &result {
            RenderResult::Error(e) => {
                failures += 1;
                Some(e.to_string())
            }
            _ => None,
        };
        write_png(
            &args.out_dir.join(&file),
            &result.into_canvas_or_placeholder(pipeline.config()),
        )?;
        manifest.push(serde_json::json!({
            "file": file,
            "field": args.field,
            "value": value,
            "status": status,
            "error": error,
        }));
    }

    let manifest_path = args.out_dir.join("sweep.json");
    let text = serde_json::to_string_pretty(&manifest).context("encode sweep manifest")?;
    std::fs::write(&manifest_path, text)
        .with_context(|| format!("write '{}'", manifest_path.display()))?;
    eprintln!("wrote {} frames to {}", values.len(), args.out_dir.display());

    if failures > 0 {
        anyhow::bail!("{failures} of {} sweep steps failed", values.len());
    }
    Ok(())
}

fn write_png(path: &Path, canvas: &Canvas) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        &canvas.to_rgba8(),
        canvas.width(),
        canvas.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}

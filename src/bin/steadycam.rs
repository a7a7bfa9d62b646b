use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use steadycam::{
    Algorithm, FfmpegEngine, FfprobeProbe, HwAccel, Probe as _, Projection, RenderOptions,
    RenderRequest, Scheduler, StabiliseMode, VaapiVendor, plan_render,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "steadycam", version, about)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract part of a source video, stabilise it and write it to a file.
    Render(Box<RenderArgs>),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Source video.
    source: PathBuf,

    /// Output video.
    dest: PathBuf,

    /// Starting point in the source.
    #[arg(short, long)]
    start: Option<String>,

    /// Duration of the output.
    #[arg(short, long)]
    duration: Option<String>,

    /// End point in the source.
    #[arg(short, long)]
    end: Option<String>,

    /// Output width in pixels.
    #[arg(short, long)]
    width: Option<u32>,

    /// Output height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Turn the camera clockwise by this many degrees.
    #[arg(short, long, default_value_t = 0.0, allow_hyphen_values = true)]
    roll: f64,

    /// Turn the camera up by this many degrees.
    #[arg(short, long, default_value_t = 0.0, allow_hyphen_values = true)]
    pitch: f64,

    /// Turn the camera left by this many degrees.
    #[arg(short, long, default_value_t = 0.0, allow_hyphen_values = true)]
    yaw: f64,

    /// Scale the video by this percentage before processing.
    #[arg(short, long, default_value_t = 0)]
    upsample: u32,

    /// Crop the output (options for ffmpeg's crop filter).
    #[arg(long)]
    crop: Option<String>,

    /// Stabilisation algorithm (vidstab, deshake, deshake_opencl, dewobble).
    #[arg(long, alias = "filter", default_value = "dewobble")]
    algorithm: Algorithm,

    /// Remove camera shake (none, fixed, smooth).
    #[arg(long, default_value = "none")]
    stabilise: StabiliseMode,

    /// Frames to look ahead and behind when smoothing.
    #[arg(long, default_value_t = steadycam::render::options::DEFAULT_STABILISE_RADIUS)]
    stabilise_radius: u32,

    /// Frames to look behind when interpolating the camera position.
    #[arg(long, default_value_t = steadycam::render::options::DEFAULT_INTERPOLATE_RADIUS)]
    interpolate_radius: u32,

    /// Border, in percent, added around the input while stabilising.
    #[arg(long, default_value_t = steadycam::render::options::DEFAULT_STABILISE_BUFFER)]
    stabilise_buffer: f64,

    /// Diagonal field of view of the camera, in degrees.
    #[arg(long, default_value_t = steadycam::render::options::DEFAULT_INPUT_DFOV)]
    input_dfov: f64,

    /// Diagonal field of view of the output, in degrees.
    #[arg(long)]
    output_dfov: Option<f64>,

    /// Lens projection of the camera.
    #[arg(long, default_value = "fisheye")]
    input_projection: Projection,

    /// Projection of the output.
    #[arg(long, default_value = "rect")]
    projection: Projection,

    /// Zoom into the output by this percentage.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    zoom: f64,

    /// Skip the analysis pass and reuse existing stabilisation data.
    #[arg(short = 'c', long)]
    encode_only: bool,

    /// Skip the encode pass and only write stabilisation data.
    #[arg(short = 'a', long)]
    analyse_only: bool,

    /// Hardware decoder (vaapi, nvdec).
    #[arg(long)]
    hw_accel: Option<HwAccel>,

    /// VAAPI device vendor (intel, amd).
    #[arg(long)]
    vaapi_vendor: Option<VaapiVendor>,

    /// OpenCL platform used for filtering.
    #[arg(long, alias = "open-cl-platform")]
    opencl_platform: Option<u32>,

    /// Do not derive the OpenCL device from the VAAPI device.
    #[arg(long, alias = "no-map-open-cl-from-vaapi")]
    no_map_opencl_from_vaapi: bool,

    /// Encoder for the output video.
    #[arg(long, default_value = steadycam::render::options::DEFAULT_ENCODER)]
    encoder: String,

    /// Speed the output up or down by retiming it to this frame rate.
    #[arg(long)]
    frame_rate: Option<u32>,

    /// Extra algorithms rendered side by side, comma separated.
    #[arg(long, value_delimiter = ',')]
    compare: Vec<Algorithm>,

    /// Ask filters to draw debugging information.
    #[arg(long)]
    debug: bool,

    /// ffmpeg log level.
    #[arg(short, long)]
    verbosity: Option<String>,

    /// Print the resolved options and ffmpeg command lines instead of running them.
    #[arg(long)]
    dry_run: bool,

    /// ffmpeg binary.
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// ffprobe binary.
    #[arg(long, default_value = "ffprobe")]
    ffprobe: PathBuf,
}

impl RenderArgs {
    fn options(&self) -> RenderOptions {
        RenderOptions {
            encode_only: self.encode_only,
            analyse_only: self.analyse_only,
            start: self.start.clone(),
            duration: self.duration.clone(),
            end: self.end.clone(),
            roll: self.roll,
            pitch: self.pitch,
            yaw: self.yaw,
            width: self.width,
            height: self.height,
            upsample: self.upsample,
            crop: self.crop.clone(),
            algorithm: self.algorithm,
            stabilise: self.stabilise,
            stabilise_radius: self.stabilise_radius,
            interpolate_radius: self.interpolate_radius,
            stabilise_buffer: self.stabilise_buffer,
            input_dfov: self.input_dfov,
            output_dfov: self.output_dfov,
            input_projection: self.input_projection,
            projection: self.projection,
            zoom: self.zoom,
            hw_accel: self.hw_accel,
            vaapi_vendor: self.vaapi_vendor,
            opencl_platform: self.opencl_platform,
            map_opencl_from_vaapi: !self.no_map_opencl_from_vaapi,
            encoder: self.encoder.clone(),
            frame_rate: self.frame_rate,
            compare: self.compare.clone(),
            debug: self.debug,
            verbosity: self.verbosity.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("steadycam=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => render(*args).await,
    }
}

async fn render(args: RenderArgs) -> anyhow::Result<()> {
    let options = args.options();
    options.validate()?;
    let request = RenderRequest {
        source: args.source.clone(),
        dest: args.dest.clone(),
        options,
    };
    let engine = FfmpegEngine::new(&args.ffmpeg);
    let probe = FfprobeProbe::new(&args.ffprobe);

    if args.dry_run {
        let video = probe.probe(&request.source).await?;
        let plan = plan_render(&request, &video)?;
        println!(
            "{}",
            serde_json::to_string_pretty(&request.options).context("serialize options")?
        );
        let program = args.ffmpeg.to_string_lossy();
        for (phase, job) in [("analyse", &plan.analyse), ("encode", &plan.encode)] {
            match job {
                Some(job) => println!("# {phase}\n{}", job.command_line(&program)),
                None => println!("# {phase}: skipped"),
            }
        }
        return Ok(());
    }

    let scheduler = Scheduler::new(engine, probe);
    let report = scheduler.render(&request).await?;
    tracing::info!(state = ?report.state(), dest = %request.dest.display(), "done");
    Ok(())
}

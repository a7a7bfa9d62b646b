use std::path::PathBuf;

use crate::engine::job::{Destination, EngineJob, SINK_LABEL, SOURCE_LABEL};
use crate::engine::probe::VideoInfo;
use crate::foundation::error::{SteadycamError, SteadycamResult};
use crate::graph::format::PixelFormat;
use crate::graph::pad::PadAllocator;
use crate::graph::pipeline::{Endpoint, assemble};
use crate::render::compare::{comparison_grid_size, comparison_pipeline};
use crate::render::hardware::{HardwareConfig, HardwareRequest, resolve_hardware};
use crate::render::io::{Retime, input_configuration, output_configuration};
use crate::render::options::{Algorithm, RenderOptions};
use crate::render::stabilise::{
    StabiliseParams, analysis_pipeline, stabilise_pipeline, transform_path,
};

/// One render: a source, a destination and the options to get from one to the other.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderRequest {
    /// Source media file.
    pub source: PathBuf,
    /// Output media file.
    pub dest: PathBuf,
    /// Render options.
    pub options: RenderOptions,
}

/// Engine jobs for the two phases of a render. A phase without a job is skipped.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderPlan {
    /// Motion analysis pass.
    pub analyse: Option<EngineJob>,
    /// Encode pass.
    pub encode: Option<EngineJob>,
}

/// Parse an ffmpeg time value: plain seconds or `[HH:]MM:SS[.frac]`.
pub fn parse_time(value: &str) -> Option<f64> {
    let value = value.trim();
    let (negative, value) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };
    let mut secs = 0.0;
    for part in value.split(':') {
        let v: f64 = part.parse().ok()?;
        if v < 0.0 {
            return None;
        }
        secs = secs * 60.0 + v;
    }
    Some(if negative { -secs } else { secs })
}

/// Output duration implied by the time range options and the source length.
pub fn expected_duration(opts: &RenderOptions, video: &VideoInfo) -> Option<f64> {
    if let Some(d) = opts.duration.as_deref().and_then(parse_time) {
        return Some(d);
    }
    let start = opts.start.as_deref().and_then(parse_time).unwrap_or(0.0);
    let end = opts
        .end
        .as_deref()
        .and_then(parse_time)
        .or(video.duration_secs)?;
    let secs = end - start;
    (secs > 0.0).then_some(secs)
}

/// Build the engine jobs for `request`, given what the probe found out about its source.
pub fn plan_render(request: &RenderRequest, video: &VideoInfo) -> SteadycamResult<RenderPlan> {
    let opts = &request.options;
    opts.validate()?;
    let hardware = resolve_hardware(HardwareRequest::from_options(opts));
    if let Some(algorithm) = algorithms(opts)
        .into_iter()
        .find(|a| a.needs_compute_device())
        && !hardware.conversion_context().can_reach(PixelFormat::OpenCl)
    {
        return Err(SteadycamError::configuration(format!(
            "{algorithm} needs an OpenCL device: pass --opencl-platform or use an Intel VAAPI \
             vendor"
        )));
    }
    let trf = transform_path(&request.dest);
    let params = StabiliseParams::new(opts, &trf, video);

    let analyse = if opts.needs_analysis() && !opts.encode_only {
        Some(analyse_job(request, &hardware, &params, video)?)
    } else {
        None
    };
    let encode = if opts.analyse_only {
        None
    } else {
        Some(encode_job(request, &hardware, &params, video)?)
    };
    tracing::debug!(
        source = %request.source.display(),
        analyse = analyse.is_some(),
        encode = encode.is_some(),
        "planned render"
    );
    Ok(RenderPlan { analyse, encode })
}

fn algorithms(opts: &RenderOptions) -> Vec<Algorithm> {
    std::iter::once(opts.algorithm)
        .chain(opts.compare.iter().copied())
        .collect()
}

fn source_endpoint(hardware: &HardwareConfig) -> Endpoint {
    Endpoint::new(SOURCE_LABEL, hardware.output_format)
}

fn analyse_job(
    request: &RenderRequest,
    hardware: &HardwareConfig,
    params: &StabiliseParams<'_>,
    video: &VideoInfo,
) -> SteadycamResult<EngineJob> {
    let opts = &request.options;
    let ctx = hardware.conversion_context();
    let mut alloc = PadAllocator::new();
    let divisor = if opts.compare.is_empty() {
        1
    } else {
        comparison_grid_size(algorithms(opts).len() as u32, params.output_size.aspect_ratio())
            .divisor()
    };

    let input = input_configuration(opts, hardware, None, &mut alloc);
    let mut pipelines = vec![input.pipeline];
    pipelines.extend(analysis_pipeline(
        Algorithm::Vidstab,
        opts,
        params.transform_path,
        divisor,
        &mut alloc,
    ));
    let stages = assemble(
        source_endpoint(hardware),
        pipelines,
        Endpoint::new(SINK_LABEL, PixelFormat::Software),
        ctx,
        &mut alloc,
    )?;

    Ok(EngineJob {
        input_options: input.input_options,
        source: request.source.clone(),
        stages,
        output_options: vec!["-an".to_string()],
        destination: Destination::Null,
        duration_secs: expected_duration(opts, video),
        verbosity: opts.verbosity.clone(),
    })
}

fn encode_job(
    request: &RenderRequest,
    hardware: &HardwareConfig,
    params: &StabiliseParams<'_>,
    video: &VideoInfo,
) -> SteadycamResult<EngineJob> {
    let opts = &request.options;
    let ctx = hardware.conversion_context();
    let mut alloc = PadAllocator::new();
    let retime = Retime::from_options(opts, video.frame_rate);

    let input = input_configuration(opts, hardware, retime, &mut alloc);
    let body = if opts.compare.is_empty() {
        stabilise_pipeline(opts.algorithm, params, ctx, &mut alloc)?
    } else {
        comparison_pipeline(&algorithms(opts), params, ctx, &mut alloc)?
    };
    let output = output_configuration(opts, retime, &mut alloc)?;
    let sink = Endpoint::new(SINK_LABEL, output.pipeline.output_format);
    let stages = assemble(
        source_endpoint(hardware),
        vec![input.pipeline, body, output.pipeline],
        sink,
        ctx,
        &mut alloc,
    )?;

    Ok(EngineJob {
        input_options: input.input_options,
        source: request.source.clone(),
        stages,
        output_options: output.output_options,
        destination: Destination::File(request.dest.clone()),
        duration_secs: expected_duration(opts, video),
        verbosity: opts.verbosity.clone(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;

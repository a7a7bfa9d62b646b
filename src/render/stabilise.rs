use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::engine::probe::VideoInfo;
use crate::foundation::core::{FrameRate, Size};
use crate::foundation::error::{SteadycamError, SteadycamResult};
use crate::foundation::math::{buffered_fov, normalize_angle, zoomed_fov};
use crate::graph::convert::{ConversionContext, convert};
use crate::graph::filter::Filter;
use crate::graph::format::PixelFormat;
use crate::graph::pad::PadAllocator;
use crate::graph::pipeline::{Pipeline, combine};
use crate::render::options::{Algorithm, Projection, RenderOptions, StabiliseMode};

/// Largest motion search radius `deshake` accepts, in pixels.
const DESHAKE_SEARCH_RADIUS: u32 = 64;

/// Path of the motion-transform file written by the analysis pass for `dest`.
pub fn transform_path(dest: &Path) -> PathBuf {
    let mut path = OsString::from(dest.as_os_str());
    path.push(".trf");
    PathBuf::from(path)
}

/// Geometry and settings one stabilisation pipeline is generated for.
#[derive(Clone, Debug)]
pub struct StabiliseParams<'a> {
    /// Request options.
    pub opts: &'a RenderOptions,
    /// Motion-transform file shared by the analysis and encode passes.
    pub transform_path: &'a Path,
    /// Size of frames entering the pipeline.
    pub input_size: Size,
    /// Size of frames leaving the pipeline.
    pub output_size: Size,
    /// Source frame rate.
    pub frame_rate: FrameRate,
    /// Diagonal field of view of the output, zoom included.
    pub output_dfov: f64,
    /// Output pixel the optical axis lands on. `None` is the centre of the output.
    pub focal_point: Option<(f64, f64)>,
}

impl<'a> StabiliseParams<'a> {
    /// Parameters for a full-frame render of `video`.
    pub fn new(opts: &'a RenderOptions, transform_path: &'a Path, video: &VideoInfo) -> Self {
        let input_size = if opts.upsample > 0 {
            video.size().scale_percent(opts.upsample)
        } else {
            video.size()
        };
        let output_size = Size::new(
            opts.width.unwrap_or(input_size.width),
            opts.height.unwrap_or(input_size.height),
        );
        Self {
            opts,
            transform_path,
            input_size,
            output_size,
            frame_rate: video.frame_rate,
            output_dfov: zoomed_fov(opts.nominal_output_dfov(), opts.zoom),
            focal_point: None,
        }
    }

    fn buffer_percent(&self) -> f64 {
        if self.opts.stabilise.is_enabled() {
            self.opts.stabilise_buffer
        } else {
            0.0
        }
    }

    fn angles(&self) -> (f64, f64, f64) {
        (
            normalize_angle(self.opts.yaw),
            normalize_angle(self.opts.pitch),
            normalize_angle(self.opts.roll),
        )
    }
}

/// First-pass pipeline, if `algorithm` needs one.
///
/// `tile_divisor` shrinks the analysed frames the same way the comparison grid shrinks them
/// before encoding, so the transforms line up.
pub fn analysis_pipeline(
    algorithm: Algorithm,
    opts: &RenderOptions,
    transform_path: &Path,
    tile_divisor: u32,
    alloc: &mut PadAllocator,
) -> Option<Pipeline> {
    if !algorithm.needs_analysis() || !opts.stabilise.is_enabled() {
        return None;
    }
    let detect = Filter::new("vidstabdetect")
        .opt("result", transform_path.to_string_lossy().into_owned())
        .opt("shakiness", 10)
        .opt("mincontrast", 0.2)
        .opt("stepsize", 12)
        .opt_some("tripod", (opts.stabilise == StabiliseMode::Fixed).then_some(1));
    Some(Pipeline::from_optional(
        PixelFormat::Software,
        [tile_scale(tile_divisor), Some(detect)],
        alloc,
    ))
}

/// Scale frames down for one cell of a comparison grid.
pub(crate) fn tile_scale(divisor: u32) -> Option<Filter> {
    (divisor > 1).then(|| {
        Filter::new("scale")
            .opt("w", format!("trunc(iw/{divisor}/2)*2"))
            .opt("h", format!("trunc(ih/{divisor}/2)*2"))
    })
}

/// Encode-pass pipeline for `algorithm`.
pub fn stabilise_pipeline(
    algorithm: Algorithm,
    params: &StabiliseParams<'_>,
    ctx: ConversionContext,
    alloc: &mut PadAllocator,
) -> SteadycamResult<Pipeline> {
    let parts = match algorithm {
        Algorithm::Vidstab => vidstab(params, alloc),
        Algorithm::Deshake => deshake(params, alloc),
        Algorithm::DeshakeOpenCl => deshake_opencl(params, ctx, alloc)?,
        Algorithm::Dewobble => dewobble(params, alloc)?,
    };
    tracing::debug!(%algorithm, parts = parts.len(), "built stabilisation pipeline");
    Ok(combine(parts, ctx, alloc)?
        .unwrap_or_else(|| Pipeline::uniform(PixelFormat::Software, Vec::new(), alloc)))
}

/// `vidstabtransform` zoom that shrinks the picture so the frame spans `buffer` percent more
/// field of view.
fn buffer_zoom(buffer: f64) -> f64 {
    -100.0 * buffer / (100.0 + buffer)
}

fn vidstab(params: &StabiliseParams<'_>, alloc: &mut PadAllocator) -> Vec<Pipeline> {
    let opts = params.opts;
    let buffer = params.buffer_percent();
    let transform = opts.stabilise.is_enabled().then(|| {
        let f = Filter::new("vidstabtransform")
            .opt("input", params.transform_path.to_string_lossy().into_owned())
            .opt("optzoom", 0)
            .opt("zoom", buffer_zoom(buffer))
            .opt("interpol", "bicubic")
            .opt("crop", "black");
        match opts.stabilise {
            StabiliseMode::Fixed => f.opt("tripod", 1),
            _ => f.opt("smoothing", opts.stabilise_radius),
        }
    });
    let remap = remap(params, opts.input_projection, buffered_fov(opts.input_dfov, buffer));
    vec![Pipeline::from_optional(PixelFormat::Software, [transform, remap], alloc)]
}

/// Rectangle of the buffered frame that still holds picture, as `(x, y, w, h)`.
pub fn content_rect(size: Size, buffer_percent: f64) -> (u32, u32, u32, u32) {
    let fraction = 1.0 / (1.0 + buffer_percent / 100.0);
    let w = (f64::from(size.width) * fraction).round() as u32;
    let h = (f64::from(size.height) * fraction).round() as u32;
    ((size.width - w) / 2, (size.height - h) / 2, w, h)
}

/// Shrink the fisheye picture inside its own frame, leaving black border to move into.
fn zero_buffer(params: &StabiliseParams<'_>, buffer: f64) -> Option<Filter> {
    let opts = params.opts;
    (buffer > 0.0).then(|| {
        Filter::new("v360")
            .opt("input", opts.input_projection.v360_name())
            .opt("output", opts.input_projection.v360_name())
            .opt("id_fov", opts.input_dfov)
            .opt("d_fov", buffered_fov(opts.input_dfov, buffer))
            .opt("w", params.input_size.width)
            .opt("h", params.input_size.height)
            .opt("interp", "lanc")
    })
}

fn deshake(params: &StabiliseParams<'_>, alloc: &mut PadAllocator) -> Vec<Pipeline> {
    let opts = params.opts;
    let buffer = params.buffer_percent();
    let motion = opts.stabilise.is_enabled().then(|| {
        let (x, y, w, h) = content_rect(params.input_size, buffer);
        Filter::new("deshake")
            .opt("x", x)
            .opt("y", y)
            .opt("w", w)
            .opt("h", h)
            .opt("rx", DESHAKE_SEARCH_RADIUS)
            .opt("ry", DESHAKE_SEARCH_RADIUS)
            .opt("edge", "blank")
    });
    let remap = remap(params, opts.input_projection, buffered_fov(opts.input_dfov, buffer));
    vec![Pipeline::from_optional(
        PixelFormat::Software,
        [zero_buffer(params, buffer), motion, remap],
        alloc,
    )]
}

fn deshake_opencl(
    params: &StabiliseParams<'_>,
    ctx: ConversionContext,
    alloc: &mut PadAllocator,
) -> SteadycamResult<Vec<Pipeline>> {
    let opts = params.opts;
    let buffer = params.buffer_percent();
    let mut parts = vec![Pipeline::from_optional(
        PixelFormat::Software,
        [zero_buffer(params, buffer)],
        alloc,
    )];

    if opts.stabilise.is_enabled() {
        let window =
            (f64::from(opts.stabilise_radius) / params.frame_rate.as_f64()).clamp(0.1, 10.0);
        let motion = Filter::new("deshake_opencl")
            .opt("tripod", opts.stabilise == StabiliseMode::Fixed)
            .opt("adaptive_crop", 0)
            .opt("smooth_window_multiplier", window)
            .opt("debug", opts.debug);
        let filters = if opts.debug {
            // Round-trip through host memory on both sides so the intermediate can be dumped.
            let mut filters = debug_bridge(ctx)?;
            filters.push(motion);
            filters.extend(debug_bridge(ctx)?);
            filters
        } else {
            vec![motion]
        };
        parts.push(Pipeline::uniform(PixelFormat::OpenCl, filters, alloc));
    }

    parts.push(Pipeline::from_optional(
        PixelFormat::Software,
        [remap(params, opts.input_projection, buffered_fov(opts.input_dfov, buffer))],
        alloc,
    ));
    Ok(parts)
}

fn debug_bridge(ctx: ConversionContext) -> SteadycamResult<Vec<Filter>> {
    let mut filters = convert(PixelFormat::OpenCl, PixelFormat::Software, ctx)?;
    // Downloaded frames are already normalised.
    filters.extend(
        convert(PixelFormat::Software, PixelFormat::OpenCl, ctx)?
            .into_iter()
            .filter(|f| f.name != "format"),
    );
    Ok(filters)
}

fn dewobble_projection(projection: Projection) -> SteadycamResult<&'static str> {
    projection.dewobble_name().ok_or_else(|| {
        SteadycamError::configuration(format!(
            "projection '{projection}' is not supported by {}",
            Algorithm::Dewobble
        ))
    })
}

fn dewobble(
    params: &StabiliseParams<'_>,
    alloc: &mut PadAllocator,
) -> SteadycamResult<Vec<Pipeline>> {
    let opts = params.opts;
    let in_p = dewobble_projection(opts.input_projection)?;
    let out_p = dewobble_projection(opts.projection)?;
    let out = params.output_size;
    let (fx, fy) = params
        .focal_point
        .unwrap_or((f64::from(out.width) / 2.0, f64::from(out.height) / 2.0));

    let dewobble = Filter::new("dewobble_opencl")
        .opt("in_p", in_p)
        .opt("in_dfov", opts.input_dfov)
        .opt("out_p", out_p)
        .opt("out_dfov", params.output_dfov)
        .opt("out_w", out.width)
        .opt("out_h", out.height)
        .opt("out_fx", fx)
        .opt("out_fy", fy)
        .opt("stab", opts.stabilise.name())
        .opt("stab_r", opts.stabilise_radius)
        .opt("stab_h", opts.interpolate_radius)
        .opt("debug", opts.debug);
    let mut parts = vec![Pipeline::uniform(PixelFormat::OpenCl, vec![dewobble], alloc)];

    if opts.is_rotated() {
        let (yaw, pitch, roll) = params.angles();
        let rotate = Filter::new("v360")
            .opt("input", opts.projection.v360_name())
            .opt("output", opts.projection.v360_name())
            .opt("id_fov", params.output_dfov)
            .opt("d_fov", params.output_dfov)
            .opt("yaw", yaw)
            .opt("pitch", pitch)
            .opt("roll", roll)
            .opt("interp", "lanc");
        parts.push(Pipeline::uniform(PixelFormat::Software, vec![rotate], alloc));
    }
    Ok(parts)
}

/// Reproject into the output projection, field of view, size and orientation, when any of
/// them differ from what the algorithm produced.
fn remap(params: &StabiliseParams<'_>, native: Projection, input_fov: f64) -> Option<Filter> {
    let opts = params.opts;
    let needed = opts.projection != native
        || opts.is_rotated()
        || (input_fov - params.output_dfov).abs() > f64::EPSILON
        || params.input_size != params.output_size;
    if !needed {
        return None;
    }
    let (yaw, pitch, roll) = params.angles();
    Some(
        Filter::new("v360")
            .opt("input", native.v360_name())
            .opt("output", opts.projection.v360_name())
            .opt("id_fov", input_fov)
            .opt("d_fov", params.output_dfov)
            .opt("w", params.output_size.width)
            .opt("h", params.output_size.height)
            .opt("yaw", yaw)
            .opt("pitch", pitch)
            .opt("roll", roll)
            .opt("interp", "lanc"),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/render/stabilise.rs"]
mod tests;

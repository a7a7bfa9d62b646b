use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{SteadycamError, SteadycamResult};
use crate::foundation::math::{scale_fov_linear, scale_fov_tangent, zoomed_fov};
use crate::render::hardware::{HwAccel, VaapiVendor};

/// Diagonal field of view of a wide action-camera lens.
pub const DEFAULT_INPUT_DFOV: f64 = 145.8;
/// Frames looked at either side of the current one while smoothing.
pub const DEFAULT_STABILISE_RADIUS: u32 = 90;
/// Frames looked behind to interpolate the camera position.
pub const DEFAULT_INTERPOLATE_RADIUS: u32 = 30;
/// Border, in percent of the frame, added around the input while stabilising.
pub const DEFAULT_STABILISE_BUFFER: f64 = 20.0;
/// Encoder used when none is requested.
pub const DEFAULT_ENCODER: &str = "libx264";

/// Stabilisation algorithm, one per ffmpeg filter family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Two-pass `vidstabdetect` / `vidstabtransform`.
    Vidstab,
    /// Single-pass CPU `deshake`.
    Deshake,
    /// Single-pass `deshake_opencl`.
    #[serde(rename = "deshake_opencl")]
    DeshakeOpenCl,
    /// `dewobble_opencl`: lens dewarp and stabilisation in one stage.
    Dewobble,
}

impl Algorithm {
    /// Name accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::Vidstab => "vidstab",
            Self::Deshake => "deshake",
            Self::DeshakeOpenCl => "deshake_opencl",
            Self::Dewobble => "dewobble",
        }
    }

    /// Return `true` when the algorithm needs a first analysis pass.
    pub fn needs_analysis(self) -> bool {
        matches!(self, Self::Vidstab)
    }

    /// Return `true` when the algorithm runs on an OpenCL device.
    pub fn needs_compute_device(self) -> bool {
        matches!(self, Self::DeshakeOpenCl | Self::Dewobble)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = SteadycamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vidstab" => Ok(Self::Vidstab),
            "deshake" => Ok(Self::Deshake),
            "deshake_opencl" => Ok(Self::DeshakeOpenCl),
            "dewobble" | "dewobble_opencl" => Ok(Self::Dewobble),
            other => Err(SteadycamError::configuration(format!(
                "unknown stabilisation filter '{other}' (expected vidstab, deshake, deshake_opencl or dewobble)"
            ))),
        }
    }
}

/// How camera motion is treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabiliseMode {
    /// Keep camera motion.
    #[default]
    None,
    /// Lock the camera to the first frame, as if on a tripod.
    Fixed,
    /// Smooth camera motion over the stabilisation radius.
    Smooth,
}

impl StabiliseMode {
    /// Return `true` unless stabilisation is off.
    pub fn is_enabled(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Name accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Fixed => "fixed",
            Self::Smooth => "smooth",
        }
    }
}

impl FromStr for StabiliseMode {
    type Err = SteadycamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(Self::None),
            "fixed" | "tripod" => Ok(Self::Fixed),
            "smooth" => Ok(Self::Smooth),
            other => Err(SteadycamError::configuration(format!(
                "unknown stabilisation mode '{other}' (expected none, fixed or smooth)"
            ))),
        }
    }
}

/// Lens projection model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    /// Pinhole projection, straight lines stay straight.
    Rectilinear,
    /// Equidistant fisheye.
    Fisheye,
    /// Stereographic fisheye.
    Stereographic,
    /// Equisolid-angle fisheye.
    Equisolid,
    /// Equirectangular (longitude/latitude).
    Equirectangular,
}

impl Projection {
    /// Name understood by the `v360` filter.
    pub fn v360_name(self) -> &'static str {
        match self {
            Self::Rectilinear => "flat",
            Self::Fisheye => "fisheye",
            Self::Stereographic => "sg",
            Self::Equisolid => "equisolid",
            Self::Equirectangular => "e",
        }
    }

    /// Name understood by `dewobble_opencl`, if it supports this projection.
    pub fn dewobble_name(self) -> Option<&'static str> {
        match self {
            Self::Rectilinear => Some("rect"),
            Self::Fisheye => Some("fish"),
            _ => None,
        }
    }

    /// Diagonal field of view the projection stops being able to represent, if any.
    pub fn fov_limit(self) -> Option<f64> {
        match self {
            Self::Rectilinear => Some(180.0),
            Self::Stereographic => Some(360.0),
            Self::Fisheye | Self::Equisolid | Self::Equirectangular => None,
        }
    }

    /// Field of view seen through a window `ratio` times the size of the original image,
    /// keeping the same focal length.
    ///
    /// Fisheye-family projections place angles linearly on the image; rectilinear-family ones
    /// place them on a tangent, so a smaller window loses less angle than it loses pixels.
    pub fn scale_fov(self, fov: f64, ratio: f64) -> f64 {
        match self {
            Self::Rectilinear => scale_fov_tangent(fov, ratio, 2.0),
            Self::Stereographic => scale_fov_tangent(fov, ratio, 4.0),
            Self::Fisheye | Self::Equisolid | Self::Equirectangular => scale_fov_linear(fov, ratio),
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rectilinear => "rectilinear",
            Self::Fisheye => "fisheye",
            Self::Stereographic => "stereographic",
            Self::Equisolid => "equisolid",
            Self::Equirectangular => "equirectangular",
        })
    }
}

impl FromStr for Projection {
    type Err = SteadycamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rect" | "flat" | "rectilinear" | "gnomonic" => Ok(Self::Rectilinear),
            "fish" | "fisheye" => Ok(Self::Fisheye),
            "sg" | "stereographic" => Ok(Self::Stereographic),
            "equisolid" => Ok(Self::Equisolid),
            "e" | "equirect" | "equirectangular" => Ok(Self::Equirectangular),
            other => Err(SteadycamError::configuration(format!(
                "unknown projection '{other}'"
            ))),
        }
    }
}

/// Everything one render request needs, resolved from the command line.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Skip the analysis pass and reuse an existing transform file.
    pub encode_only: bool,
    /// Skip the encode pass.
    pub analyse_only: bool,
    /// Seek position in the source (`-ss`).
    pub start: Option<String>,
    /// Output duration (`-t`).
    pub duration: Option<String>,
    /// End position in the source (`-to`).
    pub end: Option<String>,
    /// Clockwise camera roll in degrees.
    pub roll: f64,
    /// Upward camera pitch in degrees.
    pub pitch: f64,
    /// Leftward camera yaw in degrees.
    pub yaw: f64,
    /// Output width; defaults to the (upsampled) input width.
    pub width: Option<u32>,
    /// Output height; defaults to the (upsampled) input height.
    pub height: Option<u32>,
    /// Scale the input by this percentage before processing. `0` disables upsampling.
    pub upsample: u32,
    /// Options for ffmpeg's `crop` filter, applied before encoding.
    pub crop: Option<String>,
    /// Stabilisation algorithm for the main output.
    pub algorithm: Algorithm,
    /// Stabilisation mode.
    pub stabilise: StabiliseMode,
    /// Frames looked at either side for smoothing.
    pub stabilise_radius: u32,
    /// Frames looked behind to interpolate camera position.
    pub interpolate_radius: u32,
    /// Border, in percent, added around the input during stabilisation.
    pub stabilise_buffer: f64,
    /// Diagonal field of view of the camera, in degrees.
    pub input_dfov: f64,
    /// Diagonal field of view of the output, in degrees. Defaults to `input_dfov`.
    pub output_dfov: Option<f64>,
    /// Projection of the camera lens.
    pub input_projection: Projection,
    /// Projection of the output.
    pub projection: Projection,
    /// Zoom into the output by this percentage.
    pub zoom: f64,
    /// Hardware decoder.
    pub hw_accel: Option<HwAccel>,
    /// VAAPI device vendor.
    pub vaapi_vendor: Option<VaapiVendor>,
    /// OpenCL platform index for filtering.
    pub opencl_platform: Option<u32>,
    /// Derive the OpenCL device from the VAAPI device so frames map without copies.
    pub map_opencl_from_vaapi: bool,
    /// Output video encoder.
    pub encoder: String,
    /// Retime the output to this frame rate.
    pub frame_rate: Option<u32>,
    /// Extra algorithms rendered side by side with `algorithm`.
    pub compare: Vec<Algorithm>,
    /// Ask filters to draw debugging information.
    pub debug: bool,
    /// ffmpeg log level.
    pub verbosity: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            encode_only: false,
            analyse_only: false,
            start: None,
            duration: None,
            end: None,
            roll: 0.0,
            pitch: 0.0,
            yaw: 0.0,
            width: None,
            height: None,
            upsample: 0,
            crop: None,
            algorithm: Algorithm::Dewobble,
            stabilise: StabiliseMode::None,
            stabilise_radius: DEFAULT_STABILISE_RADIUS,
            interpolate_radius: DEFAULT_INTERPOLATE_RADIUS,
            stabilise_buffer: DEFAULT_STABILISE_BUFFER,
            input_dfov: DEFAULT_INPUT_DFOV,
            output_dfov: None,
            input_projection: Projection::Fisheye,
            projection: Projection::Rectilinear,
            zoom: 0.0,
            hw_accel: None,
            vaapi_vendor: None,
            opencl_platform: None,
            map_opencl_from_vaapi: true,
            encoder: DEFAULT_ENCODER.to_string(),
            frame_rate: None,
            compare: Vec::new(),
            debug: false,
            verbosity: None,
        }
    }
}

impl RenderOptions {
    /// Reject option combinations no graph can satisfy.
    pub fn validate(&self) -> SteadycamResult<()> {
        if self.encode_only && self.analyse_only {
            return Err(SteadycamError::configuration(
                "encode-only and analyse-only are mutually exclusive",
            ));
        }
        if !self.compare.is_empty() && !self.stabilise.is_enabled() {
            return Err(SteadycamError::configuration(
                "comparing filters requires stabilisation to be enabled",
            ));
        }
        if self.zoom <= -100.0 {
            return Err(SteadycamError::configuration("zoom must be greater than -100%"));
        }
        if self.stabilise_buffer < 0.0 {
            return Err(SteadycamError::configuration(
                "stabilisation buffer must not be negative",
            ));
        }
        if self.input_dfov.is_nan() || self.input_dfov <= 0.0 {
            return Err(SteadycamError::configuration(
                "input field of view must be positive",
            ));
        }
        if let Some(fov) = self.output_dfov
            && (fov.is_nan() || fov <= 0.0)
        {
            return Err(SteadycamError::configuration(
                "output field of view must be positive",
            ));
        }
        if let Some(limit) = self.input_projection.fov_limit()
            && self.input_dfov >= limit
        {
            return Err(SteadycamError::configuration(format!(
                "input field of view must be below {limit} degrees for {} lenses",
                self.input_projection
            )));
        }
        let output_dfov = zoomed_fov(self.nominal_output_dfov(), self.zoom);
        if let Some(limit) = self.projection.fov_limit()
            && output_dfov >= limit
        {
            return Err(SteadycamError::configuration(format!(
                "output field of view {output_dfov:.1} degrees (after zoom) must be below {limit} \
                 degrees for {} output",
                self.projection
            )));
        }
        if self.frame_rate == Some(0) {
            return Err(SteadycamError::configuration("frame rate must be positive"));
        }
        Ok(())
    }

    /// Return `true` when the render needs an analysis pass before encoding.
    pub fn needs_analysis(&self) -> bool {
        self.stabilise.is_enabled()
            && (self.algorithm.needs_analysis() || self.compare.iter().any(|a| a.needs_analysis()))
    }

    /// Return `true` when any roll, pitch or yaw is requested.
    pub fn is_rotated(&self) -> bool {
        self.roll != 0.0 || self.pitch != 0.0 || self.yaw != 0.0
    }

    /// Diagonal field of view of the output, before zoom.
    pub fn nominal_output_dfov(&self) -> f64 {
        self.output_dfov.unwrap_or(self.input_dfov)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/options.rs"]
mod tests;

//! Steadycam builds ffmpeg filter graphs that stabilise and dewarp action-camera footage,
//! moving frames between host memory, VAAPI surfaces and OpenCL images only where a stage
//! needs it, and runs the resulting jobs in two bounded phases:
//!
//! - Describe a render with [`RenderOptions`] and a [`RenderRequest`]
//! - Turn it into [`EngineJob`]s with [`plan_render`]
//! - Execute requests through a [`Scheduler`] backed by an [`Engine`] and a [`Probe`]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;

/// External engine collaborators.
pub mod engine;
/// Filter-graph model.
pub mod graph;
/// Render planning.
pub mod render;
/// Two-phase scheduling.
pub mod schedule;

pub use crate::foundation::core::{FrameRate, Size};
pub use crate::foundation::error::{SteadycamError, SteadycamResult};
pub use crate::foundation::math::{buffered_fov, normalize_angle, zoomed_fov};

pub use crate::engine::{
    Destination, Engine, EngineJob, FfmpegEngine, FfprobeProbe, Probe, Progress, VideoInfo,
};
pub use crate::graph::format::PixelFormat;
pub use crate::graph::pipeline::Pipeline;
pub use crate::render::hardware::{HwAccel, VaapiVendor};
pub use crate::render::options::{Algorithm, Projection, RenderOptions, StabiliseMode};
pub use crate::render::plan::{RenderPlan, RenderRequest, plan_render};
pub use crate::schedule::{RenderEvent, RenderReport, RenderState, Scheduler};

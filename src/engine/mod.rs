//! External engine collaborators: the job description, the ffmpeg runner and the probe.

/// ffmpeg runner and progress parsing.
pub mod ffmpeg;
/// Engine invocation description and argv generation.
pub mod job;
/// Source inspection with ffprobe.
pub mod probe;

pub use ffmpeg::{Engine, FfmpegEngine, Progress, ProgressParser};
pub use job::{Destination, EngineJob, SINK_LABEL, SOURCE_LABEL};
pub use probe::{FfprobeProbe, Probe, VideoInfo};

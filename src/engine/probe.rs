use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::Deserialize;
use tokio::process::Command;

use crate::foundation::core::{FrameRate, Size};
use crate::foundation::error::{SteadycamError, SteadycamResult};

/// Facts about the source video stream the graph depends on.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct VideoInfo {
    /// Coded width.
    pub width: u32,
    /// Coded height.
    pub height: u32,
    /// Nominal frame rate.
    pub frame_rate: FrameRate,
    /// Stream or container duration, when known.
    pub duration_secs: Option<f64>,
}

impl VideoInfo {
    /// Frame size.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Something able to describe a source file.
pub trait Probe: Send + Sync {
    /// Inspect the first video stream of `source`.
    fn probe(&self, source: &Path) -> impl Future<Output = SteadycamResult<VideoInfo>> + Send;
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Parse the JSON document printed by `ffprobe -of json`.
pub fn parse_probe_output(json: &str) -> SteadycamResult<VideoInfo> {
    let output: ProbeOutput = serde_json::from_str(json)
        .map_err(|e| SteadycamError::probe(format!("malformed ffprobe output: {e}")))?;
    let stream = output
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref().is_none_or(|t| t == "video"))
        .ok_or_else(|| SteadycamError::probe("no video stream found"))?;
    let (Some(width), Some(height)) = (stream.width, stream.height) else {
        return Err(SteadycamError::probe("video stream has no dimensions"));
    };
    let rate = stream
        .r_frame_rate
        .as_deref()
        .ok_or_else(|| SteadycamError::probe("video stream has no frame rate"))?;
    let duration_secs = stream
        .duration
        .as_deref()
        .or(output.format.as_ref().and_then(|f| f.duration.as_deref()))
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| *d > 0.0);

    Ok(VideoInfo {
        width,
        height,
        frame_rate: FrameRate::parse(rate)?,
        duration_secs,
    })
}

/// Probes sources with the `ffprobe` binary.
#[derive(Clone, Debug)]
pub struct FfprobeProbe {
    program: PathBuf,
}

impl Default for FfprobeProbe {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl FfprobeProbe {
    /// Probe running `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn inspect(&self, source: &Path) -> SteadycamResult<VideoInfo> {
        let output = Command::new(&self.program)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=codec_type,width,height,r_frame_rate,duration:format=duration",
                "-of",
                "json",
            ])
            .arg(source)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                SteadycamError::probe(format!(
                    "failed to run '{}': {e}",
                    self.program.display()
                ))
            })?;
        if !output.status.success() {
            return Err(SteadycamError::probe(format!(
                "ffprobe failed on '{}': {}",
                source.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let info = parse_probe_output(&String::from_utf8_lossy(&output.stdout))?;
        tracing::debug!(
            source = %source.display(),
            width = info.width,
            height = info.height,
            fps = info.frame_rate.as_f64(),
            "probed source"
        );
        Ok(info)
    }
}

impl Probe for FfprobeProbe {
    fn probe(&self, source: &Path) -> impl Future<Output = SteadycamResult<VideoInfo>> + Send {
        self.inspect(source)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/probe.rs"]
mod tests;

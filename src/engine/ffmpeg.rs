use std::collections::VecDeque;
use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::engine::job::EngineJob;
use crate::foundation::error::{SteadycamError, SteadycamResult};

/// Lines of ffmpeg's stderr kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// Something able to execute an [`EngineJob`] to completion.
pub trait Engine: Send + Sync {
    /// Run `job`, resolving once the engine has exited.
    fn run(&self, job: &EngineJob) -> impl Future<Output = SteadycamResult<()>> + Send;
}

/// One progress report from a running engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Progress {
    /// Completion in percent, when the duration is known.
    pub percent: Option<f64>,
    /// Frames processed per second.
    pub fps: Option<f64>,
    /// Final report of the run.
    pub done: bool,
}

/// Accumulates ffmpeg's `-progress` key/value blocks.
#[derive(Clone, Debug, Default)]
pub struct ProgressParser {
    duration_secs: Option<f64>,
    out_time_us: Option<i64>,
    fps: Option<f64>,
}

impl ProgressParser {
    /// Parser for a run expected to produce `duration_secs` of output.
    pub fn new(duration_secs: Option<f64>) -> Self {
        Self {
            duration_secs: duration_secs.filter(|d| *d > 0.0),
            ..Self::default()
        }
    }

    /// Feed one line; returns a report at the end of every block.
    pub fn feed(&mut self, line: &str) -> Option<Progress> {
        let (key, value) = line.trim().split_once('=')?;
        match key {
            "out_time_us" | "out_time_ms" => {
                // Both keys carry microseconds.
                self.out_time_us = value.parse().ok().or(self.out_time_us);
            }
            "fps" => self.fps = value.parse().ok().or(self.fps),
            "progress" => {
                let done = value == "end";
                let percent = match (self.duration_secs, self.out_time_us) {
                    (_, _) if done => Some(100.0),
                    (Some(total), Some(us)) => {
                        Some((us as f64 / 1e6 / total * 100.0).clamp(0.0, 100.0))
                    }
                    _ => None,
                };
                return Some(Progress {
                    percent,
                    fps: self.fps,
                    done,
                });
            }
            _ => {}
        }
        None
    }
}

/// Runs jobs with the `ffmpeg` binary.
#[derive(Clone, Debug)]
pub struct FfmpegEngine {
    program: PathBuf,
}

impl Default for FfmpegEngine {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegEngine {
    /// Engine running `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn execute(&self, job: &EngineJob) -> SteadycamResult<()> {
        tracing::debug!(
            command = %job.command_line(&self.program.to_string_lossy()),
            "spawning ffmpeg"
        );
        let mut child = Command::new(&self.program)
            .args(job.to_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                SteadycamError::process(format!(
                    "failed to spawn '{}' (is it installed and on PATH?): {e}",
                    self.program.display()
                ))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SteadycamError::process("failed to open ffmpeg stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| SteadycamError::process("failed to open ffmpeg stderr"))?;

        // Drain stderr concurrently so a chatty engine never blocks on a full pipe.
        let drain = tokio::spawn(async move {
            let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                tracing::trace!(target: "steadycam::ffmpeg", "{line}");
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            tail
        });

        let mut parser = ProgressParser::new(job.duration_secs);
        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| SteadycamError::process(format!("failed to read ffmpeg progress: {e}")))?
        {
            if let Some(p) = parser.feed(&line) {
                tracing::info!(percent = ?p.percent, fps = ?p.fps, done = p.done, "progress");
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| SteadycamError::process(format!("failed to wait for ffmpeg: {e}")))?;
        let tail = drain.await.map_err(anyhow::Error::from)?;

        if !status.success() {
            let tail = Vec::from(tail).join("\n");
            return Err(SteadycamError::process(format!(
                "ffmpeg exited with {status}:\n{tail}"
            )));
        }
        Ok(())
    }
}

impl Engine for FfmpegEngine {
    fn run(&self, job: &EngineJob) -> impl Future<Output = SteadycamResult<()>> + Send {
        self.execute(job)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/ffmpeg.rs"]
mod tests;

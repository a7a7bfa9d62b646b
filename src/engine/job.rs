use std::ffi::OsString;
use std::path::PathBuf;

use crate::graph::filter::{FilterStage, serialize_graph};

/// Pad the decoded first video stream arrives on.
pub const SOURCE_LABEL: &str = "0:v";
/// Pad the encoder reads from.
pub const SINK_LABEL: &str = "vout";

/// Where an engine invocation writes its output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    /// Encode into a file.
    File(PathBuf),
    /// Discard the output (analysis passes only need the side effects of their filters).
    Null,
}

/// One complete ffmpeg invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineJob {
    /// Options placed before `-i`.
    pub input_options: Vec<String>,
    /// Source media file.
    pub source: PathBuf,
    /// Filter graph from [`SOURCE_LABEL`] to [`SINK_LABEL`].
    pub stages: Vec<FilterStage>,
    /// Options placed after `-map [vout]`.
    pub output_options: Vec<String>,
    /// Output target.
    pub destination: Destination,
    /// Expected output duration, used to turn progress into a percentage.
    pub duration_secs: Option<f64>,
    /// ffmpeg log level.
    pub verbosity: Option<String>,
}

impl EngineJob {
    /// Serialized `-filter_complex` argument.
    pub fn graph(&self) -> String {
        serialize_graph(&self.stages)
    }

    /// Full argument vector, without the program name.
    pub fn to_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-nostats", "-y", "-progress", "pipe:1"]
            .into_iter()
            .map(OsString::from)
            .collect();
        if let Some(level) = &self.verbosity {
            args.push("-v".into());
            args.push(level.into());
        }
        args.extend(self.input_options.iter().map(OsString::from));
        args.push("-i".into());
        args.push(self.source.clone().into_os_string());
        args.push("-filter_complex".into());
        args.push(self.graph().into());
        args.push("-map".into());
        args.push(format!("[{SINK_LABEL}]").into());
        args.extend(self.output_options.iter().map(OsString::from));
        match &self.destination {
            Destination::File(path) => args.push(path.clone().into_os_string()),
            Destination::Null => args.extend(["-f", "null", "-"].map(OsString::from)),
        }
        args
    }

    /// Shell-quoted command line, for logs and dry runs.
    pub fn command_line(&self, program: &str) -> String {
        std::iter::once(program.to_string())
            .chain(
                self.to_args()
                    .iter()
                    .map(|a| shell_quote(&a.to_string_lossy())),
            )
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,+@%".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/job.rs"]
mod tests;

use crate::foundation::core::FrameRate;
use crate::foundation::error::{SteadycamError, SteadycamResult};
use crate::graph::filter::{Filter, OptionValue};
use crate::graph::format::PixelFormat;
use crate::graph::pad::PadAllocator;
use crate::graph::pipeline::Pipeline;
use crate::render::hardware::HardwareConfig;
use crate::render::options::RenderOptions;

/// Constant quantiser handed to the encoder.
///
/// For H.264, 19 is visually lossless, 23 great, 25 pretty good, 28 a bit dodgy.
pub const ENCODER_QP: u32 = 19;

/// Decoder-side arguments and the filters applied straight after decoding.
#[derive(Clone, Debug)]
pub struct InputConfiguration {
    /// Arguments placed before `-i`.
    pub input_options: Vec<String>,
    /// Filters in the decoded format.
    pub pipeline: Pipeline,
}

/// Encoder-side arguments and the filters applied just before encoding.
#[derive(Clone, Debug)]
pub struct OutputConfiguration {
    /// Filters ending in the format the encoder consumes.
    pub pipeline: Pipeline,
    /// Arguments placed after the output mapping.
    pub output_options: Vec<String>,
}

/// Playback retiming from the source frame rate to `target` frames per second.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Retime {
    /// Probed source frame rate.
    pub source: FrameRate,
    /// Requested output frame rate.
    pub target: u32,
}

impl Retime {
    /// Retiming requested by `opts`, if any.
    pub fn from_options(opts: &RenderOptions, source: FrameRate) -> Option<Self> {
        opts.frame_rate.map(|target| Self { source, target })
    }

    fn filter(self) -> Filter {
        Filter::new("setpts").opt(
            "expr",
            format!(
                "PTS*{}/({}*{})",
                self.source.num, self.source.den, self.target
            ),
        )
    }
}

/// Build the input side of a render.
pub fn input_configuration(
    opts: &RenderOptions,
    hardware: &HardwareConfig,
    retime: Option<Retime>,
    alloc: &mut PadAllocator,
) -> InputConfiguration {
    let mut input_options = hardware.init_options.clone();
    for (flag, value) in [("-ss", &opts.start), ("-t", &opts.duration), ("-to", &opts.end)] {
        if let Some(v) = value {
            input_options.extend([flag.to_string(), v.clone()]);
        }
    }

    let format = hardware.output_format;
    let upsample = (opts.upsample > 0).then(|| {
        let factor = f64::from(opts.upsample) / 100.0;
        let name = if format == PixelFormat::Vaapi {
            "scale_vaapi"
        } else {
            "scale"
        };
        Filter::new(name)
            .opt("w", format!("iw*{factor}"))
            .opt("h", format!("ih*{factor}"))
    });
    let pipeline = Pipeline::from_optional(
        format,
        [upsample, retime.map(Retime::filter)],
        alloc,
    );
    InputConfiguration {
        input_options,
        pipeline,
    }
}

/// Build the output side of a render.
pub fn output_configuration(
    opts: &RenderOptions,
    retime: Option<Retime>,
    alloc: &mut PadAllocator,
) -> SteadycamResult<OutputConfiguration> {
    let is_vaapi_encoder = opts.encoder.contains("vaapi");
    let is_amf_encoder = opts.encoder.contains("amf");
    let format = if is_vaapi_encoder || is_amf_encoder {
        PixelFormat::Vaapi
    } else {
        PixelFormat::Software
    };

    let mut filters = Vec::new();
    if let Some(crop) = &opts.crop {
        filters.push(crop_filter(crop)?);
        if format == PixelFormat::Vaapi {
            // Cropping surfaces only adjusts metadata until something re-renders them.
            filters.push(Filter::new("scale_vaapi"));
        }
    }
    if is_amf_encoder {
        filters.push(Filter::new("hwmap"));
    }

    let mut output_options = vec![
        "-c:v".to_string(),
        opts.encoder.clone(),
        "-qp".to_string(),
        ENCODER_QP.to_string(),
    ];
    match retime {
        Some(r) => {
            output_options.extend(["-r".to_string(), r.target.to_string(), "-an".to_string()])
        }
        None => output_options.extend([
            "-map".to_string(),
            "0:a?".to_string(),
            "-c:a".to_string(),
            "copy".to_string(),
        ]),
    }

    Ok(OutputConfiguration {
        pipeline: Pipeline::uniform(format, filters, alloc),
        output_options,
    })
}

/// Parse crop options given either positionally (`w:h:x:y`) or as `key=value` pairs.
pub fn crop_filter(crop: &str) -> SteadycamResult<Filter> {
    const POSITIONAL: [&str; 4] = ["w", "h", "x", "y"];
    let invalid = || SteadycamError::configuration(format!("invalid crop '{crop}'"));

    let parts: Vec<&str> = crop.split(':').map(str::trim).collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(invalid());
    }
    let mut filter = Filter::new("crop");
    if crop.contains('=') {
        for part in parts {
            let (key, value) = part.split_once('=').ok_or_else(invalid)?;
            if key.is_empty() || value.is_empty() {
                return Err(invalid());
            }
            filter = filter.opt(key, raw_value(value));
        }
    } else {
        if parts.len() > POSITIONAL.len() {
            return Err(invalid());
        }
        for (key, value) in POSITIONAL.iter().zip(parts) {
            filter = filter.opt(*key, raw_value(value));
        }
    }
    Ok(filter)
}

fn raw_value(v: &str) -> OptionValue {
    v.parse::<i64>()
        .map(OptionValue::Int)
        .unwrap_or_else(|_| OptionValue::from(v))
}

#[cfg(test)]
#[path = "../../tests/unit/render/io.rs"]
mod tests;

use crate::foundation::error::SteadycamResult;
use crate::graph::convert::{ConversionContext, convert};
use crate::graph::filter::{Filter, FilterStage, PASSTHROUGH};
use crate::graph::format::PixelFormat;
use crate::graph::pad::{Pad, PadAllocator};

/// Chain `filters` from `input` to `output`, allocating the pads in between.
///
/// An empty chain still produces one passthrough stage, because every declared pad must be
/// produced by some stage.
pub fn connect(
    filters: Vec<Filter>,
    input: Pad,
    output: Pad,
    alloc: &mut PadAllocator,
) -> Vec<FilterStage> {
    if filters.is_empty() {
        return vec![Filter::new(PASSTHROUGH).wire([input], [output])];
    }
    let last = filters.len() - 1;
    let mut stages = Vec::with_capacity(filters.len());
    let mut current = input;
    for (i, filter) in filters.into_iter().enumerate() {
        let next = if i == last {
            output.clone()
        } else {
            alloc.next_pad()
        };
        stages.push(filter.wire([current], [next.clone()]));
        current = next;
    }
    stages
}

/// Ordered, format-tagged sub-graph with one entry pad and one exit pad.
#[derive(Clone, Debug, PartialEq)]
pub struct Pipeline {
    /// Entry pad.
    pub input_pad: Pad,
    /// Format frames must be in at the entry pad.
    pub input_format: PixelFormat,
    /// Wired stages.
    pub stages: Vec<FilterStage>,
    /// Format frames leave in.
    pub output_format: PixelFormat,
    /// Exit pad.
    pub output_pad: Pad,
}

impl Pipeline {
    /// Build a linear pipeline from unwired filters.
    pub fn linear(
        input_format: PixelFormat,
        filters: Vec<Filter>,
        output_format: PixelFormat,
        alloc: &mut PadAllocator,
    ) -> Self {
        let input_pad = alloc.next_pad();
        let output_pad = alloc.next_pad();
        let stages = connect(filters, input_pad.clone(), output_pad.clone(), alloc);
        Self {
            input_pad,
            input_format,
            stages,
            output_format,
            output_pad,
        }
    }

    /// Build a linear pipeline whose filters all run in one format.
    pub fn uniform(format: PixelFormat, filters: Vec<Filter>, alloc: &mut PadAllocator) -> Self {
        Self::linear(format, filters, format, alloc)
    }

    /// Build a linear pipeline from optional filters, dropping the absent ones.
    pub fn from_optional(
        format: PixelFormat,
        filters: impl IntoIterator<Item = Option<Filter>>,
        alloc: &mut PadAllocator,
    ) -> Self {
        Self::uniform(format, filters.into_iter().flatten().collect(), alloc)
    }

    /// Return `true` when the pipeline does nothing and carries no format obligation.
    pub fn is_transparent(&self) -> bool {
        self.stages.iter().all(FilterStage::is_passthrough)
    }
}

/// Concatenate pipelines, converting formats at every junction.
///
/// Transparent pipelines are skipped. `None` means nothing is left to do.
pub fn combine(
    pipelines: Vec<Pipeline>,
    ctx: ConversionContext,
    alloc: &mut PadAllocator,
) -> SteadycamResult<Option<Pipeline>> {
    let mut remaining = pipelines.into_iter().filter(|p| !p.is_transparent());
    let Some(mut combined) = remaining.next() else {
        return Ok(None);
    };
    for mut next in remaining {
        let bridge = convert(combined.output_format, next.input_format, ctx)?;
        if bridge.is_empty() {
            relabel_inputs(&mut next.stages, &next.input_pad, &combined.output_pad);
        } else {
            combined
                .stages
                .extend(connect(bridge, combined.output_pad, next.input_pad, alloc));
        }
        combined.stages.extend(next.stages);
        combined.output_pad = next.output_pad;
        combined.output_format = next.output_format;
    }
    Ok(Some(combined))
}

/// A pad owned by the engine invocation (decoder output or encoder input) and its format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    /// External pad label.
    pub pad: Pad,
    /// Format frames have (source) or need (sink) at this pad.
    pub format: PixelFormat,
}

impl Endpoint {
    /// Create an endpoint.
    pub fn new(label: &str, format: PixelFormat) -> Self {
        Self {
            pad: Pad::named(label),
            format,
        }
    }
}

/// Splice `pipelines` between the engine's source and sink, converting at both ends.
pub fn assemble(
    source: Endpoint,
    pipelines: Vec<Pipeline>,
    sink: Endpoint,
    ctx: ConversionContext,
    alloc: &mut PadAllocator,
) -> SteadycamResult<Vec<FilterStage>> {
    let Some(body) = combine(pipelines, ctx, alloc)? else {
        let bridge = convert(source.format, sink.format, ctx)?;
        return Ok(connect(bridge, source.pad, sink.pad, alloc));
    };
    let head = convert(source.format, body.input_format, ctx)?;
    let tail = convert(body.output_format, sink.format, ctx)?;

    let mut stages = Vec::new();
    let mut body_stages = body.stages;
    if head.is_empty() {
        relabel_inputs(&mut body_stages, &body.input_pad, &source.pad);
    } else {
        stages.extend(connect(head, source.pad, body.input_pad, alloc));
    }
    stages.extend(body_stages);
    if tail.is_empty() {
        relabel_outputs(&mut stages, &body.output_pad, &sink.pad);
    } else {
        stages.extend(connect(tail, body.output_pad, sink.pad, alloc));
    }
    Ok(stages)
}

/// Junctions that need no conversion are joined by renaming the downstream pad.
fn relabel_inputs(stages: &mut [FilterStage], old: &Pad, new: &Pad) {
    for pad in stages.iter_mut().flat_map(|s| s.inputs.iter_mut()) {
        if pad == old {
            *pad = new.clone();
        }
    }
}

fn relabel_outputs(stages: &mut [FilterStage], old: &Pad, new: &Pad) {
    for pad in stages.iter_mut().flat_map(|s| s.outputs.iter_mut()) {
        if pad == old {
            *pad = new.clone();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/pipeline.rs"]
mod tests;

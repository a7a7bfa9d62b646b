use crate::foundation::core::Size;
use crate::foundation::error::SteadycamResult;
use crate::graph::convert::{ConversionContext, convert};
use crate::graph::filter::{Filter, FilterStage};
use crate::graph::format::PixelFormat;
use crate::graph::pad::PadAllocator;
use crate::graph::pipeline::{Pipeline, combine, connect};
use crate::render::options::Algorithm;
use crate::render::stabilise::{StabiliseParams, stabilise_pipeline, tile_scale};

/// Columns and rows of a grid able to hold `tiles` tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSize {
    /// Tiles per row.
    pub cols: u32,
    /// Tiles per column.
    pub rows: u32,
}

impl GridSize {
    /// Factor every tile is shrunk by so the whole grid fits in one frame.
    pub fn divisor(self) -> u32 {
        self.cols.max(self.rows)
    }

    /// Column and row of tile `index`, filling rows first.
    pub fn position(self, index: u32) -> (u32, u32) {
        (index % self.cols, index / self.cols)
    }
}

fn grid_cost(short: u32, tiles: u32, ratio: f64) -> f64 {
    let long = tiles.div_ceil(short);
    let used = f64::from(short * long) / f64::from(tiles);
    let mismatch = (f64::from(long) / f64::from(short)) / ratio;
    used * mismatch.max(1.0 / mismatch)
}

/// Grid for `tiles` tiles whose shape best matches `ratio` (width over height).
///
/// Starts from the squarest grid and narrows the short side while the score improves,
/// stopping at the first step that does not. Portrait ratios are searched inverted and the
/// result transposed.
pub fn comparison_grid_size(tiles: u32, ratio: f64) -> GridSize {
    let tiles = tiles.max(1);
    let landscape = ratio >= 1.0;
    let ratio = if landscape { ratio } else { 1.0 / ratio };

    let mut short = f64::from(tiles).sqrt().ceil() as u32;
    let mut cost = grid_cost(short, tiles, ratio);
    while short > 1 {
        let candidate = grid_cost(short - 1, tiles, ratio);
        if candidate >= cost {
            break;
        }
        short -= 1;
        cost = candidate;
    }
    let long = tiles.div_ceil(short);
    if landscape {
        GridSize {
            cols: long,
            rows: short,
        }
    } else {
        GridSize {
            cols: short,
            rows: long,
        }
    }
}

/// Render every algorithm in `algorithms` on its own tile and compose the tiles into one
/// frame. The first algorithm is the baseline.
///
/// The returned pipeline takes host frames and fans them out with `split`. Tiles are moved
/// to the compute device for composition only when every tile already ends there.
pub fn comparison_pipeline(
    algorithms: &[Algorithm],
    params: &StabiliseParams<'_>,
    ctx: ConversionContext,
    alloc: &mut PadAllocator,
) -> SteadycamResult<Pipeline> {
    let count = algorithms.len() as u32;
    let frame = params.output_size;
    let grid = comparison_grid_size(count, frame.aspect_ratio());
    let divisor = grid.divisor();
    let tile = frame.div(divisor);
    let grid_span = Size::new(grid.cols * tile.width, grid.rows * tile.height);
    tracing::debug!(
        tiles = count,
        cols = grid.cols,
        rows = grid.rows,
        tile_width = tile.width,
        tile_height = tile.height,
        "laying out comparison grid"
    );

    let mut tiles = Vec::with_capacity(algorithms.len());
    for (index, &algorithm) in algorithms.iter().enumerate() {
        let (col, row) = grid.position(index as u32);
        let mut tile_params = params.clone();
        tile_params.input_size = params.input_size.div(divisor);
        tile_params.output_size = tile;
        if index == 0 {
            // Same magnification as one image spanning the whole grid, aligned under its tile.
            tile_params.output_dfov = params
                .opts
                .projection
                .scale_fov(params.output_dfov, tile.diagonal() / grid_span.diagonal());
            tile_params.focal_point = Some((
                f64::from(grid_span.width) / 2.0 - f64::from(col * tile.width),
                f64::from(grid_span.height) / 2.0 - f64::from(row * tile.height),
            ));
        }
        let scale = Pipeline::from_optional(PixelFormat::Software, [tile_scale(divisor)], alloc);
        let body = stabilise_pipeline(algorithm, &tile_params, ctx, alloc)?;
        let combined = combine(vec![scale, body], ctx, alloc)?
            .unwrap_or_else(|| Pipeline::uniform(PixelFormat::Software, Vec::new(), alloc));
        tiles.push(combined);
    }

    let common = if tiles.iter().all(|t| t.output_format == PixelFormat::OpenCl) {
        PixelFormat::OpenCl
    } else {
        PixelFormat::Software
    };
    for t in &mut tiles {
        let bridge = convert(t.output_format, common, ctx)?;
        if !bridge.is_empty() {
            let out = alloc.next_pad();
            let from = std::mem::replace(&mut t.output_pad, out.clone());
            t.stages.extend(connect(bridge, from, out, alloc));
            t.output_format = common;
        }
    }

    let input_pad = alloc.next_pad();
    let mut stages: Vec<FilterStage> = vec![
        Filter::new("split")
            .opt("outputs", count)
            .wire([input_pad.clone()], tiles.iter().map(|t| t.input_pad.clone())),
    ];
    let (pad_filter, overlay_filter) = match common {
        PixelFormat::OpenCl => ("pad_opencl", "overlay_opencl"),
        _ => ("pad", "overlay"),
    };

    let mut outputs = Vec::with_capacity(tiles.len());
    for t in tiles {
        stages.extend(t.stages);
        outputs.push(t.output_pad);
    }
    let mut outputs = outputs.into_iter();
    let mut canvas = alloc.next_pad();
    if let Some(first) = outputs.next() {
        stages.push(
            Filter::new(pad_filter)
                .opt("w", frame.width)
                .opt("h", frame.height)
                .opt("x", 0)
                .opt("y", 0)
                .wire([first], [canvas.clone()]),
        );
    }
    for (index, tile_out) in outputs.enumerate() {
        let (col, row) = grid.position(index as u32 + 1);
        let next = alloc.next_pad();
        stages.push(
            Filter::new(overlay_filter)
                .opt("x", col * tile.width)
                .opt("y", row * tile.height)
                .wire([canvas, tile_out], [next.clone()]),
        );
        canvas = next;
    }

    Ok(Pipeline {
        input_pad,
        input_format: PixelFormat::Software,
        stages,
        output_format: common,
        output_pad: canvas,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/compare.rs"]
mod tests;

use std::path::PathBuf;

use super::*;
use crate::engine::probe::VideoInfo;
use crate::foundation::core::FrameRate;
use crate::graph::filter::OptionValue;
use crate::render::options::{RenderOptions, StabiliseMode};

fn video() -> VideoInfo {
    VideoInfo {
        width: 1920,
        height: 1080,
        frame_rate: FrameRate { num: 30, den: 1 },
        duration_secs: None,
    }
}

fn opencl_ctx() -> ConversionContext {
    ConversionContext {
        filter_device_format: PixelFormat::OpenCl,
        opencl_mapped_from_vaapi: false,
    }
}

fn smooth() -> RenderOptions {
    RenderOptions {
        stabilise: StabiliseMode::Smooth,
        ..RenderOptions::default()
    }
}

#[test]
fn small_grids() {
    let wide = 16.0 / 9.0;
    assert_eq!(comparison_grid_size(1, wide), GridSize { cols: 1, rows: 1 });
    assert_eq!(comparison_grid_size(3, wide), GridSize { cols: 3, rows: 1 });
    assert_eq!(comparison_grid_size(4, wide), GridSize { cols: 2, rows: 2 });
    assert_eq!(comparison_grid_size(5, wide), GridSize { cols: 3, rows: 2 });
}

#[test]
fn portrait_grids_are_transposed() {
    assert_eq!(
        comparison_grid_size(3, 9.0 / 16.0),
        GridSize { cols: 1, rows: 3 }
    );
    assert_eq!(
        comparison_grid_size(5, 9.0 / 16.0),
        GridSize { cols: 2, rows: 3 }
    );
}

#[test]
fn grid_holds_every_tile_and_no_narrower_grid_scores_better() {
    for ratio in [16.0 / 9.0, 4.0 / 3.0, 1.0, 9.0 / 16.0, 3.0] {
        let search = if ratio >= 1.0 { ratio } else { 1.0 / ratio };
        for tiles in 1..=40u32 {
            let grid = comparison_grid_size(tiles, ratio);
            assert!(grid.cols * grid.rows >= tiles, "{tiles} tiles at {ratio}");
            let short = if ratio >= 1.0 { grid.rows } else { grid.cols };
            let chosen = grid_cost(short, tiles, search);
            for narrower in 1..short {
                assert!(
                    grid_cost(narrower, tiles, search) >= chosen - 1e-12,
                    "{tiles} tiles at {ratio}: short side {narrower} beats {short}"
                );
            }
        }
    }
}

#[test]
fn positions_fill_rows_first() {
    let grid = GridSize { cols: 3, rows: 2 };
    assert_eq!(grid.position(0), (0, 0));
    assert_eq!(grid.position(2), (2, 0));
    assert_eq!(grid.position(4), (1, 1));
    assert_eq!(grid.divisor(), 3);
}

#[test]
fn mixed_tiles_compose_on_the_host() {
    let opts = smooth();
    let trf = PathBuf::from("o.trf");
    let params = StabiliseParams::new(&opts, &trf, &video());
    let mut alloc = PadAllocator::new();
    let p = comparison_pipeline(
        &[Algorithm::Vidstab, Algorithm::Deshake, Algorithm::Dewobble],
        &params,
        opencl_ctx(),
        &mut alloc,
    )
    .unwrap();

    assert_eq!(p.input_format, PixelFormat::Software);
    assert_eq!(p.output_format, PixelFormat::Software);
    let split = &p.stages[0];
    assert_eq!(split.name, "split");
    assert_eq!(split.outputs.len(), 3);
    assert_eq!(split.inputs.as_slice(), &[p.input_pad.clone()]);

    let overlays: Vec<_> = p.stages.iter().filter(|s| s.name == "overlay").collect();
    assert_eq!(overlays.len(), 2);
    assert_eq!(overlays[0].option("x"), Some(&OptionValue::Int(640)));
    assert_eq!(overlays[1].option("x"), Some(&OptionValue::Int(1280)));
    assert_eq!(overlays[1].outputs.as_slice(), &[p.output_pad.clone()]);
    assert_eq!(overlays[1].inputs[0], overlays[0].outputs[0]);

    let canvas = p.stages.iter().find(|s| s.name == "pad").unwrap();
    assert_eq!(canvas.option("w"), Some(&OptionValue::Int(1920)));
    assert_eq!(canvas.option("h"), Some(&OptionValue::Int(1080)));
}

#[test]
fn every_pad_has_one_producer() {
    let opts = smooth();
    let trf = PathBuf::from("o.trf");
    let params = StabiliseParams::new(&opts, &trf, &video());
    let mut alloc = PadAllocator::new();
    let p = comparison_pipeline(
        &[Algorithm::Vidstab, Algorithm::DeshakeOpenCl, Algorithm::Dewobble],
        &params,
        opencl_ctx(),
        &mut alloc,
    )
    .unwrap();
    let mut produced: Vec<_> = p.stages.iter().flat_map(|s| s.outputs.iter()).collect();
    let total = produced.len();
    produced.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    produced.dedup();
    assert_eq!(produced.len(), total);
    for stage in &p.stages {
        for input in &stage.inputs {
            assert!(
                *input == p.input_pad || produced.contains(&input),
                "{input} has no producer"
            );
        }
    }
}

#[test]
fn compute_tiles_compose_on_the_device() {
    let opts = smooth();
    let trf = PathBuf::from("o.trf");
    let params = StabiliseParams::new(&opts, &trf, &video());
    let mut alloc = PadAllocator::new();
    let p = comparison_pipeline(
        &[Algorithm::Dewobble, Algorithm::Dewobble],
        &params,
        opencl_ctx(),
        &mut alloc,
    )
    .unwrap();
    assert_eq!(p.output_format, PixelFormat::OpenCl);
    assert!(p.stages.iter().any(|s| s.name == "pad_opencl"));
    assert_eq!(
        p.stages.iter().filter(|s| s.name == "overlay_opencl").count(),
        1
    );
    assert!(!p.stages.iter().any(|s| s.name == "hwdownload"));
}

#[test]
fn baseline_tile_keeps_grid_magnification() {
    let opts = smooth();
    let trf = PathBuf::from("o.trf");
    let params = StabiliseParams::new(&opts, &trf, &video());
    let mut alloc = PadAllocator::new();
    let p = comparison_pipeline(
        &[Algorithm::Dewobble, Algorithm::Dewobble],
        &params,
        opencl_ctx(),
        &mut alloc,
    )
    .unwrap();
    let tiles: Vec<_> = p
        .stages
        .iter()
        .filter(|s| s.name == "dewobble_opencl")
        .collect();
    assert_eq!(tiles.len(), 2);
    let Some(OptionValue::Float(baseline)) = tiles[0].option("out_dfov") else {
        panic!("out_dfov missing");
    };
    let ratio = Size::new(960, 540).diagonal() / Size::new(1920, 540).diagonal();
    assert!(*baseline < 145.8);
    assert!(*baseline > 145.8 * ratio);
    assert_eq!(tiles[1].option("out_dfov"), Some(&OptionValue::Float(145.8)));
    assert_eq!(tiles[0].option("out_fx"), Some(&OptionValue::Float(960.0)));
    assert_eq!(tiles[0].option("out_w"), Some(&OptionValue::Int(960)));
    assert_eq!(tiles[1].option("out_fx"), Some(&OptionValue::Float(480.0)));
}

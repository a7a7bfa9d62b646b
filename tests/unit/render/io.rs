use super::*;
use crate::graph::filter::serialize_graph;
use crate::render::hardware::{HardwareRequest, HwAccel, VaapiVendor, resolve_hardware};

fn software() -> HardwareConfig {
    resolve_hardware(HardwareRequest::default())
}

#[test]
fn time_range_lands_in_input_options() {
    let opts = RenderOptions {
        start: Some("00:01:00".to_string()),
        duration: Some("10".to_string()),
        ..RenderOptions::default()
    };
    let mut alloc = PadAllocator::new();
    let input = input_configuration(&opts, &software(), None, &mut alloc);
    assert_eq!(input.input_options, vec!["-ss", "00:01:00", "-t", "10"]);
    assert!(input.pipeline.is_transparent());
}

#[test]
fn upsample_scales_on_the_decoded_device() {
    let opts = RenderOptions {
        upsample: 150,
        ..RenderOptions::default()
    };
    let hw = resolve_hardware(HardwareRequest {
        hw_accel: Some(HwAccel::Vaapi),
        vaapi_vendor: Some(VaapiVendor::Amd),
        ..HardwareRequest::default()
    });
    let mut alloc = PadAllocator::new();
    let input = input_configuration(&opts, &hw, None, &mut alloc);
    assert_eq!(input.pipeline.input_format, PixelFormat::Vaapi);
    assert_eq!(input.pipeline.stages.len(), 1);
    assert_eq!(input.pipeline.stages[0].name, "scale_vaapi");
    assert!(serialize_graph(&input.pipeline.stages).contains("scale_vaapi=w=iw*1.5:h=ih*1.5"));
}

#[test]
fn retime_adds_setpts_and_drops_audio() {
    let opts = RenderOptions {
        frame_rate: Some(60),
        ..RenderOptions::default()
    };
    let retime = Retime::from_options(&opts, FrameRate::new(30000, 1001).unwrap());
    let mut alloc = PadAllocator::new();
    let input = input_configuration(&opts, &software(), retime, &mut alloc);
    assert_eq!(
        input.pipeline.stages[0].option("expr"),
        Some(&OptionValue::from("PTS*30000/(1001*60)"))
    );
    let output = output_configuration(&opts, retime, &mut alloc).unwrap();
    assert!(
        output
            .output_options
            .ends_with(&["-r".to_string(), "60".to_string(), "-an".to_string()])
    );
}

#[test]
fn software_encoder_takes_host_frames_and_copies_audio() {
    let mut alloc = PadAllocator::new();
    let output = output_configuration(&RenderOptions::default(), None, &mut alloc).unwrap();
    assert_eq!(output.pipeline.input_format, PixelFormat::Software);
    assert!(output.pipeline.is_transparent());
    assert_eq!(
        output.output_options,
        vec!["-c:v", "libx264", "-qp", "19", "-map", "0:a?", "-c:a", "copy"]
    );
}

#[test]
fn vaapi_encoder_crop_is_materialised_on_surfaces() {
    let opts = RenderOptions {
        encoder: "h264_vaapi".to_string(),
        crop: Some("1800:1600:300:800".to_string()),
        ..RenderOptions::default()
    };
    let mut alloc = PadAllocator::new();
    let output = output_configuration(&opts, None, &mut alloc).unwrap();
    assert_eq!(output.pipeline.input_format, PixelFormat::Vaapi);
    let graph = serialize_graph(&output.pipeline.stages);
    assert!(graph.contains("crop=w=1800:h=1600:x=300:y=800"), "{graph}");
    assert!(graph.contains("scale_vaapi"));
}

#[test]
fn amf_encoder_maps_surfaces() {
    let opts = RenderOptions {
        encoder: "h264_amf".to_string(),
        ..RenderOptions::default()
    };
    let mut alloc = PadAllocator::new();
    let output = output_configuration(&opts, None, &mut alloc).unwrap();
    assert_eq!(output.pipeline.input_format, PixelFormat::Vaapi);
    assert_eq!(output.pipeline.stages[0].name, "hwmap");
}

#[test]
fn crop_accepts_keyed_expressions() {
    let filter = crop_filter("w=iw-100:h=ih-100").unwrap();
    assert_eq!(filter.option("w"), Some(&OptionValue::from("iw-100")));
    assert!(crop_filter("").is_err());
    assert!(crop_filter("1:2:3:4:5").is_err());
    assert!(crop_filter("w=:h=2").is_err());
    assert!(crop_filter("w=1:2").is_err());
}

use super::*;

fn request(
    hw_accel: Option<HwAccel>,
    vaapi_vendor: Option<VaapiVendor>,
    opencl_platform: Option<u32>,
    map_opencl_from_vaapi: bool,
) -> HardwareRequest {
    HardwareRequest {
        hw_accel,
        vaapi_vendor,
        opencl_platform,
        map_opencl_from_vaapi,
    }
}

#[test]
fn no_acceleration_means_software_everywhere() {
    let cfg = resolve_hardware(HardwareRequest::default());
    assert!(cfg.init_options.is_empty());
    assert_eq!(cfg.output_format, PixelFormat::Software);
    assert_eq!(cfg.filter_device_format, PixelFormat::Software);
    assert!(!cfg.opencl_mapped_from_vaapi);
}

#[test]
fn intel_vaapi_with_mapping_derives_opencl() {
    let cfg = resolve_hardware(request(
        Some(HwAccel::Vaapi),
        Some(VaapiVendor::Intel),
        None,
        true,
    ));
    assert_eq!(cfg.output_format, PixelFormat::Vaapi);
    assert_eq!(cfg.filter_device_format, PixelFormat::OpenCl);
    assert!(cfg.opencl_mapped_from_vaapi);
    assert_eq!(
        cfg.init_options.join(" "),
        "-init_hw_device vaapi=intel_vaapi:,driver=iHD,kernel_driver=i915 \
         -hwaccel vaapi -hwaccel_device intel_vaapi -hwaccel_output_format vaapi \
         -init_hw_device opencl=intel_opencl@intel_vaapi -filter_hw_device intel_opencl"
    );
}

#[test]
fn amd_cannot_derive_opencl() {
    let cfg = resolve_hardware(request(
        Some(HwAccel::Vaapi),
        Some(VaapiVendor::Amd),
        None,
        true,
    ));
    assert_eq!(cfg.output_format, PixelFormat::Vaapi);
    assert_eq!(cfg.filter_device_format, PixelFormat::Vaapi);
    assert!(!cfg.opencl_mapped_from_vaapi);
    assert!(cfg.init_options.ends_with(&[
        "-filter_hw_device".to_string(),
        "amd_vaapi".to_string()
    ]));
}

#[test]
fn opencl_platform_is_independent_of_vaapi() {
    let cfg = resolve_hardware(request(
        Some(HwAccel::Vaapi),
        Some(VaapiVendor::Intel),
        Some(1),
        false,
    ));
    assert_eq!(cfg.filter_device_format, PixelFormat::OpenCl);
    assert!(!cfg.opencl_mapped_from_vaapi);
    let joined = cfg.init_options.join(" ");
    assert!(joined.contains("-init_hw_device opencl=opencl_1:1.0"));
    assert!(joined.ends_with("-filter_hw_device opencl_1"));
}

#[test]
fn vaapi_decode_without_vendor_falls_back_to_software() {
    let cfg = resolve_hardware(request(Some(HwAccel::Vaapi), None, None, true));
    assert_eq!(cfg.output_format, PixelFormat::Software);
    assert!(cfg.init_options.is_empty());
}

#[test]
fn nvdec_decodes_to_host_frames() {
    let cfg = resolve_hardware(request(Some(HwAccel::Nvdec), None, None, true));
    assert_eq!(cfg.init_options, vec!["-hwaccel", "nvdec"]);
    assert_eq!(cfg.output_format, PixelFormat::Software);
}

#[test]
fn unknown_vendor_is_a_configuration_error() {
    let err = "nvidia".parse::<VaapiVendor>().unwrap_err();
    assert!(matches!(err, SteadycamError::Configuration(_)));
    assert_eq!("INTEL".parse::<VaapiVendor>().unwrap(), VaapiVendor::Intel);
}

#[test]
fn conversion_context_mirrors_the_resolved_devices() {
    let cfg = resolve_hardware(request(None, Some(VaapiVendor::Intel), None, true));
    let ctx = cfg.conversion_context();
    assert_eq!(ctx.filter_device_format, PixelFormat::OpenCl);
    assert!(ctx.opencl_mapped_from_vaapi);
}

use super::*;
use crate::graph::filter::OptionValue;

const DOMAIN: [PixelFormat; 3] = [PixelFormat::Software, PixelFormat::Vaapi, PixelFormat::OpenCl];

fn names(filters: &[Filter]) -> Vec<&str> {
    filters.iter().map(|f| f.name.as_str()).collect()
}

fn contexts() -> Vec<ConversionContext> {
    let mut out = Vec::new();
    for filter_device_format in DOMAIN {
        for opencl_mapped_from_vaapi in [false, true] {
            out.push(ConversionContext {
                filter_device_format,
                opencl_mapped_from_vaapi,
            });
        }
    }
    out
}

#[test]
fn identity_pairs_are_empty() {
    for ctx in contexts() {
        for f in DOMAIN {
            assert!(convert(f, f, ctx).unwrap().is_empty());
        }
    }
}

#[test]
fn every_pair_converts_or_fails_loudly() {
    for ctx in contexts() {
        for from in DOMAIN {
            for to in DOMAIN {
                if from == to {
                    continue;
                }
                match convert(from, to, ctx) {
                    Ok(filters) => assert!(!filters.is_empty(), "{from}->{to} silently no-ops"),
                    Err(SteadycamError::UnsupportedConversion { from: f, to: t }) => {
                        assert_eq!((f, t), (from, to));
                    }
                    Err(e) => panic!("unexpected error {e}"),
                }
            }
        }
    }
}

#[test]
fn download_always_reaches_software() {
    for ctx in contexts() {
        for from in [PixelFormat::Vaapi, PixelFormat::OpenCl] {
            let filters = convert(from, PixelFormat::Software, ctx).unwrap();
            assert_eq!(names(&filters), ["hwdownload", "format"]);
        }
    }
}

#[test]
fn mapped_surface_to_compute_is_zero_copy() {
    let ctx = ConversionContext {
        filter_device_format: PixelFormat::OpenCl,
        opencl_mapped_from_vaapi: true,
    };
    let filters = convert(PixelFormat::Vaapi, PixelFormat::OpenCl, ctx).unwrap();
    assert_eq!(filters, vec![Filter::new("hwmap")]);

    let back = convert(PixelFormat::OpenCl, PixelFormat::Vaapi, ctx).unwrap();
    assert_eq!(back.len(), 1);
    assert_eq!(back[0].option("reverse"), Some(&OptionValue::Int(1)));
}

#[test]
fn mapping_from_surface_device_derives_compute_device() {
    let ctx = ConversionContext {
        filter_device_format: PixelFormat::Vaapi,
        opencl_mapped_from_vaapi: true,
    };
    let filters = convert(PixelFormat::Vaapi, PixelFormat::OpenCl, ctx).unwrap();
    assert_eq!(names(&filters), ["hwmap"]);
    assert_eq!(
        filters[0].option("derive_device"),
        Some(&OptionValue::from("opencl"))
    );
}

#[test]
fn unmapped_surface_to_compute_copies_through_host() {
    let ctx = ConversionContext {
        filter_device_format: PixelFormat::Vaapi,
        opencl_mapped_from_vaapi: false,
    };
    let filters = convert(PixelFormat::Vaapi, PixelFormat::OpenCl, ctx).unwrap();
    assert_eq!(names(&filters), ["hwdownload", "format", "hwupload"]);
}

#[test]
fn software_upload_skips_download() {
    let ctx = ConversionContext {
        filter_device_format: PixelFormat::OpenCl,
        opencl_mapped_from_vaapi: false,
    };
    let filters = convert(PixelFormat::Software, PixelFormat::OpenCl, ctx).unwrap();
    assert_eq!(names(&filters), ["format", "hwupload"]);
}

#[test]
fn upload_without_filter_device_is_unsupported() {
    let err = convert(
        PixelFormat::Software,
        PixelFormat::Vaapi,
        ConversionContext::software(),
    )
    .unwrap_err();
    assert!(matches!(err, SteadycamError::UnsupportedConversion { .. }));
}

#[test]
fn amf_only_converts_to_itself() {
    let ctx = ConversionContext::software();
    assert!(convert(PixelFormat::Amf, PixelFormat::Amf, ctx).unwrap().is_empty());
    assert!(convert(PixelFormat::Vaapi, PixelFormat::Amf, ctx).is_err());
    assert!(convert(PixelFormat::Amf, PixelFormat::Software, ctx).is_err());
}

#[test]
fn a_pair_converts_exactly_when_its_target_is_reachable() {
    for ctx in contexts() {
        for from in DOMAIN {
            for to in DOMAIN {
                if from == to {
                    continue;
                }
                assert_eq!(
                    convert(from, to, ctx).is_ok(),
                    ctx.can_reach(to),
                    "{from}->{to} under {ctx:?}"
                );
            }
        }
    }
}

#[test]
fn one_way_pairs_only_lack_a_device_for_the_return_trip() {
    for ctx in contexts() {
        for from in DOMAIN {
            for to in DOMAIN {
                if from == to || convert(from, to, ctx).is_err() {
                    continue;
                }
                match convert(to, from, ctx) {
                    Ok(back) => assert!(!back.is_empty()),
                    Err(SteadycamError::UnsupportedConversion { .. }) => {
                        assert!(!ctx.can_reach(from), "{to}->{from} under {ctx:?}");
                    }
                    Err(e) => panic!("unexpected error {e}"),
                }
            }
        }
    }
}

#[test]
fn mapped_compute_device_reaches_surfaces_from_host() {
    let ctx = ConversionContext {
        filter_device_format: PixelFormat::OpenCl,
        opencl_mapped_from_vaapi: true,
    };
    let filters = convert(PixelFormat::Software, PixelFormat::Vaapi, ctx).unwrap();
    assert_eq!(names(&filters), ["format", "hwupload", "hwmap"]);
    assert_eq!(filters[2].option("reverse"), Some(&OptionValue::Int(1)));

    let back = convert(PixelFormat::Vaapi, PixelFormat::Software, ctx).unwrap();
    assert_eq!(names(&back), ["hwdownload", "format"]);
}

#[test]
fn surfaces_stay_out_of_reach_without_their_device() {
    let ctx = ConversionContext {
        filter_device_format: PixelFormat::OpenCl,
        opencl_mapped_from_vaapi: false,
    };
    assert!(!ctx.can_reach(PixelFormat::Vaapi));
    assert!(ctx.can_reach(PixelFormat::OpenCl));
    assert!(matches!(
        convert(PixelFormat::OpenCl, PixelFormat::Vaapi, ctx),
        Err(SteadycamError::UnsupportedConversion { .. })
    ));
}

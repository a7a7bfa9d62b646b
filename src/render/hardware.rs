use std::fmt;
use std::str::FromStr;

use crate::foundation::error::SteadycamError;
use crate::graph::convert::ConversionContext;
use crate::graph::format::PixelFormat;
use crate::render::options::RenderOptions;

/// Hardware decoder requested for the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HwAccel {
    /// VAAPI decode into hardware surfaces.
    Vaapi,
    /// NVDEC decode, downloaded to host frames by ffmpeg.
    Nvdec,
}

impl FromStr for HwAccel {
    type Err = SteadycamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vaapi" => Ok(Self::Vaapi),
            "nvdec" => Ok(Self::Nvdec),
            other => Err(SteadycamError::configuration(format!(
                "unknown hardware acceleration '{other}' (expected vaapi or nvdec)"
            ))),
        }
    }
}

/// GPU vendor behind the VAAPI device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VaapiVendor {
    /// Intel iHD driver.
    Intel,
    /// AMD radeonsi driver.
    Amd,
}

impl VaapiVendor {
    /// Return `true` when an OpenCL device can be derived from this vendor's VAAPI device.
    pub fn supports_opencl_derivation(self) -> bool {
        matches!(self, Self::Intel)
    }
}

impl fmt::Display for VaapiVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Intel => "intel",
            Self::Amd => "amd",
        })
    }
}

impl FromStr for VaapiVendor {
    type Err = SteadycamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "intel" => Ok(Self::Intel),
            "amd" => Ok(Self::Amd),
            other => Err(SteadycamError::configuration(format!(
                "unknown VAAPI vendor '{other}' (expected intel or amd)"
            ))),
        }
    }
}

/// Hardware devices requested for one render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HardwareRequest {
    /// Hardware decoder.
    pub hw_accel: Option<HwAccel>,
    /// VAAPI device vendor.
    pub vaapi_vendor: Option<VaapiVendor>,
    /// OpenCL platform index.
    pub opencl_platform: Option<u32>,
    /// Derive OpenCL from VAAPI when the vendor allows it.
    pub map_opencl_from_vaapi: bool,
}

impl HardwareRequest {
    /// Hardware part of `opts`.
    pub fn from_options(opts: &RenderOptions) -> Self {
        Self {
            hw_accel: opts.hw_accel,
            vaapi_vendor: opts.vaapi_vendor,
            opencl_platform: opts.opencl_platform,
            map_opencl_from_vaapi: opts.map_opencl_from_vaapi,
        }
    }
}

/// Device setup and the formats it implies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HardwareConfig {
    /// ffmpeg input arguments initialising the devices.
    pub init_options: Vec<String>,
    /// Format decoded frames arrive in.
    pub output_format: PixelFormat,
    /// Format of the device filter stages run on.
    pub filter_device_format: PixelFormat,
    /// OpenCL is derived from the VAAPI device.
    pub opencl_mapped_from_vaapi: bool,
}

impl HardwareConfig {
    /// Conversion facts for this device setup.
    pub fn conversion_context(&self) -> ConversionContext {
        ConversionContext {
            filter_device_format: self.filter_device_format,
            opencl_mapped_from_vaapi: self.opencl_mapped_from_vaapi,
        }
    }
}

struct DeviceConfig {
    init_line: String,
    name: String,
}

fn vaapi_device(vendor: VaapiVendor) -> DeviceConfig {
    match vendor {
        VaapiVendor::Intel => DeviceConfig {
            init_line: "intel_vaapi:,driver=iHD,kernel_driver=i915".to_string(),
            name: "intel_vaapi".to_string(),
        },
        VaapiVendor::Amd => DeviceConfig {
            init_line: "amd_vaapi:,driver=radeonsi,kernel_driver=amdgpu".to_string(),
            name: "amd_vaapi".to_string(),
        },
    }
}

fn opencl_device(derive_from: Option<VaapiVendor>, platform: Option<u32>) -> Option<DeviceConfig> {
    if derive_from == Some(VaapiVendor::Intel) {
        return Some(DeviceConfig {
            init_line: "intel_opencl@intel_vaapi".to_string(),
            name: "intel_opencl".to_string(),
        });
    }
    platform.map(|p| DeviceConfig {
        init_line: format!("opencl_{p}:{p}.0"),
        name: format!("opencl_{p}"),
    })
}

/// Work out device initialisation and the formats frames move through.
///
/// Unknown vendors never reach this point: they are rejected when the option is parsed.
pub fn resolve_hardware(req: HardwareRequest) -> HardwareConfig {
    let vaapi = req.vaapi_vendor.map(vaapi_device);
    let derive_from = req
        .vaapi_vendor
        .filter(|v| req.map_opencl_from_vaapi && v.supports_opencl_derivation());
    let opencl = opencl_device(derive_from, req.opencl_platform);
    let opencl_mapped_from_vaapi = derive_from.is_some();

    if req.hw_accel == Some(HwAccel::Vaapi) && vaapi.is_none() {
        tracing::warn!("VAAPI decoding requested without a VAAPI vendor; decoding in software");
    }
    let use_vaapi_decode = req.hw_accel == Some(HwAccel::Vaapi) && vaapi.is_some();

    let mut init_options = Vec::new();
    if let Some(dev) = &vaapi {
        init_options.extend(["-init_hw_device".to_string(), format!("vaapi={}", dev.init_line)]);
        if use_vaapi_decode {
            init_options.extend([
                "-hwaccel".to_string(),
                "vaapi".to_string(),
                "-hwaccel_device".to_string(),
                dev.name.clone(),
                "-hwaccel_output_format".to_string(),
                "vaapi".to_string(),
            ]);
        }
    }
    if req.hw_accel == Some(HwAccel::Nvdec) {
        init_options.extend(["-hwaccel".to_string(), "nvdec".to_string()]);
    }
    if let Some(dev) = &opencl {
        init_options.extend(["-init_hw_device".to_string(), format!("opencl={}", dev.init_line)]);
    }
    let filter_device = opencl.as_ref().or(vaapi.as_ref());
    if let Some(dev) = filter_device {
        init_options.extend(["-filter_hw_device".to_string(), dev.name.clone()]);
    }

    let filter_device_format = if opencl.is_some() {
        PixelFormat::OpenCl
    } else if vaapi.is_some() {
        PixelFormat::Vaapi
    } else {
        PixelFormat::Software
    };

    HardwareConfig {
        init_options,
        output_format: if use_vaapi_decode {
            PixelFormat::Vaapi
        } else {
            PixelFormat::Software
        },
        filter_device_format,
        opencl_mapped_from_vaapi,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/hardware.rs"]
mod tests;

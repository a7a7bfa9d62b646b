use crate::foundation::error::{SteadycamError, SteadycamResult};
use crate::graph::filter::Filter;
use crate::graph::format::PixelFormat;

/// Host layout frames are normalised to before any upload.
pub const NORMALISED_PIX_FMT: &str = "nv12";

/// Per-request device facts every conversion depends on.
///
/// Resolved once from the hardware configuration and threaded through all graph
/// construction for the request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConversionContext {
    /// Format of the device `-filter_hw_device` points at.
    pub filter_device_format: PixelFormat,
    /// OpenCL device is derived from the VAAPI device, so frames can be mapped zero-copy.
    pub opencl_mapped_from_vaapi: bool,
}

impl ConversionContext {
    /// Context for a request without any filter device.
    pub fn software() -> Self {
        Self {
            filter_device_format: PixelFormat::Software,
            opencl_mapped_from_vaapi: false,
        }
    }

    /// Return `true` when frames from any other domain can be brought into `format`.
    ///
    /// Host memory is always reachable. The compute device needs a filter device to upload
    /// through; surfaces need the surface device itself or a compute device mapped from it.
    pub fn can_reach(self, format: PixelFormat) -> bool {
        match format {
            PixelFormat::Software => true,
            PixelFormat::OpenCl => {
                matches!(self.filter_device_format, PixelFormat::OpenCl | PixelFormat::Vaapi)
            }
            PixelFormat::Vaapi => match self.filter_device_format {
                PixelFormat::Vaapi => true,
                PixelFormat::OpenCl => self.opencl_mapped_from_vaapi,
                _ => false,
            },
            PixelFormat::Amf => false,
        }
    }
}

/// Minimal filter sequence moving frames from `from` to `to`.
///
/// Called once per adjacency: the right sequence depends on the exact pair of formats and on
/// where the filter device lives.
pub fn convert(
    from: PixelFormat,
    to: PixelFormat,
    ctx: ConversionContext,
) -> SteadycamResult<Vec<Filter>> {
    use PixelFormat::*;

    if from == to {
        return Ok(Vec::new());
    }
    if from == Amf || to == Amf {
        return Err(SteadycamError::unsupported_conversion(from, to));
    }
    if to == Software {
        return Ok(vec![download(), normalise()]);
    }
    match to {
        OpenCl => {
            if from == Vaapi && ctx.opencl_mapped_from_vaapi {
                match ctx.filter_device_format {
                    OpenCl => return Ok(vec![Filter::new("hwmap")]),
                    Vaapi => {
                        return Ok(vec![Filter::new("hwmap").opt("derive_device", "opencl")]);
                    }
                    _ => {}
                }
            }
            match ctx.filter_device_format {
                OpenCl => Ok(reupload(from, Filter::new("hwupload"))),
                // The compute context can still be derived from the surface device.
                Vaapi => Ok(reupload(
                    from,
                    Filter::new("hwupload").opt("derive_device", "opencl"),
                )),
                _ => Err(SteadycamError::unsupported_conversion(from, to)),
            }
        }
        Vaapi => match ctx.filter_device_format {
            Vaapi if from == OpenCl && ctx.opencl_mapped_from_vaapi => Ok(vec![map_to_surface()]),
            Vaapi => Ok(reupload(from, Filter::new("hwupload"))),
            OpenCl if ctx.opencl_mapped_from_vaapi => {
                if from == OpenCl {
                    return Ok(vec![map_to_surface()]);
                }
                // Upload to the compute device, then map back onto the surface device it was
                // derived from.
                let mut filters = reupload(from, Filter::new("hwupload"));
                filters.push(map_to_surface());
                Ok(filters)
            }
            _ => Err(SteadycamError::unsupported_conversion(from, to)),
        },
        Software | Amf => Err(SteadycamError::unsupported_conversion(from, to)),
    }
}

fn map_to_surface() -> Filter {
    Filter::new("hwmap")
        .opt("derive_device", "vaapi")
        .opt("reverse", 1)
}

fn download() -> Filter {
    Filter::new("hwdownload")
}

fn normalise() -> Filter {
    Filter::new("format").opt("pix_fmts", NORMALISED_PIX_FMT)
}

fn reupload(from: PixelFormat, upload: Filter) -> Vec<Filter> {
    let mut filters = Vec::with_capacity(3);
    if from.is_hardware() {
        filters.push(download());
    }
    filters.push(normalise());
    filters.push(upload);
    filters
}

#[cfg(test)]
#[path = "../../tests/unit/graph/convert.rs"]
mod tests;

use std::fmt;

/// Memory domain a frame buffer currently lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// Ordinary host-addressable frames.
    Software,
    /// VAAPI hardware surfaces, used by accelerated decode and encode.
    Vaapi,
    /// OpenCL images, used by compute-heavy filters.
    OpenCl,
    /// AMF surfaces. Declared for encoder plumbing; hardware resolution never produces it.
    Amf,
}

impl PixelFormat {
    /// Lowercase name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Software => "software",
            Self::Vaapi => "vaapi",
            Self::OpenCl => "opencl",
            Self::Amf => "amf",
        }
    }

    /// Return `true` for formats whose frames are not host-addressable.
    pub fn is_hardware(self) -> bool {
        !matches!(self, Self::Software)
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

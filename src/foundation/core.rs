use crate::foundation::error::{SteadycamError, SteadycamResult};

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRate {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl FrameRate {
    /// Create a validated frame rate.
    pub fn new(num: u32, den: u32) -> SteadycamResult<Self> {
        if den == 0 {
            return Err(SteadycamError::probe("frame rate denominator must be > 0"));
        }
        if num == 0 {
            return Err(SteadycamError::probe("frame rate numerator must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Parse the `num/den` notation used by ffprobe (`30000/1001`). A bare integer is `n/1`.
    pub fn parse(s: &str) -> SteadycamResult<Self> {
        let (num, den) = s.trim().split_once('/').unwrap_or((s.trim(), "1"));
        let num = num
            .parse::<u32>()
            .map_err(|_| SteadycamError::probe(format!("invalid frame rate '{s}'")))?;
        let den = den
            .parse::<u32>()
            .map_err(|_| SteadycamError::probe(format!("invalid frame rate '{s}'")))?;
        Self::new(num, den)
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }
}

/// Frame dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Create a size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Length of the diagonal in pixels.
    pub fn diagonal(self) -> f64 {
        f64::from(self.width).hypot(f64::from(self.height))
    }

    /// Width divided by height.
    pub fn aspect_ratio(self) -> f64 {
        f64::from(self.width) / f64::from(self.height.max(1))
    }

    /// Scale both dimensions by `percent / 100`, rounding to the nearest even pixel count
    /// (4:2:0 frames need even dimensions).
    pub fn scale_percent(self, percent: u32) -> Self {
        let f = f64::from(percent) / 100.0;
        Self {
            width: even(f64::from(self.width) * f),
            height: even(f64::from(self.height) * f),
        }
    }

    /// Divide both dimensions by `divisor`, rounding down to even pixel counts.
    pub fn div(self, divisor: u32) -> Self {
        let d = divisor.max(1);
        Self {
            width: (self.width / d) & !1,
            height: (self.height / d) & !1,
        }
    }
}

fn even(v: f64) -> u32 {
    ((v / 2.0).round() as u32) * 2
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

/// Wrap an angle in degrees into `[-180, 180)`.
pub fn normalize_angle(degrees: f64) -> f64 {
    (degrees + 180.0).rem_euclid(360.0) - 180.0
}

/// Field of view covered once `buffer_percent` of black border is added around the frame.
pub fn buffered_fov(fov: f64, buffer_percent: f64) -> f64 {
    fov * (1.0 + buffer_percent / 100.0)
}

/// Field of view left after zooming in by `zoom_percent`.
pub fn zoomed_fov(fov: f64, zoom_percent: f64) -> f64 {
    fov / (1.0 + zoom_percent / 100.0)
}

/// Rescale an angle for a projection whose image radius grows linearly with the angle.
pub(crate) fn scale_fov_linear(fov: f64, ratio: f64) -> f64 {
    fov * ratio
}

/// Rescale an angle for a projection with image radius `r = k * tan(theta / divisor)`.
///
/// Rectilinear lenses use `divisor = 2` over the full angle, stereographic ones `4`.
pub(crate) fn scale_fov_tangent(fov: f64, ratio: f64, divisor: f64) -> f64 {
    let half = (fov / divisor).to_radians();
    divisor * (ratio * half.tan()).atan().to_degrees()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;

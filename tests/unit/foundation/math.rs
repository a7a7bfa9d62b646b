use super::*;

#[test]
fn normalized_angles_stay_in_range_and_congruent() {
    for a in [-1080.0, -540.0, -181.0, -180.0, -1.0, 0.0, 90.0, 179.9, 180.0, 359.0, 725.5] {
        let n = normalize_angle(a);
        assert!((-180.0..180.0).contains(&n), "{a} -> {n}");
        let diff = (a - n) / 360.0;
        assert!((diff - diff.round()).abs() < 1e-9, "{a} -> {n} not congruent");
    }
    assert_eq!(normalize_angle(180.0), -180.0);
    assert_eq!(normalize_angle(270.0), -90.0);
}

#[test]
fn buffer_and_zoom_are_inverse_shaped() {
    assert!((buffered_fov(100.0, 20.0) - 120.0).abs() < 1e-9);
    assert!((zoomed_fov(120.0, 20.0) - 100.0).abs() < 1e-9);
    assert_eq!(zoomed_fov(145.8, 0.0), 145.8);
}

#[test]
fn tangent_scaling_is_not_linear() {
    // Halving the image radius of a 90 degree rectilinear view gives ~53.13 degrees, not 45.
    let scaled = scale_fov_tangent(90.0, 0.5, 2.0);
    assert!((scaled - 53.130_102).abs() < 1e-4, "{scaled}");
    assert!((scale_fov_linear(90.0, 0.5) - 45.0).abs() < 1e-9);
}

#[test]
fn unit_ratio_is_identity_for_all_laws() {
    for fov in [30.0, 90.0, 145.8] {
        assert!((scale_fov_tangent(fov, 1.0, 2.0) - fov).abs() < 1e-9);
        assert!((scale_fov_tangent(fov, 1.0, 4.0) - fov).abs() < 1e-9);
    }
}

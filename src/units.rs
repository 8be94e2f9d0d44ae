//! Unit conversion factors shared by the skeleton and motion readers.

use std::f32::consts::PI;

/// Multiplier applied to angles given in radians.
pub const RADIANS: f32 = 1.;
/// Multiplier turning degrees into radians.
pub const DEGREES: f32 = PI / 180.;
/// Default length unit, inches to meters.
pub const INCHES_TO_METERS: f32 = 2.54e-2;

/// Angle multiplier for a `units` section angle name.
pub fn angle_unit(name: &str) -> Option<f32> {
    match name {
        "deg" => Some(DEGREES),
        "rad" => Some(RADIANS),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn angle_names() {
        assert_eq!(angle_unit("rad"), Some(1.));
        assert!((angle_unit("deg").unwrap() * 180. - PI).abs() < 1e-6);
        assert_eq!(angle_unit("grad"), None);
    }
}

//! Acclaim skeleton (ASF) and motion (AMC) readers with a forward kinematics
//! engine that turns a parsed frame into per-bone world transforms.

pub mod error;
pub mod kinematics;
pub mod motion;
pub mod read;
pub mod skeleton;
pub mod units;

pub use error::{Error, Result, Warning};
pub use kinematics::{evaluate, BoneTransforms, Pose};
pub use motion::{Frame, Motion, Transformation};
pub use skeleton::{Bone, Skeleton};

use cgmath::Vector3;

/// Channel kind: three rotations and three translations.
///
/// Bones may only animate the rotational ones, the root may use all six.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    Rx,
    Ry,
    Rz,
    Tx,
    Ty,
    Tz,
}

impl Axis {
    pub fn is_rotation(self) -> bool {
        matches!(self, Self::Rx | Self::Ry | Self::Rz)
    }

    /// Vector component (0 = x, 1 = y, 2 = z) this channel drives.
    pub fn component(self) -> usize {
        match self {
            Self::Rx | Self::Tx => 0,
            Self::Ry | Self::Ty => 1,
            Self::Rz | Self::Tz => 2,
        }
    }

    pub fn unit(self) -> Vector3<f32> {
        match self.component() {
            0 => Vector3::unit_x(),
            1 => Vector3::unit_y(),
            _ => Vector3::unit_z(),
        }
    }

    /// Rotation axis from an axis order letter (`X`, `Y` or `Z`).
    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'X' => Some(Self::Rx),
            'Y' => Some(Self::Ry),
            'Z' => Some(Self::Rz),
            _ => None,
        }
    }

    /// Channel from a `RX`..`TZ` token, in either case.
    pub fn from_token(token: &str) -> Option<Self> {
        match &token.to_ascii_lowercase()[..] {
            "rx" => Some(Self::Rx),
            "ry" => Some(Self::Ry),
            "rz" => Some(Self::Rz),
            "tx" => Some(Self::Tx),
            "ty" => Some(Self::Ty),
            "tz" => Some(Self::Tz),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn axis_tokens() {
        assert_eq!(Axis::from_token("RX"), Some(Axis::Rx));
        assert_eq!(Axis::from_token("tz"), Some(Axis::Tz));
        assert_eq!(Axis::from_token("l"), None);
        assert_eq!(Axis::from_letter('y'), Some(Axis::Ry));
        assert_eq!(Axis::from_letter('W'), None);
    }

    #[test]
    fn axis_components() {
        assert!(Axis::Rz.is_rotation());
        assert!(!Axis::Ty.is_rotation());
        assert_eq!(Axis::Ty.component(), Axis::Ry.component());
        assert_eq!(Axis::Tz.unit(), Vector3::unit_z());
    }
}

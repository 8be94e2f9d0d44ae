//! Forward kinematics: walks the bone tree from the root and composes each
//! bone's world transform, optionally layering one motion frame on top.

use crate::error::{Error, Result};
use crate::motion::{Frame, Motion};
use crate::skeleton::Skeleton;
use crate::Axis;

use cgmath::{EuclideanSpace, InnerSpace, Matrix, Matrix4, Point3, Rad, SquareMatrix, Transform, Vector3};

use std::f32::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct BoneTransforms {
    pub local_trans: Matrix4<f32>,
    pub local_trans_inv: Matrix4<f32>,
    /// Carries (0, 1, 0) onto the bone direction.
    pub bone_dir_trans: Matrix4<f32>,
    /// Incoming parent transform, before this bone's motion.
    pub still_trans: Matrix4<f32>,
    pub motion_trans: Matrix4<f32>,
}

/// Per-bone transforms, indexed like [`Skeleton::bones`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    bones: Vec<Option<BoneTransforms>>,
}

impl Pose {
    /// `None` for bones the walk from the root never reached.
    pub fn bone(&self, index: usize) -> Option<&BoneTransforms> {
        self.bones.get(index).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &BoneTransforms)> + '_ {
        self.bones
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.as_ref().map(|t| (i, t)))
    }

    pub fn bone_start(&self, index: usize) -> Option<Point3<f32>> {
        self.bone(index)
            .map(|t| t.motion_trans.transform_point(Point3::origin()))
    }

    pub fn bone_tip(&self, skeleton: &Skeleton, index: usize) -> Option<Point3<f32>> {
        let bone = skeleton.bone(index)?;
        let tip = Point3::from_vec(bone.direction * bone.length);
        self.bone(index).map(|t| t.motion_trans.transform_point(tip))
    }
}

impl Skeleton {
    pub fn rest_pose(&self) -> Pose {
        Evaluator::new(self, None).run()
    }
}

impl Motion {
    pub fn pose(&self, skeleton: &Skeleton, frame: i64) -> Result<Pose> {
        evaluate(skeleton, Some((self, frame)))
    }
}

/// Computes the world transform of every bone reachable from the root.
///
/// With a motion, `frame` is an absolute frame number and must lie inside
/// [`Motion::frame_range`]; nothing is clamped here.
pub fn evaluate(skeleton: &Skeleton, motion: Option<(&Motion, i64)>) -> Result<Pose> {
    let frame = match motion {
        None => None,
        Some((motion, number)) => {
            if motion.bone_count() != skeleton.bones().len() {
                return Err(Error::SkeletonMismatch {
                    motion: motion.bone_count(),
                    skeleton: skeleton.bones().len(),
                });
            }
            let frame = motion.frame(number).ok_or_else(|| {
                let range = motion.frame_range();
                Error::FrameOutOfRange {
                    frame: number,
                    first: range.start,
                    end: range.end,
                }
            })?;
            Some(frame)
        }
    };
    Ok(Evaluator::new(skeleton, frame).run())
}

struct Evaluator<'a> {
    skeleton: &'a Skeleton,
    frame: Option<&'a Frame>,
    bones: Vec<Option<BoneTransforms>>,
}

impl<'a> Evaluator<'a> {
    fn new(skeleton: &'a Skeleton, frame: Option<&'a Frame>) -> Self {
        Self {
            skeleton,
            frame,
            bones: vec![None; skeleton.bones().len()],
        }
    }

    fn run(mut self) -> Pose {
        let mut root = Matrix4::from_translation(self.skeleton.root_position());
        if let Some(frame) = self.frame {
            root = root * Matrix4::from_translation(frame.root_translation);
            root = root
                * rotations(
                    self.skeleton
                        .root_axis()
                        .iter()
                        .rev()
                        .map(|&axis| (axis, frame.root_rotation[axis.component()])),
                );
        }
        self.visit(self.skeleton.root_index(), root);
        Pose { bones: self.bones }
    }

    fn visit(&mut self, index: usize, mv: Matrix4<f32>) {
        let skeleton = self.skeleton;
        let bone = &skeleton.bones()[index];

        let local_trans = rotations(
            bone.axis_order
                .iter()
                .rev()
                .map(|&axis| (axis, bone.axis[axis.component()])),
        );
        // Pure rotation, so the transpose is the inverse.
        let local_trans_inv = local_trans.transpose();

        let motion = match self.frame {
            Some(frame) => {
                let channels = frame
                    .transformations
                    .get(index)
                    .copied()
                    .unwrap_or_default();
                rotations(
                    bone.dof_order
                        .iter()
                        .rev()
                        .filter_map(|&axis| channels.get(axis).map(|angle| (axis, angle))),
                )
            }
            None => Matrix4::identity(),
        };

        let motion_trans = mv * local_trans * motion * local_trans_inv;
        self.bones[index] = Some(BoneTransforms {
            local_trans,
            local_trans_inv,
            bone_dir_trans: direction_transform(bone.direction),
            still_trans: mv,
            motion_trans,
        });

        let child_mv = motion_trans * Matrix4::from_translation(bone.direction * bone.length);
        for child in skeleton.children(index) {
            self.visit(child, child_mv);
        }
    }
}

fn rotation(axis: Axis, angle: f32) -> Matrix4<f32> {
    match axis.component() {
        0 => Matrix4::from_angle_x(Rad(angle)),
        1 => Matrix4::from_angle_y(Rad(angle)),
        _ => Matrix4::from_angle_z(Rad(angle)),
    }
}

/// Right-multiplies one rotation per term, in iteration order.
fn rotations(terms: impl Iterator<Item = (Axis, f32)>) -> Matrix4<f32> {
    terms.fold(Matrix4::identity(), |m, (axis, angle)| m * rotation(axis, angle))
}

/// Rotation carrying the canonical up vector onto `direction`.
fn direction_transform(direction: Vector3<f32>) -> Matrix4<f32> {
    let up = Vector3::unit_y();
    if direction == up {
        return Matrix4::identity();
    }
    let axis = up.cross(direction);
    if axis.magnitude2() < 1e-12 {
        // Parallel to up: either straight down or a zero vector.
        return if direction.y < 0. {
            Matrix4::from_angle_z(Rad(PI))
        } else {
            Matrix4::identity()
        };
    }
    let angle = direction.dot(up).max(-1.).min(1.).acos();
    Matrix4::from_axis_angle(axis.normalize(), Rad(angle))
}

use crate::Axis;

use cgmath::Vector3;
use log::*;

use std::convert::TryFrom;
use std::ops::Range;

/// Rotation channels of one bone in one frame, in radians.
#[derive(Debug, Default, PartialEq, PartialOrd, Clone, Copy)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Transformation {
    pub rx: f32,
    pub ry: f32,
    pub rz: f32,
}

impl Transformation {
    pub fn get(&self, axis: Axis) -> Option<f32> {
        match axis {
            Axis::Rx => Some(self.rx),
            Axis::Ry => Some(self.ry),
            Axis::Rz => Some(self.rz),
            _ => None,
        }
    }

    /// Returns `false` for translational channels, which bones cannot hold.
    pub(crate) fn set(&mut self, axis: Axis, value: f32) -> bool {
        match axis {
            Axis::Rx => self.rx = value,
            Axis::Ry => self.ry = value,
            Axis::Rz => self.rz = value,
            _ => return false,
        }
        true
    }
}

#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame {
    pub root_translation: Vector3<f32>,
    pub root_rotation: Vector3<f32>,
    /// Indexed like [`crate::Skeleton::bones`].
    pub transformations: Vec<Transformation>,
}

impl Frame {
    pub fn new(bone_count: usize) -> Self {
        Self {
            root_translation: Vector3::new(0., 0., 0.),
            root_rotation: Vector3::new(0., 0., 0.),
            transformations: vec![Transformation::default(); bone_count],
        }
    }
}

/// Frames read from an AMC stream against one skeleton.
///
/// Frame `n` lives at `frames()[n - first_frame()]`; the buffer never has gaps.
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Motion {
    first_frame: usize,
    frames: Vec<Frame>,
    bone_count: usize,
}

impl Motion {
    pub(crate) fn new(bone_count: usize) -> Self {
        Self {
            first_frame: 0,
            frames: vec![],
            bone_count,
        }
    }

    pub fn first_frame(&self) -> usize {
        self.first_frame
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn bone_count(&self) -> usize {
        self.bone_count
    }

    pub fn frame_range(&self) -> Range<usize> {
        self.first_frame..self.first_frame + self.frames.len()
    }

    pub fn frame(&self, number: i64) -> Option<&Frame> {
        let number = usize::try_from(number).ok()?;
        self.frames.get(number.checked_sub(self.first_frame)?)
    }

    /// Nearest frame number inside [`Motion::frame_range`], for callers
    /// driving playback from free-running counters.
    pub fn clamp_frame(&self, number: i64) -> Option<usize> {
        let range = self.frame_range();
        if range.is_empty() {
            return None;
        }
        let number = usize::try_from(number).unwrap_or(0);
        Some(number.max(range.start).min(range.end - 1))
    }

    /// Makes room for frame `number` and returns its buffer index, or `None`
    /// when the buffer cannot grow that far.
    ///
    /// Frames below the current first frame are prepended, keeping every
    /// stored frame at its absolute number.
    pub(crate) fn frame_slot(&mut self, number: usize) -> Option<usize> {
        let bone_count = self.bone_count;
        if self.frames.is_empty() {
            self.first_frame = number;
            self.frames.push(Frame::new(bone_count));
        } else if number >= self.first_frame {
            let required = (number - self.first_frame).checked_add(1)?;
            if self.frames.len() < required {
                trace!("growing motion to {} frames", required);
                self.frames.try_reserve(required - self.frames.len()).ok()?;
                self.frames.resize_with(required, || Frame::new(bone_count));
            }
        } else {
            let missing = self.first_frame - number;
            trace!("prepending {} frames before frame {}", missing, self.first_frame);
            self.frames.try_reserve(missing).ok()?;
            self.frames
                .splice(0..0, (0..missing).map(|_| Frame::new(bone_count)));
            self.first_frame = number;
        }
        Some(number - self.first_frame)
    }

    pub(crate) fn frame_at_mut(&mut self, index: usize) -> Option<&mut Frame> {
        self.frames.get_mut(index)
    }
}

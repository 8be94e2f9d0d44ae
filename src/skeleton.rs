use crate::Axis;

use cgmath::Vector3;
use log::*;

use std::collections::{BTreeMap, HashMap};

/// Tree links are indices into [`Skeleton::bones`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Bone {
    pub id: i32,
    pub name: String,
    pub direction: Vector3<f32>,
    pub length: f32,
    /// Fixed local frame angles, in radians.
    pub axis: Vector3<f32>,
    pub axis_order: Vec<Axis>,
    /// Order in which a motion line lists this bone's channels.
    pub dof_order: Vec<Axis>,
    /// `(min, max)` per declared dof, unbounded unless a limits line says otherwise.
    pub dof_limits: BTreeMap<Axis, (f32, f32)>,
    pub parent: Option<usize>,
    pub first_child: Option<usize>,
    pub next_sibling: Option<usize>,
}

impl Bone {
    pub(crate) fn new(name: String, axis_order: Vec<Axis>, length: f32) -> Self {
        Self {
            id: 0,
            name,
            direction: Vector3::new(0., 0., 0.),
            length,
            axis: Vector3::new(0., 0., 0.),
            axis_order,
            dof_order: vec![],
            dof_limits: BTreeMap::new(),
            parent: None,
            first_child: None,
            next_sibling: None,
        }
    }

    pub fn dof_limit(&self, axis: Axis) -> Option<(f32, f32)> {
        self.dof_limits.get(&axis).copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Skeleton {
    pub(crate) bones: Vec<Bone>,
    pub(crate) names: HashMap<String, usize>,
    pub(crate) root: usize,
    pub(crate) root_axis: Vec<Axis>,
    pub(crate) root_order: Vec<Axis>,
    pub(crate) root_position: Vector3<f32>,
    pub(crate) root_orientation: Vector3<f32>,
    pub(crate) length_unit: f32,
    pub(crate) angle_unit: f32,
    pub(crate) mass_default: f32,
    pub(crate) length_default: f32,
}

impl Skeleton {
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    pub fn root_index(&self) -> usize {
        self.root
    }

    pub fn root(&self) -> &Bone {
        &self.bones[self.root]
    }

    /// Index of the first bone declared under `name`.
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    pub fn find_bone(&self, name: &str) -> Option<&Bone> {
        self.bone_index(name).map(|i| &self.bones[i])
    }

    /// Direct children of `index`, in declaration order.
    pub fn children(&self, index: usize) -> Children<'_> {
        Children {
            bones: &self.bones,
            next: self.bones.get(index).and_then(|b| b.first_child),
        }
    }

    /// Ancestors of `index`, nearest first.
    pub fn parent_chain(&self, index: usize) -> ParentChain<'_> {
        ParentChain {
            bones: &self.bones,
            next: self.bones.get(index).and_then(|b| b.parent),
        }
    }

    pub fn root_axis(&self) -> &[Axis] {
        &self.root_axis
    }

    /// Order of the root channels on a motion line.
    pub fn root_order(&self) -> &[Axis] {
        &self.root_order
    }

    pub fn root_position(&self) -> Vector3<f32> {
        self.root_position
    }

    pub fn root_orientation(&self) -> Vector3<f32> {
        self.root_orientation
    }

    /// Scales root translation only; bone lengths stay in file units.
    pub fn length_unit(&self) -> f32 {
        self.length_unit
    }

    pub fn angle_unit(&self) -> f32 {
        self.angle_unit
    }

    pub fn mass_default(&self) -> f32 {
        self.mass_default
    }

    pub fn length_default(&self) -> f32 {
        self.length_default
    }

    pub(crate) fn dump_hierarchy(&self) {
        if !log_enabled!(Level::Debug) {
            return;
        }
        debug!("ASF bone hierarchy:");
        let mut stack = vec![(self.root, 0)];
        while let Some((index, depth)) = stack.pop() {
            let bone = &self.bones[index];
            debug!("{:indent$}{}: {}", "", bone.id, bone.name, indent = depth * 2);
            let children: Vec<_> = self.children(index).collect();
            stack.extend(children.into_iter().rev().map(|c| (c, depth + 1)));
        }
    }
}

pub struct Children<'a> {
    bones: &'a [Bone],
    next: Option<usize>,
}

impl Iterator for Children<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.next?;
        self.next = self.bones.get(current).and_then(|b| b.next_sibling);
        Some(current)
    }
}

pub struct ParentChain<'a> {
    bones: &'a [Bone],
    next: Option<usize>,
}

impl Iterator for ParentChain<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.next?;
        self.next = self.bones.get(current).and_then(|b| b.parent);
        Some(current)
    }
}

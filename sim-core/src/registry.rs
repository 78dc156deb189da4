use std::{
    collections::HashMap,
    ops::{Index, IndexMut},
};

use glam::Mat4;

use crate::{
    error::{ConfigError, InvariantViolation},
    limb::LimbNode,
    transform::{LimbTransform, Orientation},
    types::LimbId,
};

/// Arena owning every limb of a grove.
///
/// Limbs are appended and never removed, so a [`LimbId`] stays valid for
/// the registry's lifetime and a parent always has a smaller id than its
/// children.
#[derive(Debug, Default)]
pub struct LimbRegistry {
    nodes: Vec<LimbNode>,
    anchors: HashMap<LimbId, Mat4>,
}

/// Rejects non-positive (or NaN) base dimensions.
pub fn validate_dimensions(radius: f32, length: f32) -> Result<(), ConfigError> {
    if radius.is_nan() || radius <= 0.0 {
        return Err(ConfigError::NonPositiveRadius(radius));
    }
    if length.is_nan() || length <= 0.0 {
        return Err(ConfigError::NonPositiveLength(length));
    }
    Ok(())
}

impl LimbRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a root limb (level 1) placed at `anchor` in world space.
    ///
    /// ### Errors
    /// A [`ConfigError`] if `radius` or `length` is not positive.
    pub fn add_root(
        &mut self,
        anchor: Mat4,
        orientation: Orientation,
        radius: f32,
        length: f32,
    ) -> Result<LimbId, ConfigError> {
        validate_dimensions(radius, length)?;
        let id = self.nodes.len();
        let transform = LimbTransform::new(orientation, radius, length);
        self.nodes.push(LimbNode::new_root(id, transform));
        self.anchors.insert(id, anchor);
        Ok(id)
    }

    /// Registers a child attached to `parent`'s attachment point and records
    /// it in the parent's children.
    ///
    /// Dimensions are expected to be validated up front (see
    /// [`validate_dimensions`]).
    ///
    /// ### Panics
    /// Panics if `parent` is not a registered limb.
    pub fn add_child(
        &mut self,
        parent: LimbId,
        orientation: Orientation,
        radius: f32,
        length: f32,
    ) -> LimbId {
        let id = self.nodes.len();
        let parent_level = self.nodes[parent].level();
        let transform = LimbTransform::new(orientation, radius, length);
        self.nodes
            .push(LimbNode::new_child(id, parent, parent_level, transform));
        self.nodes[parent].push_child(id);
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: LimbId) -> Option<&LimbNode> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: LimbId) -> Option<&mut LimbNode> {
        self.nodes.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LimbNode> {
        self.nodes.iter()
    }

    pub fn roots(&self) -> impl Iterator<Item = &LimbNode> {
        self.nodes.iter().filter(|n| n.parent().is_none())
    }

    /// World placement of a root limb; `None` for children.
    pub fn anchor(&self, id: LimbId) -> Option<Mat4> {
        self.anchors.get(&id).copied()
    }

    /// Checks one limb's own invariants plus its level against its parent.
    pub fn check_limb(&self, id: LimbId) -> Result<(), InvariantViolation> {
        let limb = &self.nodes[id];
        limb.check_invariants()?;
        if let Some(parent) = limb.parent() {
            let parent_level = self.nodes[parent].level();
            if limb.level() != parent_level + 1 {
                return Err(InvariantViolation::ChildLevel {
                    id,
                    level: limb.level(),
                    parent_level,
                });
            }
        }
        Ok(())
    }

    /// World-space origin frame of every limb, indexed by [`LimbId`].
    ///
    /// A root's frame is its anchor; a child's is its parent's world
    /// attachment frame. One forward pass suffices because parents always
    /// precede their children.
    pub fn world_frames(&self) -> Vec<Mat4> {
        let mut frames: Vec<Mat4> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let frame = match node.parent() {
                Some(p) => frames[p] * self.nodes[p].transform().attachment_matrix(),
                None => self.anchor(node.id()).unwrap_or(Mat4::IDENTITY),
            };
            frames.push(frame);
        }
        frames
    }
}

impl Index<LimbId> for LimbRegistry {
    type Output = LimbNode;

    fn index(&self, id: LimbId) -> &LimbNode {
        &self.nodes[id]
    }
}

impl IndexMut<LimbId> for LimbRegistry {
    fn index_mut(&mut self, id: LimbId) -> &mut LimbNode {
        &mut self.nodes[id]
    }
}

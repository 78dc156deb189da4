use std::rc::Rc;

use glam::Vec3;

use crate::{
    color::ColorTransition,
    error::InvariantViolation,
    leaf::{LeafImageSet, LeafPair},
    transform::{LimbTransform, Orientation},
    types::{LimbId, Rgb},
};

/// One segment of a grown tree.
///
/// Limbs live in a [`crate::registry::LimbRegistry`] arena and refer to each
/// other by [`LimbId`]. A limb is never removed; its `children` only grow.
#[derive(Debug)]
pub struct LimbNode {
    id: LimbId,
    parent: Option<LimbId>,
    children: Vec<LimbId>,
    level: u32,
    transform: LimbTransform,
    color: ColorTransition,
    age: u32,
    leaves: Option<LeafPair>,
}

impl LimbNode {
    pub(crate) fn new_root(id: LimbId, transform: LimbTransform) -> Self {
        Self::new(id, None, 1, transform)
    }

    pub(crate) fn new_child(
        id: LimbId,
        parent: LimbId,
        parent_level: u32,
        transform: LimbTransform,
    ) -> Self {
        Self::new(id, Some(parent), parent_level + 1, transform)
    }

    fn new(id: LimbId, parent: Option<LimbId>, level: u32, transform: LimbTransform) -> Self {
        Self {
            id,
            parent,
            children: Vec::with_capacity(2),
            level,
            transform,
            color: ColorTransition::default(),
            age: 0,
            leaves: None,
        }
    }

    pub(crate) fn push_child(&mut self, child: LimbId) {
        self.children.push(child);
    }

    pub fn id(&self) -> LimbId {
        self.id
    }

    pub fn parent(&self) -> Option<LimbId> {
        self.parent
    }

    pub fn children(&self) -> &[LimbId] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn incr_age(&mut self) {
        self.age += 1;
    }

    pub fn transform(&self) -> &LimbTransform {
        &self.transform
    }

    pub fn orientation(&self) -> Orientation {
        self.transform.orientation()
    }

    // ---- dimensions, all expressed through the scale ----

    pub fn radius(&self) -> f32 {
        self.transform.radius()
    }

    pub fn length(&self) -> f32 {
        self.transform.length()
    }

    pub fn scale(&self) -> Vec3 {
        self.transform.scale()
    }

    pub fn scale_length(&mut self, factor: f32) {
        self.transform.scale_length(factor);
    }

    pub fn scale_radius(&mut self, factor: f32) {
        self.transform.scale_radius(factor);
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.transform.set_radius(radius);
    }

    pub fn set_length(&mut self, length: f32) {
        self.transform.set_length(length);
    }

    // ---- color ----

    pub fn color(&self) -> Rgb {
        self.color.color()
    }

    pub fn color_steps(&self) -> u32 {
        self.color.steps_taken()
    }

    /// One step from green towards brown; no-op once the walk is complete.
    pub fn step_color(&mut self) {
        self.color.step();
    }

    /// Forces the color, ending any transition in progress.
    pub fn set_color(&mut self, color: Rgb) {
        self.color.force(color);
    }

    // ---- leaves ----

    pub fn has_leaves(&self) -> bool {
        self.leaves.is_some()
    }

    pub fn leaves(&self) -> Option<&LeafPair> {
        self.leaves.as_ref()
    }

    /// Shared frame index of the leaf screens, if any.
    pub fn leaf_index(&self) -> Option<usize> {
        self.leaves.as_ref().map(LeafPair::index)
    }

    /// Attaches a front/back pair of leaf screens on frame 0.
    ///
    /// Returns `false` and leaves the limb untouched if it already has leaves.
    pub fn add_leaves(&mut self, images: &Rc<LeafImageSet>) -> bool {
        if self.leaves.is_some() {
            return false;
        }
        self.leaves = Some(LeafPair::new(images));
        true
    }

    pub fn show_leaf(&mut self, index: isize) {
        if let Some(leaves) = &mut self.leaves {
            leaves.set_index(index);
        }
    }

    pub fn show_next_leaf(&mut self) {
        if let Some(leaves) = &mut self.leaves {
            leaves.advance();
        }
    }

    pub fn show_prev_leaf(&mut self) {
        if let Some(leaves) = &mut self.leaves {
            leaves.retreat();
        }
    }

    /// Checks the invariants a limb can verify on its own.
    ///
    /// Parent/child level consistency needs the registry and is checked by
    /// [`crate::registry::LimbRegistry::check_limb`].
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.level < 1 {
            return Err(InvariantViolation::Level {
                id: self.id,
                level: self.level,
            });
        }

        let scale = self.scale();
        if scale.x != scale.z {
            return Err(InvariantViolation::NonUniformRadius {
                id: self.id,
                x: scale.x,
                z: scale.z,
            });
        }

        if let Some(leaves) = &self.leaves {
            if !leaves.in_lockstep() {
                return Err(InvariantViolation::LeafPairDiverged {
                    id: self.id,
                    front: leaves.front().index(),
                    back: leaves.back().index(),
                });
            }
            if leaves.index() >= leaves.frame_count() {
                return Err(InvariantViolation::LeafIndex {
                    id: self.id,
                    index: leaves.index(),
                    count: leaves.frame_count(),
                });
            }
            if !self.children.is_empty() {
                return Err(InvariantViolation::LeavesWithChildren {
                    id: self.id,
                    children: self.children.len(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        color::{MATURE_COLOR, MAX_COLOR_STEP, TERMINAL_COLOR, YOUNG_COLOR},
        leaf::ImageHandle,
    };

    fn root() -> LimbNode {
        LimbNode::new_root(0, LimbTransform::new(Orientation::upright(), 0.05, 0.5))
    }

    fn images(n: usize) -> Rc<LeafImageSet> {
        let frames = (0..n).map(|i| ImageHandle(format!("leaf{i}"))).collect();
        Rc::new(LeafImageSet::new("test", frames).unwrap())
    }

    #[test]
    fn fresh_root_has_documented_defaults() {
        let limb = root();

        assert_eq!(limb.level(), 1);
        assert_eq!(limb.age(), 0);
        assert_eq!(limb.parent(), None);
        assert_eq!(limb.child_count(), 0);
        assert_eq!(limb.scale(), Vec3::ONE);
        assert_eq!(limb.color(), YOUNG_COLOR);
        assert!(!limb.has_leaves());
        assert_eq!(limb.leaf_index(), None);
        assert!(limb.check_invariants().is_ok());
    }

    #[test]
    fn child_level_is_parent_level_plus_one() {
        let t = LimbTransform::new(Orientation::upright(), 0.05, 0.5);
        let child = LimbNode::new_child(7, 3, 4, t);
        assert_eq!(child.level(), 5);
        assert_eq!(child.parent(), Some(3));
    }

    #[test]
    fn set_radius_round_trips() {
        let mut limb = root();
        for r in [0.01_f32, 0.05, 0.2, 1.5] {
            limb.set_radius(r);
            assert!((limb.radius() - r).abs() <= r * 1e-5);
        }
        assert!(limb.check_invariants().is_ok());
    }

    #[test]
    fn color_walk_saturates_at_brown() {
        let mut limb = root();
        for _ in 0..MAX_COLOR_STEP {
            limb.step_color();
        }
        assert!((limb.color() - MATURE_COLOR).abs().max_element() <= 1e-6);

        let brown = limb.color();
        limb.step_color();
        assert_eq!(limb.color(), brown);

        limb.set_color(TERMINAL_COLOR);
        assert_eq!(limb.color(), TERMINAL_COLOR);
    }

    #[test]
    fn leaves_are_added_once_and_move_together() {
        let imgs = images(3);
        let mut limb = root();

        // Leaf navigation without leaves is a no-op.
        limb.show_next_leaf();
        assert_eq!(limb.leaf_index(), None);

        assert!(limb.add_leaves(&imgs));
        assert!(!limb.add_leaves(&imgs));
        assert_eq!(limb.leaf_index(), Some(0));

        limb.show_next_leaf();
        limb.show_next_leaf();
        limb.show_next_leaf();
        assert_eq!(limb.leaf_index(), Some(2));
        limb.show_prev_leaf();
        assert_eq!(limb.leaf_index(), Some(1));
        limb.show_leaf(-1);
        assert_eq!(limb.leaf_index(), Some(0));

        let leaves = limb.leaves().unwrap();
        assert_eq!(leaves.front().index(), leaves.back().index());
        assert!(limb.check_invariants().is_ok());
    }

    #[test]
    fn leaves_with_children_is_reported() {
        let imgs = images(2);
        let mut limb = root();
        limb.add_leaves(&imgs);
        limb.push_child(1);

        assert_eq!(
            limb.check_invariants(),
            Err(InvariantViolation::LeavesWithChildren { id: 0, children: 1 })
        );
    }
}

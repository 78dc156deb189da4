//! Leaf screens: a shared, read-only image sequence and per-limb cursors
//! into it.
//!
//! A limb with leaves carries a [`LeafPair`]: a front and a back
//! [`LeafAnimator`] rotating about anchors on either side of the
//! attachment point, which together read as a mass of leaves. Both screens
//! always show the same frame.

use std::rc::Rc;

use crate::error::ConfigError;

/// Side length of a square leaf screen.
pub const SCREEN_SIZE: f32 = 2.0;

/// Rotation anchor (local z) of the front screen.
pub const FRONT_ANCHOR_Z: f32 = 0.5;

/// Rotation anchor (local z) of the back screen.
pub const BACK_ANCHOR_Z: f32 = -0.5;

/// Opaque reference to one leaf image, resolved by the renderer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub String);

/// Ordered, non-empty sequence of leaf images shared by every limb of a
/// grove.
#[derive(Debug)]
pub struct LeafImageSet {
    name: String,
    frames: Vec<ImageHandle>,
}

impl LeafImageSet {
    /// Builds an image set.
    ///
    /// ### Errors
    /// [`ConfigError::EmptyLeafImages`] if `frames` is empty.
    pub fn new(name: impl Into<String>, frames: Vec<ImageHandle>) -> Result<Self, ConfigError> {
        let name = name.into();
        if frames.is_empty() {
            return Err(ConfigError::EmptyLeafImages { variant: name });
        }
        Ok(Self { name, frames })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Never true for a constructed set.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn frame(&self, index: usize) -> Option<&ImageHandle> {
        self.frames.get(index)
    }
}

/// Cursor into a shared [`LeafImageSet`]. The index is clamped to the
/// sequence; it never wraps and never errors.
#[derive(Clone, Debug)]
pub struct LeafAnimator {
    images: Rc<LeafImageSet>,
    index: usize,
    anchor_z: f32,
}

impl LeafAnimator {
    pub fn new(images: Rc<LeafImageSet>, anchor_z: f32) -> Self {
        Self {
            images,
            index: 0,
            anchor_z,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn anchor_z(&self) -> f32 {
        self.anchor_z
    }

    pub fn frame_count(&self) -> usize {
        self.images.len()
    }

    pub fn current(&self) -> &ImageHandle {
        &self.images.frames[self.index]
    }

    /// Shows the next frame, stopping at the last one.
    pub fn advance(&mut self) {
        if self.index < self.images.last_index() {
            self.index += 1;
        }
    }

    /// Shows the previous frame, stopping at the first one.
    pub fn retreat(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    /// Shows frame `index`, clamped into the sequence.
    pub fn set_index(&mut self, index: isize) {
        self.index = index.clamp(0, self.images.last_index() as isize) as usize;
    }
}

/// Front and back leaf screens of one limb, always on the same frame.
#[derive(Clone, Debug)]
pub struct LeafPair {
    front: LeafAnimator,
    back: LeafAnimator,
}

impl LeafPair {
    /// Both screens start on frame 0.
    pub fn new(images: &Rc<LeafImageSet>) -> Self {
        Self {
            front: LeafAnimator::new(Rc::clone(images), FRONT_ANCHOR_Z),
            back: LeafAnimator::new(Rc::clone(images), BACK_ANCHOR_Z),
        }
    }

    pub fn front(&self) -> &LeafAnimator {
        &self.front
    }

    pub fn back(&self) -> &LeafAnimator {
        &self.back
    }

    /// Shared frame index of both screens.
    pub fn index(&self) -> usize {
        self.front.index()
    }

    pub fn frame_count(&self) -> usize {
        self.front.frame_count()
    }

    pub fn in_lockstep(&self) -> bool {
        self.front.index() == self.back.index()
    }

    pub fn advance(&mut self) {
        self.front.advance();
        self.back.advance();
    }

    pub fn retreat(&mut self) {
        self.front.retreat();
        self.back.retreat();
    }

    pub fn set_index(&mut self, index: isize) {
        self.front.set_index(index);
        self.back.set_index(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn images(n: usize) -> Rc<LeafImageSet> {
        let frames = (0..n)
            .map(|i| ImageHandle(format!("images/leaf{i}.gif")))
            .collect();
        Rc::new(LeafImageSet::new("oak", frames).unwrap())
    }

    #[test]
    fn empty_image_set_is_rejected() {
        let err = LeafImageSet::new("bare", Vec::new()).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyLeafImages { ref variant } if variant == "bare"));
    }

    #[test]
    fn advance_clamps_at_last_frame() {
        let mut a = LeafAnimator::new(images(3), FRONT_ANCHOR_Z);
        assert_eq!(a.index(), 0);

        for _ in 0..10 {
            a.advance();
        }
        assert_eq!(a.index(), 2);
        assert_eq!(a.current(), &ImageHandle("images/leaf2.gif".into()));
    }

    #[test]
    fn set_index_clamps_both_ends() {
        let mut a = LeafAnimator::new(images(6), BACK_ANCHOR_Z);

        a.set_index(-4);
        assert_eq!(a.index(), 0);
        a.set_index(3);
        assert_eq!(a.index(), 3);
        a.set_index(99);
        assert_eq!(a.index(), 5);

        a.retreat();
        assert_eq!(a.index(), 4);
        a.set_index(0);
        a.retreat();
        assert_eq!(a.index(), 0);
    }

    #[test]
    fn single_frame_set_never_moves() {
        let mut a = LeafAnimator::new(images(1), FRONT_ANCHOR_Z);
        a.advance();
        a.set_index(7);
        assert_eq!(a.index(), 0);
    }

    #[test]
    fn pair_screens_stay_in_lockstep() {
        let imgs = images(4);
        let mut pair = LeafPair::new(&imgs);
        assert!(pair.in_lockstep());
        assert_eq!(pair.front().anchor_z(), FRONT_ANCHOR_Z);
        assert_eq!(pair.back().anchor_z(), BACK_ANCHOR_Z);

        pair.advance();
        assert!(pair.in_lockstep());
        pair.set_index(10);
        assert!(pair.in_lockstep());
        assert_eq!(pair.index(), 3);
        pair.retreat();
        assert!(pair.in_lockstep());
        assert_eq!(pair.back().index(), 2);

        // Both cursors share one image set.
        assert_eq!(Rc::strong_count(&imgs), 3);
    }
}

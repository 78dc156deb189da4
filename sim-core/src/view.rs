//! Read-only snapshot of a registry for renderers.

use glam::{Mat4, Vec3};

use crate::{
    leaf::SCREEN_SIZE,
    registry::LimbRegistry,
    types::{LimbId, Rgb},
};

/// Leaf state of one limb.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LeafView {
    pub front_frame: usize,
    pub back_frame: usize,
    /// Local z of the front screen's rotation anchor.
    pub front_anchor_z: f32,
    /// Local z of the back screen's rotation anchor.
    pub back_anchor_z: f32,
    pub screen_size: f32,
}

/// Everything a renderer needs to draw one limb.
#[derive(Clone, Debug, PartialEq)]
pub struct LimbView {
    pub id: LimbId,
    pub parent: Option<LimbId>,
    pub level: u32,
    pub age: u32,
    pub radius: f32,
    pub length: f32,
    pub color: Rgb,
    /// World position of the limb's base.
    pub base: Vec3,
    /// World position of the limb's far end, at its current length.
    pub tip: Vec3,
    /// World transform of the base-dimension cylinder primitive (centered
    /// on its own origin).
    pub primitive: Mat4,
    /// World frame of the attachment point; leaf screens hang here.
    pub attachment: Mat4,
    pub leaves: Option<LeafView>,
}

/// Builds a [`LimbView`] for every limb, in [`LimbId`] order.
pub fn snapshot(registry: &LimbRegistry) -> Vec<LimbView> {
    let frames = registry.world_frames();
    registry
        .iter()
        .zip(frames)
        .map(|(limb, frame)| {
            let t = limb.transform();
            let oriented = frame * Mat4::from_quat(t.orientation().rotation());
            LimbView {
                id: limb.id(),
                parent: limb.parent(),
                level: limb.level(),
                age: limb.age(),
                radius: limb.radius(),
                length: limb.length(),
                color: limb.color(),
                base: frame.transform_point3(Vec3::ZERO),
                tip: oriented.transform_point3(Vec3::new(0.0, limb.length(), 0.0)),
                primitive: frame * t.primitive_matrix(),
                attachment: frame * t.attachment_matrix(),
                leaves: limb.leaves().map(|pair| LeafView {
                    front_frame: pair.front().index(),
                    back_frame: pair.back().index(),
                    front_anchor_z: pair.front().anchor_z(),
                    back_anchor_z: pair.back().anchor_z(),
                    screen_size: SCREEN_SIZE,
                }),
            }
        })
        .collect()
}

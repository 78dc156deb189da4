//! Local geometry of a single limb.
//!
//! A limb is a cylinder whose base sits at its local origin and which grows
//! along local +y. Its local frame is composed as:
//!
//! ```text
//! orientation ──► scale ──► lift(length / 2) ──► cylinder
//!      │
//!      └──► attachment offset ──► child limbs, leaf screens
//! ```
//!
//! The attachment point hangs off the orientation, not off the scaled
//! cylinder, so a limb's scale never compounds into its children. It is
//! therefore recomputed from scratch every time the length scale changes.

use glam::{Mat4, Quat, Vec3};

use crate::types::Axis;

/// Fraction of a limb's length by which children overlap it.
pub const OVERLAP: f32 = 0.1;

/// Rotation of a limb relative to its parent's attachment frame.
///
/// Fixed at creation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orientation {
    pub axis: Axis,
    /// Rotation angle in degrees.
    pub angle_deg: f32,
}

impl Orientation {
    pub fn new(axis: Axis, angle_deg: f32) -> Self {
        Self { axis, angle_deg }
    }

    /// No rotation; used for roots.
    pub fn upright() -> Self {
        Self::new(Axis::Z, 0.0)
    }

    pub fn rotation(&self) -> Quat {
        if self.angle_deg == 0.0 {
            Quat::IDENTITY
        } else {
            Quat::from_axis_angle(self.axis.unit(), self.angle_deg.to_radians())
        }
    }
}

/// Transform state of one limb: fixed orientation and base dimensions plus
/// a mutable scale.
///
/// Radius and length are never stored directly. Getters return
/// `base * scale`, so the original dimensions always stay recoverable and
/// scale operations compose multiplicatively. `scale.x` and `scale.z` both
/// carry the radius scale and are always changed together.
#[derive(Clone, Debug)]
pub struct LimbTransform {
    orientation: Orientation,
    base_radius: f32,
    base_length: f32,
    scale: Vec3,
    attach_offset: f32,
}

impl LimbTransform {
    /// Creates an unscaled transform.
    ///
    /// ### Parameters
    /// - `orientation` - Rotation relative to the parent's attachment frame.
    /// - `base_radius` - Original cylinder radius; must be positive.
    /// - `base_length` - Original cylinder length; must be positive.
    ///
    /// Positivity is checked by [`crate::registry::LimbRegistry`] before a
    /// limb is created.
    pub fn new(orientation: Orientation, base_radius: f32, base_length: f32) -> Self {
        let mut t = Self {
            orientation,
            base_radius,
            base_length,
            scale: Vec3::ONE,
            attach_offset: 0.0,
        };
        t.update_attachment();
        t
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn base_radius(&self) -> f32 {
        self.base_radius
    }

    pub fn base_length(&self) -> f32 {
        self.base_length
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Current radius, `base_radius * scale.x`.
    pub fn radius(&self) -> f32 {
        self.base_radius * self.scale.x
    }

    /// Current length, `base_length * scale.y`.
    pub fn length(&self) -> f32 {
        self.base_length * self.scale.y
    }

    /// Multiplies the length scale by `factor` and moves the attachment point.
    pub fn scale_length(&mut self, factor: f32) {
        self.scale.y *= factor;
        self.update_attachment();
    }

    /// Multiplies the radius scale (x and z) by `factor`.
    pub fn scale_radius(&mut self, factor: f32) {
        self.scale.x *= factor;
        self.scale.z *= factor;
        self.update_attachment();
    }

    /// Changes the scale so that [`LimbTransform::radius`] returns `radius`.
    pub fn set_radius(&mut self, radius: f32) {
        self.scale_radius(radius / self.radius());
    }

    /// Changes the scale so that [`LimbTransform::length`] returns `length`.
    pub fn set_length(&mut self, length: f32) {
        self.scale_length(length / self.length());
    }

    /// Distance along local +y from the limb origin to its attachment point.
    pub fn attachment_offset(&self) -> f32 {
        self.attach_offset
    }

    // Recomputed from the base length, never accumulated from deltas.
    fn update_attachment(&mut self) {
        self.attach_offset = self.base_length * self.scale.y * (1.0 - OVERLAP);
    }

    /// Transform placing the cylinder primitive in the limb's local frame.
    ///
    /// The primitive is a cylinder of the base dimensions centered on its
    /// own origin; it is lifted by half its base length so its base sits at
    /// the limb origin, then scaled, then oriented.
    pub fn primitive_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.orientation.rotation())
            * Mat4::from_scale(self.scale)
            * Mat4::from_translation(Vec3::new(0.0, self.base_length / 2.0, 0.0))
    }

    /// Frame where child limbs and leaf screens are anchored, in the limb's
    /// local frame.
    pub fn attachment_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.orientation.rotation())
            * Mat4::from_translation(Vec3::new(0.0, self.attach_offset, 0.0))
    }
}

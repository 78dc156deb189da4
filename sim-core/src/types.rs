use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Identifier for a limb in a [`crate::registry::LimbRegistry`].
///
/// This is an index into the registry's arena, and is only meaningful within
/// the lifetime of a given registry instance.
pub type LimbId = usize;

/// RGB diffuse color, each channel in `0.0..=1.0`.
pub type Rgb = Vec3;

/// Principal axis a limb is rotated around, relative to its parent's
/// attachment frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Unit vector along this axis.
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

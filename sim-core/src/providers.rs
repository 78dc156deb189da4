//! Seams to the outside world: where leaf images and root placements come
//! from.

use glam::{Mat4, Vec3};
use rand::{Rng, RngCore};

use crate::{config::VariantConfig, leaf::ImageHandle};

/// Supplies the ordered leaf image handles of a grove.
pub trait LeafImageProvider {
    fn leaf_images(&self, variant: &VariantConfig) -> Vec<ImageHandle>;
}

/// Uses the handles listed in the configuration as-is.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConfiguredImages;

impl LeafImageProvider for ConfiguredImages {
    fn leaf_images(&self, variant: &VariantConfig) -> Vec<ImageHandle> {
        variant
            .leaf_images
            .iter()
            .map(|s| ImageHandle(s.clone()))
            .collect()
    }
}

/// Supplies the world anchor of each root limb.
pub trait PlacementProvider {
    /// ### Parameters
    /// - `variant` - Grove the root belongs to.
    /// - `index` - Index of the root within its grove.
    /// - `rng` - The simulation's shared generator.
    fn place_root(&mut self, variant: &VariantConfig, index: usize, rng: &mut dyn RngCore) -> Mat4;
}

/// Scatters roots on integer x/z coordinates in `[-half_extent, half_extent)`
/// at the grove's base height.
#[derive(Clone, Copy, Debug)]
pub struct ScatterPlacement {
    pub half_extent: i32,
}

impl Default for ScatterPlacement {
    fn default() -> Self {
        Self { half_extent: 30 }
    }
}

impl PlacementProvider for ScatterPlacement {
    fn place_root(&mut self, variant: &VariantConfig, _index: usize, rng: &mut dyn RngCore) -> Mat4 {
        let x = rng.random_range(-self.half_extent..self.half_extent);
        let z = rng.random_range(-self.half_extent..self.half_extent);
        Mat4::from_translation(Vec3::new(x as f32, variant.base_height, z as f32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn configured_images_preserve_order() {
        let v = VariantConfig::new("oak", 1, vec!["a".into(), "b".into(), "c".into()]);
        let frames = ConfiguredImages.leaf_images(&v);
        assert_eq!(
            frames,
            vec![
                ImageHandle("a".into()),
                ImageHandle("b".into()),
                ImageHandle("c".into())
            ]
        );
    }

    #[test]
    fn scatter_stays_on_grid_at_base_height() {
        let v = VariantConfig::new("cactus", 1, vec!["c".into()]).with_base_height(-2.0);
        let mut placement = ScatterPlacement::default();
        let mut rng = StdRng::seed_from_u64(3);

        for i in 0..200 {
            let p = placement
                .place_root(&v, i, &mut rng)
                .transform_point3(Vec3::ZERO);
            assert_eq!(p.y, -2.0);
            assert!((-30.0..30.0).contains(&p.x));
            assert!((-30.0..30.0).contains(&p.z));
            assert_eq!(p.x, p.x.round());
            assert_eq!(p.z, p.z.round());
        }
    }
}

use std::rc::Rc;

use glam::Mat4;
use rand::{Rng, RngCore};
use tracing::debug;

use crate::{
    config::{GrowthConfig, VariantConfig},
    error::{ConfigError, InvariantViolation},
    leaf::LeafImageSet,
    providers::{LeafImageProvider, PlacementProvider},
    registry::LimbRegistry,
    rules::{self, TickReport},
    transform::Orientation,
    types::LimbId,
    view::{self, LimbView},
};

/// A population of trees sharing one leaf image sequence and one registry.
///
/// The registry cap in [`GrowthConfig`] applies to the whole grove, not to
/// each tree.
#[derive(Debug)]
pub struct Grove {
    name: String,
    registry: LimbRegistry,
    images: Rc<LeafImageSet>,
    cap_reached: bool,
}

impl Grove {
    /// An empty grove.
    pub fn new(name: impl Into<String>, images: Rc<LeafImageSet>) -> Self {
        Self {
            name: name.into(),
            registry: LimbRegistry::new(),
            images,
            cap_reached: false,
        }
    }

    /// Builds a grove from its configuration and plants `variant.population`
    /// upright roots where `placement` puts them.
    ///
    /// ### Errors
    /// A [`ConfigError`] for an empty leaf image sequence or bad root
    /// dimensions.
    pub fn plant(
        variant: &VariantConfig,
        images: &dyn LeafImageProvider,
        placement: &mut dyn PlacementProvider,
        rng: &mut dyn RngCore,
    ) -> Result<Self, ConfigError> {
        let frames = images.leaf_images(variant);
        let images = Rc::new(LeafImageSet::new(variant.name.clone(), frames)?);
        let mut grove = Self::new(variant.name.clone(), images);

        for i in 0..variant.population {
            let anchor = placement.place_root(variant, i, rng);
            grove.add_root(anchor, variant.root_radius, variant.root_length)?;
        }
        Ok(grove)
    }

    /// Adds an upright root at `anchor`.
    pub fn add_root(&mut self, anchor: Mat4, radius: f32, length: f32) -> Result<LimbId, ConfigError> {
        self.registry
            .add_root(anchor, Orientation::upright(), radius, length)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &LimbRegistry {
        &self.registry
    }

    #[cfg(test)]
    pub(crate) fn registry_mut(&mut self) -> &mut LimbRegistry {
        &mut self.registry
    }

    pub fn images(&self) -> &Rc<LeafImageSet> {
        &self.images
    }

    /// Whether branching has been suppressed by the registry cap at least
    /// once.
    pub fn cap_reached(&self) -> bool {
        self.cap_reached
    }

    /// One pass of the growth rules over every limb of the grove.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        cfg: &GrowthConfig,
        rng: &mut R,
    ) -> Result<TickReport, InvariantViolation> {
        let report = rules::tick(&mut self.registry, &self.images, cfg, rng)?;

        if report.cap_suppressed && !self.cap_reached {
            self.cap_reached = true;
            debug!(
                grove = %self.name,
                limbs = self.registry.len(),
                "registry cap reached, branching suppressed"
            );
        }
        debug!(
            grove = %self.name,
            visited = report.visited,
            spawned = report.spawned.len(),
            leaves = report.leaves_started.len(),
            "grove ticked"
        );
        Ok(report)
    }

    pub fn snapshot(&self) -> Vec<LimbView> {
        view::snapshot(&self.registry)
    }
}

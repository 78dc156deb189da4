//! The growth rules, applied to every limb of a registry once per tick.
//!
//! For each limb, in registry order, [`apply_rules`] evaluates:
//! 1. elongate, 2. thicken, 3. color step, 4. branch, 5. leaf initiation,
//! 6. leaf growth, 7. terminal transform.
//!
//! Rules are independent; several can fire for the same limb in one tick.
//! After the rules the limb's age is incremented.
//!
//! [`tick`] walks the registry by index against its *live* length, so
//! limbs spawned earlier in a pass are themselves visited later in the same
//! pass. Random draws happen in a fixed order (axis, spawn, angle, twice
//! for branching; then the leaf draw), so a seeded generator reproduces a
//! run exactly.

use std::rc::Rc;

use rand::Rng;
use tracing::trace;

use crate::{
    color::TERMINAL_COLOR,
    config::GrowthConfig,
    error::InvariantViolation,
    leaf::LeafImageSet,
    registry::LimbRegistry,
    transform::Orientation,
    types::{Axis, LimbId},
};

/// What happened during one pass over a registry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Limbs visited, including those spawned during the pass.
    pub visited: usize,
    /// Limbs spawned, in creation order.
    pub spawned: Vec<LimbId>,
    /// Limbs that started growing leaves.
    pub leaves_started: Vec<LimbId>,
    /// A limb was due to branch but the registry was full.
    pub cap_suppressed: bool,
}

/// Runs one full pass of the rules over `registry`.
///
/// ### Parameters
/// - `registry` - Limbs to grow; new limbs are appended and visited.
/// - `images` - Leaf images shared by every limb of the registry.
/// - `cfg` - Rule constants.
/// - `rng` - The simulation's shared generator.
///
/// ### Errors
/// An [`InvariantViolation`] if a limb is found in an inconsistent state
/// after its rules ran. The pass stops at that limb.
pub fn tick<R: Rng + ?Sized>(
    registry: &mut LimbRegistry,
    images: &Rc<LeafImageSet>,
    cfg: &GrowthConfig,
    rng: &mut R,
) -> Result<TickReport, InvariantViolation> {
    let mut report = TickReport::default();

    let mut id = 0;
    while id < registry.len() {
        apply_rules(registry, id, images, cfg, rng, &mut report);
        registry[id].incr_age();
        registry.check_limb(id)?;
        id += 1;
    }

    report.visited = id;
    Ok(report)
}

/// Applies rules 1–7 to limb `id`. Does not touch its age.
pub fn apply_rules<R: Rng + ?Sized>(
    registry: &mut LimbRegistry,
    id: LimbId,
    images: &Rc<LeafImageSet>,
    cfg: &GrowthConfig,
    rng: &mut R,
    report: &mut TickReport,
) {
    let limb = &mut registry[id];
    let age = limb.age();
    let level = limb.level();

    // Get longer.
    if limb.length() < cfg.max_length && !limb.has_leaves() {
        limb.scale_length(cfg.elongate_factor);
    }

    // Get thicker; deeper limbs stop earlier.
    let max_radius = cfg.thicken_slope * level as f32 + cfg.thicken_intercept;
    if limb.radius() <= max_radius && !limb.has_leaves() {
        limb.scale_radius(cfg.thicken_factor);
    }

    // Get browner.
    limb.step_color();

    // Branch, once, at exactly `branch_age`.
    if age == cfg.branch_age && !limb.has_leaves() && level < cfg.max_level {
        if registry.len() < cfg.registry_cap {
            branch(registry, id, cfg, rng, report);
        } else {
            report.cap_suppressed = true;
        }
    }

    // Start leaves on bare tips.
    let limb = &registry[id];
    if limb.level() > cfg.leaf_min_level
        && rng.random_bool(cfg.leaf_probability)
        && limb.child_count() == 0
        && !limb.has_leaves()
    {
        registry[id].add_leaves(images);
        report.leaves_started.push(id);
        trace!(limb = id, level, "leaves started");
    }

    let limb = &mut registry[id];

    // Grow the leaves.
    if age % cfg.leaf_period == 0 {
        limb.show_next_leaf();
    }

    // Old roots turn into a thick blue bucket.
    if age == cfg.terminal_age && level == cfg.terminal_level {
        limb.scale_radius(cfg.terminal_radius_factor);
        limb.set_color(TERMINAL_COLOR);
    }
}

/// Two independent spawn attempts: the first at a positive angle, the second
/// at a negative one, each around a freshly drawn axis.
fn branch<R: Rng + ?Sized>(
    registry: &mut LimbRegistry,
    parent: LimbId,
    cfg: &GrowthConfig,
    rng: &mut R,
    report: &mut TickReport,
) {
    for (lo, hi) in [cfg.positive_angle, cfg.negative_angle] {
        let axis = if rng.random_bool(0.5) { Axis::Z } else { Axis::X };
        if rng.random_bool(cfg.spawn_probability) {
            let angle = rng.random_range(lo..hi);
            let child = registry.add_child(
                parent,
                Orientation::new(axis, angle),
                cfg.child_radius,
                cfg.child_length,
            );
            trace!(parent, child, ?axis, angle, "limb spawned");
            report.spawned.push(child);
        }
    }
}

//! The simulation: every grove, the shared generator and the tick timer.
//!
//! The typical loop is:
//! 1. Build a [`Simulation`] from a [`SimConfig`]; all validation happens
//!    here and nothing runs if it fails.
//! 2. Feed elapsed time to [`Simulation::advance`] (viewer) or call
//!    [`Simulation::run_blocking`] (headless). Each due tick runs one full
//!    pass over every grove, in configuration order.
//! 3. Poll [`Simulation::groves`] / [`crate::grove::Grove::snapshot`] to draw.

use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, error, info};

use crate::{
    config::{GrowthConfig, SimConfig},
    error::{ConfigError, InvariantViolation, SimError},
    grove::Grove,
    providers::{ConfiguredImages, LeafImageProvider, PlacementProvider, ScatterPlacement},
    rules::TickReport,
    scheduler::TickScheduler,
};

pub struct Simulation {
    groves: Vec<Grove>,
    growth: GrowthConfig,
    rng: StdRng,
    seed: u64,
    scheduler: TickScheduler,
    fault: Option<InvariantViolation>,
}

impl Simulation {
    /// Builds a simulation with the default providers: configured leaf
    /// images and scattered root placement.
    pub fn from_config(cfg: &SimConfig) -> Result<Self, ConfigError> {
        Self::new(
            cfg,
            GrowthConfig::default(),
            &ConfiguredImages,
            &mut ScatterPlacement::default(),
        )
    }

    /// Validates `cfg`, seeds the generator and plants every grove.
    ///
    /// ### Parameters
    /// - `cfg` - File-facing configuration.
    /// - `growth` - Rule constants.
    /// - `images` - Source of each grove's leaf images.
    /// - `placement` - Source of each root's world anchor; draws from the
    ///   simulation's generator.
    ///
    /// ### Errors
    /// The first [`ConfigError`] found; the simulation does not start.
    pub fn new(
        cfg: &SimConfig,
        growth: GrowthConfig,
        images: &dyn LeafImageProvider,
        placement: &mut dyn PlacementProvider,
    ) -> Result<Self, ConfigError> {
        cfg.validate()?;
        growth.validate()?;
        let scheduler = TickScheduler::new(Duration::from_millis(cfg.tick_interval_ms))?;

        let seed = cfg.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = StdRng::seed_from_u64(seed);

        let groves = cfg
            .variants
            .iter()
            .map(|v| Grove::plant(v, images, placement, &mut rng))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            seed,
            groves = groves.len(),
            roots = groves.iter().map(|g| g.registry().len()).sum::<usize>(),
            interval_ms = cfg.tick_interval_ms,
            "simulation planted"
        );

        Ok(Self {
            groves,
            growth,
            rng,
            seed,
            scheduler,
            fault: None,
        })
    }

    pub fn groves(&self) -> &[Grove] {
        &self.groves
    }

    pub fn growth_config(&self) -> &GrowthConfig {
        &self.growth
    }

    /// Seed of the shared generator; replaying it reproduces the run.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    /// Ticks whose pass ran to completion. A faulted pass is not counted.
    pub fn ticks(&self) -> u64 {
        self.scheduler.completed()
    }

    pub fn limb_count(&self) -> usize {
        self.groves.iter().map(|g| g.registry().len()).sum()
    }

    /// The fault that halted the simulation, if any.
    pub fn fault(&self) -> Option<&InvariantViolation> {
        self.fault.as_ref()
    }

    /// Runs one tick now, regardless of the timer.
    pub fn step(&mut self) -> Result<Vec<TickReport>, SimError> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone().into());
        }
        self.pass()
    }

    /// Feeds elapsed time to the timer and runs every tick that became due.
    ///
    /// ### Returns
    /// Reports of the last tick run, or an empty vector if none was due.
    ///
    /// ### Errors
    /// The fault of the first failing pass; remaining due ticks are dropped.
    pub fn advance(&mut self, elapsed: Duration) -> Result<Vec<TickReport>, SimError> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone().into());
        }
        let due = self.scheduler.advance(elapsed);
        let mut last = Vec::new();
        for _ in 0..due {
            last = self.pass()?;
        }
        Ok(last)
    }

    /// Runs `ticks` ticks on the wall clock, one per interval, calling
    /// `on_tick` after each.
    pub fn run_blocking<F>(&mut self, ticks: u64, mut on_tick: F) -> Result<(), SimError>
    where
        F: FnMut(&Simulation, &[TickReport]),
    {
        let interval = self.scheduler.interval();
        let mut deadline = Instant::now() + interval;
        for _ in 0..ticks {
            let now = Instant::now();
            if deadline > now {
                std::thread::sleep(deadline - now);
            }
            let reports = self.step()?;
            on_tick(self, &reports);
            deadline += interval;
        }
        Ok(())
    }

    /// One full pass over every grove, counted only if every grove finishes.
    fn pass(&mut self) -> Result<Vec<TickReport>, SimError> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone().into());
        }

        let mut reports = Vec::with_capacity(self.groves.len());
        for grove in &mut self.groves {
            match grove.tick(&self.growth, &mut self.rng) {
                Ok(report) => reports.push(report),
                Err(fault) => {
                    error!(grove = grove.name(), %fault, "invariant violated, halting");
                    self.fault = Some(fault.clone());
                    return Err(fault.into());
                }
            }
        }
        self.scheduler.record_tick();
        debug!(tick = self.ticks(), limbs = self.limb_count(), "tick complete");
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VariantConfig;
    use std::rc::Rc;

    fn small_config(seed: u64) -> SimConfig {
        SimConfig {
            seed: Some(seed),
            tick_interval_ms: 1000,
            variants: vec![
                VariantConfig::new("oak", 3, vec!["l0".into(), "l1".into(), "l2".into()]),
                VariantConfig::new("bush", 2, vec!["b".into()]).with_base_height(-2.0),
            ],
        }
    }

    #[test]
    fn bad_config_never_starts() {
        let mut cfg = small_config(1);
        cfg.variants[1].leaf_images.clear();
        assert!(matches!(
            Simulation::from_config(&cfg),
            Err(ConfigError::EmptyLeafImages { .. })
        ));

        let mut cfg = small_config(1);
        cfg.tick_interval_ms = 0;
        assert!(matches!(
            Simulation::from_config(&cfg),
            Err(ConfigError::NonPositiveInterval)
        ));

        let mut cfg = small_config(1);
        cfg.variants[0].root_radius = -0.1;
        assert!(matches!(
            Simulation::from_config(&cfg),
            Err(ConfigError::NonPositiveRadius(_))
        ));
    }

    #[test]
    fn bad_growth_constants_never_start() {
        let cfg = small_config(1);
        let cases = [
            GrowthConfig {
                leaf_period: 0,
                ..GrowthConfig::default()
            },
            GrowthConfig {
                spawn_probability: 1.5,
                ..GrowthConfig::default()
            },
            GrowthConfig {
                leaf_probability: -0.5,
                ..GrowthConfig::default()
            },
            GrowthConfig {
                positive_angle: (30.0, 10.0),
                ..GrowthConfig::default()
            },
            GrowthConfig {
                negative_angle: (-10.0, -10.0),
                ..GrowthConfig::default()
            },
        ];

        for growth in cases {
            let result = Simulation::new(
                &cfg,
                growth,
                &ConfiguredImages,
                &mut ScatterPlacement::default(),
            );
            assert!(result.is_err(), "accepted {growth:?}");
        }
    }

    #[test]
    fn invariant_violation_halts_for_good() {
        let mut sim = Simulation::from_config(&small_config(9)).unwrap();

        // Root 0 of the first grove gets leaves and a child at once.
        let images = Rc::clone(sim.groves[0].images());
        let reg = sim.groves[0].registry_mut();
        assert!(reg[0].add_leaves(&images));
        reg[0].push_child(1);

        let err = sim.step().unwrap_err();
        assert!(matches!(
            err,
            SimError::Invariant(InvariantViolation::LeavesWithChildren { id: 0, children: 1 })
        ));
        assert!(matches!(
            sim.fault(),
            Some(InvariantViolation::LeavesWithChildren { id: 0, .. })
        ));

        // The pass stopped at the faulty limb: later limbs and groves never ran.
        assert_eq!(sim.groves()[0].registry()[0].age(), 1);
        assert_eq!(sim.groves()[0].registry()[1].age(), 0);
        for root in sim.groves()[1].registry().roots() {
            assert_eq!(root.age(), 0);
        }
        assert_eq!(sim.ticks(), 0);

        assert!(matches!(sim.step(), Err(SimError::Invariant(_))));
        assert!(matches!(
            sim.advance(Duration::from_millis(5000)),
            Err(SimError::Invariant(_))
        ));
        assert_eq!(sim.ticks(), 0);
        assert_eq!(sim.groves()[0].registry()[1].age(), 0);
    }

    #[test]
    fn plants_every_grove() {
        let sim = Simulation::from_config(&small_config(5)).unwrap();
        assert_eq!(sim.groves().len(), 2);
        assert_eq!(sim.limb_count(), 5);
        assert_eq!(sim.seed(), 5);
        assert_eq!(sim.ticks(), 0);
    }

    #[test]
    fn advance_runs_one_pass_per_interval() {
        let mut sim = Simulation::from_config(&small_config(5)).unwrap();

        assert!(sim.advance(Duration::from_millis(999)).unwrap().is_empty());
        assert_eq!(sim.ticks(), 0);

        let reports = sim.advance(Duration::from_millis(1)).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(sim.ticks(), 1);

        sim.advance(Duration::from_millis(3000)).unwrap();
        assert_eq!(sim.ticks(), 4);
        for grove in sim.groves() {
            for root in grove.registry().roots() {
                assert_eq!(root.age(), 4);
            }
        }
    }

    #[test]
    fn same_seed_same_simulation() {
        let grow = |seed| {
            let mut sim = Simulation::from_config(&small_config(seed)).unwrap();
            for _ in 0..30 {
                sim.step().unwrap();
            }
            sim.groves()
                .iter()
                .map(|g| g.snapshot())
                .collect::<Vec<_>>()
        };
        assert_eq!(grow(77), grow(77));
    }

    #[test]
    fn run_blocking_reports_every_tick() {
        let mut cfg = small_config(3);
        cfg.tick_interval_ms = 1;
        let mut sim = Simulation::from_config(&cfg).unwrap();

        let mut seen = Vec::new();
        sim.run_blocking(3, |s, reports| {
            seen.push((s.ticks(), reports.len()));
        })
        .unwrap();

        assert_eq!(seen, vec![(1, 2), (2, 2), (3, 2)]);
    }

    #[test]
    fn invariants_hold_across_a_long_run() {
        let mut sim = Simulation::from_config(&small_config(2024)).unwrap();
        for _ in 0..120 {
            sim.step().unwrap();
        }
        assert!(sim.fault().is_none());

        for grove in sim.groves() {
            let reg = grove.registry();
            for limb in reg.iter() {
                assert!(reg.check_limb(limb.id()).is_ok());
                if let Some(p) = limb.parent() {
                    assert_eq!(limb.level(), reg[p].level() + 1);
                }
                if limb.has_leaves() {
                    assert_eq!(limb.child_count(), 0);
                    assert!(limb.leaf_index().unwrap() < grove.images().len());
                }
            }
        }
    }
}

//! Simulation configuration.
//!
//! [`SimConfig`] is the file-facing part (TOML): seed, tick interval and the
//! list of groves. [`GrowthConfig`] holds the rule constants and is only
//! set from code.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, registry::validate_dimensions};

/// Constants of the growth rules.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrowthConfig {
    /// Limbs shorter than this keep elongating.
    pub max_length: f32,
    pub elongate_factor: f32,
    /// Thicken while `radius <= thicken_slope * level + thicken_intercept`.
    pub thicken_slope: f32,
    pub thicken_intercept: f32,
    pub thicken_factor: f32,

    /// Age at which a limb tries to branch.
    pub branch_age: u32,
    /// Branching requires the registry to hold fewer limbs than this.
    pub registry_cap: usize,
    /// Branching requires `level < max_level`.
    pub max_level: u32,
    pub spawn_probability: f64,
    /// Angle range (degrees) of the first child.
    pub positive_angle: (f32, f32),
    /// Angle range (degrees) of the second child.
    pub negative_angle: (f32, f32),
    pub child_radius: f32,
    pub child_length: f32,

    /// Leaves may start on limbs with `level > leaf_min_level`.
    pub leaf_min_level: u32,
    pub leaf_probability: f64,
    /// Leaves advance one frame whenever `age % leaf_period == 0`.
    pub leaf_period: u32,

    pub terminal_age: u32,
    pub terminal_level: u32,
    pub terminal_radius_factor: f32,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            max_length: 1.0,
            elongate_factor: 1.1,
            thicken_slope: -0.05,
            thicken_intercept: 0.25,
            thicken_factor: 1.05,
            branch_age: 5,
            registry_cap: 256,
            max_level: 10,
            spawn_probability: 0.85,
            positive_angle: (10.0, 30.0),
            negative_angle: (-30.0, -10.0),
            child_radius: 0.05,
            child_length: 0.5,
            leaf_min_level: 3,
            leaf_probability: 0.08,
            leaf_period: 10,
            terminal_age: 100,
            terminal_level: 1,
            terminal_radius_factor: 2.0,
        }
    }
}

impl GrowthConfig {
    /// Rejects constants that would make a rule fail mid-tick.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_dimensions(self.child_radius, self.child_length)?;

        if self.leaf_period == 0 {
            return Err(ConfigError::ZeroLeafPeriod);
        }
        check_probability("spawn_probability", self.spawn_probability)?;
        check_probability("leaf_probability", self.leaf_probability)?;
        check_angle_range("positive", self.positive_angle)?;
        check_angle_range("negative", self.negative_angle)?;
        Ok(())
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { name, value })
    }
}

// Angles are drawn from the half-open range `lo..hi`.
fn check_angle_range(name: &'static str, (lo, hi): (f32, f32)) -> Result<(), ConfigError> {
    if lo.is_finite() && hi.is_finite() && lo < hi {
        Ok(())
    } else {
        Err(ConfigError::EmptyAngleRange { name, lo, hi })
    }
}

/// One grove: a population of trees sharing a leaf image sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariantConfig {
    pub name: String,
    /// Number of root limbs.
    #[serde(default = "default_population")]
    pub population: usize,
    /// Leaf image handles, in animation order.
    #[serde(default)]
    pub leaf_images: Vec<String>,
    /// World y of every root of this grove.
    #[serde(default = "default_base_height")]
    pub base_height: f32,
    #[serde(default = "default_root_radius")]
    pub root_radius: f32,
    #[serde(default = "default_root_length")]
    pub root_length: f32,
}

impl VariantConfig {
    pub fn new(name: impl Into<String>, population: usize, leaf_images: Vec<String>) -> Self {
        Self {
            name: name.into(),
            population,
            leaf_images,
            base_height: default_base_height(),
            root_radius: default_root_radius(),
            root_length: default_root_length(),
        }
    }

    pub fn with_base_height(mut self, base_height: f32) -> Self {
        self.base_height = base_height;
        self
    }
}

/// File-facing simulation configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Seed of the shared generator; drawn from the OS when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Milliseconds between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_variants")]
    pub variants: Vec<VariantConfig>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: None,
            tick_interval_ms: default_tick_interval_ms(),
            variants: default_variants(),
        }
    }
}

impl SimConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: SimConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks everything that must hold before a simulation starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::NonPositiveInterval);
        }
        for v in &self.variants {
            if v.leaf_images.is_empty() {
                return Err(ConfigError::EmptyLeafImages {
                    variant: v.name.clone(),
                });
            }
            validate_dimensions(v.root_radius, v.root_length)?;
        }
        Ok(())
    }
}

fn default_population() -> usize {
    30
}
fn default_base_height() -> f32 {
    2.0
}
fn default_root_radius() -> f32 {
    0.05
}
fn default_root_length() -> f32 {
    0.5
}
fn default_tick_interval_ms() -> u64 {
    1000
}

fn single_image(stem: &str) -> Vec<String> {
    vec![format!("images/{stem}.gif")]
}

fn default_variants() -> Vec<VariantConfig> {
    let oak_frames = (0..6).map(|i| format!("images/leaf{i}.gif")).collect();
    vec![
        VariantConfig::new("oak", 30, oak_frames),
        VariantConfig::new("other_leaf", 35, single_image("otherLeaf")),
        VariantConfig::new("red_flower", 35, single_image("redflower")),
        VariantConfig::new("sakura", 40, single_image("sakura")),
        VariantConfig::new("cactus", 10, single_image("cactus")).with_base_height(-2.0),
        VariantConfig::new("bush", 30, single_image("bush")).with_base_height(-2.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let cfg = SimConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.tick_interval_ms, 1000);
        assert_eq!(cfg.variants.len(), 6);
        assert_eq!(cfg.variants[0].leaf_images.len(), 6);
        assert!(GrowthConfig::default().validate().is_ok());
    }

    #[test]
    fn growth_constants_that_would_fail_a_tick_are_rejected() {
        let base = GrowthConfig::default();

        let cfg = GrowthConfig {
            leaf_period: 0,
            ..base
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::ZeroLeafPeriod)));

        for p in [1.5, -0.1, f64::NAN] {
            let cfg = GrowthConfig {
                spawn_probability: p,
                ..base
            };
            assert!(matches!(
                cfg.validate(),
                Err(ConfigError::ProbabilityOutOfRange {
                    name: "spawn_probability",
                    ..
                })
            ));
        }

        let cfg = GrowthConfig {
            leaf_probability: 2.0,
            ..base
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ProbabilityOutOfRange {
                name: "leaf_probability",
                ..
            })
        ));

        for range in [(20.0, 20.0), (30.0, 10.0), (f32::NAN, 10.0)] {
            let cfg = GrowthConfig {
                positive_angle: range,
                ..base
            };
            assert!(matches!(
                cfg.validate(),
                Err(ConfigError::EmptyAngleRange { name: "positive", .. })
            ));
        }
        let cfg = GrowthConfig {
            negative_angle: (-10.0, -30.0),
            ..base
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::EmptyAngleRange { name: "negative", .. })
        ));

        // Boundary probabilities are fine.
        let cfg = GrowthConfig {
            spawn_probability: 1.0,
            leaf_probability: 0.0,
            ..base
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn toml_fills_missing_fields_with_defaults() {
        let cfg = SimConfig::from_toml_str(
            r#"
            seed = 7

            [[variants]]
            name = "birch"
            leaf_images = ["a.gif", "b.gif"]
            "#,
        )
        .unwrap();

        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.tick_interval_ms, 1000);
        assert_eq!(cfg.variants.len(), 1);
        let v = &cfg.variants[0];
        assert_eq!(v.population, 30);
        assert_eq!(v.base_height, 2.0);
        assert_eq!(v.root_radius, 0.05);
        assert_eq!(v.root_length, 0.5);
    }

    #[test]
    fn empty_leaf_sequence_is_rejected() {
        let err = SimConfig::from_toml_str(
            r#"
            [[variants]]
            name = "bare"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyLeafImages { .. }));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = SimConfig::from_toml_str("tick_interval_ms = 0").unwrap_err();
        assert!(matches!(err, ConfigError::NonPositiveInterval));
    }

    #[test]
    fn negative_interval_fails_to_parse() {
        let err = SimConfig::from_toml_str("tick_interval_ms = -5").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn non_positive_root_dimensions_are_rejected() {
        let err = SimConfig::from_toml_str(
            r#"
            [[variants]]
            name = "flat"
            leaf_images = ["x.gif"]
            root_length = 0.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::NonPositiveLength(_)));
    }

    #[test]
    fn from_file_reads_toml_and_reports_missing_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seed = 99\ntick_interval_ms = 250").unwrap();

        let cfg = SimConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.seed, Some(99));
        assert_eq!(cfg.tick_interval_ms, 250);
        assert_eq!(cfg.variants.len(), 6);

        let err = SimConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

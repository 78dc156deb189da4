use std::path::PathBuf;

use thiserror::Error;

use crate::types::LimbId;

/// Setup failures. A simulation that fails validation never starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("variant `{variant}` has an empty leaf image sequence")]
    EmptyLeafImages { variant: String },

    #[error("tick interval must be positive")]
    NonPositiveInterval,

    #[error("limb base radius must be positive, got {0}")]
    NonPositiveRadius(f32),

    #[error("limb base length must be positive, got {0}")]
    NonPositiveLength(f32),

    #[error("leaf period must be positive")]
    ZeroLeafPeriod,

    #[error("{name} must be within [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },

    #[error("{name} angle range [{lo}, {hi}) is empty")]
    EmptyAngleRange { name: &'static str, lo: f32, hi: f32 },

    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Internal-consistency faults. Valid input never produces one; detecting
/// one halts the simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("limb {id} has level {level}, expected at least 1")]
    Level { id: LimbId, level: u32 },

    #[error("limb {id} has level {level} but its parent has level {parent_level}")]
    ChildLevel {
        id: LimbId,
        level: u32,
        parent_level: u32,
    },

    #[error("limb {id} radius scale is not uniform: x = {x}, z = {z}")]
    NonUniformRadius { id: LimbId, x: f32, z: f32 },

    #[error("limb {id} leaf frame {index} is out of range for {count} frames")]
    LeafIndex {
        id: LimbId,
        index: usize,
        count: usize,
    },

    #[error("limb {id} leaf screens diverged: front = {front}, back = {back}")]
    LeafPairDiverged {
        id: LimbId,
        front: usize,
        back: usize,
    },

    #[error("limb {id} has leaves and {children} children")]
    LeavesWithChildren { id: LimbId, children: usize },
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("simulation halted: {0}")]
    Invariant(#[from] InvariantViolation),
}

//! Core limb-growth simulation library.
//!
//! Main components:
//! - [`transform`] - limb geometry and child attachment points.
//! - [`color`] - bounded green-to-brown color walk.
//! - [`leaf`] - shared leaf image sequences and front/back leaf screens.
//! - [`limb`] - a single limb and its mutators.
//! - [`registry`] - the arena owning every limb of a grove.
//! - [`rules`] - the per-tick growth rules.
//! - [`grove`] - a population of trees sharing leaf images.
//! - [`scheduler`] - the fixed-interval tick timer.
//! - [`simulation`] - groves, shared generator and timer together.
//! - [`view`] - read-only snapshots for renderers.
//! - [`providers`] - leaf image and root placement seams.
//! - [`config`] - file and rule configuration.
//! - [`error`] - configuration errors and invariant violations.
//! - [`types`] - shared ids and small types.

pub mod color;
pub mod config;
pub mod error;
pub mod grove;
pub mod leaf;
pub mod limb;
pub mod providers;
pub mod registry;
pub mod rules;
pub mod scheduler;
pub mod simulation;
pub mod transform;
pub mod types;
pub mod view;

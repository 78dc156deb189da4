use glam::Vec3;

use crate::types::Rgb;

/// Number of steps from the young color to the mature color.
pub const MAX_COLOR_STEP: u32 = 15;

/// Starting color of every limb (green).
pub const YOUNG_COLOR: Rgb = Vec3::new(0.0, 1.0, 0.1);

/// Color a limb reaches after [`MAX_COLOR_STEP`] steps (brown).
pub const MATURE_COLOR: Rgb = Vec3::new(0.35, 0.29, 0.0);

/// Color forced onto old roots by the terminal transform (blue).
pub const TERMINAL_COLOR: Rgb = Vec3::new(0.0, 0.0, 1.0);

/// Bounded linear walk of a diffuse color from a start to a target.
///
/// Each [`ColorTransition::step`] moves every channel by
/// `(target - start) / MAX_COLOR_STEP`. The color after `n` steps is
/// evaluated as `start + delta * n`, so no rounding error accumulates
/// across steps.
#[derive(Clone, Debug)]
pub struct ColorTransition {
    start: Rgb,
    delta: Rgb,
    color: Rgb,
    step: u32,
}

impl ColorTransition {
    pub fn new(start: Rgb, target: Rgb) -> Self {
        Self {
            start,
            delta: (target - start) / MAX_COLOR_STEP as f32,
            color: start,
            step: 0,
        }
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Steps applied so far, at most [`MAX_COLOR_STEP`].
    pub fn steps_taken(&self) -> u32 {
        self.step
    }

    pub fn is_saturated(&self) -> bool {
        self.step >= MAX_COLOR_STEP
    }

    /// Advances one step. Returns `false` (and changes nothing) once saturated.
    pub fn step(&mut self) -> bool {
        if self.is_saturated() {
            return false;
        }
        self.step += 1;
        self.color = self.start + self.delta * self.step as f32;
        true
    }

    /// Overrides the color and ends the transition.
    pub fn force(&mut self, color: Rgb) {
        self.color = color;
        self.step = MAX_COLOR_STEP;
    }
}

impl Default for ColorTransition {
    fn default() -> Self {
        Self::new(YOUNG_COLOR, MATURE_COLOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaches_target_after_exactly_max_steps() {
        let mut c = ColorTransition::default();
        assert_eq!(c.color(), YOUNG_COLOR);

        for _ in 0..MAX_COLOR_STEP {
            assert!(c.step());
        }

        let diff = (c.color() - MATURE_COLOR).abs().max_element();
        assert!(diff <= 1e-6, "off by {diff}");
        assert!(c.is_saturated());
    }

    #[test]
    fn further_steps_are_no_ops() {
        let mut c = ColorTransition::default();
        for _ in 0..MAX_COLOR_STEP {
            c.step();
        }
        let saturated = c.color();

        for _ in 0..10 {
            assert!(!c.step());
            assert_eq!(c.color(), saturated);
        }
        assert_eq!(c.steps_taken(), MAX_COLOR_STEP);
    }

    #[test]
    fn each_channel_moves_monotonically() {
        let mut c = ColorTransition::default();
        let mut prev = c.color();
        for _ in 0..MAX_COLOR_STEP {
            c.step();
            let now = c.color();
            // Green to brown: red rises, green and blue fall.
            assert!(now.x >= prev.x);
            assert!(now.y <= prev.y);
            assert!(now.z <= prev.z);
            prev = now;
        }
    }

    #[test]
    fn force_overrides_and_freezes_transition() {
        let mut c = ColorTransition::default();
        c.step();
        c.step();

        c.force(TERMINAL_COLOR);
        assert_eq!(c.color(), TERMINAL_COLOR);

        c.step();
        assert_eq!(c.color(), TERMINAL_COLOR);
    }
}

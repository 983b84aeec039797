use crate::fractal::{CHILD_COUNT, FractalError};

/// Deepest accepted `max_depth`. A full tree of this depth already has
/// about 300 million nodes.
pub const MAX_DEPTH: u32 = 12;

/// Shape of a fractal tree. Copied verbatim from every parent to its children.
///
/// Angles are in degrees, speeds in degrees per second.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FractalConfig {
    /// Deepest level that is still spawned. The root sits at depth 0.
    pub max_depth: u32,
    /// Uniform scale of a child relative to its parent, in `(0, 1]`.
    pub child_scale: f32,
    /// Chance in `[0, 1]` that a direction gets a child.
    pub spawn_probability: f32,
    pub max_rotation_speed: f32,
    pub max_twist: f32,
}

impl FractalConfig {
    pub fn validate(&self) -> Result<(), FractalError> {
        if self.max_depth > MAX_DEPTH {
            return Err(FractalError::InvalidConfig(format!(
                "max_depth must be at most {}, got {}",
                MAX_DEPTH, self.max_depth
            )));
        }
        if !(self.child_scale > 0.0 && self.child_scale <= 1.0) {
            return Err(FractalError::InvalidConfig(format!(
                "child_scale must be in (0, 1], got {}",
                self.child_scale
            )));
        }
        if !(0.0..=1.0).contains(&self.spawn_probability) {
            return Err(FractalError::InvalidConfig(format!(
                "spawn_probability must be in [0, 1], got {}",
                self.spawn_probability
            )));
        }
        if !(self.max_rotation_speed >= 0.0 && bounded_span(self.max_rotation_speed)) {
            return Err(FractalError::InvalidConfig(format!(
                "max_rotation_speed must be >= 0 and span a finite range, got {}",
                self.max_rotation_speed
            )));
        }
        if !(self.max_twist >= 0.0 && bounded_span(self.max_twist)) {
            return Err(FractalError::InvalidConfig(format!(
                "max_twist must be >= 0 and span a finite range, got {}",
                self.max_twist
            )));
        }
        Ok(())
    }

    /// Node count of a fully grown tree, i.e. with `spawn_probability == 1`.
    pub fn max_node_count(&self) -> u64 {
        let mut level = 1u64;
        let mut total = 1u64;
        for _ in 0..self.max_depth {
            if total == u64::MAX {
                break;
            }
            level = level.saturating_mul(CHILD_COUNT as u64);
            total = total.saturating_add(level);
        }
        total
    }
}

/// Samples are drawn from `[-bound, bound]`, whose width must be finite.
fn bounded_span(bound: f32) -> bool {
    (2.0 * bound).is_finite()
}

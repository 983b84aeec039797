//! Depth-indexed material table shared by all nodes of one fractal.
//!
//! Each depth has two variants. Variant 0 fades from white to yellow, variant
//! 1 from white to cyan, both along a quadratic curve so that the colour
//! changes mostly near the leaves. The deepest level is marked with magenta
//! and red instead.

use std::sync::Arc;

use crate::data_structures::material::{Color, Material};

pub const VARIANTS: usize = 2;

const BASE: Color = Color::WHITE;
const ACCENTS: [Color; VARIANTS] = [Color::YELLOW, Color::CYAN];
const DEEPEST: [Color; VARIANTS] = [Color::MAGENTA, Color::RED];

#[derive(Debug)]
pub struct MaterialGradient {
    rows: Vec<[Arc<Material>; VARIANTS]>,
}

impl MaterialGradient {
    /// Builds `max_depth + 1` rows of tinted copies of `template`.
    pub fn build(template: &Material, max_depth: u32) -> Self {
        // With max_depth <= 1 the only interpolated row is depth 0, which maps to t = 0.
        let denominator = max_depth.saturating_sub(1).max(1) as f32;
        let mut rows: Vec<[Arc<Material>; VARIANTS]> = (0..=max_depth)
            .map(|depth| {
                let t = depth as f32 / denominator;
                let t = t * t;
                ACCENTS.map(|accent| Arc::new(template.tinted(Color::lerp(BASE, accent, t))))
            })
            .collect();
        if let Some(deepest) = rows.last_mut() {
            *deepest = DEEPEST.map(|color| Arc::new(template.tinted(color)));
        }
        Self { rows }
    }

    pub fn get(&self, depth: u32, variant: usize) -> Option<&Arc<Material>> {
        self.rows.get(depth as usize)?.get(variant)
    }

    pub fn rows(&self) -> &[[Arc<Material>; VARIANTS]] {
        &self.rows
    }

    /// Number of depth levels, always `max_depth + 1`.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

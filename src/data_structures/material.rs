//! Mesh and material handles.
//!
//! The engine does not own geometry or shading state here; it only hands out
//! references that a renderer resolves. A [`Material`] is a template that can
//! be tinted into independent copies, one per colour.

use std::sync::Arc;

/// Linear RGBA colour with channels usually in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const YELLOW: Color = Color::rgb(1.0, 0.92, 0.016);
    pub const CYAN: Color = Color::rgb(0.0, 1.0, 1.0);
    pub const MAGENTA: Color = Color::rgb(1.0, 0.0, 1.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// `a + (b - a) * t` per channel. `t` is not clamped.
    pub fn lerp(a: Color, b: Color, t: f32) -> Color {
        Color {
            r: a.r + (b.r - a.r) * t,
            g: a.g + (b.g - a.g) * t,
            b: a.b + (b.b - a.b) * t,
            a: a.a + (b.a - a.a) * t,
        }
    }
}

/// Opaque reference to a mesh stored by the host.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle {
    pub id: u32,
    pub name: String,
}

impl MeshHandle {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub color: Color,
}

impl Material {
    pub fn new(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }

    /// Copy of this material carrying `color`. The template is left untouched.
    pub fn tinted(&self, color: Color) -> Self {
        Self {
            name: self.name.clone(),
            color,
        }
    }
}

/// What a scene node draws: one mesh with one (shared) material.
#[derive(Clone, Debug)]
pub struct Renderable {
    pub mesh: MeshHandle,
    pub material: Arc<Material>,
}

//! flow-fractal
//!
//! A recursive, self-spawning fractal for flow-style engines. A root node
//! grows up to five smaller, rotated copies of itself on its faces, each of
//! which does the same until a maximum depth is reached. Children appear one
//! after another with random delays and random gaps, every node spins at its
//! own speed, and each depth level is tinted from a precomputed gradient.
//!
//! High-level modules
//! - `context`: engine-wide settings and counters shared with flows
//! - `data_structures`: transforms, the scene graph and asset handles
//! - `flow`: high level flow control (update loop, ticks, events)
//! - `fractal`: the fractal itself, its gradient table and its scheduler
//! - `resources`: the read-only asset set a fractal is built from
//!

pub mod context;
pub mod data_structures;
pub mod flow;
pub mod fractal;
pub mod resources;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;

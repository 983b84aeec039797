//! Engine data structures: transforms, scene graphs, and asset handles.
//!
//! - `instance` holds per-node transformation data
//! - `scene_graph` enables hierarchical scene organization
//! - `material` contains mesh/material handles and colours

pub mod instance;
pub mod material;
pub mod scene_graph;

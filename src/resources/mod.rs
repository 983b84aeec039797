/**
 * This module contains the read-only asset set a fractal is built from.
 *
 * Meshes and the material template are owned by the host; the fractal only
 * keeps handles and hands them to the scene graph.
 */
use std::sync::Arc;

use crate::{
    data_structures::material::{Color, Material, MeshHandle},
    fractal::FractalError,
};

#[derive(Clone, Debug)]
pub struct Assets {
    meshes: Arc<[MeshHandle]>,
    material: Material,
}

impl Assets {
    /// Fails if `meshes` is empty, since every node must pick one.
    pub fn new(meshes: Vec<MeshHandle>, material: Material) -> Result<Self, FractalError> {
        if meshes.is_empty() {
            return Err(FractalError::NoMeshes);
        }
        Ok(Self {
            meshes: meshes.into(),
            material,
        })
    }

    /// The cube and sphere primitives every host is expected to provide.
    pub fn primitives(material: Material) -> Self {
        Self {
            meshes: vec![MeshHandle::new(0, "cube"), MeshHandle::new(1, "sphere")].into(),
            material,
        }
    }

    pub fn meshes(&self) -> &Arc<[MeshHandle]> {
        &self.meshes
    }

    pub fn material(&self) -> &Material {
        &self.material
    }
}

impl Default for Assets {
    fn default() -> Self {
        Self::primitives(Material::new("standard", Color::WHITE))
    }
}

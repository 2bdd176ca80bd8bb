// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The floor slab under a room. Its top face sits at `y = 0`.

use nalgebra::{Isometry3, Translation3, Vector3};
use roomplan_core::{Material, NodeKey, Params, RenderBackend};

use crate::shape::BoxShape;

#[derive(Debug)]
pub struct Floor {
    shape: BoxShape,
}

impl Floor {
    pub fn build(backend: &mut dyn RenderBackend, width: f64, depth: f64, params: &Params) -> Self {
        let material = Material::standard(
            params.floor.color,
            params.floor.opacity,
            params.floor.roughness,
            params.floor.metalness,
        );
        let size = Vector3::new(width, params.floor.thickness, depth);
        let shape = BoxShape::outlined(backend, size, &material, params.highlight.outline_color);
        shape.set_transform(backend, &Self::placement(size.y));
        Self { shape }
    }

    fn placement(thickness: f64) -> Isometry3<f64> {
        Isometry3::from(Translation3::new(0.0, -thickness / 2.0, 0.0))
    }

    #[inline]
    pub fn mesh(&self) -> NodeKey {
        self.shape.mesh()
    }

    #[inline]
    pub fn size(&self) -> Vector3<f64> {
        self.shape.size()
    }

    pub fn resize(&mut self, backend: &mut dyn RenderBackend, width: f64, depth: f64) {
        let thickness = self.shape.size().y;
        self.shape.resize(backend, Vector3::new(width, thickness, depth));
        self.shape.set_transform(backend, &Self::placement(thickness));
    }

    pub fn release(self, backend: &mut dyn RenderBackend) {
        self.shape.release(backend);
    }
}

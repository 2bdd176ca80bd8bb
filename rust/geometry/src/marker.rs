// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Resize handles at the four floor corners of a room.

use nalgebra::{Isometry3, Point3, Translation3, Vector3};
use roomplan_core::{Material, NodeKey, Params, RenderBackend};

use crate::shape::BoxShape;

/// Which corner a marker sits on, as a sign pair along X and Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Corner {
    pub x: i8,
    pub z: i8,
}

impl Corner {
    /// Generation order of the four corners.
    pub const ALL: [Corner; 4] = [
        Corner { x: 1, z: 1 },
        Corner { x: -1, z: 1 },
        Corner { x: 1, z: -1 },
        Corner { x: -1, z: -1 },
    ];

    /// Room-local position of this corner's marker.
    pub fn position(self, width: f64, depth: f64, elevation: f64) -> Point3<f64> {
        Point3::new(
            f64::from(self.x) * width / 2.0,
            elevation,
            f64::from(self.z) * depth / 2.0,
        )
    }
}

#[derive(Debug)]
pub struct ResizeMarker {
    corner: Corner,
    position: Point3<f64>,
    shape: BoxShape,
}

impl ResizeMarker {
    pub fn build(
        backend: &mut dyn RenderBackend,
        corner: Corner,
        width: f64,
        depth: f64,
        params: &Params,
    ) -> Self {
        let size = params.marker.size;
        let shape = BoxShape::plain(backend, Vector3::new(size, size, size), &Material::basic(params.marker.color));
        let position = corner.position(width, depth, params.marker.elevation);
        shape.set_transform(backend, &Isometry3::from(Translation3::from(position.coords)));
        Self {
            corner,
            position,
            shape,
        }
    }

    /// One marker per corner, in [`Corner::ALL`] order.
    pub fn build_all(backend: &mut dyn RenderBackend, width: f64, depth: f64, params: &Params) -> Vec<Self> {
        Corner::ALL
            .iter()
            .map(|&corner| Self::build(backend, corner, width, depth, params))
            .collect()
    }

    #[inline]
    pub fn corner(&self) -> Corner {
        self.corner
    }

    #[inline]
    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    #[inline]
    pub fn mesh(&self) -> NodeKey {
        self.shape.mesh()
    }

    pub fn release(self, backend: &mut dyn RenderBackend) {
        self.shape.release(backend);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The rendering seam.
//!
//! The engine never touches a graphics API directly. It describes what it
//! needs (box geometry, edge outlines, meshes, a parent/child hierarchy,
//! transforms, materials) through [`RenderBackend`], and every handle it
//! receives is released through the same trait exactly once.

use nalgebra::{Isometry3, Vector3};
use serde::{Deserialize, Serialize};

use crate::keys::{GeometryKey, NodeKey};

/// Surface description for a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: u32,
    pub emissive: u32,
    pub emissive_intensity: f64,
    pub opacity: f64,
    pub transparent: bool,
    pub roughness: f64,
    pub metalness: f64,
}

impl Material {
    /// A physically based material; transparency follows `opacity < 1`.
    pub fn standard(color: u32, opacity: f64, roughness: f64, metalness: f64) -> Self {
        Self {
            color,
            emissive: 0x000000,
            emissive_intensity: 1.0,
            opacity,
            transparent: opacity < 1.0,
            roughness,
            metalness,
        }
    }

    /// An unlit, opaque material.
    pub fn basic(color: u32) -> Self {
        Self::standard(color, 1.0, 1.0, 0.0)
    }

    /// Returns a copy with the given opacity.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self.transparent = opacity < 1.0;
        self
    }
}

/// Operations the engine consumes from a renderer.
///
/// Parent `None` in [`attach`](Self::attach) means the scene root.
/// Disposing a node does not dispose its geometry; callers release both.
pub trait RenderBackend {
    /// Allocates a box geometry of the given full extents.
    fn create_box_geometry(&mut self, size: Vector3<f64>) -> GeometryKey;

    /// Allocates a line geometry tracing the hard edges of `source`.
    fn create_edges_geometry(&mut self, source: GeometryKey) -> GeometryKey;

    /// Creates an empty grouping node.
    fn create_group(&mut self) -> NodeKey;

    /// Creates a mesh node drawing `geometry` with `material`.
    fn create_mesh(&mut self, geometry: GeometryKey, material: &Material) -> NodeKey;

    /// Creates a line-segments node drawing `geometry` in a flat color.
    fn create_line_segments(&mut self, geometry: GeometryKey, color: u32) -> NodeKey;

    /// Swaps the geometry a mesh or line node draws. The previous geometry
    /// is not released.
    fn set_geometry(&mut self, node: NodeKey, geometry: GeometryKey);

    /// Re-parents `child` under `parent`.
    fn attach(&mut self, parent: Option<NodeKey>, child: NodeKey);

    /// Removes `child` from its parent.
    fn detach(&mut self, child: NodeKey);

    /// Sets a node's transform relative to its parent.
    fn set_transform(&mut self, node: NodeKey, transform: &Isometry3<f64>);

    /// Replaces a mesh node's material.
    fn set_material(&mut self, node: NodeKey, material: &Material);

    /// Shows or hides a node and its children.
    fn set_visible(&mut self, node: NodeKey, visible: bool);

    /// Releases a geometry buffer.
    fn dispose_geometry(&mut self, geometry: GeometryKey);

    /// Releases a node.
    fn dispose_node(&mut self, node: NodeKey);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_material_transparency_follows_opacity() {
        assert!(Material::standard(0x986eba, 0.27, 0.5, 0.1).transparent);
        assert!(!Material::standard(0x2196f3, 1.0, 0.5, 0.8).transparent);
        assert!(Material::basic(0xffffff).with_opacity(0.5).transparent);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Box meshes with an optional edge outline.
//!
//! Every panel, slab, marker and wall object in a room is a [`BoxShape`].
//! Resizing replaces the box geometry and the outline built from it, and the
//! previous pair is released before the call returns. Releasing consumes the
//! shape, so a handle cannot be disposed twice through this type.

use nalgebra::{Isometry3, Vector3};
use roomplan_core::{GeometryKey, Material, NodeKey, RenderBackend};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Outline {
    node: NodeKey,
    geometry: GeometryKey,
    color: u32,
}

impl Outline {
    fn build(backend: &mut dyn RenderBackend, mesh: NodeKey, source: GeometryKey, color: u32) -> Self {
        let geometry = backend.create_edges_geometry(source);
        let node = backend.create_line_segments(geometry, color);
        backend.attach(Some(mesh), node);
        Self {
            node,
            geometry,
            color,
        }
    }

    fn release(self, backend: &mut dyn RenderBackend) {
        backend.detach(self.node);
        backend.dispose_node(self.node);
        backend.dispose_geometry(self.geometry);
    }
}

/// A box mesh, its geometry, and an optional outline child.
#[derive(Debug)]
pub struct BoxShape {
    mesh: NodeKey,
    geometry: GeometryKey,
    outline: Option<Outline>,
    size: Vector3<f64>,
}

impl BoxShape {
    /// Builds an outlined box. The mesh is not attached anywhere yet.
    pub fn outlined(
        backend: &mut dyn RenderBackend,
        size: Vector3<f64>,
        material: &Material,
        outline_color: u32,
    ) -> Self {
        let mut shape = Self::plain(backend, size, material);
        shape.outline = Some(Outline::build(backend, shape.mesh, shape.geometry, outline_color));
        shape
    }

    /// Builds a box without an outline.
    pub fn plain(backend: &mut dyn RenderBackend, size: Vector3<f64>, material: &Material) -> Self {
        let geometry = backend.create_box_geometry(size);
        let mesh = backend.create_mesh(geometry, material);
        Self {
            mesh,
            geometry,
            outline: None,
            size,
        }
    }

    #[inline]
    pub fn mesh(&self) -> NodeKey {
        self.mesh
    }

    #[inline]
    pub fn geometry(&self) -> GeometryKey {
        self.geometry
    }

    /// The outline node, if the shape has one.
    #[inline]
    pub fn outline(&self) -> Option<NodeKey> {
        self.outline.map(|o| o.node)
    }

    /// Full extents of the box.
    #[inline]
    pub fn size(&self) -> Vector3<f64> {
        self.size
    }

    /// Replaces the geometry (and outline) with a box of `size`, releasing
    /// the old handles.
    pub fn resize(&mut self, backend: &mut dyn RenderBackend, size: Vector3<f64>) {
        let geometry = backend.create_box_geometry(size);
        backend.set_geometry(self.mesh, geometry);
        let previous = std::mem::replace(&mut self.geometry, geometry);

        if let Some(outline) = self.outline.take() {
            let color = outline.color;
            outline.release(backend);
            self.outline = Some(Outline::build(backend, self.mesh, geometry, color));
        }
        backend.dispose_geometry(previous);
        self.size = size;
    }

    pub fn set_transform(&self, backend: &mut dyn RenderBackend, transform: &Isometry3<f64>) {
        backend.set_transform(self.mesh, transform);
    }

    pub fn set_material(&self, backend: &mut dyn RenderBackend, material: &Material) {
        backend.set_material(self.mesh, material);
    }

    pub fn set_outline_visible(&self, backend: &mut dyn RenderBackend, visible: bool) {
        if let Some(outline) = self.outline {
            backend.set_visible(outline.node, visible);
        }
    }

    /// Detaches the mesh and releases every handle the shape owns.
    pub fn release(self, backend: &mut dyn RenderBackend) {
        if let Some(outline) = self.outline {
            outline.release(backend);
        }
        backend.detach(self.mesh);
        backend.dispose_node(self.mesh);
        backend.dispose_geometry(self.geometry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomplan_core::{GeometryKind, MemoryRenderer};

    #[test]
    fn outlined_box_owns_four_handles() {
        let mut r = MemoryRenderer::new();
        let shape = BoxShape::outlined(&mut r, Vector3::new(4.0, 2.5, 0.1), &Material::basic(0), 0x111111);
        assert_eq!(r.live_node_count(), 2);
        assert_eq!(r.live_geometry_count(), 2);
        assert_eq!(r.children(Some(shape.mesh())), vec![shape.outline().unwrap()]);

        shape.release(&mut r);
        assert_eq!(r.live_node_count(), 0);
        assert_eq!(r.live_geometry_count(), 0);
        assert_eq!(r.stale_releases(), 0);
    }

    #[test]
    fn resize_replaces_and_releases() {
        let mut r = MemoryRenderer::new();
        let mut shape = BoxShape::outlined(&mut r, Vector3::new(4.0, 2.5, 0.1), &Material::basic(0), 0x111111);
        let old_geometry = shape.geometry();
        let mesh = shape.mesh();

        shape.resize(&mut r, Vector3::new(6.0, 2.5, 0.1));

        assert!(r.geometry(old_geometry).is_none());
        assert_eq!(shape.mesh(), mesh);
        assert_eq!(r.mesh_box_size(mesh), Some(Vector3::new(6.0, 2.5, 0.1)));
        assert_eq!(r.live_node_count(), 2);
        assert_eq!(r.live_geometry_count(), 2);

        let outline = shape.outline().unwrap();
        let edges = match &r.node(outline).unwrap().kind {
            roomplan_core::NodeKind::Lines { geometry, .. } => *geometry,
            other => panic!("unexpected node {other:?}"),
        };
        assert_eq!(r.geometry(edges), Some(&GeometryKind::Edges(shape.geometry())));
    }

    #[test]
    fn plain_box_resizes_without_outline() {
        let mut r = MemoryRenderer::new();
        let mut shape = BoxShape::plain(&mut r, Vector3::new(0.2, 0.2, 0.2), &Material::basic(0));
        shape.resize(&mut r, Vector3::new(0.3, 0.3, 0.3));
        assert!(shape.outline().is_none());
        assert_eq!(r.live_geometry_count(), 1);
        shape.release(&mut r);
        assert_eq!(r.live_node_count(), 0);
        assert_eq!(r.stale_releases(), 0);
    }
}

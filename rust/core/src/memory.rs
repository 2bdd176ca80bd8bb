// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Headless renderer that keeps every live handle in slot maps.
//!
//! Used by tests and tools to inspect what the engine built, and to prove
//! that replaced or removed geometry is released exactly once: releasing an
//! unknown or already released handle is counted as a stale release.

use nalgebra::{Isometry3, Vector3};
use slotmap::SlotMap;

use crate::keys::{GeometryKey, NodeKey};
use crate::render::{Material, RenderBackend};

/// What a geometry buffer holds.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryKind {
    /// A box of the given full extents.
    Box(Vector3<f64>),
    /// The edges of another geometry.
    Edges(GeometryKey),
}

/// What a node draws.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh {
        geometry: GeometryKey,
        material: Material,
    },
    Lines {
        geometry: GeometryKey,
        color: u32,
    },
}

/// Data stored for a node.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: NodeKind,
    pub parent: Option<NodeKey>,
    pub attached: bool,
    pub transform: Isometry3<f64>,
    pub visible: bool,
}

/// The in-memory renderer.
#[derive(Debug, Default)]
pub struct MemoryRenderer {
    nodes: SlotMap<NodeKey, NodeData>,
    geometries: SlotMap<GeometryKey, GeometryKind>,
    stale_releases: usize,
}

impl MemoryRenderer {
    /// Creates an empty renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node data for the given key, or `None` if released.
    pub fn node(&self, key: NodeKey) -> Option<&NodeData> {
        self.nodes.get(key)
    }

    /// Returns the geometry for the given key, or `None` if released.
    pub fn geometry(&self, key: GeometryKey) -> Option<&GeometryKind> {
        self.geometries.get(key)
    }

    /// Returns the number of live nodes.
    pub fn live_node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of live geometry buffers.
    pub fn live_geometry_count(&self) -> usize {
        self.geometries.len()
    }

    /// Number of release calls that targeted a handle that was not live.
    pub fn stale_releases(&self) -> usize {
        self.stale_releases
    }

    /// Returns the material of a mesh node.
    pub fn material(&self, key: NodeKey) -> Option<&Material> {
        match &self.nodes.get(key)?.kind {
            NodeKind::Mesh { material, .. } => Some(material),
            _ => None,
        }
    }

    /// Returns the transform of a node relative to its parent.
    pub fn transform(&self, key: NodeKey) -> Option<Isometry3<f64>> {
        self.nodes.get(key).map(|n| n.transform)
    }

    /// Returns the box extents a mesh node currently draws.
    pub fn mesh_box_size(&self, key: NodeKey) -> Option<Vector3<f64>> {
        match &self.nodes.get(key)?.kind {
            NodeKind::Mesh { geometry, .. } => match self.geometries.get(*geometry)? {
                GeometryKind::Box(size) => Some(*size),
                GeometryKind::Edges(_) => None,
            },
            _ => None,
        }
    }

    /// Returns the live, attached children of `parent` (`None` = scene root).
    pub fn children(&self, parent: Option<NodeKey>) -> Vec<NodeKey> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.attached && n.parent == parent)
            .map(|(k, _)| k)
            .collect()
    }

    /// Composes transforms up the parent chain.
    pub fn world_transform(&self, key: NodeKey) -> Option<Isometry3<f64>> {
        let node = self.nodes.get(key)?;
        match node.parent {
            Some(parent) if node.attached => {
                Some(self.world_transform(parent)? * node.transform)
            }
            _ => Some(node.transform),
        }
    }

    fn insert_node(&mut self, kind: NodeKind) -> NodeKey {
        self.nodes.insert(NodeData {
            kind,
            parent: None,
            attached: false,
            transform: Isometry3::identity(),
            visible: true,
        })
    }
}

impl RenderBackend for MemoryRenderer {
    fn create_box_geometry(&mut self, size: Vector3<f64>) -> GeometryKey {
        self.geometries.insert(GeometryKind::Box(size))
    }

    fn create_edges_geometry(&mut self, source: GeometryKey) -> GeometryKey {
        if !self.geometries.contains_key(source) {
            tracing::warn!(?source, "edges requested for a released geometry");
        }
        self.geometries.insert(GeometryKind::Edges(source))
    }

    fn create_group(&mut self) -> NodeKey {
        self.insert_node(NodeKind::Group)
    }

    fn create_mesh(&mut self, geometry: GeometryKey, material: &Material) -> NodeKey {
        self.insert_node(NodeKind::Mesh {
            geometry,
            material: *material,
        })
    }

    fn create_line_segments(&mut self, geometry: GeometryKey, color: u32) -> NodeKey {
        self.insert_node(NodeKind::Lines { geometry, color })
    }

    fn set_geometry(&mut self, node: NodeKey, geometry: GeometryKey) {
        match self.nodes.get_mut(node).map(|n| &mut n.kind) {
            Some(NodeKind::Mesh { geometry: g, .. }) | Some(NodeKind::Lines { geometry: g, .. }) => {
                *g = geometry;
            }
            Some(NodeKind::Group) => tracing::warn!(?node, "geometry assigned to a group"),
            None => tracing::warn!(?node, "geometry assigned to a released node"),
        }
    }

    fn attach(&mut self, parent: Option<NodeKey>, child: NodeKey) {
        if let Some(p) = parent {
            if !self.nodes.contains_key(p) {
                tracing::warn!(?p, "attach to a released parent");
                return;
            }
        }
        match self.nodes.get_mut(child) {
            Some(node) => {
                node.parent = parent;
                node.attached = true;
            }
            None => tracing::warn!(?child, "attach of a released node"),
        }
    }

    fn detach(&mut self, child: NodeKey) {
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = None;
            node.attached = false;
        }
    }

    fn set_transform(&mut self, node: NodeKey, transform: &Isometry3<f64>) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.transform = *transform;
        }
    }

    fn set_material(&mut self, node: NodeKey, material: &Material) {
        if let Some(NodeData {
            kind: NodeKind::Mesh { material: m, .. },
            ..
        }) = self.nodes.get_mut(node)
        {
            *m = *material;
        }
    }

    fn set_visible(&mut self, node: NodeKey, visible: bool) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.visible = visible;
        }
    }

    fn dispose_geometry(&mut self, geometry: GeometryKey) {
        if self.geometries.remove(geometry).is_none() {
            tracing::warn!(?geometry, "geometry released twice");
            self.stale_releases += 1;
        }
    }

    fn dispose_node(&mut self, node: NodeKey) {
        if self.nodes.remove(node).is_none() {
            tracing::warn!(?node, "node released twice");
            self.stale_releases += 1;
        }
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Objects mounted on walls: sockets and doors.
//!
//! A [`WallObject`] references its wall by index into the owning room and
//! never owns it. Its transform is always derived by the placement engine
//! from the wall and its normalized position; the object only stores the
//! result. Selection and hover feedback are applied to the object's own
//! material and undone exactly, using a baseline color remembered on the
//! first selection.

use std::fmt;
use std::str::FromStr;

use nalgebra::{Isometry3, Vector3};
use roomplan_core::{HighlightParams, Material, NodeKey, Params, RenderBackend};
use serde::{Deserialize, Serialize};

use crate::placement::Placement;
use crate::shape::BoxShape;

/// Type tag of a wall object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Socket,
    Door,
}

impl ObjectType {
    /// Box extents of the object's mesh.
    pub fn box_size(self, params: &Params) -> Vector3<f64> {
        match self {
            ObjectType::Socket => Vector3::new(params.socket.width, params.socket.height, params.socket.depth),
            ObjectType::Door => Vector3::new(params.door.width, params.door.height, params.door.depth),
        }
    }

    /// Height an object gets when none is requested.
    pub fn default_height(self, params: &Params) -> f64 {
        match self {
            ObjectType::Socket => params.socket.height,
            ObjectType::Door => params.door.height,
        }
    }

    /// Substitute for an invalid requested height.
    pub fn fallback_height(self, params: &Params) -> f64 {
        match self {
            ObjectType::Socket => params.socket.fallback_height,
            ObjectType::Door => params.door.fallback_height,
        }
    }

    /// Perpendicular offset used when the object carries none.
    pub fn default_z_bias(self, params: &Params) -> f64 {
        match self {
            ObjectType::Socket => params.socket.default_z_bias,
            ObjectType::Door => 0.0,
        }
    }

    /// Starting material; ghosts are drawn translucent.
    pub fn base_material(self, params: &Params, is_ghost: bool) -> Material {
        let (material, ghost_opacity) = match self {
            ObjectType::Socket => (
                Material::standard(
                    params.socket.color,
                    params.socket.opacity,
                    params.socket.roughness,
                    params.socket.metalness,
                ),
                params.socket.ghost_opacity,
            ),
            ObjectType::Door => (
                Material::standard(
                    params.door.color,
                    params.door.opacity,
                    params.door.roughness,
                    params.door.metalness,
                ),
                params.door.ghost_opacity,
            ),
        };
        if is_ghost {
            material.with_opacity(ghost_opacity)
        } else {
            material
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ObjectType::Socket => "socket",
            ObjectType::Door => "door",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a socket powers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    #[default]
    Power,
    Light,
    Climate,
    Security,
    Media,
}

impl DeviceType {
    pub const ALL: [DeviceType; 5] = [
        DeviceType::Power,
        DeviceType::Light,
        DeviceType::Climate,
        DeviceType::Security,
        DeviceType::Media,
    ];

    /// Housing color. `Power` keeps the configured socket color.
    pub fn housing_color(self, socket_color: u32) -> u32 {
        match self {
            DeviceType::Power => socket_color,
            DeviceType::Light => 0xffcc00,
            DeviceType::Climate => 0x00ccff,
            DeviceType::Security => 0xff0000,
            DeviceType::Media => 0x9900cc,
        }
    }

    /// Color of the on/off indicator.
    pub fn indicator_color(self) -> u32 {
        match self {
            DeviceType::Power => 0x00ff00,
            other => other.housing_color(0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceType::Power => "power",
            DeviceType::Light => "light",
            DeviceType::Climate => "climate",
            DeviceType::Security => "security",
            DeviceType::Media => "media",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        DeviceType::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown device type `{s}`"))
    }
}

/// Socket-only state.
#[derive(Debug, Clone, PartialEq)]
pub struct SocketState {
    pub name: String,
    pub device_type: DeviceType,
    pub is_on: bool,
    /// Watts drawn while on.
    pub power_consumption: f64,
    /// Housing depth used for the wall offset.
    pub depth: f64,
}

impl SocketState {
    pub fn new(name: impl Into<String>, depth: f64) -> Self {
        Self {
            name: name.into(),
            device_type: DeviceType::Power,
            is_on: false,
            power_consumption: 0.0,
            depth,
        }
    }

    /// Indicator light as (color, intensity).
    pub fn indicator(&self) -> (u32, f64) {
        (self.device_type.indicator_color(), if self.is_on { 1.0 } else { 0.0 })
    }
}

/// Variant data of a wall object.
#[derive(Debug, Clone, PartialEq)]
pub enum WallObjectKind {
    Socket(SocketState),
    Door,
}

impl WallObjectKind {
    #[inline]
    pub fn object_type(&self) -> ObjectType {
        match self {
            WallObjectKind::Socket(_) => ObjectType::Socket,
            WallObjectKind::Door => ObjectType::Door,
        }
    }
}

/// A socket or door on a wall.
#[derive(Debug)]
pub struct WallObject {
    kind: WallObjectKind,
    wall: usize,
    position: f64,
    height: f64,
    z_offset: Option<f64>,
    transform: Isometry3<f64>,
    is_ghost: bool,
    selected: bool,
    hovered: bool,
    material: Material,
    baseline_color: Option<u32>,
    socket_color: u32,
    highlight: HighlightParams,
    shape: BoxShape,
}

impl WallObject {
    /// Builds the object's mesh. The transform is set by the first
    /// [`apply_placement`](Self::apply_placement).
    pub fn build(
        backend: &mut dyn RenderBackend,
        kind: WallObjectKind,
        wall: usize,
        is_ghost: bool,
        params: &Params,
    ) -> Self {
        let ty = kind.object_type();
        let mut material = ty.base_material(params, is_ghost);
        if let WallObjectKind::Socket(socket) = &kind {
            material.color = socket.device_type.housing_color(params.socket.color);
        }
        let shape = BoxShape::outlined(backend, ty.box_size(params), &material, params.highlight.outline_color);
        Self {
            kind,
            wall,
            position: 0.5,
            height: ty.default_height(params),
            z_offset: None,
            transform: Isometry3::identity(),
            is_ghost,
            selected: false,
            hovered: false,
            material,
            baseline_color: None,
            socket_color: params.socket.color,
            highlight: params.highlight,
            shape,
        }
    }

    #[inline]
    pub fn kind(&self) -> &WallObjectKind {
        &self.kind
    }

    #[inline]
    pub fn object_type(&self) -> ObjectType {
        self.kind.object_type()
    }

    /// Index of the wall in the owning room.
    #[inline]
    pub fn wall(&self) -> usize {
        self.wall
    }

    /// Normalized position along the wall, in `[0, 1]`.
    #[inline]
    pub fn position(&self) -> f64 {
        self.position
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[inline]
    pub fn z_offset(&self) -> Option<f64> {
        self.z_offset
    }

    /// Transform relative to the node the mesh is attached to.
    #[inline]
    pub fn transform(&self) -> Isometry3<f64> {
        self.transform
    }

    #[inline]
    pub fn is_ghost(&self) -> bool {
        self.is_ghost
    }

    #[inline]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    #[inline]
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    #[inline]
    pub fn material(&self) -> &Material {
        &self.material
    }

    #[inline]
    pub fn mesh(&self) -> NodeKey {
        self.shape.mesh()
    }

    /// Box extents of the mesh.
    #[inline]
    pub fn size(&self) -> Vector3<f64> {
        self.shape.size()
    }

    pub fn socket(&self) -> Option<&SocketState> {
        match &self.kind {
            WallObjectKind::Socket(s) => Some(s),
            WallObjectKind::Door => None,
        }
    }

    pub fn socket_mut(&mut self) -> Option<&mut SocketState> {
        match &mut self.kind {
            WallObjectKind::Socket(s) => Some(s),
            WallObjectKind::Door => None,
        }
    }

    /// Stores a computed placement and moves the mesh.
    pub fn apply_placement(&mut self, backend: &mut dyn RenderBackend, placement: &Placement) {
        self.position = placement.position;
        self.height = placement.height;
        self.z_offset = Some(placement.z_offset);
        self.transform = placement.transform;
        self.shape.set_transform(backend, &self.transform);
    }

    /// Sets the requested normalized position without moving the mesh.
    pub(crate) fn set_requested_position(&mut self, position: f64) {
        self.position = position;
    }

    /// Forgets the stored offset so the next placement derives it again.
    pub(crate) fn clear_z_offset(&mut self) {
        self.z_offset = None;
    }

    /// Replaces the mesh with a fresh one carrying the current material,
    /// attached to `parent`, and releases the old one.
    pub fn reissue(&mut self, backend: &mut dyn RenderBackend, parent: Option<NodeKey>) {
        let fresh = BoxShape::outlined(backend, self.shape.size(), &self.material, self.highlight.outline_color);
        let old = std::mem::replace(&mut self.shape, fresh);
        old.release(backend);
        backend.attach(parent, self.shape.mesh());
        self.shape.set_transform(backend, &self.transform);
    }

    /// Color the object shows when not highlighted.
    fn resting_color(&self) -> u32 {
        match &self.kind {
            WallObjectKind::Socket(s) => s.device_type.housing_color(self.socket_color),
            WallObjectKind::Door => self.material.color,
        }
    }

    /// Re-applies the device color after a socket change.
    pub fn refresh_appearance(&mut self, backend: &mut dyn RenderBackend) {
        let color = self.resting_color();
        if self.selected {
            self.baseline_color = Some(color);
        } else {
            self.material.color = color;
            self.shape.set_material(backend, &self.material);
        }
    }

    /// Highlights the object. Selecting twice changes nothing.
    pub fn select(&mut self, backend: &mut dyn RenderBackend) {
        if self.selected {
            return;
        }
        if self.baseline_color.is_none() {
            self.baseline_color = Some(self.material.color);
        }
        self.material.color = self.highlight.selected_color;
        self.material.emissive = self.highlight.selected_emissive;
        self.material.emissive_intensity = self.highlight.selected_emissive_intensity;
        self.selected = true;
        self.hovered = false;
        self.shape.set_material(backend, &self.material);
    }

    /// Restores the baseline color and turns the glow off.
    pub fn deselect(&mut self, backend: &mut dyn RenderBackend) {
        if !self.selected {
            return;
        }
        if let Some(color) = self.baseline_color.take() {
            self.material.color = color;
        }
        self.material.emissive = 0x000000;
        self.material.emissive_intensity = 1.0;
        self.selected = false;
        self.shape.set_material(backend, &self.material);
    }

    /// Hover glow. Ignored on selected objects.
    pub fn hover(&mut self, backend: &mut dyn RenderBackend) {
        if self.selected || self.hovered {
            return;
        }
        self.material.emissive = self.highlight.hover_emissive;
        self.material.emissive_intensity = self.highlight.hover_emissive_intensity;
        self.hovered = true;
        self.shape.set_material(backend, &self.material);
    }

    pub fn unhover(&mut self, backend: &mut dyn RenderBackend) {
        if !self.hovered {
            return;
        }
        self.material.emissive = 0x000000;
        self.material.emissive_intensity = 1.0;
        self.hovered = false;
        self.shape.set_material(backend, &self.material);
    }

    pub fn set_outline_visible(&self, backend: &mut dyn RenderBackend, visible: bool) {
        self.shape.set_outline_visible(backend, visible);
    }

    pub fn release(self, backend: &mut dyn RenderBackend) {
        self.shape.release(backend);
    }
}

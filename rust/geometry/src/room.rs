// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room geometry manager.
//!
//! A [`Room`] owns four walls, a floor slab, four corner markers and an
//! ordered list of wall objects, all parented to one group node placed at
//! the room center. Object transforms are stored relative to that group.
//!
//! Every dimension change keeps the layout consistent: walls are re-anchored
//! and their geometry replaced, the floor resized, the markers regenerated,
//! and each wall object re-issued on a fresh mesh at the same normalized
//! position. Each replaced handle is released exactly once.

use nalgebra::{Isometry3, Point3, Translation3, Vector3};
use roomplan_core::{NodeKey, Params, RenderBackend, WallObjectKey};
use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::floor::Floor;
use crate::marker::ResizeMarker;
use crate::placement::{compute_transform, socket_z_offset, Placement, PlacementRequest};
use crate::wall::{Wall, WallGeometry};
use crate::wall_object::{DeviceType, SocketState, WallObject, WallObjectKind};

/// Room size used when nothing else can be inferred.
pub const FALLBACK_SIZE: f64 = 4.0;

/// Wall height of a room built without one.
pub const DEFAULT_WALL_HEIGHT: f64 = 2.5;

/// Everything needed to build a room.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomLayout {
    /// Room center; `y` is ignored.
    pub position: Point3<f64>,
    pub walls: Vec<WallGeometry>,
    /// Floor box extents, used to infer the size when none is given.
    pub floor_size: Option<Vector3<f64>>,
    pub width: Option<f64>,
    pub depth: Option<f64>,
    pub wall_height: Option<f64>,
}

fn is_positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

pub(crate) fn check_dimensions(width: f64, depth: f64) -> Result<()> {
    if is_positive(width) && is_positive(depth) {
        Ok(())
    } else {
        Err(Error::InvalidDimensions { width, depth })
    }
}

pub(crate) fn check_wall_height(height: f64) -> Result<()> {
    if is_positive(height) {
        Ok(())
    } else {
        Err(Error::InvalidWallHeight(height))
    }
}

/// Outer extent of a set of walls along one axis, including thickness.
fn outer_extent(walls: &[WallGeometry], axis: usize) -> Option<f64> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for w in walls {
        let half = w.thickness() / 2.0;
        min = min.min(w.position[axis] - half);
        max = max.max(w.position[axis] + half);
    }
    let extent = max - min;
    is_positive(extent).then_some(extent)
}

/// Infers `(width, depth)` from a floor box, or from the walls.
///
/// Falls back to 4 x 4 when neither gives a usable size.
pub fn infer_dimensions(walls: &[WallGeometry], floor_size: Option<&Vector3<f64>>) -> (f64, f64) {
    if let Some(size) = floor_size {
        if is_positive(size.x) && is_positive(size.z) {
            return (size.x, size.z);
        }
    }

    let span_of = |depth_side: bool| {
        walls
            .iter()
            .find(|w| w.side.spans_depth() == depth_side)
            .map(|w| w.span())
            .filter(|s| is_positive(*s))
    };
    let width = span_of(false).or_else(|| outer_extent(walls, 0));
    let depth = span_of(true).or_else(|| outer_extent(walls, 2));

    match (width, depth) {
        (Some(w), Some(d)) => (w, d),
        _ => {
            tracing::warn!(walls = walls.len(), "could not infer room size, using defaults");
            (FALLBACK_SIZE, FALLBACK_SIZE)
        }
    }
}

/// A rectangular room.
#[derive(Debug)]
pub struct Room {
    group: NodeKey,
    position: Point3<f64>,
    width: f64,
    depth: f64,
    wall_height: f64,
    walls: Vec<Wall>,
    floor: Floor,
    markers: Vec<ResizeMarker>,
    objects: SlotMap<WallObjectKey, WallObject>,
    order: Vec<WallObjectKey>,
    params: Params,
    sockets_created: u32,
}

impl Room {
    /// Builds a room from a layout.
    ///
    /// All validation happens before the first render handle is created, so
    /// an error leaves the backend untouched.
    pub fn assemble(backend: &mut dyn RenderBackend, params: &Params, layout: RoomLayout) -> Result<Self> {
        if layout.walls.len() != 4 {
            return Err(Error::WallCount(layout.walls.len()));
        }
        let (width, depth) = match (layout.width, layout.depth) {
            (Some(w), Some(d)) => (w, d),
            (w, d) => {
                let (inferred_w, inferred_d) = infer_dimensions(&layout.walls, layout.floor_size.as_ref());
                (w.unwrap_or(inferred_w), d.unwrap_or(inferred_d))
            }
        };
        check_dimensions(width, depth)?;
        let wall_height = layout.wall_height.unwrap_or_else(|| {
            let h = layout.walls[0].height();
            if is_positive(h) {
                h
            } else {
                DEFAULT_WALL_HEIGHT
            }
        });
        check_wall_height(wall_height)?;
        let position = Point3::new(layout.position.x, 0.0, layout.position.z);

        let group = backend.create_group();
        backend.set_transform(group, &Isometry3::from(Translation3::from(position.coords)));

        let walls: Vec<Wall> = layout
            .walls
            .into_iter()
            .map(|geometry| {
                let wall = Wall::build(backend, geometry, params);
                backend.attach(Some(group), wall.mesh());
                wall
            })
            .collect();

        let floor = Floor::build(backend, width, depth, params);
        backend.attach(Some(group), floor.mesh());

        let mut room = Self {
            group,
            position,
            width,
            depth,
            wall_height,
            walls,
            floor,
            markers: Vec::new(),
            objects: SlotMap::with_key(),
            order: Vec::new(),
            params: *params,
            sockets_created: 0,
        };
        room.rebuild_markers(backend);

        tracing::debug!(width, depth, wall_height, x = position.x, z = position.z, "room assembled");
        Ok(room)
    }

    fn rebuild_markers(&mut self, backend: &mut dyn RenderBackend) {
        for marker in self.markers.drain(..) {
            marker.release(backend);
        }
        self.markers = ResizeMarker::build_all(backend, self.width, self.depth, &self.params);
        for marker in &self.markers {
            backend.attach(Some(self.group), marker.mesh());
        }
    }

    /// Group node every part of the room hangs from.
    #[inline]
    pub fn group(&self) -> NodeKey {
        self.group
    }

    /// Room center on the ground plane.
    #[inline]
    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn depth(&self) -> f64 {
        self.depth
    }

    /// The last accepted `(width, depth)`.
    #[inline]
    pub fn size(&self) -> (f64, f64) {
        (self.width, self.depth)
    }

    #[inline]
    pub fn wall_height(&self) -> f64 {
        self.wall_height
    }

    #[inline]
    pub fn params(&self) -> &Params {
        &self.params
    }

    #[inline]
    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn wall(&self, index: usize) -> Result<&Wall> {
        self.walls.get(index).ok_or(Error::WallNotFound {
            index,
            count: self.walls.len(),
        })
    }

    #[inline]
    pub fn floor(&self) -> &Floor {
        &self.floor
    }

    #[inline]
    pub fn markers(&self) -> &[ResizeMarker] {
        &self.markers
    }

    /// Room-local to world.
    pub fn frame(&self) -> Isometry3<f64> {
        Isometry3::from(Translation3::from(self.position.coords))
    }

    /// Wall-local to world.
    pub fn wall_world_frame(&self, index: usize) -> Result<Isometry3<f64>> {
        Ok(self.frame() * self.wall(index)?.geometry().frame())
    }

    /// Index of the wall whose mesh is `mesh`.
    pub fn wall_index_of(&self, mesh: NodeKey) -> Option<usize> {
        self.walls.iter().position(|w| w.mesh() == mesh)
    }

    /// Moves the room center on the ground plane.
    pub fn set_position(&mut self, backend: &mut dyn RenderBackend, x: f64, z: f64) -> Result<()> {
        if !x.is_finite() || !z.is_finite() {
            return Err(Error::InvalidPosition { x, z });
        }
        self.position = Point3::new(x, 0.0, z);
        backend.set_transform(self.group, &self.frame());
        Ok(())
    }

    /// Resizes the room and re-lays out everything in it.
    ///
    /// Rejects non-finite or non-positive sizes and leaves the room as it
    /// was.
    pub fn set_size(&mut self, backend: &mut dyn RenderBackend, width: f64, depth: f64) -> Result<()> {
        check_dimensions(width, depth)?;
        tracing::debug!(
            from_width = self.width,
            from_depth = self.depth,
            width,
            depth,
            objects = self.order.len(),
            "resizing room"
        );
        self.width = width;
        self.depth = depth;

        for wall in &mut self.walls {
            wall.relayout(backend, width, depth, self.wall_height);
        }
        self.floor.resize(backend, width, depth);
        self.rebuild_markers(backend);

        for key in self.order.clone() {
            if let Some(object) = self.objects.get_mut(key) {
                if object.socket().is_some() {
                    object.clear_z_offset();
                }
                object.reissue(backend, Some(self.group));
            }
            self.place(backend, key)?;
        }
        Ok(())
    }

    /// Changes the wall height and re-places doors.
    pub fn set_wall_height(&mut self, backend: &mut dyn RenderBackend, height: f64) -> Result<()> {
        check_wall_height(height)?;
        tracing::debug!(from = self.wall_height, to = height, "changing wall height");
        self.wall_height = height;
        for wall in &mut self.walls {
            wall.relayout(backend, self.width, self.depth, height);
        }
        let doors: Vec<WallObjectKey> = self
            .order
            .iter()
            .copied()
            .filter(|k| self.objects.get(*k).is_some_and(|o| o.socket().is_none()))
            .collect();
        for key in doors {
            self.place(backend, key)?;
        }
        Ok(())
    }

    /// Recomputes one object's transform from its wall.
    fn place(&mut self, backend: &mut dyn RenderBackend, key: WallObjectKey) -> Result<Placement> {
        let object = self.objects.get(key).ok_or(Error::ObjectNotFound(key))?;
        let wall = *self.wall(object.wall())?.geometry();
        let z_offset = match object.socket() {
            Some(socket) => object
                .z_offset()
                .or_else(|| Some(socket_z_offset(&wall, Some(&Point3::origin()), socket.depth))),
            None => object.z_offset(),
        };
        let request = PlacementRequest::on_wall(&wall, object.object_type(), object.position(), object.height(), z_offset);
        let placement = compute_transform(&request, &self.params);
        if let Some(object) = self.objects.get_mut(key) {
            object.apply_placement(backend, &placement);
        }
        Ok(placement)
    }

    /// Adds a wall object at a normalized position on wall `wall`.
    pub fn add_wall_object(
        &mut self,
        backend: &mut dyn RenderBackend,
        kind: WallObjectKind,
        wall: usize,
        position: f64,
    ) -> Result<WallObjectKey> {
        self.wall(wall)?;
        let mut object = WallObject::build(backend, kind, wall, false, &self.params);
        object.set_requested_position(position);
        backend.attach(Some(self.group), object.mesh());
        let ty = object.object_type();
        let key = self.objects.insert(object);
        self.order.push(key);
        let placement = self.place(backend, key)?;
        tracing::debug!(object_type = %ty, wall, position = placement.position, "wall object added");
        Ok(key)
    }

    /// Adds a socket named `Socket N`. `socket_depth` defaults to the
    /// configured housing depth.
    pub fn add_socket(
        &mut self,
        backend: &mut dyn RenderBackend,
        wall: usize,
        position: f64,
        socket_depth: Option<f64>,
    ) -> Result<WallObjectKey> {
        self.wall(wall)?;
        let depth = socket_depth
            .filter(|d| is_positive(*d))
            .unwrap_or(self.params.socket.depth);
        self.sockets_created += 1;
        let state = SocketState::new(format!("Socket {}", self.sockets_created), depth);
        self.add_wall_object(backend, WallObjectKind::Socket(state), wall, position)
    }

    /// Moves the `Socket N` counter past every socket already named that way.
    pub(crate) fn seed_socket_counter(&mut self) {
        let highest = self
            .objects
            .values()
            .filter_map(|o| o.socket())
            .filter_map(|s| s.name.strip_prefix("Socket ")?.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        self.sockets_created = self.sockets_created.max(highest);
    }

    pub fn add_door(&mut self, backend: &mut dyn RenderBackend, wall: usize, position: f64) -> Result<WallObjectKey> {
        self.add_wall_object(backend, WallObjectKind::Door, wall, position)
    }

    /// Removes an object and releases its mesh.
    pub fn remove_wall_object(&mut self, backend: &mut dyn RenderBackend, key: WallObjectKey) -> Result<()> {
        let object = self.objects.remove(key).ok_or(Error::ObjectNotFound(key))?;
        self.order.retain(|k| *k != key);
        object.release(backend);
        Ok(())
    }

    pub fn wall_object(&self, key: WallObjectKey) -> Option<&WallObject> {
        self.objects.get(key)
    }

    pub fn wall_object_mut(&mut self, key: WallObjectKey) -> Option<&mut WallObject> {
        self.objects.get_mut(key)
    }

    /// Objects in insertion order.
    pub fn wall_objects(&self) -> impl Iterator<Item = (WallObjectKey, &WallObject)> + '_ {
        self.order
            .iter()
            .filter_map(move |k| self.objects.get(*k).map(|o| (*k, o)))
    }

    #[inline]
    pub fn object_count(&self) -> usize {
        self.order.len()
    }

    /// World transform of an object's mesh.
    pub fn object_world_transform(&self, key: WallObjectKey) -> Option<Isometry3<f64>> {
        self.objects.get(key).map(|o| self.frame() * o.transform())
    }

    /// Moves an object along its wall.
    pub fn set_object_position(
        &mut self,
        backend: &mut dyn RenderBackend,
        key: WallObjectKey,
        position: f64,
    ) -> Result<()> {
        let object = self.objects.get_mut(key).ok_or(Error::ObjectNotFound(key))?;
        object.set_requested_position(position);
        self.place(backend, key)?;
        Ok(())
    }

    fn update_socket<F>(&mut self, backend: &mut dyn RenderBackend, key: WallObjectKey, update: F) -> Result<()>
    where
        F: FnOnce(&mut SocketState),
    {
        let object = self.objects.get_mut(key).ok_or(Error::ObjectNotFound(key))?;
        let socket = object.socket_mut().ok_or(Error::NotASocket(key))?;
        update(socket);
        object.refresh_appearance(backend);
        Ok(())
    }

    pub fn turn_on(&mut self, backend: &mut dyn RenderBackend, key: WallObjectKey) -> Result<()> {
        self.update_socket(backend, key, |s| s.is_on = true)
    }

    pub fn turn_off(&mut self, backend: &mut dyn RenderBackend, key: WallObjectKey) -> Result<()> {
        self.update_socket(backend, key, |s| s.is_on = false)
    }

    pub fn toggle(&mut self, backend: &mut dyn RenderBackend, key: WallObjectKey) -> Result<()> {
        self.update_socket(backend, key, |s| s.is_on = !s.is_on)
    }

    pub fn set_socket_name(
        &mut self,
        backend: &mut dyn RenderBackend,
        key: WallObjectKey,
        name: impl Into<String>,
    ) -> Result<()> {
        let name = name.into();
        self.update_socket(backend, key, move |s| s.name = name)
    }

    pub fn set_device_type(
        &mut self,
        backend: &mut dyn RenderBackend,
        key: WallObjectKey,
        device_type: DeviceType,
    ) -> Result<()> {
        self.update_socket(backend, key, |s| s.device_type = device_type)
    }

    /// Sets the wattage. Negative or non-finite values are stored as 0.
    pub fn set_power_consumption(
        &mut self,
        backend: &mut dyn RenderBackend,
        key: WallObjectKey,
        watts: f64,
    ) -> Result<()> {
        let watts = if watts.is_finite() && watts >= 0.0 {
            watts
        } else {
            tracing::warn!(watts, "invalid power consumption, storing 0");
            0.0
        };
        self.update_socket(backend, key, |s| s.power_consumption = watts)
    }

    /// Releases every render handle the room owns.
    pub fn release(mut self, backend: &mut dyn RenderBackend) {
        for key in std::mem::take(&mut self.order) {
            if let Some(object) = self.objects.remove(key) {
                object.release(backend);
            }
        }
        for marker in self.markers {
            marker.release(backend);
        }
        self.floor.release(backend);
        for wall in self.walls {
            wall.release(backend);
        }
        backend.detach(self.group);
        backend.dispose_node(self.group);
    }
}

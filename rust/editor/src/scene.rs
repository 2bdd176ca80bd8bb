// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene manager: the room collection and wall-object placement mode.
//!
//! Placement runs as a small state machine driven by pointer rays:
//!
//! ```text
//! Idle ──ray hits a wall──▶ Hovering ──type chosen──▶ GhostActive
//!   ▲                                                   │  │
//!   └──── no wall / cancel / commit ◀───────────────────┘  │
//!                         same wall and type: move ghost ◀─┘
//!                         other wall or type: rebuild ghost
//! ```
//!
//! The ghost is a translucent preview object attached at the scene root and
//! owned here. It belongs to no room, so hit testing never sees it.

use nalgebra::Point3;
use roomplan_core::math::snap;
use roomplan_core::{Params, Ray, RenderBackend, RoomKey, WallObjectKey};
use roomplan_geometry::placement::{compute_transform, socket_z_offset, PlacementRequest};
use roomplan_geometry::{ObjectType, Room, RoomRecord, SocketState, WallObject, WallObjectKind};
use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::persistence::ProjectFile;

/// Lowest and highest normalized position a ghost snaps to.
pub const GHOST_POSITION_RANGE: (f64, f64) = (0.05, 0.95);

/// A wall in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WallRef {
    pub room: RoomKey,
    pub wall: usize,
}

/// A wall object in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub room: RoomKey,
    pub object: WallObjectKey,
}

/// Nearest wall along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallHit {
    pub wall: WallRef,
    pub point: Point3<f64>,
    pub distance: f64,
    /// Hit point along the wall, `0` at one end and `1` at the other.
    pub position: f64,
}

/// Placement mode.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PlacementState {
    #[default]
    Idle,
    Hovering { wall: WallRef, position: f64 },
    GhostActive { wall: WallRef, kind: ObjectType, position: f64 },
}

#[derive(Debug)]
struct Ghost {
    wall: WallRef,
    object: WallObject,
}

/// Owns every room and the placement preview.
#[derive(Debug)]
pub struct SceneManager {
    rooms: SlotMap<RoomKey, Room>,
    order: Vec<RoomKey>,
    ghost: Option<Ghost>,
    state: PlacementState,
    params: Params,
    placement_snap: f64,
}

impl SceneManager {
    pub fn new(params: Params) -> Self {
        Self {
            rooms: SlotMap::with_key(),
            order: Vec::new(),
            ghost: None,
            state: PlacementState::Idle,
            params,
            placement_snap: 0.1,
        }
    }

    /// Sets the step ghost positions snap to.
    pub fn with_placement_snap(mut self, step: f64) -> Self {
        self.placement_snap = step;
        self
    }

    #[inline]
    pub fn params(&self) -> &Params {
        &self.params
    }

    #[inline]
    pub fn state(&self) -> PlacementState {
        self.state
    }

    /// Takes ownership of a room and attaches it to the scene root.
    pub fn add_room(&mut self, backend: &mut dyn RenderBackend, room: Room) -> RoomKey {
        backend.attach(None, room.group());
        let key = self.rooms.insert(room);
        self.order.push(key);
        tracing::debug!(?key, rooms = self.order.len(), "room added");
        key
    }

    /// Removes a room and releases everything it owns. A ghost on that room
    /// is discarded too.
    pub fn remove_room(&mut self, backend: &mut dyn RenderBackend, key: RoomKey) -> Result<()> {
        let room = self.rooms.remove(key).ok_or(Error::RoomNotFound(key))?;
        self.order.retain(|k| *k != key);
        if self.ghost.as_ref().is_some_and(|g| g.wall.room == key) {
            self.cancel_placement(backend);
        }
        room.release(backend);
        tracing::debug!(?key, rooms = self.order.len(), "room removed");
        Ok(())
    }

    /// Rooms in insertion order.
    pub fn rooms(&self) -> impl Iterator<Item = (RoomKey, &Room)> + '_ {
        self.order
            .iter()
            .filter_map(move |k| self.rooms.get(*k).map(|r| (*k, r)))
    }

    #[inline]
    pub fn room_count(&self) -> usize {
        self.order.len()
    }

    pub fn room(&self, key: RoomKey) -> Option<&Room> {
        self.rooms.get(key)
    }

    pub fn room_mut(&mut self, key: RoomKey) -> Option<&mut Room> {
        self.rooms.get_mut(key)
    }

    /// Finds the room and index of the wall drawn by `mesh`.
    pub fn find_room_of_wall(&self, mesh: roomplan_core::NodeKey) -> Option<WallRef> {
        self.rooms().find_map(|(room, r)| r.wall_index_of(mesh).map(|wall| WallRef { room, wall }))
    }

    /// Every wall object of every room.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectRef, &WallObject)> + '_ {
        self.rooms().flat_map(|(room, r)| {
            r.wall_objects()
                .map(move |(object, o)| (ObjectRef { room, object }, o))
        })
    }

    pub fn wall_object(&self, obj: ObjectRef) -> Option<&WallObject> {
        self.rooms.get(obj.room)?.wall_object(obj.object)
    }

    pub fn wall_object_mut(&mut self, obj: ObjectRef) -> Option<&mut WallObject> {
        self.rooms.get_mut(obj.room)?.wall_object_mut(obj.object)
    }

    /// Releases every room and the ghost.
    pub fn clear(&mut self, backend: &mut dyn RenderBackend) {
        self.cancel_placement(backend);
        for key in std::mem::take(&mut self.order) {
            if let Some(room) = self.rooms.remove(key) {
                room.release(backend);
            }
        }
    }

    /// Nearest wall hit along `ray` across all rooms.
    ///
    /// Ties keep the first wall met in room, then wall, order.
    pub fn find_wall_by_ray(&self, ray: &Ray) -> Option<WallHit> {
        let mut best: Option<WallHit> = None;
        for (room_key, room) in self.rooms() {
            for (index, wall) in room.walls().iter().enumerate() {
                let frame = room.frame() * wall.geometry().frame();
                let Some(distance) = ray.intersect_box(&frame, &wall.geometry().size) else {
                    continue;
                };
                if best.as_ref().is_some_and(|b| distance >= b.distance) {
                    continue;
                }
                let point = ray.at(distance);
                let local = frame.inverse_transform_point(&point);
                best = Some(WallHit {
                    wall: WallRef {
                        room: room_key,
                        wall: index,
                    },
                    point,
                    distance,
                    position: local.x / wall.geometry().span() + 0.5,
                });
            }
        }
        best
    }

    /// Snaps a raw wall coordinate for ghost placement.
    pub fn snap_position(&self, position: f64) -> f64 {
        let (lo, hi) = GHOST_POSITION_RANGE;
        snap(position, self.placement_snap).clamp(lo, hi)
    }

    /// Advances the placement state machine for a pointer ray. `kind` is the
    /// object type chosen for placement, if any.
    pub fn pointer_moved(
        &mut self,
        backend: &mut dyn RenderBackend,
        ray: &Ray,
        kind: Option<ObjectType>,
    ) -> PlacementState {
        let Some(hit) = self.find_wall_by_ray(ray) else {
            self.cancel_placement(backend);
            return self.state;
        };
        let position = self.snap_position(hit.position);

        self.state = match kind {
            None => {
                self.remove_ghost_object(backend);
                PlacementState::Hovering {
                    wall: hit.wall,
                    position,
                }
            }
            Some(kind) => {
                let reusable = self
                    .ghost
                    .as_ref()
                    .is_some_and(|g| g.wall == hit.wall && g.object.object_type() == kind);
                let result = if reusable {
                    self.update_ghost_object_position(backend, position)
                } else {
                    self.create_ghost_object(backend, hit.wall, kind, position)
                };
                match result {
                    Ok(()) => PlacementState::GhostActive {
                        wall: hit.wall,
                        kind,
                        position,
                    },
                    Err(e) => {
                        tracing::error!(error = %e, "ghost placement failed");
                        self.remove_ghost_object(backend);
                        PlacementState::Idle
                    }
                }
            }
        };
        self.state
    }

    fn place_ghost(&mut self, backend: &mut dyn RenderBackend, position: f64) -> Result<()> {
        let ghost = self
            .ghost
            .as_mut()
            .ok_or_else(|| Error::InvalidState("no ghost object".into()))?;
        let room = self
            .rooms
            .get(ghost.wall.room)
            .ok_or(Error::RoomNotFound(ghost.wall.room))?;
        let wall = *room.wall(ghost.wall.wall)?.geometry();
        let z_offset = ghost
            .object
            .socket()
            .map(|s| socket_z_offset(&wall, Some(&Point3::origin()), s.depth));
        let request = PlacementRequest::on_wall(
            &wall,
            ghost.object.object_type(),
            position,
            ghost.object.height(),
            z_offset,
        )
        .in_frame(&room.frame());
        let placement = compute_transform(&request, &self.params);
        ghost.object.apply_placement(backend, &placement);
        Ok(())
    }

    /// Builds a ghost of `kind` on `wall`, replacing any current ghost.
    pub fn create_ghost_object(
        &mut self,
        backend: &mut dyn RenderBackend,
        wall: WallRef,
        kind: ObjectType,
        position: f64,
    ) -> Result<()> {
        self.remove_ghost_object(backend);
        let room = self.rooms.get(wall.room).ok_or(Error::RoomNotFound(wall.room))?;
        room.wall(wall.wall)?;

        let object_kind = match kind {
            ObjectType::Socket => WallObjectKind::Socket(SocketState::new("", self.params.socket.depth)),
            ObjectType::Door => WallObjectKind::Door,
        };
        let object = WallObject::build(backend, object_kind, wall.wall, true, &self.params);
        backend.attach(None, object.mesh());
        self.ghost = Some(Ghost { wall, object });
        if let Err(e) = self.place_ghost(backend, position) {
            self.remove_ghost_object(backend);
            return Err(e);
        }
        tracing::debug!(object_type = %kind, wall = wall.wall, position, "ghost created");
        Ok(())
    }

    /// Moves the current ghost along its wall.
    pub fn update_ghost_object_position(&mut self, backend: &mut dyn RenderBackend, position: f64) -> Result<()> {
        self.place_ghost(backend, position)
    }

    /// Releases the ghost, if any.
    pub fn remove_ghost_object(&mut self, backend: &mut dyn RenderBackend) {
        if let Some(ghost) = self.ghost.take() {
            ghost.object.release(backend);
        }
    }

    /// Drops the ghost and returns to `Idle`.
    pub fn cancel_placement(&mut self, backend: &mut dyn RenderBackend) {
        self.remove_ghost_object(backend);
        self.state = PlacementState::Idle;
    }

    /// The ghost's wall and object, if one is active.
    pub fn ghost(&self) -> Option<(WallRef, &WallObject)> {
        self.ghost.as_ref().map(|g| (g.wall, &g.object))
    }

    /// Turns the ghost into a real object on its wall.
    ///
    /// The ghost is discarded whether or not the object could be built.
    pub fn place_ghost_object(&mut self, backend: &mut dyn RenderBackend) -> Result<ObjectRef> {
        let ghost = self
            .ghost
            .take()
            .ok_or_else(|| Error::InvalidState("no ghost object to place".into()))?;
        self.state = PlacementState::Idle;

        let wall = ghost.wall;
        let position = ghost.object.position();
        let socket_depth = ghost.object.socket().map(|s| s.depth);
        let kind = ghost.object.object_type();
        ghost.object.release(backend);

        let Some(room) = self.rooms.get_mut(wall.room) else {
            tracing::error!(room = ?wall.room, "ghost room no longer exists");
            return Err(Error::InvalidState("ghost room no longer exists".into()));
        };
        let object = match kind {
            ObjectType::Socket => room.add_socket(backend, wall.wall, position, socket_depth)?,
            ObjectType::Door => room.add_door(backend, wall.wall, position)?,
        };
        tracing::debug!(object_type = %kind, wall = wall.wall, position, "ghost placed");
        Ok(ObjectRef {
            room: wall.room,
            object,
        })
    }

    /// Records of every room, in order.
    pub fn to_records(&self) -> Vec<RoomRecord> {
        self.rooms().map(|(_, r)| r.to_record()).collect()
    }

    /// Replaces the scene with the rooms of a saved project.
    pub fn load_project(&mut self, backend: &mut dyn RenderBackend, project: &ProjectFile) -> Result<Vec<RoomKey>> {
        let keys = self.load_rooms(backend, &project.rooms)?;
        tracing::info!(name = %project.name, rooms = keys.len(), "project loaded");
        Ok(keys)
    }

    /// Replaces the scene with rooms rebuilt from records.
    ///
    /// Every room is rebuilt before the current scene is touched. If any
    /// record fails, the rooms already rebuilt are released and the scene
    /// stays as it was.
    pub fn load_rooms(&mut self, backend: &mut dyn RenderBackend, records: &[RoomRecord]) -> Result<Vec<RoomKey>> {
        let mut built = Vec::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            match Room::from_record(backend, &self.params, record) {
                Ok(room) => built.push(room),
                Err(e) => {
                    tracing::error!(room = i, error = %e, "project load aborted");
                    for room in built {
                        room.release(backend);
                    }
                    return Err(e.into());
                }
            }
        }
        self.clear(backend);
        Ok(built.into_iter().map(|room| self.add_room(backend, room)).collect())
    }
}

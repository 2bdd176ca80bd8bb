// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON records for rooms.
//!
//! The record mirrors what saved project files contain: room size, center,
//! the four wall panels with their Euler rotation, and the wall objects
//! referencing walls by index. Reading a record validates it completely
//! before any render handle is created.

use nalgebra::{Point3, Vector3};
use roomplan_core::math::rotation_from_euler_xyz;
use roomplan_core::{Params, RenderBackend};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::room::{check_dimensions, check_wall_height, Room, RoomLayout, FALLBACK_SIZE};
use crate::wall::{yaw_of, WallGeometry, WallSide};
use crate::wall_object::{DeviceType, WallObjectKind};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3Record {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3Record {
    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<Point3<f64>> for Vec3Record {
    fn from(p: Point3<f64>) -> Self {
        Self { x: p.x, y: p.y, z: p.z }
    }
}

impl From<Vec3Record> for Point3<f64> {
    fn from(v: Vec3Record) -> Self {
        Point3::new(v.x, v.y, v.z)
    }
}

/// A wall panel: room-local center, Euler XYZ rotation and box extents
/// (`depth` is the thickness).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallRecord {
    pub position: Vec3Record,
    pub rotation: Vec3Record,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocketRecord {
    pub position: f64,
    pub wall_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<DeviceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_on: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_consumption: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoorRecord {
    pub position: f64,
    pub wall_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WallObjectRecord {
    Socket(SocketRecord),
    Door(DoorRecord),
}

impl WallObjectRecord {
    pub fn wall_index(&self) -> usize {
        match self {
            WallObjectRecord::Socket(s) => s.wall_index,
            WallObjectRecord::Door(d) => d.wall_index,
        }
    }

    pub fn position(&self) -> f64 {
        match self {
            WallObjectRecord::Socket(s) => s.position,
            WallObjectRecord::Door(d) => d.position,
        }
    }
}

/// A saved room. `height` is the depth along Z.
///
/// Missing sizes are inferred from the walls when the room is rebuilt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRecord {
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub wall_height: Option<f64>,
    pub position: Vec3Record,
    pub walls: Vec<WallRecord>,
    #[serde(default)]
    pub wall_objects: Vec<WallObjectRecord>,
}

impl RoomRecord {
    /// Checks everything [`Room::from_record`] relies on.
    pub fn validate(&self) -> Result<()> {
        // Absent sizes are inferred after the walls are checked.
        check_dimensions(
            self.width.unwrap_or(FALLBACK_SIZE),
            self.height.unwrap_or(FALLBACK_SIZE),
        )?;
        if let Some(height) = self.wall_height {
            check_wall_height(height)?;
        }
        if !self.position.is_finite() {
            return Err(Error::Serialization("room position is not finite".into()));
        }
        if self.walls.len() != 4 {
            return Err(Error::WallCount(self.walls.len()));
        }
        for (i, wall) in self.walls.iter().enumerate() {
            if !wall.position.is_finite() || !wall.rotation.is_finite() {
                return Err(Error::Serialization(format!("wall {i} has a non-finite transform")));
            }
            for extent in [wall.width, wall.height, wall.depth] {
                if !(extent.is_finite() && extent > 0.0) {
                    return Err(Error::Serialization(format!("wall {i} has an invalid size {extent}")));
                }
            }
        }
        let mut sides = Vec::with_capacity(4);
        for (i, wall) in self.wall_geometries().into_iter().enumerate() {
            if sides.contains(&wall.side) {
                return Err(Error::Serialization(format!("wall {i} repeats the {:?} side", wall.side)));
            }
            sides.push(wall.side);
        }
        for (i, object) in self.wall_objects.iter().enumerate() {
            let index = object.wall_index();
            if index >= self.walls.len() {
                return Err(Error::WallNotFound {
                    index,
                    count: self.walls.len(),
                });
            }
            if !object.position().is_finite() {
                return Err(Error::Serialization(format!("wall object {i} has a non-finite position")));
            }
            if let WallObjectRecord::Socket(SocketRecord {
                power_consumption: Some(watts),
                ..
            }) = object
            {
                if !watts.is_finite() {
                    return Err(Error::Serialization(format!("socket {i} has a non-finite power draw")));
                }
            }
        }
        Ok(())
    }

    fn wall_geometries(&self) -> Vec<WallGeometry> {
        self.walls
            .iter()
            .map(|w| {
                let rotation = rotation_from_euler_xyz(w.rotation.x, w.rotation.y, w.rotation.z);
                let position = Point3::from(w.position);
                WallGeometry {
                    side: WallSide::classify(&position, &rotation),
                    yaw: yaw_of(&rotation),
                    position,
                    size: Vector3::new(w.width, w.height, w.depth),
                }
            })
            .collect()
    }
}

impl Room {
    /// Captures the room as a record.
    pub fn to_record(&self) -> RoomRecord {
        let walls = self
            .walls()
            .iter()
            .map(|wall| {
                let g = wall.geometry();
                WallRecord {
                    position: g.position.into(),
                    rotation: Vec3Record {
                        x: 0.0,
                        y: g.yaw,
                        z: 0.0,
                    },
                    width: g.size.x,
                    height: g.size.y,
                    depth: g.size.z,
                }
            })
            .collect();

        let wall_objects = self
            .wall_objects()
            .map(|(_, object)| match object.kind() {
                WallObjectKind::Socket(s) => WallObjectRecord::Socket(SocketRecord {
                    position: object.position(),
                    wall_index: object.wall(),
                    name: Some(s.name.clone()),
                    device_type: Some(s.device_type),
                    is_on: Some(s.is_on),
                    power_consumption: Some(s.power_consumption),
                }),
                WallObjectKind::Door => WallObjectRecord::Door(DoorRecord {
                    position: object.position(),
                    wall_index: object.wall(),
                }),
            })
            .collect();

        RoomRecord {
            width: Some(self.width()),
            height: Some(self.depth()),
            wall_height: Some(self.wall_height()),
            position: self.position().into(),
            walls,
            wall_objects,
        }
    }

    /// Rebuilds a room from a record.
    ///
    /// On error nothing is left allocated in the backend.
    pub fn from_record(backend: &mut dyn RenderBackend, params: &Params, record: &RoomRecord) -> Result<Room> {
        record.validate()?;
        let layout = RoomLayout {
            position: record.position.into(),
            walls: record.wall_geometries(),
            floor_size: None,
            width: record.width,
            depth: record.height,
            wall_height: record.wall_height,
        };
        let mut room = Room::assemble(backend, params, layout)?;
        if let Err(e) = room.replay_objects(backend, &record.wall_objects) {
            tracing::error!(error = %e, "failed to restore wall objects");
            room.release(backend);
            return Err(e);
        }
        tracing::debug!(objects = record.wall_objects.len(), "room restored");
        Ok(room)
    }

    fn replay_objects(&mut self, backend: &mut dyn RenderBackend, objects: &[WallObjectRecord]) -> Result<()> {
        for object in objects {
            match object {
                WallObjectRecord::Door(d) => {
                    self.add_door(backend, d.wall_index, d.position)?;
                }
                WallObjectRecord::Socket(s) => {
                    let key = self.add_socket(backend, s.wall_index, s.position, None)?;
                    if let Some(name) = &s.name {
                        self.set_socket_name(backend, key, name.clone())?;
                    }
                    if let Some(device_type) = s.device_type {
                        self.set_device_type(backend, key, device_type)?;
                    }
                    if s.is_on == Some(true) {
                        self.turn_on(backend, key)?;
                    }
                    if let Some(watts) = s.power_consumption {
                        self.set_power_consumption(backend, key, watts)?;
                    }
                }
            }
        }
        self.seed_socket_counter();
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_record()).map_err(|e| Error::Serialization(e.to_string()))
    }

    pub fn from_json(backend: &mut dyn RenderBackend, params: &Params, json: &str) -> Result<Room> {
        let record: RoomRecord = serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        Room::from_record(backend, params, &record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::create_room;
    use approx::assert_relative_eq;
    use roomplan_core::MemoryRenderer;
    use std::f64::consts::PI;

    fn sample(r: &mut MemoryRenderer) -> Room {
        let mut room = create_room(r, &Params::default(), &Point3::new(2.0, 0.0, -1.0), 5.0, 3.0, 2.7).unwrap();
        let socket = room.add_socket(r, 1, 0.3, None).unwrap();
        room.set_device_type(r, socket, DeviceType::Media).unwrap();
        room.set_power_consumption(r, socket, 40.0).unwrap();
        room.turn_on(r, socket).unwrap();
        room.add_door(r, 0, 0.7).unwrap();
        room
    }

    #[test]
    fn json_uses_camel_case_and_type_tags() {
        let mut r = MemoryRenderer::new();
        let room = sample(&mut r);
        let value: serde_json::Value = serde_json::from_str(&room.to_json().unwrap()).unwrap();
        assert_eq!(value["wallHeight"], 2.7);
        assert_eq!(value["wallObjects"][0]["type"], "socket");
        assert_eq!(value["wallObjects"][0]["wallIndex"], 1);
        assert_eq!(value["wallObjects"][0]["deviceType"], "media");
        assert_eq!(value["wallObjects"][0]["isOn"], true);
        assert_eq!(value["wallObjects"][1]["type"], "door");
        assert_eq!(value["walls"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn round_trip_preserves_layout() {
        let mut r = MemoryRenderer::new();
        let room = sample(&mut r);
        let json = room.to_json().unwrap();
        let restored = Room::from_json(&mut r, &Params::default(), &json).unwrap();

        assert_eq!(restored.size(), room.size());
        assert_eq!(restored.wall_height(), room.wall_height());
        assert_eq!(restored.position(), room.position());
        let before: Vec<_> = room.wall_objects().map(|(_, o)| (o.object_type(), o.wall(), o.position())).collect();
        let after: Vec<_> = restored.wall_objects().map(|(_, o)| (o.object_type(), o.wall(), o.position())).collect();
        assert_eq!(before, after);

        let socket = restored.wall_objects().next().unwrap().1.socket().unwrap().clone();
        assert_eq!(socket.device_type, DeviceType::Media);
        assert!(socket.is_on);
        assert_eq!(socket.power_consumption, 40.0);
        assert_eq!(socket.name, "Socket 1");

        let sides: Vec<_> = restored.walls().iter().map(|w| w.side()).collect();
        assert_eq!(sides, WallSide::ALL.to_vec());
    }

    #[test]
    fn back_wall_saved_as_flipped_euler() {
        let mut r = MemoryRenderer::new();
        let room = sample(&mut r);
        let mut record = room.to_record();
        record.walls[2].rotation = Vec3Record { x: PI, y: 0.0, z: PI };
        let restored = Room::from_record(&mut r, &Params::default(), &record).unwrap();
        assert_eq!(restored.walls()[2].side(), WallSide::Back);
        assert_relative_eq!(restored.walls()[2].geometry().yaw, PI);
    }

    #[test]
    fn corrupt_records_leave_nothing_behind() {
        let mut r = MemoryRenderer::new();
        let room = sample(&mut r);
        let record = room.to_record();
        room.release(&mut r);
        assert_eq!(r.live_node_count(), 0);

        let mut bad_index = record.clone();
        bad_index.wall_objects.push(WallObjectRecord::Door(DoorRecord {
            position: 0.5,
            wall_index: 4,
        }));
        assert!(matches!(
            Room::from_record(&mut r, &Params::default(), &bad_index),
            Err(Error::WallNotFound { index: 4, .. })
        ));

        let mut three_walls = record.clone();
        three_walls.walls.pop();
        assert!(matches!(
            Room::from_record(&mut r, &Params::default(), &three_walls),
            Err(Error::WallCount(3))
        ));

        let mut bad_width = record;
        bad_width.width = Some(-1.0);
        assert!(Room::from_record(&mut r, &Params::default(), &bad_width).is_err());

        assert!(Room::from_json(&mut r, &Params::default(), "{\"width\": 4").is_err());
        assert_eq!(r.live_node_count(), 0);
        assert_eq!(r.live_geometry_count(), 0);
    }

    #[test]
    fn out_of_range_positions_are_clamped_on_load() {
        let mut r = MemoryRenderer::new();
        let room = sample(&mut r);
        let mut record = room.to_record();
        record.wall_objects = vec![WallObjectRecord::Door(DoorRecord {
            position: 1.4,
            wall_index: 0,
        })];
        let restored = Room::from_record(&mut r, &Params::default(), &record).unwrap();
        assert_eq!(restored.wall_objects().next().unwrap().1.position(), 1.0);
    }

    #[test]
    fn missing_sizes_are_inferred_from_walls() {
        let mut r = MemoryRenderer::new();
        let room = sample(&mut r);
        let mut value: serde_json::Value = serde_json::from_str(&room.to_json().unwrap()).unwrap();
        let fields = value.as_object_mut().unwrap();
        for key in ["width", "height", "wallHeight"] {
            fields.remove(key);
        }

        let restored = Room::from_json(&mut r, &Params::default(), &value.to_string()).unwrap();
        let (width, depth) = restored.size();
        assert_relative_eq!(width, 5.0, epsilon = 1e-12);
        assert_relative_eq!(depth, 3.0, epsilon = 1e-12);
        assert_relative_eq!(restored.wall_height(), 2.7);
        assert_eq!(restored.wall_objects().count(), 2);

        let record = restored.to_record();
        assert_eq!(record.width, Some(width));
        assert_eq!(record.wall_height, Some(2.7));
    }

    #[test]
    fn walls_on_the_same_side_are_rejected() {
        let mut r = MemoryRenderer::new();
        let room = sample(&mut r);
        let mut record = room.to_record();
        room.release(&mut r);
        record.walls[2] = record.walls[0].clone();

        assert!(matches!(record.validate(), Err(Error::Serialization(_))));
        assert!(matches!(
            Room::from_record(&mut r, &Params::default(), &record),
            Err(Error::Serialization(_))
        ));
        assert_eq!(r.live_node_count(), 0);
    }

    #[test]
    fn restored_socket_names_are_not_reused() {
        let mut r = MemoryRenderer::new();
        let room = sample(&mut r);
        let mut record = room.to_record();
        let socket = |name: &str, wall_index| {
            WallObjectRecord::Socket(SocketRecord {
                position: 0.5,
                wall_index,
                name: Some(name.into()),
                device_type: None,
                is_on: None,
                power_consumption: None,
            })
        };
        record.wall_objects = vec![socket("Socket 1", 0), socket("Socket 5", 1), socket("Kettle", 2)];

        let mut restored = Room::from_record(&mut r, &Params::default(), &record).unwrap();
        let key = restored.add_socket(&mut r, 3, 0.5, None).unwrap();
        assert_eq!(restored.wall_object(key).unwrap().socket().unwrap().name, "Socket 6");
    }

    #[test]
    fn minimal_socket_record_gets_defaults() {
        let json = r#"{ "type": "socket", "position": 0.5, "wallIndex": 0 }"#;
        let record: WallObjectRecord = serde_json::from_str(json).unwrap();
        match record {
            WallObjectRecord::Socket(s) => {
                assert!(s.name.is_none());
                assert!(s.device_type.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}

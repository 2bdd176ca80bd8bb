// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room construction from a center and size, or from two opposite corners.
//!
//! Walls are built in [`WallSide::ALL`] order (front, right, back, left),
//! each facing the room center. Minimum-size policy belongs to the caller.

use nalgebra::Point3;
use roomplan_core::{Params, RenderBackend};

use crate::error::Result;
use crate::room::{check_dimensions, Room, RoomLayout};
use crate::wall::{WallGeometry, WallSide};

/// Builds a room spanning the rectangle between two ground points.
pub fn create_room_from_points(
    backend: &mut dyn RenderBackend,
    params: &Params,
    start: &Point3<f64>,
    end: &Point3<f64>,
    wall_height: f64,
) -> Result<Room> {
    let center = Point3::new((start.x + end.x) / 2.0, 0.0, (start.z + end.z) / 2.0);
    let width = (end.x - start.x).abs();
    let depth = (end.z - start.z).abs();
    create_room(backend, params, &center, width, depth, wall_height)
}

/// Builds a `width` x `depth` room centered on `center`.
pub fn create_room(
    backend: &mut dyn RenderBackend,
    params: &Params,
    center: &Point3<f64>,
    width: f64,
    depth: f64,
    wall_height: f64,
) -> Result<Room> {
    check_dimensions(width, depth)?;
    let walls = WallSide::ALL
        .iter()
        .map(|&side| WallGeometry::canonical(side, width, depth, wall_height, params.wall.thickness))
        .collect();
    tracing::debug!(width, depth, wall_height, "creating room");
    Room::assemble(
        backend,
        params,
        RoomLayout {
            position: *center,
            walls,
            floor_size: None,
            width: Some(width),
            depth: Some(depth),
            wall_height: Some(wall_height),
        },
    )
}

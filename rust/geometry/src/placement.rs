// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall-relative placement.
//!
//! An object on a wall is described by a normalized coordinate along the
//! wall, a height, and a perpendicular offset. [`compute_transform`] turns
//! that description into a transform in the wall's parent frame:
//!
//! ```text
//! local.x = (position - 0.5) * span
//! local.y = door:   height / 2 - wall_height / 2      (bottom on the floor)
//!           socket: mount_height - wall_height / 2
//! local.z = z_offset, or the type's bias when absent
//! result  = wall_frame * local, rotation copied from the wall
//! ```
//!
//! Nothing here touches the renderer; the room applies the result.

use nalgebra::{Isometry3, Point3, Translation3, Vector3};
use roomplan_core::Params;

use crate::wall::WallGeometry;
use crate::wall_object::ObjectType;

/// Non-fatal corrections made while placing an object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementWarning {
    /// The requested height was not positive and finite.
    HeightDefaulted { requested: f64, substituted: f64 },
}

/// Inputs of a placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRequest {
    /// Wall transform in the frame the result is expressed in.
    pub wall_frame: Isometry3<f64>,
    /// Wall box extents: span, height, thickness.
    pub wall_size: Vector3<f64>,
    pub object_type: ObjectType,
    pub position: f64,
    pub height: f64,
    pub z_offset: Option<f64>,
}

impl PlacementRequest {
    /// A request against a wall, expressed in the wall's room frame.
    pub fn on_wall(
        wall: &WallGeometry,
        object_type: ObjectType,
        position: f64,
        height: f64,
        z_offset: Option<f64>,
    ) -> Self {
        Self {
            wall_frame: wall.frame(),
            wall_size: wall.size,
            object_type,
            position,
            height,
            z_offset,
        }
    }

    /// Re-expresses the request under a parent transform.
    pub fn in_frame(mut self, parent: &Isometry3<f64>) -> Self {
        self.wall_frame = parent * self.wall_frame;
        self
    }
}

/// Result of a placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub transform: Isometry3<f64>,
    /// Clamped normalized position.
    pub position: f64,
    /// Validated height.
    pub height: f64,
    /// Offset actually used.
    pub z_offset: f64,
    pub warning: Option<PlacementWarning>,
}

/// Clamps a normalized wall coordinate to `[0, 1]`. NaN maps to the center.
pub fn clamp_position(position: f64) -> f64 {
    if position.is_nan() {
        0.5
    } else {
        position.clamp(0.0, 1.0)
    }
}

/// Substitutes the type's fallback for a non-positive or non-finite height.
pub fn validate_height(object_type: ObjectType, height: f64, params: &Params) -> (f64, Option<PlacementWarning>) {
    if height.is_finite() && height > 0.0 {
        return (height, None);
    }
    let substituted = object_type.fallback_height(params);
    tracing::warn!(
        object_type = %object_type,
        requested = height,
        substituted,
        "invalid object height, using default"
    );
    (
        substituted,
        Some(PlacementWarning::HeightDefaulted {
            requested: height,
            substituted,
        }),
    )
}

/// Object offset in the wall's local frame.
pub fn local_offset(
    object_type: ObjectType,
    position: f64,
    height: f64,
    z_offset: f64,
    wall_size: &Vector3<f64>,
    params: &Params,
) -> Vector3<f64> {
    let x = (position - 0.5) * wall_size.x;
    let y = match object_type {
        ObjectType::Door => height / 2.0 - wall_size.y / 2.0,
        ObjectType::Socket => params.socket.mount_height - wall_size.y / 2.0,
    };
    Vector3::new(x, y, z_offset)
}

/// Computes where an object sits on a wall.
pub fn compute_transform(request: &PlacementRequest, params: &Params) -> Placement {
    let position = clamp_position(request.position);
    let (height, warning) = validate_height(request.object_type, request.height, params);
    let z_offset = request
        .z_offset
        .filter(|z| z.is_finite())
        .unwrap_or_else(|| request.object_type.default_z_bias(params));

    let local = local_offset(request.object_type, position, height, z_offset, &request.wall_size, params);
    let frame = &request.wall_frame;
    let translation = frame.translation.vector + frame.rotation * local;
    Placement {
        transform: Isometry3::from_parts(Translation3::from(translation), frame.rotation),
        position,
        height,
        z_offset,
        warning,
    }
}

/// Perpendicular offset that puts a socket housing flush on the room side
/// of the wall.
///
/// Positive when the wall normal faces `room_center`, negative otherwise.
/// Without a room center the housing goes on the +Z side.
pub fn socket_z_offset(wall: &WallGeometry, room_center: Option<&Point3<f64>>, socket_depth: f64) -> f64 {
    let offset = wall.thickness() / 2.0 + socket_depth / 2.0;
    match room_center {
        Some(center) if !wall.faces_inward(center) => -offset,
        _ => offset,
    }
}

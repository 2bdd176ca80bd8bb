// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall panels.
//!
//! A wall is a thin box whose local X axis runs along the wall, Y points up
//! and +Z is the wall normal. Its [`WallSide`] is fixed when the wall is
//! built and decides which room dimension it spans and where it is anchored,
//! independently of the yaw actually stored (loaded files may carry a wall
//! turned by half a revolution).

use std::f64::consts::{FRAC_PI_2, PI};

use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};
use roomplan_core::math::{quarter_turns, yaw_rotation};
use roomplan_core::{Material, NodeKey, Params, RenderBackend};
use serde::{Deserialize, Serialize};

use crate::shape::BoxShape;

/// Which side of the room a wall closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallSide {
    /// At -Z, spans the width.
    Front,
    /// At +X, spans the depth.
    Right,
    /// At +Z, spans the width.
    Back,
    /// At -X, spans the depth.
    Left,
}

impl WallSide {
    /// Construction order used by the room factory.
    pub const ALL: [WallSide; 4] = [WallSide::Front, WallSide::Right, WallSide::Back, WallSide::Left];

    /// Yaw the factory gives a wall on this side.
    pub fn canonical_yaw(self) -> f64 {
        match self {
            WallSide::Front => 0.0,
            WallSide::Right => -FRAC_PI_2,
            WallSide::Back => PI,
            WallSide::Left => FRAC_PI_2,
        }
    }

    /// True for the sides that span the room depth.
    #[inline]
    pub fn spans_depth(self) -> bool {
        matches!(self, WallSide::Right | WallSide::Left)
    }

    /// Length of a wall on this side of a `width` x `depth` room.
    #[inline]
    pub fn span(self, width: f64, depth: f64) -> f64 {
        if self.spans_depth() {
            depth
        } else {
            width
        }
    }

    /// Room-local center of a wall on this side.
    pub fn anchor(self, width: f64, depth: f64, wall_height: f64) -> Point3<f64> {
        let y = wall_height / 2.0;
        match self {
            WallSide::Front => Point3::new(0.0, y, -depth / 2.0),
            WallSide::Right => Point3::new(width / 2.0, y, 0.0),
            WallSide::Back => Point3::new(0.0, y, depth / 2.0),
            WallSide::Left => Point3::new(-width / 2.0, y, 0.0),
        }
    }

    /// Infers the side of a wall read back from a file.
    ///
    /// The dominant horizontal axis of the normal tells whether the wall runs
    /// along X or along Z; the sign of its offset from the room center tells
    /// which of the two walls it is. A wall sitting on the center line falls
    /// back to the direction its normal faces.
    pub fn classify(position: &Point3<f64>, rotation: &UnitQuaternion<f64>) -> Self {
        let normal = rotation * Vector3::z();
        if normal.z.abs() >= normal.x.abs() {
            let toward_back = if position.z.abs() > f64::EPSILON {
                position.z > 0.0
            } else {
                normal.z < 0.0
            };
            if toward_back {
                WallSide::Back
            } else {
                WallSide::Front
            }
        } else {
            let toward_right = if position.x.abs() > f64::EPSILON {
                position.x > 0.0
            } else {
                normal.x < 0.0
            };
            if toward_right {
                WallSide::Right
            } else {
                WallSide::Left
            }
        }
    }
}

/// Snaps a rotation to the nearest quarter-turn yaw in `(-PI, PI]`.
pub fn yaw_of(rotation: &UnitQuaternion<f64>) -> f64 {
    let normal = rotation * Vector3::z();
    match quarter_turns(normal.x.atan2(normal.z)) {
        0 => 0.0,
        1 => FRAC_PI_2,
        2 => PI,
        _ => -FRAC_PI_2,
    }
}

/// Pure description of a wall in room-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallGeometry {
    pub side: WallSide,
    pub yaw: f64,
    pub position: Point3<f64>,
    /// Box extents: span, height, thickness.
    pub size: Vector3<f64>,
}

impl WallGeometry {
    /// The wall the factory builds on `side`.
    pub fn canonical(side: WallSide, width: f64, depth: f64, wall_height: f64, thickness: f64) -> Self {
        Self {
            side,
            yaw: side.canonical_yaw(),
            position: side.anchor(width, depth, wall_height),
            size: Vector3::new(side.span(width, depth), wall_height, thickness),
        }
    }

    #[inline]
    pub fn span(&self) -> f64 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.size.y
    }

    #[inline]
    pub fn thickness(&self) -> f64 {
        self.size.z
    }

    #[inline]
    pub fn rotation(&self) -> UnitQuaternion<f64> {
        yaw_rotation(self.yaw)
    }

    /// Transform from wall-local to room-local coordinates.
    pub fn frame(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.position.coords), self.rotation())
    }

    /// Local +Z in room coordinates.
    pub fn normal(&self) -> Vector3<f64> {
        self.rotation() * Vector3::z()
    }

    /// True when the normal points toward `room_center`.
    pub fn faces_inward(&self, room_center: &Point3<f64>) -> bool {
        let to_wall = self.position - room_center;
        let len = to_wall.norm();
        if len <= f64::EPSILON {
            tracing::warn!(side = ?self.side, "wall centered on the room center");
            return false;
        }
        let dot = self.normal().dot(&(to_wall / len));
        if dot.abs() < 0.1 {
            tracing::warn!(side = ?self.side, dot, "wall normal nearly perpendicular to the room center");
        }
        dot < 0.0
    }

    /// Re-anchors the wall for new room dimensions. The yaw is kept.
    pub fn relayout(&mut self, width: f64, depth: f64, wall_height: f64) {
        self.position = self.side.anchor(width, depth, wall_height);
        self.size.x = self.side.span(width, depth);
        self.size.y = wall_height;
    }
}

/// A wall panel in a room.
#[derive(Debug)]
pub struct Wall {
    geometry: WallGeometry,
    shape: BoxShape,
}

impl Wall {
    /// Builds the panel mesh and places it. The caller attaches it.
    pub fn build(backend: &mut dyn RenderBackend, geometry: WallGeometry, params: &Params) -> Self {
        let material = Material::standard(
            params.wall.color,
            params.wall.opacity,
            params.wall.roughness,
            params.wall.metalness,
        );
        let shape = BoxShape::outlined(backend, geometry.size, &material, params.highlight.outline_color);
        shape.set_transform(backend, &geometry.frame());
        Self { geometry, shape }
    }

    #[inline]
    pub fn geometry(&self) -> &WallGeometry {
        &self.geometry
    }

    #[inline]
    pub fn side(&self) -> WallSide {
        self.geometry.side
    }

    #[inline]
    pub fn mesh(&self) -> NodeKey {
        self.shape.mesh()
    }

    #[inline]
    pub fn shape(&self) -> &BoxShape {
        &self.shape
    }

    /// Moves and resizes the panel for new room dimensions.
    pub fn relayout(&mut self, backend: &mut dyn RenderBackend, width: f64, depth: f64, wall_height: f64) {
        self.geometry.relayout(width, depth, wall_height);
        self.shape.resize(backend, self.geometry.size);
        self.shape.set_transform(backend, &self.geometry.frame());
    }

    pub fn release(self, backend: &mut dyn RenderBackend) {
        self.shape.release(backend);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use roomplan_core::math::rotation_from_euler_xyz;

    #[test]
    fn canonical_walls_face_inward() {
        for side in WallSide::ALL {
            let wall = WallGeometry::canonical(side, 4.0, 6.0, 2.5, 0.1);
            assert!(wall.faces_inward(&Point3::origin()), "{side:?}");
        }
    }

    #[test]
    fn canonical_anchors_and_spans() {
        let front = WallGeometry::canonical(WallSide::Front, 4.0, 6.0, 2.5, 0.1);
        assert_relative_eq!(front.position, Point3::new(0.0, 1.25, -3.0));
        assert_relative_eq!(front.span(), 4.0);

        let right = WallGeometry::canonical(WallSide::Right, 4.0, 6.0, 2.5, 0.1);
        assert_relative_eq!(right.position, Point3::new(2.0, 1.25, 0.0));
        assert_relative_eq!(right.span(), 6.0);
        assert_relative_eq!(right.normal(), Vector3::new(-1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn flipped_wall_faces_outward() {
        let mut back = WallGeometry::canonical(WallSide::Back, 4.0, 4.0, 2.5, 0.1);
        back.yaw = 0.0;
        assert!(!back.faces_inward(&Point3::origin()));
    }

    #[test]
    fn classify_uses_axis_and_offset() {
        for side in WallSide::ALL {
            let wall = WallGeometry::canonical(side, 4.0, 6.0, 2.5, 0.1);
            assert_eq!(WallSide::classify(&wall.position, &wall.rotation()), side);
        }
        // A back wall saved as Euler (PI, 0, PI).
        let rotation = rotation_from_euler_xyz(PI, 0.0, PI);
        assert_eq!(
            WallSide::classify(&Point3::new(0.0, 1.25, 2.0), &rotation),
            WallSide::Back
        );
        assert_relative_eq!(yaw_of(&rotation), PI);
    }

    #[test]
    fn yaw_snaps_to_quarter_turns() {
        assert_relative_eq!(yaw_of(&yaw_rotation(-FRAC_PI_2)), -FRAC_PI_2);
        assert_relative_eq!(yaw_of(&yaw_rotation(FRAC_PI_2 + 0.01)), FRAC_PI_2);
        assert_relative_eq!(yaw_of(&yaw_rotation(0.02)), 0.0);
    }

    #[test]
    fn relayout_keeps_yaw() {
        let mut wall = WallGeometry::canonical(WallSide::Left, 4.0, 4.0, 2.5, 0.1);
        wall.yaw = -FRAC_PI_2;
        wall.relayout(8.0, 5.0, 3.0);
        assert_relative_eq!(wall.yaw, -FRAC_PI_2);
        assert_relative_eq!(wall.position, Point3::new(-4.0, 1.5, 0.0));
        assert_relative_eq!(wall.size, Vector3::new(5.0, 3.0, 0.1));
    }
}

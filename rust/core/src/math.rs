// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Picking math: rays, boxes, camera projection and Euler helpers.
//!
//! All scene elements are boxes with a known size and rigid transform, so
//! hit testing is done analytically here instead of asking the renderer.

use std::f64::consts::FRAC_PI_2;

use nalgebra::{Isometry3, Perspective3, Point2, Point3, Unit, UnitQuaternion, Vector3};

const PARALLEL_EPSILON: f64 = 1e-12;

/// A half-line in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f64>,
    pub direction: Unit<Vector3<f64>>,
}

impl Ray {
    /// Creates a ray, or `None` when `direction` has no length.
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Option<Self> {
        Unit::try_new(direction, PARALLEL_EPSILON).map(|direction| Self { origin, direction })
    }

    /// Returns the point at distance `t` along the ray.
    #[inline]
    pub fn at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction.into_inner() * t
    }

    /// Intersects the ray with a box of `size` centered on `frame`.
    ///
    /// Uses the slab method in the box's local frame. Returns the distance to
    /// the entry point, or to the exit point when the origin is inside.
    pub fn intersect_box(&self, frame: &Isometry3<f64>, size: &Vector3<f64>) -> Option<f64> {
        let inverse = frame.inverse();
        let origin = inverse * self.origin;
        let direction = inverse * self.direction.into_inner();
        let half = size * 0.5;

        let mut t_min = f64::NEG_INFINITY;
        let mut t_max = f64::INFINITY;

        for axis in 0..3 {
            if direction[axis].abs() < PARALLEL_EPSILON {
                if origin[axis] < -half[axis] || origin[axis] > half[axis] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / direction[axis];
            let mut t0 = (-half[axis] - origin[axis]) * inv;
            let mut t1 = (half[axis] - origin[axis]) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        if t_max < 0.0 {
            return None;
        }
        Some(if t_min >= 0.0 { t_min } else { t_max })
    }

    /// Intersects the ray with the horizontal plane at height `y`.
    pub fn intersect_horizontal_plane(&self, y: f64) -> Option<Point3<f64>> {
        let dy = self.direction.y;
        if dy.abs() < PARALLEL_EPSILON {
            return None;
        }
        let t = (y - self.origin.y) / dy;
        (t >= 0.0).then(|| self.at(t))
    }
}

/// An axis-aligned rectangle in normalized device coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl ScreenRect {
    /// Builds the envelope of a set of points, or `None` for an empty set.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point2<f64>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut rect = Self {
            min: first,
            max: first,
        };
        for p in iter {
            rect.min.x = rect.min.x.min(p.x);
            rect.min.y = rect.min.y.min(p.y);
            rect.max.x = rect.max.x.max(p.x);
            rect.max.y = rect.max.y.max(p.y);
        }
        Some(rect)
    }

    /// Inclusive containment test.
    #[inline]
    pub fn contains(&self, p: &Point2<f64>) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// A perspective camera.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    view: Isometry3<f64>,
    projection: Perspective3<f64>,
}

impl Camera {
    /// Creates a camera at `eye` looking at `target` with +Y up.
    ///
    /// `fovy` is the vertical field of view in radians.
    pub fn look_at(
        eye: Point3<f64>,
        target: Point3<f64>,
        fovy: f64,
        aspect: f64,
        znear: f64,
        zfar: f64,
    ) -> Self {
        Self {
            view: Isometry3::look_at_rh(&eye, &target, &Vector3::y()),
            projection: Perspective3::new(aspect, fovy, znear, zfar),
        }
    }

    /// Returns the camera position in world space.
    pub fn eye(&self) -> Point3<f64> {
        self.view.inverse() * Point3::origin()
    }

    /// Projects a world point to normalized device coordinates.
    pub fn project(&self, world: &Point3<f64>) -> Point3<f64> {
        self.projection.project_point(&(self.view * world))
    }

    /// Builds the pick ray through a pointer given in normalized device
    /// coordinates (`[-1, 1]` on both axes, +Y up).
    pub fn ray_from_ndc(&self, ndc: &Point2<f64>) -> Option<Ray> {
        let far = self.projection.unproject_point(&Point3::new(ndc.x, ndc.y, 1.0));
        let eye = self.eye();
        let far_world = self.view.inverse() * far;
        Ray::new(eye, far_world - eye)
    }
}

/// Returns the eight corners of a box of `size` centered at the origin.
pub fn box_corners(size: &Vector3<f64>) -> [Point3<f64>; 8] {
    let h = size * 0.5;
    [
        Point3::new(-h.x, -h.y, -h.z),
        Point3::new(-h.x, -h.y, h.z),
        Point3::new(-h.x, h.y, -h.z),
        Point3::new(-h.x, h.y, h.z),
        Point3::new(h.x, -h.y, -h.z),
        Point3::new(h.x, -h.y, h.z),
        Point3::new(h.x, h.y, -h.z),
        Point3::new(h.x, h.y, h.z),
    ]
}

/// Rotation for intrinsic X-Y-Z Euler angles (the convention saved room
/// files use).
pub fn rotation_from_euler_xyz(x: f64, y: f64, z: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::x_axis(), x)
        * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), y)
        * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), z)
}

/// Rotation about +Y.
#[inline]
pub fn yaw_rotation(yaw: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw)
}

/// Rounds an angle to the nearest quarter turn, returned in `0..4`.
pub fn quarter_turns(angle: f64) -> u8 {
    ((angle / FRAC_PI_2).round() as i64).rem_euclid(4) as u8
}

/// Rounds `value` to the nearest multiple of `step`.
#[inline]
pub fn snap(value: f64, step: f64) -> f64 {
    if step > 0.0 {
        (value / step).round() * step
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn ray_hits_unit_box_front_face() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0)).unwrap();
        let t = ray
            .intersect_box(&Isometry3::identity(), &Vector3::new(1.0, 1.0, 1.0))
            .unwrap();
        assert_relative_eq!(t, 4.5);
    }

    #[test]
    fn ray_misses_box_to_the_side() {
        let ray = Ray::new(Point3::new(2.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0)).unwrap();
        assert!(ray
            .intersect_box(&Isometry3::identity(), &Vector3::new(1.0, 1.0, 1.0))
            .is_none());
    }

    #[test]
    fn ray_respects_box_rotation() {
        // A 4 x 1 x 0.1 panel turned a quarter turn spans Z instead of X.
        let frame = Isometry3::from_parts(Vector3::zeros().into(), yaw_rotation(FRAC_PI_2));
        let size = Vector3::new(4.0, 1.0, 0.1);
        let along_z = Ray::new(Point3::new(5.0, 0.0, 1.5), Vector3::new(-1.0, 0.0, 0.0)).unwrap();
        let along_x = Ray::new(Point3::new(1.5, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0)).unwrap();

        assert_relative_eq!(along_z.intersect_box(&frame, &size).unwrap(), 4.95, epsilon = 1e-9);
        assert!(along_x.intersect_box(&frame, &size).is_none());
    }

    #[test]
    fn box_behind_ray_is_not_hit() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 1.0)).unwrap();
        assert!(ray
            .intersect_box(&Isometry3::identity(), &Vector3::new(1.0, 1.0, 1.0))
            .is_none());
    }

    #[test]
    fn zero_direction_is_rejected() {
        assert!(Ray::new(Point3::origin(), Vector3::zeros()).is_none());
    }

    #[test]
    fn ground_plane_intersection() {
        let ray = Ray::new(Point3::new(1.0, 10.0, 2.0), Vector3::new(0.0, -1.0, 0.0)).unwrap();
        let p = ray.intersect_horizontal_plane(0.0).unwrap();
        assert_relative_eq!(p.x, 1.0);
        assert_relative_eq!(p.y, 0.0);
        assert_relative_eq!(p.z, 2.0);

        let upward = Ray::new(Point3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 1.0, 0.0)).unwrap();
        assert!(upward.intersect_horizontal_plane(0.0).is_none());
    }

    #[test]
    fn camera_center_ray_points_at_target() {
        let camera = Camera::look_at(
            Point3::new(0.0, 0.0, 10.0),
            Point3::origin(),
            PI / 3.0,
            1.0,
            0.1,
            100.0,
        );
        let ray = camera.ray_from_ndc(&Point2::origin()).unwrap();
        assert_relative_eq!(ray.origin.z, 10.0, epsilon = 1e-9);
        assert_relative_eq!(ray.direction.z, -1.0, epsilon = 1e-9);

        let ndc = camera.project(&Point3::origin());
        assert_relative_eq!(ndc.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(ndc.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn projected_point_lies_on_its_pick_ray() {
        let camera = Camera::look_at(
            Point3::new(3.0, 4.0, 8.0),
            Point3::new(0.0, 1.0, 0.0),
            PI / 4.0,
            16.0 / 9.0,
            0.1,
            100.0,
        );
        let world = Point3::new(0.5, 1.2, -0.3);
        let ndc = camera.project(&world);
        let ray = camera.ray_from_ndc(&Point2::new(ndc.x, ndc.y)).unwrap();
        let to_point = (world - ray.origin).normalize();
        assert_relative_eq!(to_point.dot(&ray.direction), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn screen_rect_envelope() {
        let rect = ScreenRect::enclosing([
            Point2::new(0.2, -0.1),
            Point2::new(-0.3, 0.4),
            Point2::new(0.1, 0.0),
        ])
        .unwrap();
        assert_eq!(rect.min, Point2::new(-0.3, -0.1));
        assert_eq!(rect.max, Point2::new(0.2, 0.4));
        assert!(rect.contains(&Point2::new(0.2, 0.4)));
        assert!(!rect.contains(&Point2::new(0.25, 0.0)));
        assert!(ScreenRect::enclosing(Vec::new()).is_none());
    }

    #[test]
    fn euler_back_wall_matches_half_turn_yaw() {
        // A half-turn yaw read back as XYZ Euler angles becomes (PI, 0, PI).
        let from_euler = rotation_from_euler_xyz(PI, 0.0, PI);
        let normal = from_euler * Vector3::z();
        let expected = yaw_rotation(PI) * Vector3::z();
        assert_relative_eq!(normal, expected, epsilon = 1e-12);
    }

    #[test]
    fn quarter_turn_rounding() {
        assert_eq!(quarter_turns(0.0), 0);
        assert_eq!(quarter_turns(FRAC_PI_2 + 1e-6), 1);
        assert_eq!(quarter_turns(-FRAC_PI_2), 3);
        assert_eq!(quarter_turns(PI), 2);
        assert_eq!(quarter_turns(-PI), 2);
    }

    #[test]
    fn snapping() {
        assert_relative_eq!(snap(0.34, 0.1), 0.3, epsilon = 1e-12);
        assert_relative_eq!(snap(1.26, 0.5), 1.5);
        assert_relative_eq!(snap(0.37, 0.0), 0.37);
    }
}

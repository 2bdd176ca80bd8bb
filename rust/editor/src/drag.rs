// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dragging a wall object along its wall.

use roomplan_core::math::snap;
use roomplan_core::{Ray, RenderBackend};

use crate::error::{Error, Result};
use crate::scene::{ObjectRef, SceneManager};

/// Drag positions snap to this step.
pub const DRAG_SNAP: f64 = 0.1;

#[derive(Debug, Default)]
pub struct DragController {
    active: Option<ObjectRef>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts dragging `obj`.
    pub fn start(&mut self, scene: &SceneManager, obj: ObjectRef) -> Result<()> {
        scene.wall_object(obj).ok_or(Error::ObjectNotFound(obj))?;
        self.active = Some(obj);
        Ok(())
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    #[inline]
    pub fn target(&self) -> Option<ObjectRef> {
        self.active
    }

    /// Moves the dragged object to where `ray` meets its wall. Returns the
    /// new normalized position, or `None` when the ray misses the wall.
    pub fn update(
        &mut self,
        scene: &mut SceneManager,
        backend: &mut dyn RenderBackend,
        ray: &Ray,
    ) -> Result<Option<f64>> {
        let Some(obj) = self.active else {
            return Ok(None);
        };
        let Some(room) = scene.room_mut(obj.room) else {
            self.active = None;
            return Err(Error::RoomNotFound(obj.room));
        };
        let Some(wall_index) = room.wall_object(obj.object).map(|o| o.wall()) else {
            self.active = None;
            return Err(Error::ObjectNotFound(obj));
        };

        let frame = room.wall_world_frame(wall_index)?;
        let wall = *room.wall(wall_index)?.geometry();
        let Some(distance) = ray.intersect_box(&frame, &wall.size) else {
            return Ok(None);
        };
        let local = frame.inverse_transform_point(&ray.at(distance));
        let position = snap(local.x / wall.span() + 0.5, DRAG_SNAP).clamp(0.0, 1.0);
        room.set_object_position(backend, obj.object, position)?;
        Ok(Some(position))
    }

    pub fn stop(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};
    use roomplan_core::{MemoryRenderer, Params};
    use roomplan_geometry::create_room;

    #[test]
    fn drag_follows_the_wall_and_snaps() {
        let mut r = MemoryRenderer::new();
        let params = Params::default();
        let mut room = create_room(&mut r, &params, &Point3::new(10.0, 0.0, 0.0), 4.0, 4.0, 2.5).unwrap();
        let door = room.add_door(&mut r, 0, 0.5).unwrap();
        let mut scene = SceneManager::new(params);
        let room = scene.add_room(&mut r, room);
        let obj = ObjectRef { room, object: door };

        let mut drag = DragController::new();
        drag.start(&scene, obj).unwrap();
        // World x 10.93 is local x 0.93 on the front wall: 0.7325 snaps to 0.7.
        let ray = Ray::new(Point3::new(10.93, 1.0, 0.0), Vector3::new(0.0, 0.0, -1.0)).unwrap();
        let position = drag.update(&mut scene, &mut r, &ray).unwrap().unwrap();
        assert_relative_eq!(position, 0.7);
        assert_relative_eq!(scene.wall_object(obj).unwrap().position(), 0.7);

        let away = Ray::new(Point3::new(10.0, 1.0, 0.0), Vector3::new(0.0, 1.0, 0.0)).unwrap();
        assert_eq!(drag.update(&mut scene, &mut r, &away).unwrap(), None);

        drag.stop();
        assert!(!drag.is_dragging());
        assert_eq!(drag.update(&mut scene, &mut r, &ray).unwrap(), None);
    }

    #[test]
    fn dragging_a_removed_object_fails() {
        let mut r = MemoryRenderer::new();
        let params = Params::default();
        let mut room = create_room(&mut r, &params, &Point3::origin(), 4.0, 4.0, 2.5).unwrap();
        let door = room.add_door(&mut r, 0, 0.5).unwrap();
        let mut scene = SceneManager::new(params);
        let room = scene.add_room(&mut r, room);
        let obj = ObjectRef { room, object: door };

        let mut drag = DragController::new();
        drag.start(&scene, obj).unwrap();
        scene.room_mut(room).unwrap().remove_wall_object(&mut r, door).unwrap();
        let ray = Ray::new(Point3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 0.0, -1.0)).unwrap();
        assert!(matches!(drag.update(&mut scene, &mut r, &ray), Err(Error::ObjectNotFound(_))));
        assert!(!drag.is_dragging());
    }
}

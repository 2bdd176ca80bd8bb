// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Selection, hover and wall-object picking.

use std::str::FromStr;

use nalgebra::Point2;
use roomplan_core::math::box_corners;
use roomplan_core::{Camera, RenderBackend, ScreenRect};
use rustc_hash::FxHashSet;

use crate::scene::{ObjectRef, SceneManager};

/// How a pointer position is matched against wall objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PickStrategy {
    /// Nearest object box along the camera ray.
    #[default]
    Ray,
    /// First object whose projected bounding rectangle holds the pointer.
    ScreenBox,
}

impl FromStr for PickStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ray" => Ok(Self::Ray),
            "bbox" | "screen-box" | "screenbox" => Ok(Self::ScreenBox),
            other => Err(format!("unknown pick strategy: {other}")),
        }
    }
}

/// Tracks selected and hovered wall objects.
///
/// References are non-owning. An entry whose object has been removed is
/// dropped the next time the manager looks at it.
#[derive(Debug, Default)]
pub struct SelectionManager {
    selected: FxHashSet<ObjectRef>,
    hovered: Option<ObjectRef>,
    strategy: PickStrategy,
}

impl SelectionManager {
    pub fn new(strategy: PickStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    #[inline]
    pub fn strategy(&self) -> PickStrategy {
        self.strategy
    }

    pub fn set_strategy(&mut self, strategy: PickStrategy) {
        self.strategy = strategy;
    }

    /// Highlights `obj`. Returns `false` if the object no longer exists.
    pub fn select(&mut self, scene: &mut SceneManager, backend: &mut dyn RenderBackend, obj: ObjectRef) -> bool {
        let Some(object) = scene.wall_object_mut(obj) else {
            self.forget(obj);
            return false;
        };
        object.select(backend);
        if self.hovered == Some(obj) {
            self.hovered = None;
        }
        self.selected.insert(obj);
        true
    }

    /// Restores the object's resting look.
    pub fn deselect(&mut self, scene: &mut SceneManager, backend: &mut dyn RenderBackend, obj: ObjectRef) {
        if let Some(object) = scene.wall_object_mut(obj) {
            object.deselect(backend);
        }
        self.selected.remove(&obj);
    }

    /// Hover glow on `obj`, clearing any previous hover. Hovering a selected
    /// object changes nothing, the previous hover included.
    pub fn hover(&mut self, scene: &mut SceneManager, backend: &mut dyn RenderBackend, obj: ObjectRef) {
        if self.hovered == Some(obj) {
            return;
        }
        match scene.wall_object(obj) {
            None => {
                self.forget(obj);
                return;
            }
            Some(object) if object.is_selected() => return,
            Some(_) => {}
        }
        self.unhover_current(scene, backend);
        if let Some(object) = scene.wall_object_mut(obj) {
            object.hover(backend);
            self.hovered = Some(obj);
        }
    }

    pub fn unhover_current(&mut self, scene: &mut SceneManager, backend: &mut dyn RenderBackend) {
        if let Some(obj) = self.hovered.take() {
            if let Some(object) = scene.wall_object_mut(obj) {
                object.unhover(backend);
            }
        }
    }

    /// Deselects everything and drops the hover.
    pub fn clear(&mut self, scene: &mut SceneManager, backend: &mut dyn RenderBackend) {
        self.unhover_current(scene, backend);
        for obj in std::mem::take(&mut self.selected) {
            if let Some(object) = scene.wall_object_mut(obj) {
                object.deselect(backend);
            }
        }
    }

    #[inline]
    pub fn is_selected(&self, obj: ObjectRef) -> bool {
        self.selected.contains(&obj)
    }

    #[inline]
    pub fn hovered(&self) -> Option<ObjectRef> {
        self.hovered
    }

    /// Selected objects that still exist.
    pub fn selected(&mut self, scene: &SceneManager) -> Vec<ObjectRef> {
        self.prune(scene);
        self.selected.iter().copied().collect()
    }

    /// Drops references to objects that are gone.
    pub fn prune(&mut self, scene: &SceneManager) {
        let before = self.selected.len();
        self.selected.retain(|obj| scene.wall_object(*obj).is_some());
        if self.hovered.is_some_and(|obj| scene.wall_object(obj).is_none()) {
            self.hovered = None;
        }
        if self.selected.len() != before {
            tracing::debug!(dropped = before - self.selected.len(), "pruned stale selection");
        }
    }

    fn forget(&mut self, obj: ObjectRef) {
        self.selected.remove(&obj);
        if self.hovered == Some(obj) {
            self.hovered = None;
        }
    }

    /// Finds the wall object under a pointer given in normalized device
    /// coordinates. Ghost previews never match.
    pub fn pick(&self, scene: &SceneManager, camera: &Camera, ndc: &Point2<f64>) -> Option<ObjectRef> {
        match self.strategy {
            PickStrategy::Ray => pick_by_ray(scene, camera, ndc),
            PickStrategy::ScreenBox => pick_by_screen_box(scene, camera, ndc),
        }
    }
}

fn pick_by_ray(scene: &SceneManager, camera: &Camera, ndc: &Point2<f64>) -> Option<ObjectRef> {
    let ray = camera.ray_from_ndc(ndc)?;
    let mut best: Option<(ObjectRef, f64)> = None;
    for (obj, object) in scene.objects() {
        let Some(frame) = scene.room(obj.room).map(|r| r.frame() * object.transform()) else {
            continue;
        };
        if let Some(distance) = ray.intersect_box(&frame, &object.size()) {
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((obj, distance));
            }
        }
    }
    best.map(|(obj, _)| obj)
}

fn pick_by_screen_box(scene: &SceneManager, camera: &Camera, ndc: &Point2<f64>) -> Option<ObjectRef> {
    scene
        .objects()
        .find(|(obj, object)| {
            let Some(frame) = scene.room(obj.room).map(|r| r.frame() * object.transform()) else {
                return false;
            };
            let projected = box_corners(&object.size()).map(|c| camera.project(&(frame * c)));
            // Corners behind the camera flip through the projection.
            if projected.iter().any(|p| !(-1.0..=1.0).contains(&p.z)) {
                return false;
            }
            ScreenRect::enclosing(projected.iter().map(|p| Point2::new(p.x, p.y)))
                .is_some_and(|rect| rect.contains(ndc))
        })
        .map(|(obj, _)| obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use roomplan_core::{MemoryRenderer, Params, RoomKey, WallObjectKey};
    use roomplan_geometry::create_room;
    use std::f64::consts::FRAC_PI_3;

    fn scene_with_socket(r: &mut MemoryRenderer) -> (SceneManager, ObjectRef) {
        let params = Params::default();
        let mut room = create_room(r, &params, &Point3::origin(), 4.0, 4.0, 2.5).unwrap();
        let object = room.add_socket(r, 0, 0.5, None).unwrap();
        let mut scene = SceneManager::new(params);
        let room = scene.add_room(r, room);
        (scene, ObjectRef { room, object })
    }

    /// Camera in the room looking straight at the front-wall socket.
    fn camera_at_socket(scene: &SceneManager, obj: ObjectRef) -> Camera {
        let room = scene.room(obj.room).unwrap();
        let target = room.object_world_transform(obj.object).unwrap() * Point3::origin();
        let eye = Point3::new(target.x, target.y, 0.0);
        Camera::look_at(eye, target, FRAC_PI_3, 1.0, 0.1, 100.0)
    }

    #[test]
    fn parses_strategy_names() {
        assert_eq!("ray".parse::<PickStrategy>(), Ok(PickStrategy::Ray));
        assert_eq!("BBox".parse::<PickStrategy>(), Ok(PickStrategy::ScreenBox));
        assert_eq!("screen-box".parse::<PickStrategy>(), Ok(PickStrategy::ScreenBox));
        assert!("lasso".parse::<PickStrategy>().is_err());
    }

    #[test]
    fn select_restores_baseline_on_deselect() {
        let mut r = MemoryRenderer::new();
        let (mut scene, obj) = scene_with_socket(&mut r);
        let mut selection = SelectionManager::default();
        let before = *scene.wall_object(obj).unwrap().material();

        assert!(selection.select(&mut scene, &mut r, obj));
        assert!(selection.select(&mut scene, &mut r, obj));
        let lit = scene.wall_object(obj).unwrap().material();
        assert_eq!(lit.color, 0xffff00);
        assert_eq!(lit.emissive, 0xffff00);

        selection.deselect(&mut scene, &mut r, obj);
        selection.deselect(&mut scene, &mut r, obj);
        assert_eq!(*scene.wall_object(obj).unwrap().material(), before);
        assert!(!selection.is_selected(obj));
    }

    #[test]
    fn hover_skips_selected_objects() {
        let mut r = MemoryRenderer::new();
        let (mut scene, obj) = scene_with_socket(&mut r);
        let mut selection = SelectionManager::default();

        selection.hover(&mut scene, &mut r, obj);
        assert_eq!(scene.wall_object(obj).unwrap().material().emissive, 0x44aaff);
        selection.select(&mut scene, &mut r, obj);
        assert_eq!(selection.hovered(), None);

        selection.hover(&mut scene, &mut r, obj);
        assert_eq!(selection.hovered(), None);
        assert_eq!(scene.wall_object(obj).unwrap().material().emissive, 0xffff00);
    }

    #[test]
    fn hovering_a_selected_object_keeps_the_previous_hover() {
        let mut r = MemoryRenderer::new();
        let (mut scene, a) = scene_with_socket(&mut r);
        let b = ObjectRef {
            room: a.room,
            object: scene.room_mut(a.room).unwrap().add_door(&mut r, 1, 0.5).unwrap(),
        };
        let mut selection = SelectionManager::default();

        selection.select(&mut scene, &mut r, a);
        selection.hover(&mut scene, &mut r, b);
        selection.hover(&mut scene, &mut r, a);

        assert_eq!(selection.hovered(), Some(b));
        assert!(scene.wall_object(b).unwrap().is_hovered());
        assert!(scene.wall_object(a).unwrap().is_selected());
        assert_eq!(scene.wall_object(a).unwrap().material().emissive, 0xffff00);
    }

    #[test]
    fn removed_objects_are_pruned() {
        let mut r = MemoryRenderer::new();
        let (mut scene, obj) = scene_with_socket(&mut r);
        let mut selection = SelectionManager::default();
        selection.select(&mut scene, &mut r, obj);

        scene
            .room_mut(obj.room)
            .unwrap()
            .remove_wall_object(&mut r, obj.object)
            .unwrap();
        assert!(selection.selected(&scene).is_empty());

        let missing = ObjectRef {
            room: RoomKey::default(),
            object: WallObjectKey::default(),
        };
        assert!(!selection.select(&mut scene, &mut r, missing));
    }

    #[test]
    fn both_strategies_pick_the_socket_ahead() {
        let mut r = MemoryRenderer::new();
        let (scene, obj) = scene_with_socket(&mut r);
        let camera = camera_at_socket(&scene, obj);
        let mut selection = SelectionManager::new(PickStrategy::Ray);

        assert_eq!(selection.pick(&scene, &camera, &Point2::origin()), Some(obj));
        selection.set_strategy(PickStrategy::ScreenBox);
        assert_eq!(selection.pick(&scene, &camera, &Point2::origin()), Some(obj));
        assert_eq!(selection.pick(&scene, &camera, &Point2::new(0.9, 0.9)), None);
    }

    #[test]
    fn ghosts_are_not_pickable() {
        let mut r = MemoryRenderer::new();
        let (mut scene, obj) = scene_with_socket(&mut r);
        scene
            .room_mut(obj.room)
            .unwrap()
            .remove_wall_object(&mut r, obj.object)
            .unwrap();
        let wall = crate::scene::WallRef { room: obj.room, wall: 0 };
        scene
            .create_ghost_object(&mut r, wall, roomplan_geometry::ObjectType::Socket, 0.5)
            .unwrap();

        let camera = Camera::look_at(
            Point3::new(0.0, 0.25, 0.0),
            Point3::new(0.0, 0.25, -2.0),
            FRAC_PI_3,
            1.0,
            0.1,
            100.0,
        );
        let selection = SelectionManager::new(PickStrategy::Ray);
        assert_eq!(selection.pick(&scene, &camera, &Point2::origin()), None);
    }
}

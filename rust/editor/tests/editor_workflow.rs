// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Editing sessions end to end: placement with ghosts, project loading,
//! and projects on disk.

use approx::assert_relative_eq;
use roomplan_core::{MemoryRenderer, Params, Point3, Ray, RoomKey, Vector3};
use roomplan_editor::{
    export_to_file, import_from_file, DirStore, Error, ObjectType, PlacementState, ProjectFile, ProjectLibrary,
    SceneManager, WallRef,
};
use roomplan_geometry::{create_room, RoomRecord, WallObjectRecord};

fn scene_with_room(r: &mut MemoryRenderer) -> (SceneManager, RoomKey) {
    let params = Params::default();
    let room = create_room(r, &params, &Point3::origin(), 4.0, 4.0, 2.5).unwrap();
    let mut scene = SceneManager::new(params);
    let key = scene.add_room(r, room);
    (scene, key)
}

/// Horizontal ray from the room center toward `direction`.
fn from_center(x: f64, z: f64) -> Ray {
    Ray::new(Point3::new(0.0, 1.0, 0.0), Vector3::new(x, 0.0, z)).unwrap()
}

#[test]
fn ghost_is_rebuilt_when_the_wall_changes() {
    let mut r = MemoryRenderer::new();
    let (mut scene, room) = scene_with_room(&mut r);

    scene.pointer_moved(&mut r, &from_center(0.0, -1.0), Some(ObjectType::Socket));
    let (wall, ghost) = scene.ghost().unwrap();
    assert_eq!(wall, WallRef { room, wall: 0 });
    let first_mesh = ghost.mesh();
    let nodes_with_ghost = r.live_node_count();

    let state = scene.pointer_moved(&mut r, &from_center(1.0, 0.0), Some(ObjectType::Socket));
    let (wall, ghost) = scene.ghost().unwrap();
    assert_eq!(wall, WallRef { room, wall: 1 });
    assert_ne!(ghost.mesh(), first_mesh);
    assert!(r.node(first_mesh).is_none());
    assert_eq!(r.live_node_count(), nodes_with_ghost);
    assert!(matches!(state, PlacementState::GhostActive { kind: ObjectType::Socket, .. }));

    scene.pointer_moved(&mut r, &from_center(1.0, 0.0), Some(ObjectType::Door));
    assert_eq!(scene.ghost().unwrap().1.object_type(), ObjectType::Door);
    assert_eq!(r.stale_releases(), 0);
}

#[test]
fn committing_a_ghost_adds_a_real_object() {
    let mut r = MemoryRenderer::new();
    let (mut scene, room) = scene_with_room(&mut r);
    let before = r.live_node_count();

    scene.pointer_moved(&mut r, &from_center(0.0, 1.0), Some(ObjectType::Socket));
    let obj = scene.place_ghost_object(&mut r).unwrap();

    assert!(scene.ghost().is_none());
    assert_eq!(scene.state(), PlacementState::Idle);
    let object = scene.wall_object(obj).unwrap();
    assert!(!object.is_ghost());
    assert_eq!(object.wall(), 2);
    assert_relative_eq!(object.position(), 0.5);
    assert_eq!(object.socket().unwrap().name, "Socket 1");

    // Mesh and outline of the committed object, ghost gone.
    assert_eq!(r.live_node_count(), before + 2);
    let world = scene.room(room).unwrap().object_world_transform(obj.object).unwrap();
    assert!(world.translation.z < 2.0 && world.translation.z > 1.8);
}

#[test]
fn failed_project_load_leaves_the_scene_alone() {
    let mut r = MemoryRenderer::new();
    let (mut scene, room) = scene_with_room(&mut r);
    scene.room_mut(room).unwrap().add_door(&mut r, 0, 0.3).unwrap();
    let nodes = r.live_node_count();
    let geometries = r.live_geometry_count();

    let good = scene.room(room).unwrap().to_record();
    let mut bad: RoomRecord = good.clone();
    bad.wall_objects.push(WallObjectRecord::Door(roomplan_geometry::DoorRecord {
        position: 0.5,
        wall_index: 9,
    }));
    let project = ProjectFile {
        name: "broken".into(),
        date: 0,
        rooms: vec![good.clone(), bad],
    };

    assert!(matches!(scene.load_project(&mut r, &project), Err(Error::Geometry(_))));
    assert_eq!(scene.room_count(), 1);
    assert!(scene.room(room).is_some());
    assert_eq!(r.live_node_count(), nodes);
    assert_eq!(r.live_geometry_count(), geometries);

    let project = ProjectFile {
        name: "twins".into(),
        date: 0,
        rooms: vec![good.clone(), good],
    };
    let keys = scene.load_project(&mut r, &project).unwrap();
    assert_eq!(keys.len(), 2);
    assert!(scene.room(room).is_none());
    assert_eq!(scene.objects().count(), 2);
}

#[test]
fn projects_survive_a_directory_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut r = MemoryRenderer::new();
    let (mut scene, room) = scene_with_room(&mut r);
    let socket = scene.room_mut(room).unwrap().add_socket(&mut r, 3, 0.7, None).unwrap();
    scene
        .room_mut(room)
        .unwrap()
        .set_socket_name(&mut r, socket, "Desk lamp")
        .unwrap();

    let mut library = ProjectLibrary::new(DirStore::open(dir.path().join("projects")).unwrap(), "roomEditor_");
    library.save("Ground floor", &scene).unwrap();
    library
        .save_project(&ProjectFile {
            name: "Attic".into(),
            date: 0,
            rooms: Vec::new(),
        })
        .unwrap();

    let listed: Vec<_> = library.list().unwrap().into_iter().map(|p| p.name).collect();
    assert_eq!(listed, ["Ground floor", "Attic"]);

    let project = library.load("Ground floor").unwrap();
    let mut restored = SceneManager::new(Params::default());
    restored.load_project(&mut r, &project).unwrap();
    let (_, object) = restored.objects().next().unwrap();
    assert_eq!(object.socket().unwrap().name, "Desk lamp");
    assert_relative_eq!(object.position(), 0.7);
}

#[test]
fn export_and_import_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut r = MemoryRenderer::new();
    let (mut scene, room) = scene_with_room(&mut r);
    scene.room_mut(room).unwrap().set_size(&mut r, 5.5, 3.0).unwrap();

    let path = export_to_file(dir.path(), "My flat", &scene).unwrap();
    let file_name = path.file_name().unwrap().to_str().unwrap();
    assert!(file_name.starts_with("My_flat_") && file_name.ends_with(".json"));

    let project = import_from_file(&path).unwrap();
    assert_eq!(project.name, "My flat");
    assert_eq!(project.rooms.len(), 1);
    assert_eq!(project.rooms[0].width, Some(5.5));
    assert_eq!(project.rooms[0].height, Some(3.0));

    assert!(import_from_file(&dir.path().join("missing.json")).is_err());
}

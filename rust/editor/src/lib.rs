// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # RoomPlan Editor
//!
//! Interactive editing on top of [`roomplan_geometry`]:
//!
//! - [`SceneManager`] owns the rooms and runs wall-object placement with a
//!   translucent ghost preview
//! - [`SelectionManager`] highlights and picks wall objects
//! - [`RoomCreation`] draws rooms with two clicks on the ground grid
//! - [`DragController`] slides objects along their walls
//! - [`persistence`] saves, lists, exports and imports projects
//! - [`iot`] summarizes the sockets in the scene
//!
//! ```
//! use roomplan_core::{MemoryRenderer, Params, Point3, Ray, Vector3};
//! use roomplan_editor::{ObjectType, SceneManager};
//! use roomplan_geometry::create_room;
//!
//! let mut renderer = MemoryRenderer::new();
//! let params = Params::default();
//! let room = create_room(&mut renderer, &params, &Point3::origin(), 4.0, 4.0, 2.5)?;
//!
//! let mut scene = SceneManager::new(params);
//! scene.add_room(&mut renderer, room);
//!
//! let ray = Ray::new(Point3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 0.0, -1.0)).unwrap();
//! scene.pointer_moved(&mut renderer, &ray, Some(ObjectType::Socket));
//! let socket = scene.place_ghost_object(&mut renderer)?;
//! assert!(scene.wall_object(socket).is_some());
//! # Ok::<(), roomplan_editor::Error>(())
//! ```

pub mod config;
pub mod creation;
pub mod drag;
pub mod error;
pub mod iot;
pub mod persistence;
pub mod scene;
pub mod selection;

pub use config::EditorConfig;
pub use creation::{ClickOutcome, RoomCreation};
pub use drag::DragController;
pub use error::{Error, Result};
pub use iot::{DeviceFilter, DeviceTotals, SocketSummary, StateFilter};
pub use persistence::{
    export_file_name, export_to_file, import_from_file, DirStore, MemoryStore, ProjectFile, ProjectLibrary,
    ProjectStore, ProjectSummary,
};
pub use roomplan_geometry::{DeviceType, ObjectType};
pub use scene::{ObjectRef, PlacementState, SceneManager, WallHit, WallRef};
pub use selection::{PickStrategy, SelectionManager};

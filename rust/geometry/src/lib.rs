// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # RoomPlan Geometry
//!
//! Rectangular rooms and the objects mounted on their walls.
//!
//! - [`Room`] owns four [`Wall`]s, a [`Floor`], four [`ResizeMarker`]s and
//!   its [`WallObject`]s, and keeps them consistent through
//!   [`Room::set_size`] and [`Room::set_wall_height`]
//! - [`placement`] turns a normalized wall coordinate into a transform
//! - [`factory`] builds rooms from a center and size or from two corners
//! - [`serialization`] reads and writes the saved room records
//!
//! ```
//! use roomplan_core::{MemoryRenderer, Params, Point3};
//! use roomplan_geometry::factory::create_room_from_points;
//!
//! let mut renderer = MemoryRenderer::new();
//! let params = Params::default();
//! let mut room = create_room_from_points(
//!     &mut renderer,
//!     &params,
//!     &Point3::new(0.0, 0.0, 0.0),
//!     &Point3::new(4.0, 0.0, 3.0),
//!     2.5,
//! )?;
//! let socket = room.add_socket(&mut renderer, 0, 0.5, None)?;
//! room.set_size(&mut renderer, 6.0, 3.0)?;
//! assert_eq!(room.wall_object(socket).map(|o| o.position()), Some(0.5));
//! # Ok::<(), roomplan_geometry::Error>(())
//! ```

pub mod error;
pub mod factory;
pub mod floor;
pub mod marker;
pub mod placement;
pub mod room;
pub mod serialization;
pub mod shape;
pub mod wall;
pub mod wall_object;

pub use error::{Error, Result};
pub use factory::{create_room, create_room_from_points};
pub use floor::Floor;
pub use marker::{Corner, ResizeMarker};
pub use placement::{compute_transform, socket_z_offset, Placement, PlacementRequest, PlacementWarning};
pub use room::{infer_dimensions, Room, RoomLayout};
pub use serialization::{DoorRecord, RoomRecord, SocketRecord, Vec3Record, WallObjectRecord, WallRecord};
pub use shape::BoxShape;
pub use wall::{Wall, WallGeometry, WallSide};
pub use wall_object::{DeviceType, ObjectType, SocketState, WallObject, WallObjectKind};

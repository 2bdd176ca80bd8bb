// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # RoomPlan Core
//!
//! Shared building blocks for the RoomPlan editor engine:
//!
//! - **Keys**: generational slot map keys for render handles, rooms and
//!   wall objects
//! - **Parameters**: the tunable dimensions, colors and opacities of every
//!   scene element, loadable from JSON
//! - **Picking math**: rays, ray/box intersection, camera projection to
//!   normalized device coordinates
//! - **Render seam**: the [`RenderBackend`] trait through which geometry is
//!   created, attached, restyled and released, plus an in-memory
//!   [`MemoryRenderer`] that tracks every live handle
//!
//! ```
//! use roomplan_core::{MemoryRenderer, RenderBackend, Vector3};
//!
//! let mut renderer = MemoryRenderer::new();
//! let geometry = renderer.create_box_geometry(Vector3::new(4.0, 2.5, 0.1));
//! assert_eq!(renderer.live_geometry_count(), 1);
//! renderer.dispose_geometry(geometry);
//! assert_eq!(renderer.live_geometry_count(), 0);
//! ```

pub mod error;
pub mod keys;
pub mod math;
pub mod memory;
pub mod params;
pub mod render;

// Re-export nalgebra types for convenience
pub use nalgebra::{Isometry3, Point2, Point3, Translation3, Unit, UnitQuaternion, Vector3};

pub use error::{Error, Result};
pub use keys::{GeometryKey, NodeKey, RoomKey, WallObjectKey};
pub use math::{Camera, Ray, ScreenRect};
pub use memory::{GeometryKind, MemoryRenderer, NodeData, NodeKind};
pub use params::{
    DoorParams, FloorParams, HighlightParams, MarkerParams, Params, SocketParams, WallParams,
};
pub use render::{Material, RenderBackend};

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use roomplan_core::RoomKey;
use thiserror::Error;

use crate::scene::ObjectRef;

/// Result type for editor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while editing a scene
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Room not found: {0:?}")]
    RoomNotFound(RoomKey),

    #[error("Wall object not found: {0:?}")]
    ObjectNotFound(ObjectRef),

    #[error("Invalid project name: {0:?}")]
    InvalidName(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Geometry error: {0}")]
    Geometry(#[from] roomplan_geometry::Error),
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use roomplan_core::WallObjectKey;
use thiserror::Error;

/// Result type for room geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or editing rooms
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid room dimensions: width={width}, depth={depth}")]
    InvalidDimensions { width: f64, depth: f64 },

    #[error("Invalid room position: x={x}, z={z}")]
    InvalidPosition { x: f64, z: f64 },

    #[error("Invalid wall height: {0}")]
    InvalidWallHeight(f64),

    #[error("Wall index {index} out of range (room has {count} walls)")]
    WallNotFound { index: usize, count: usize },

    #[error("A room needs exactly 4 walls, found {0}")]
    WallCount(usize),

    #[error("Wall object not found: {0:?}")]
    ObjectNotFound(WallObjectKey),

    #[error("Wall object {0:?} is not a socket")]
    NotASocket(WallObjectKey),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Core error: {0}")]
    Core(#[from] roomplan_core::Error),
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Editor configuration loaded from environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use roomplan_core::Params;

use crate::creation::RoomCreation;
use crate::error::Result;
use crate::persistence::{DirStore, ProjectLibrary};
use crate::scene::SceneManager;
use crate::selection::{PickStrategy, SelectionManager};

/// Editor configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Directory used by the directory-backed project store.
    pub storage_dir: PathBuf,
    /// Prefix of every saved project key.
    pub key_prefix: String,
    /// Smallest width and depth accepted when drawing a room.
    pub min_room_size: f64,
    /// Ground grid step for room corners.
    pub grid_size: f64,
    /// Step of normalized wall positions while placing or dragging.
    pub placement_snap: f64,
    /// Wall height of newly drawn rooms.
    pub wall_height: f64,
    /// Hit-testing strategy for wall objects.
    pub pick_strategy: PickStrategy,
}

fn env_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key).and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn positive_or(value: f64, default: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        default
    }
}

impl EditorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup. Missing or
    /// unparsable values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        Self {
            storage_dir: lookup("ROOMPLAN_STORAGE_DIR")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(d.storage_dir),
            key_prefix: lookup("ROOMPLAN_KEY_PREFIX")
                .filter(|s| !s.is_empty())
                .unwrap_or(d.key_prefix),
            min_room_size: positive_or(
                env_or(&lookup, "ROOMPLAN_MIN_ROOM_SIZE", d.min_room_size),
                d.min_room_size,
            ),
            grid_size: positive_or(env_or(&lookup, "ROOMPLAN_GRID_SIZE", d.grid_size), d.grid_size),
            placement_snap: positive_or(
                env_or(&lookup, "ROOMPLAN_PLACEMENT_SNAP", d.placement_snap),
                d.placement_snap,
            ),
            wall_height: positive_or(env_or(&lookup, "ROOMPLAN_WALL_HEIGHT", d.wall_height), d.wall_height),
            pick_strategy: env_or(&lookup, "ROOMPLAN_PICK_STRATEGY", d.pick_strategy),
        }
    }

    pub fn scene(&self, params: Params) -> SceneManager {
        SceneManager::new(params).with_placement_snap(self.placement_snap)
    }

    pub fn selection(&self) -> SelectionManager {
        SelectionManager::new(self.pick_strategy)
    }

    pub fn room_creation(&self) -> RoomCreation {
        RoomCreation::new(self.grid_size, self.min_room_size)
    }

    /// Opens the project library in [`storage_dir`](Self::storage_dir).
    pub fn library(&self) -> Result<ProjectLibrary<DirStore>> {
        Ok(ProjectLibrary::new(DirStore::open(&self.storage_dir)?, self.key_prefix.clone()))
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            storage_dir: std::env::current_dir()
                .map(|dir| dir.join(".roomplan"))
                .unwrap_or_else(|_| PathBuf::from("./.roomplan")),
            key_prefix: "roomEditor_".into(),
            min_room_size: 1.0,
            grid_size: 0.5,
            placement_snap: 0.1,
            wall_height: 2.5,
            pick_strategy: PickStrategy::Ray,
        }
    }
}

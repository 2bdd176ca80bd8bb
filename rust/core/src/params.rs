// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene element parameters.
//!
//! Every dimension, color and opacity the engine uses when it builds walls,
//! floors, markers and wall objects lives here. The defaults reproduce the
//! stock editor look; a JSON document with any subset of the fields can
//! override them.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Wall panel appearance and thickness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallParams {
    pub color: u32,
    pub opacity: f64,
    pub roughness: f64,
    pub metalness: f64,
    pub thickness: f64,
}

impl Default for WallParams {
    fn default() -> Self {
        Self {
            color: 0x986eba,
            opacity: 0.27,
            roughness: 0.5,
            metalness: 0.1,
            thickness: 0.1,
        }
    }
}

/// Floor slab appearance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorParams {
    pub color: u32,
    pub opacity: f64,
    pub roughness: f64,
    pub metalness: f64,
    /// Slab thickness. The slab top sits at `y = 0`.
    pub thickness: f64,
}

impl Default for FloorParams {
    fn default() -> Self {
        Self {
            color: 0x808080,
            opacity: 0.27,
            roughness: 0.7,
            metalness: 0.1,
            thickness: 0.1,
        }
    }
}

/// Resize-corner marker cubes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerParams {
    pub color: u32,
    pub size: f64,
    /// Height of the marker center above the floor.
    pub elevation: f64,
}

impl Default for MarkerParams {
    fn default() -> Self {
        Self {
            color: 0x2196f3,
            size: 0.2,
            elevation: 0.1,
        }
    }
}

/// Socket housing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocketParams {
    pub color: u32,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub roughness: f64,
    pub metalness: f64,
    pub opacity: f64,
    pub ghost_opacity: f64,
    /// Height of the socket center above the floor.
    pub mount_height: f64,
    /// Perpendicular offset used when no explicit offset is supplied.
    pub default_z_bias: f64,
    /// Substitute for a non-positive height.
    pub fallback_height: f64,
}

impl Default for SocketParams {
    fn default() -> Self {
        Self {
            color: 0x2196f3,
            width: 0.1,
            height: 0.1,
            depth: 0.05,
            roughness: 0.5,
            metalness: 0.8,
            opacity: 1.0,
            ghost_opacity: 0.5,
            mount_height: 0.25,
            default_z_bias: -0.06,
            fallback_height: 0.5,
        }
    }
}

/// Door leaf.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorParams {
    pub color: u32,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub roughness: f64,
    pub metalness: f64,
    pub opacity: f64,
    pub ghost_opacity: f64,
    /// Substitute for a non-positive height.
    pub fallback_height: f64,
}

impl Default for DoorParams {
    fn default() -> Self {
        Self {
            color: 0xffac59,
            width: 0.8,
            height: 2.0,
            depth: 0.2,
            roughness: 0.7,
            metalness: 0.2,
            opacity: 1.0,
            ghost_opacity: 0.5,
            fallback_height: 2.0,
        }
    }
}

/// Selection and hover feedback colors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightParams {
    pub selected_color: u32,
    pub selected_emissive: u32,
    pub selected_emissive_intensity: f64,
    pub hover_emissive: u32,
    pub hover_emissive_intensity: f64,
    pub outline_color: u32,
    pub preview_color: u32,
    pub preview_opacity: f64,
}

impl Default for HighlightParams {
    fn default() -> Self {
        Self {
            selected_color: 0xffff00,
            selected_emissive: 0xffff00,
            selected_emissive_intensity: 1.0,
            hover_emissive: 0x44aaff,
            hover_emissive_intensity: 0.7,
            outline_color: 0x111111,
            preview_color: 0x4caf50,
            preview_opacity: 0.3,
        }
    }
}

/// The full parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    pub wall: WallParams,
    pub floor: FloorParams,
    pub marker: MarkerParams,
    pub socket: SocketParams,
    pub door: DoorParams,
    pub highlight: HighlightParams,
}

impl Params {
    /// Parses a (possibly partial) parameter document and validates it.
    pub fn from_json(json: &str) -> Result<Self> {
        let params: Params = serde_json::from_str(json).map_err(|e| Error::Parse(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// Checks that every size the engine divides or builds boxes with is
    /// finite and positive.
    pub fn validate(&self) -> Result<()> {
        let sizes: [(&'static str, f64); 11] = [
            ("wall.thickness", self.wall.thickness),
            ("floor.thickness", self.floor.thickness),
            ("marker.size", self.marker.size),
            ("socket.width", self.socket.width),
            ("socket.height", self.socket.height),
            ("socket.depth", self.socket.depth),
            ("socket.fallback_height", self.socket.fallback_height),
            ("door.width", self.door.width),
            ("door.height", self.door.height),
            ("door.depth", self.door.depth),
            ("door.fallback_height", self.door.fallback_height),
        ];
        for (name, value) in sizes {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

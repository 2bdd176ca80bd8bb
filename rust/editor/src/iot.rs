// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device overview over every socket in the scene.

use roomplan_core::RenderBackend;
use roomplan_geometry::DeviceType;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::scene::{ObjectRef, SceneManager};

/// On/off filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StateFilter {
    #[default]
    All,
    On,
    Off,
}

/// Which sockets the dashboard lists. `device_type: None` means every type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceFilter {
    pub device_type: Option<DeviceType>,
    pub state: StateFilter,
}

impl DeviceFilter {
    pub fn matches(&self, device: &SocketSummary) -> bool {
        if self.device_type.is_some_and(|t| t != device.device_type) {
            return false;
        }
        match self.state {
            StateFilter::All => true,
            StateFilter::On => device.is_on,
            StateFilter::Off => !device.is_on,
        }
    }
}

/// One socket as the dashboard shows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocketSummary {
    #[serde(skip)]
    pub object: ObjectRef,
    pub name: String,
    pub device_type: DeviceType,
    pub is_on: bool,
    pub power_consumption: f64,
}

/// Totals across every socket.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceTotals {
    pub total: usize,
    pub active: usize,
    /// Watts drawn by sockets that are on.
    pub power: f64,
}

/// Every socket of every room, in scene order.
pub fn sockets(scene: &SceneManager) -> Vec<SocketSummary> {
    scene
        .objects()
        .filter_map(|(object, o)| {
            o.socket().map(|s| SocketSummary {
                object,
                name: s.name.clone(),
                device_type: s.device_type,
                is_on: s.is_on,
                power_consumption: s.power_consumption,
            })
        })
        .collect()
}

/// Sockets passing `filter`.
pub fn filtered(scene: &SceneManager, filter: &DeviceFilter) -> Vec<SocketSummary> {
    sockets(scene).into_iter().filter(|s| filter.matches(s)).collect()
}

pub fn totals(scene: &SceneManager) -> DeviceTotals {
    sockets(scene).iter().fold(DeviceTotals::default(), |mut acc, s| {
        acc.total += 1;
        if s.is_on {
            acc.active += 1;
            acc.power += s.power_consumption;
        }
        acc
    })
}

/// Flips a socket on or off from the dashboard.
pub fn toggle(scene: &mut SceneManager, backend: &mut dyn RenderBackend, obj: ObjectRef) -> Result<()> {
    let room = scene.room_mut(obj.room).ok_or(Error::RoomNotFound(obj.room))?;
    room.toggle(backend, obj.object)?;
    Ok(())
}
